use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eflags: u32 {
const CF = 1 << 0; // Carry
const PF = 1 << 2; // Parity (even popcount of the low result byte)
const ZF = 1 << 6; // Zero
const SF = 1 << 7; // Sign
const OF = 1 << 11; // Overflow
}
}
