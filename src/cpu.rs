use crate::flags::Eflags;
use serde::{Deserialize, Serialize};

/// Minimal processor execution context for the ALU core.
///
/// The flags register lives here for the processor's whole lifetime; each
/// ALU call borrows it mutably for the duration of one operation. Register
/// file, instruction pointer, memory and decode belong to the surrounding
/// interpreter, not to this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cpu {
    pub eflags: Eflags,
}

impl Cpu {
    pub fn new() -> Self {
        Self {
            eflags: Eflags::empty(),
        }
    }

    pub fn reset(&mut self) {
        self.eflags = Eflags::empty();
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Trap {
    /// Divide or remainder with a zero divisor. Surfaced to the dispatcher,
    /// which decides whether to raise the emulated divide-error trap or halt.
    #[error("Divide error: divisor is zero")]
    DivideError,
    /// Width outside {8, 16, 32}; computing with a wrong mask would
    /// silently corrupt every flag, so this fails fast instead.
    #[error("Invalid operand width: {bits} bits")]
    InvalidWidth { bits: u32 },
}
