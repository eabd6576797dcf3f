use crate::cpu::Trap;
use serde::{Deserialize, Serialize};

/// Declared operand width of an ALU operation.
///
/// Every width-sensitive test (zero check, sign check, ordered comparison)
/// must go through [`Width::truncate`] or [`Width::sign_extend`] first;
/// testing a raw host-width value directly gives wrong flags for 8- and
/// 16-bit operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Width {
    W8 = 8,
    W16 = 16,
    W32 = 32,
}

impl Width {
    pub fn bits(self) -> u32 {
        self as u32
    }

    /// Mask selecting the low `w` bits: `2^w - 1`.
    pub fn mask(self) -> u32 {
        0xFFFF_FFFF >> (32 - self.bits())
    }

    /// The sign bit of a `w`-bit value: bit `w - 1`.
    pub fn sign_bit(self) -> u32 {
        1 << (self.bits() - 1)
    }

    /// Zero out everything above the declared width.
    pub fn truncate(self, v: u32) -> u32 {
        v & self.mask()
    }

    /// Promote bit `w - 1` of the truncated value into all higher bits,
    /// yielding the host-width two's-complement view.
    pub fn sign_extend(self, v: u32) -> u32 {
        let s = 32 - self.bits();
        ((self.truncate(v) << s) as i32 >> s) as u32
    }
}

/// Top bit of a host-width value; meaningful after a prior sign extension.
pub fn sign(v: u32) -> bool {
    v & 0x8000_0000 != 0
}

impl TryFrom<u32> for Width {
    type Error = Trap;

    fn try_from(bits: u32) -> Result<Self, Trap> {
        match bits {
            8 => Ok(Width::W8),
            16 => Ok(Width::W16),
            32 => Ok(Width::W32),
            _ => Err(Trap::InvalidWidth { bits }),
        }
    }
}
