use crate::cpu::Trap;
use crate::flags::Eflags;
use crate::width::{sign, Width};

/// The seventeen ALU entry points, as a strategy trait.
///
/// The dispatch layer composes against this trait so the whole unit can be
/// swapped for the golden reference model ([`crate::golden::RefAlu`]) at
/// runtime, which is what the differential test suite does.
///
/// Operands are raw unsigned values; the caller guarantees that only the low
/// `w` bits are meaningful. Results come back masked to `w`, except for the
/// multiply family which returns the full widened product. For the shift
/// family `src` is the shift count, not a width-`w` operand.
pub trait Alu {
    /// `dest + src`. Sets CF, PF, ZF, SF, OF.
    fn add(&self, fl: &mut Eflags, src: u32, dest: u32, w: Width) -> u32;

    /// `dest + src + CF`. The incoming carry is read before any flag is
    /// overwritten; CF derivation depends on it.
    fn adc(&self, fl: &mut Eflags, src: u32, dest: u32, w: Width) -> u32;

    /// `dest - src`, computed as addition of the two's complement.
    fn sub(&self, fl: &mut Eflags, src: u32, dest: u32, w: Width) -> u32;

    /// `dest - src - CF`. With the incoming carry clear this is exactly
    /// `sub`; with it set, the subtrahend's two's complement is short one,
    /// which is where the borrow goes.
    fn sbb(&self, fl: &mut Eflags, src: u32, dest: u32, w: Width) -> u32;

    /// Unsigned widening multiply. Returns the full double-width product;
    /// the caller splits high/low halves per width. CF and OF are both set
    /// iff the half above the declared width is nonzero; PF/ZF/SF are left
    /// untouched.
    fn mul(&self, fl: &mut Eflags, src: u32, dest: u32, w: Width) -> u64;

    /// Signed widening multiply, full product returned. Sets no flags
    /// (a deliberate simplification relative to full x86 semantics).
    fn imul(&self, src: i32, dest: i32, w: Width) -> i64;

    /// Unsigned truncating divide, quotient masked to width. No flags.
    fn div(&self, src: u64, dest: u64, w: Width) -> Result<u32, Trap>;

    /// Signed truncating divide; the quotient keeps its host width rather
    /// than being masked. No flags.
    fn idiv(&self, src: i64, dest: i64, w: Width) -> Result<i32, Trap>;

    /// Unsigned remainder. No flags.
    fn modu(&self, src: u64, dest: u64) -> Result<u32, Trap>;

    /// Signed remainder; sign follows the dividend. No flags.
    fn imod(&self, src: i64, dest: i64) -> Result<i32, Trap>;

    /// Bitwise AND. CF and OF forced clear; PF, ZF, SF from the result.
    fn and(&self, fl: &mut Eflags, src: u32, dest: u32, w: Width) -> u32;

    /// Bitwise OR; flags as for `and`.
    fn or(&self, fl: &mut Eflags, src: u32, dest: u32, w: Width) -> u32;

    /// Bitwise XOR; flags as for `and`.
    fn xor(&self, fl: &mut Eflags, src: u32, dest: u32, w: Width) -> u32;

    /// `dest << src`. CF is the last bit shifted out. The count is taken
    /// mod 32 as the hardware does, and an effective count of zero returns
    /// the masked dest with every flag unchanged. OF is never touched by
    /// the shift family.
    fn shl(&self, fl: &mut Eflags, src: u32, dest: u32, w: Width) -> u32;

    /// Logical right shift of the zero-extended dest.
    fn shr(&self, fl: &mut Eflags, src: u32, dest: u32, w: Width) -> u32;

    /// Arithmetic right shift of the sign-extended dest.
    fn sar(&self, fl: &mut Eflags, src: u32, dest: u32, w: Width) -> u32;

    /// SAL is SHL by definition.
    fn sal(&self, fl: &mut Eflags, src: u32, dest: u32, w: Width) -> u32 {
        self.shl(fl, src, dest, w)
    }
}

fn set_zf(fl: &mut Eflags, result: u32, w: Width) {
    fl.set(Eflags::ZF, w.truncate(result) == 0);
}

fn set_sf(fl: &mut Eflags, result: u32, w: Width) {
    fl.set(Eflags::SF, sign(w.sign_extend(result)));
}

// Parity looks at the low 8 bits of the raw result regardless of width.
fn set_pf(fl: &mut Eflags, result: u32) {
    fl.set(Eflags::PF, (result as u8).count_ones() % 2 == 0);
}

// Unsigned wrap shows up as the masked result comparing below the masked
// source; the comparison is done on sign-extended views, which preserve the
// unsigned order of width-masked values.
fn set_cf_add(fl: &mut Eflags, result: u32, src: u32, w: Width) {
    fl.set(Eflags::CF, w.sign_extend(result) < w.sign_extend(src));
}

fn set_cf_adc(fl: &mut Eflags, result: u32, src: u32, w: Width, carry_in: bool) {
    let res = w.sign_extend(result);
    let src = w.sign_extend(src);
    if carry_in {
        fl.set(Eflags::CF, res <= src);
    } else {
        fl.set(Eflags::CF, res < src);
    }
}

fn set_of_add(fl: &mut Eflags, result: u32, src: u32, dest: u32, w: Width) {
    let res = w.sign_extend(result);
    let src = w.sign_extend(src);
    let dest = w.sign_extend(dest);
    fl.set(Eflags::OF, sign(src) == sign(dest) && sign(src) != sign(res));
}

fn set_cf_sub(fl: &mut Eflags, result: u32, dest: u32, w: Width) {
    // More subtracted than the destination held: the result wraps upward.
    fl.set(Eflags::CF, w.sign_extend(result) > w.sign_extend(dest));
}

fn set_of_sub(fl: &mut Eflags, result: u32, src: u32, dest: u32, w: Width) {
    set_of_add(fl, result, !src, dest, w);
}

fn set_cf_sbb(fl: &mut Eflags, result: u32, dest: u32, w: Width) {
    fl.set(Eflags::CF, w.sign_extend(result) >= w.sign_extend(dest));
}

fn set_cf_of_mul(fl: &mut Eflags, product: u64, w: Width) {
    let high = match w {
        Width::W8 => (product >> 8) & 0xFF,
        Width::W16 => (product >> 16) & 0xFFFF,
        Width::W32 => product >> 32,
    };
    fl.set(Eflags::CF, high != 0);
    fl.set(Eflags::OF, high != 0);
}

fn set_cf_shl(fl: &mut Eflags, count: u32, dest: u32, w: Width) {
    // Sign bit (at width) of dest shifted one short of the full count is
    // the last bit pushed out.
    let out = w.sign_extend(dest.wrapping_shl(count - 1));
    fl.set(Eflags::CF, sign(out));
}

fn set_cf_shr(fl: &mut Eflags, count: u32, dest: u32) {
    fl.set(Eflags::CF, dest.wrapping_shr(count - 1) & 1 != 0);
}

// dest arrives already sign-extended; the arithmetic shift preserves it.
fn set_cf_sar(fl: &mut Eflags, count: u32, dest: u32) {
    let res = (dest as i32).wrapping_shr(count - 1) as u32;
    fl.set(Eflags::CF, res & 1 != 0);
}

fn twos_complement(v: u32) -> u32 {
    (!v).wrapping_add(1)
}

/// The local ALU implementation.
pub struct CoreAlu;

impl Alu for CoreAlu {
    fn add(&self, fl: &mut Eflags, src: u32, dest: u32, w: Width) -> u32 {
        let res = src.wrapping_add(dest);
        set_cf_add(fl, res, src, w);
        set_pf(fl, res);
        set_zf(fl, res, w);
        set_sf(fl, res, w);
        set_of_add(fl, res, src, dest, w);
        w.truncate(res)
    }

    fn adc(&self, fl: &mut Eflags, src: u32, dest: u32, w: Width) -> u32 {
        let carry_in = fl.contains(Eflags::CF);
        let res = src.wrapping_add(dest).wrapping_add(carry_in as u32);
        set_pf(fl, res);
        set_zf(fl, res, w);
        set_sf(fl, res, w);
        set_cf_adc(fl, res, src, w, carry_in);
        set_of_add(fl, res, src, dest, w);
        w.truncate(res)
    }

    fn sub(&self, fl: &mut Eflags, src: u32, dest: u32, w: Width) -> u32 {
        let res = dest.wrapping_add(twos_complement(src));
        set_pf(fl, res);
        set_sf(fl, res, w);
        set_zf(fl, res, w);
        set_cf_sub(fl, res, dest, w);
        set_of_sub(fl, res, src, dest, w);
        w.truncate(res)
    }

    fn sbb(&self, fl: &mut Eflags, src: u32, dest: u32, w: Width) -> u32 {
        // With no borrow pending this is plain subtraction; with one, the
        // complement is short by one (`!src` instead of `!src + 1`) and the
        // carry rule switches to `>=`. The two paths are not a single
        // formula and are kept separate deliberately.
        let carry_in = fl.contains(Eflags::CF);
        if !carry_in {
            return self.sub(fl, src, dest, w);
        }
        let res = dest.wrapping_add(!src);
        set_pf(fl, res);
        set_zf(fl, res, w);
        set_sf(fl, res, w);
        set_cf_sbb(fl, res, dest, w);
        set_of_sub(fl, res, src, dest, w);
        w.truncate(res)
    }

    fn mul(&self, fl: &mut Eflags, src: u32, dest: u32, w: Width) -> u64 {
        let product = src as u64 * dest as u64;
        set_cf_of_mul(fl, product, w);
        product
    }

    fn imul(&self, src: i32, dest: i32, _w: Width) -> i64 {
        src as i64 * dest as i64
    }

    fn div(&self, src: u64, dest: u64, w: Width) -> Result<u32, Trap> {
        if src == 0 {
            return Err(Trap::DivideError);
        }
        Ok(w.truncate((dest / src) as u32))
    }

    fn idiv(&self, src: i64, dest: i64, _w: Width) -> Result<i32, Trap> {
        if src == 0 {
            return Err(Trap::DivideError);
        }
        Ok(dest.wrapping_div(src) as i32)
    }

    fn modu(&self, src: u64, dest: u64) -> Result<u32, Trap> {
        if src == 0 {
            return Err(Trap::DivideError);
        }
        Ok((dest % src) as u32)
    }

    fn imod(&self, src: i64, dest: i64) -> Result<i32, Trap> {
        if src == 0 {
            return Err(Trap::DivideError);
        }
        Ok(dest.wrapping_rem(src) as i32)
    }

    fn and(&self, fl: &mut Eflags, src: u32, dest: u32, w: Width) -> u32 {
        let res = src & dest;
        fl.remove(Eflags::CF | Eflags::OF);
        set_pf(fl, res);
        set_sf(fl, res, w);
        set_zf(fl, res, w);
        w.truncate(res)
    }

    fn or(&self, fl: &mut Eflags, src: u32, dest: u32, w: Width) -> u32 {
        let res = src | dest;
        fl.remove(Eflags::CF | Eflags::OF);
        set_pf(fl, res);
        set_sf(fl, res, w);
        set_zf(fl, res, w);
        w.truncate(res)
    }

    fn xor(&self, fl: &mut Eflags, src: u32, dest: u32, w: Width) -> u32 {
        let res = src ^ dest;
        fl.remove(Eflags::CF | Eflags::OF);
        set_pf(fl, res);
        set_sf(fl, res, w);
        set_zf(fl, res, w);
        w.truncate(res)
    }

    fn shl(&self, fl: &mut Eflags, src: u32, dest: u32, w: Width) -> u32 {
        let count = src & 31;
        if count == 0 {
            return w.truncate(dest);
        }
        let res = dest.wrapping_shl(count);
        set_pf(fl, res);
        set_sf(fl, res, w);
        set_zf(fl, res, w);
        set_cf_shl(fl, count, dest, w);
        w.truncate(res)
    }

    fn shr(&self, fl: &mut Eflags, src: u32, dest: u32, w: Width) -> u32 {
        let dest = w.truncate(dest);
        let count = src & 31;
        if count == 0 {
            return dest;
        }
        let res = dest.wrapping_shr(count);
        set_pf(fl, res);
        set_sf(fl, res, w);
        set_zf(fl, res, w);
        set_cf_shr(fl, count, dest);
        w.truncate(res)
    }

    fn sar(&self, fl: &mut Eflags, src: u32, dest: u32, w: Width) -> u32 {
        let dest = w.sign_extend(dest);
        let count = src & 31;
        if count == 0 {
            return w.truncate(dest);
        }
        let res = (dest as i32).wrapping_shr(count) as u32;
        set_pf(fl, res);
        set_sf(fl, res, w);
        set_zf(fl, res, w);
        set_cf_sar(fl, count, dest);
        w.truncate(res)
    }
}
