use x86alu_rs::{Alu, CoreAlu, Cpu, Eflags, Trap, Width};

#[test]
fn mul_reports_high_half_in_carry() {
    let mut cpu = Cpu::new();
    let product = CoreAlu.mul(&mut cpu.eflags, 0x10, 0x10, Width::W8);
    assert_eq!(product, 0x100);
    // The byte above bit 7 is nonzero
    assert!(cpu.eflags.contains(Eflags::CF));
    assert!(cpu.eflags.contains(Eflags::OF));

    let product = CoreAlu.mul(&mut cpu.eflags, 2, 3, Width::W8);
    assert_eq!(product, 6);
    assert!(!cpu.eflags.contains(Eflags::CF));
    assert!(!cpu.eflags.contains(Eflags::OF));
}

#[test]
fn mul_returns_full_product_unmasked() {
    let mut cpu = Cpu::new();
    let product = CoreAlu.mul(&mut cpu.eflags, 0xFFFF_FFFF, 0xFFFF_FFFF, Width::W32);
    assert_eq!(product, 0xFFFF_FFFE_0000_0001);
    assert!(cpu.eflags.contains(Eflags::CF | Eflags::OF));
}

#[test]
fn mul_leaves_szp_alone() {
    let mut cpu = Cpu::new();
    cpu.eflags = Eflags::ZF | Eflags::SF | Eflags::PF;
    CoreAlu.mul(&mut cpu.eflags, 2, 3, Width::W8);
    assert!(cpu.eflags.contains(Eflags::ZF | Eflags::SF | Eflags::PF));
}

#[test]
fn imul_sets_no_flags() {
    let mut cpu = Cpu::new();
    cpu.eflags = Eflags::all();
    assert_eq!(CoreAlu.imul(-3, 5, Width::W8), -15);
    assert_eq!(CoreAlu.imul(i32::MIN, 2, Width::W32), -(1i64 << 32));
    assert_eq!(cpu.eflags, Eflags::all());
}

#[test]
fn div_truncates_and_masks() {
    assert_eq!(CoreAlu.div(3, 10, Width::W8).unwrap(), 3);
    assert_eq!(CoreAlu.div(1, 0x123, Width::W8).unwrap(), 0x23);
    assert_eq!(CoreAlu.div(2, 0x1_0000_0000, Width::W32).unwrap(), 0x8000_0000);
}

#[test]
fn idiv_truncates_toward_zero() {
    assert_eq!(CoreAlu.idiv(2, -7, Width::W8).unwrap(), -3);
    assert_eq!(CoreAlu.idiv(-2, 7, Width::W8).unwrap(), -3);
    assert_eq!(CoreAlu.idiv(-2, -7, Width::W8).unwrap(), 3);
}

#[test]
fn remainder_sign_follows_dividend() {
    assert_eq!(CoreAlu.modu(3, 10).unwrap(), 1);
    assert_eq!(CoreAlu.imod(2, -7).unwrap(), -1);
    assert_eq!(CoreAlu.imod(-2, 7).unwrap(), 1);
}

#[test]
fn zero_divisor_is_a_divide_error() {
    assert_eq!(CoreAlu.div(0, 1, Width::W32), Err(Trap::DivideError));
    assert_eq!(CoreAlu.idiv(0, 1, Width::W32), Err(Trap::DivideError));
    assert_eq!(CoreAlu.modu(0, 1), Err(Trap::DivideError));
    assert_eq!(CoreAlu.imod(0, 1), Err(Trap::DivideError));
}
