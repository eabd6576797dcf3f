use std::fmt;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use x86alu_rs::{Alu, CoreAlu, Cpu, Eflags, RefAlu, Width};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Evaluate a single x86 ALU operation and print the result and flags"
)]
struct Opts {
    /// Operation mnemonic: add, adc, sub, sbb, mul, imul, div, idiv, mod,
    /// imod, and, or, xor, shl, shr, sar, sal
    op: String,
    /// Source operand (shift count for the shift family); 0x prefix and
    /// negative decimals accepted
    src: String,
    /// Destination operand; 0x prefix and negative decimals accepted
    dest: String,
    #[arg(short, long, default_value_t = 32)]
    width: u32,
    /// Incoming carry flag (consumed by adc/sbb)
    #[arg(long)]
    carry: bool,
    /// Run the golden reference ALU instead of the local one
    #[arg(long)]
    reference: bool,
    #[arg(long)]
    json: bool,
}

/// Result of one operation. The signed family keeps its sign so a quotient
/// of -1 prints as -1 rather than a sign-extended hex blob.
#[derive(Serialize)]
#[serde(untagged)]
enum Value {
    Unsigned(u64),
    Signed(i64),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unsigned(v) => write!(f, "{v:#x}"),
            Value::Signed(v) => write!(f, "{v}"),
        }
    }
}

#[derive(Serialize)]
struct Report<'a> {
    op: &'a str,
    result: Value,
    cf: bool,
    pf: bool,
    zf: bool,
    sf: bool,
    of: bool,
}

fn parse_num(s: &str) -> Result<u64> {
    let v = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
    } else if s.starts_with('-') {
        s.parse::<i64>().map(|v| v as u64)
    } else {
        s.parse()
    };
    v.with_context(|| format!("bad operand: {s}"))
}

fn eval(alu: &dyn Alu, cpu: &mut Cpu, op: &str, src: u64, dest: u64, w: Width) -> Result<Value> {
    use Value::{Signed, Unsigned};
    let fl = &mut cpu.eflags;
    let res = match op {
        "add" => Unsigned(alu.add(fl, src as u32, dest as u32, w) as u64),
        "adc" => Unsigned(alu.adc(fl, src as u32, dest as u32, w) as u64),
        "sub" => Unsigned(alu.sub(fl, src as u32, dest as u32, w) as u64),
        "sbb" => Unsigned(alu.sbb(fl, src as u32, dest as u32, w) as u64),
        "mul" => Unsigned(alu.mul(fl, src as u32, dest as u32, w)),
        "imul" => Signed(alu.imul(src as u32 as i32, dest as u32 as i32, w)),
        "div" => Unsigned(alu.div(src, dest, w)? as u64),
        "idiv" => Signed(alu.idiv(src as i64, dest as i64, w)? as i64),
        "mod" => Unsigned(alu.modu(src, dest)? as u64),
        "imod" => Signed(alu.imod(src as i64, dest as i64)? as i64),
        "and" => Unsigned(alu.and(fl, src as u32, dest as u32, w) as u64),
        "or" => Unsigned(alu.or(fl, src as u32, dest as u32, w) as u64),
        "xor" => Unsigned(alu.xor(fl, src as u32, dest as u32, w) as u64),
        "shl" => Unsigned(alu.shl(fl, src as u32, dest as u32, w) as u64),
        "sal" => Unsigned(alu.sal(fl, src as u32, dest as u32, w) as u64),
        "shr" => Unsigned(alu.shr(fl, src as u32, dest as u32, w) as u64),
        "sar" => Unsigned(alu.sar(fl, src as u32, dest as u32, w) as u64),
        other => bail!("unknown operation: {other}"),
    };
    Ok(res)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let w = Width::try_from(opts.width)?;
    let src = parse_num(&opts.src)?;
    let dest = parse_num(&opts.dest)?;

    let mut cpu = Cpu::new();
    cpu.eflags.set(Eflags::CF, opts.carry);

    let alu: &dyn Alu = if opts.reference { &RefAlu } else { &CoreAlu };
    debug!(op = %opts.op, src, dest, width = opts.width, reference = opts.reference);

    let result = eval(alu, &mut cpu, &opts.op, src, dest, w)?;

    let fl = cpu.eflags;
    let report = Report {
        op: &opts.op,
        result,
        cf: fl.contains(Eflags::CF),
        pf: fl.contains(Eflags::PF),
        zf: fl.contains(Eflags::ZF),
        sf: fl.contains(Eflags::SF),
        of: fl.contains(Eflags::OF),
    };

    if opts.json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!(
            "{} = {}  CF={} PF={} ZF={} SF={} OF={}",
            report.op,
            report.result,
            report.cf as u8,
            report.pf as u8,
            report.zf as u8,
            report.sf as u8,
            report.of as u8
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_quotients_keep_their_sign() {
        let mut cpu = Cpu::new();
        let v = eval(&CoreAlu, &mut cpu, "idiv", parse_num("-2").unwrap(), 7, Width::W32).unwrap();
        assert_eq!(v.to_string(), "-3");
        assert_eq!(serde_json::to_string(&v).unwrap(), "-3");

        let v = eval(&CoreAlu, &mut cpu, "imod", 2, parse_num("-7").unwrap(), Width::W32).unwrap();
        assert_eq!(v.to_string(), "-1");
        assert_eq!(serde_json::to_string(&v).unwrap(), "-1");
    }

    #[test]
    fn unsigned_results_print_as_hex() {
        let mut cpu = Cpu::new();
        let v = eval(&CoreAlu, &mut cpu, "add", 0xFF, 0x01, Width::W8).unwrap();
        assert_eq!(v.to_string(), "0x0");
        let v = eval(&CoreAlu, &mut cpu, "mul", 0x10, 0x10, Width::W8).unwrap();
        assert_eq!(v.to_string(), "0x100");
    }
}
