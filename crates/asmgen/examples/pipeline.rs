//! Pipeline example: build a small x86-64 routine over physical and virtual
//! registers and emit it through the formatting decorator.
//!
//! Run with: `cargo run --example pipeline`

use std::fmt;

use asmgen::{asm_text, asmfmt, x86, Builder, Config, FormatOptions, Generator, Register, Size};
use simplelog::{Config as LogConfig, LevelFilter, SimpleLogger};

/// A two-operand instruction.
struct Inst {
    op: &'static str,
    dst: Register,
    src: Register,
}

impl fmt::Display for Inst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {},{}", self.op, self.dst.asm(), self.src.asm())
    }
}

fn inst(op: &'static str, dst: Register, src: Register) -> Inst {
    Inst { op, dst, src }
}

fn reg(name: &str) -> Register {
    match x86::lookup(name) {
        Some(r) => Register::from(r.clone()),
        None => panic!("no such register: {name}"),
    }
}

fn main() {
    let _ = SimpleLogger::init(LevelFilter::Trace, LogConfig::default());

    println!("=== asmgen pipeline example ===\n");

    let gp = x86::general_purpose();
    let acc = Register::from(gp.virtual_register(0, Size::B64));
    let tmp = Register::from(gp.virtual_register(1, Size::B64));

    let prog = [
        inst("mov", acc.clone(), reg("rdi")),
        inst("mov", tmp.clone(), reg("rsi")),
        inst("add", acc.clone(), tmp),
        inst("mov", reg("rax"), acc),
    ];

    // Builders are plain functions from provenance to generator.
    let builder = asm_text::<Inst>;
    let raw = builder.build(Config::command(std::env::args()));
    let gen = asmfmt(raw, FormatOptions::default());

    match gen.generate(&prog) {
        Ok(out) => print!("{}", String::from_utf8_lossy(&out)),
        Err(e) => eprintln!("generation failed: {e}"),
    }
}
