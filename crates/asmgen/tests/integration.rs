//! Integration tests for asmgen.
//!
//! These tests exercise the public API end-to-end: registers flowing into
//! instructions, instructions through generators and decorators, and the
//! one-shot [`generate`] entry point.

use std::fmt;

use asmgen::{
    asm_text, asmfmt, formatted, generate, Accumulator, AsmText, Builder, Config, Family,
    FormatOptions, GenError, Generator, Kind, Register, Size, Spec, Unsupported, Virtual,
};

/// Toy two-operand instruction over the register model.
#[derive(Debug, Clone)]
struct Inst {
    op: &'static str,
    dst: Register,
    src: Register,
}

impl fmt::Display for Inst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}, {}", self.op, self.dst.asm(), self.src.asm())
    }
}

const GP: Kind = Kind::new(1);

fn toy_family() -> Family {
    let mut fam = Family::new(GP);
    fam.define(Spec::S64, 0, "rax");
    fam.define(Spec::S32, 0, "eax");
    fam.define(Spec::S64, 1, "rcx");
    fam.define(Spec::S8L, 0, "al");
    fam.define(Spec::S8H, 0, "ah");
    fam
}

// ============================================================================
// One-Shot API
// ============================================================================

#[test]
fn one_shot_header_and_body() {
    let out = generate(Config::named("asmgen-test"), &["nop", "ret"]).unwrap();
    assert_eq!(
        out,
        b"// Code generated by asmgen-test. DO NOT EDIT.\n\n\tnop\n\tret\n"
    );
}

#[test]
fn one_shot_normalizes_spacing() {
    let out = generate(Config::named("t"), &["mov   rax ,  [rbx+8]", "add rax,1"]).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.ends_with("\tmov rax, [rbx+8]\n\tadd rax, 1\n"));
}

#[test]
fn one_shot_command_provenance() {
    let out = generate(Config::command(["asmgen", "--arch", "x86"]), &["nop"]).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(
        text.lines().next(),
        Some("// Code generated by command: asmgen --arch x86. DO NOT EDIT.")
    );
}

#[test]
fn one_shot_empty_program() {
    let out = generate::<&str>(Config::named("t"), &[]).unwrap();
    assert_eq!(out, b"// Code generated by t. DO NOT EDIT.\n");
}

#[test]
fn one_shot_rejects_unbalanced_operand() {
    let err = generate(Config::named("t"), &["nop", "mov rax, [rbx"]).unwrap_err();
    match err {
        GenError::Format { span, .. } => assert_eq!(span.line, 4),
        other => panic!("expected format error, got {other:?}"),
    }
}

// ============================================================================
// Registers through the pipeline
// ============================================================================

#[test]
fn physical_and_virtual_operands() {
    let fam = toy_family();
    let rax = fam.lookup("rax").cloned().unwrap();
    let v = fam.virtual_register(7, Size::B64);
    let prog = [Inst {
        op: "mov",
        dst: Register::from(rax),
        src: Register::from(v),
    }];
    let out = AsmText::new(Config::named("t")).generate(&prog).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.ends_with("\tmov rax, <virtual:7:1:8>\n"));
}

#[test]
fn register_accessors_agree_with_variants() {
    let fam = toy_family();
    let eax = Register::from(fam.lookup("eax").cloned().unwrap());
    let v = Register::from(fam.virtual_register(3, Size::B16));

    assert_eq!(eax.kind(), GP);
    assert_eq!(eax.bytes(), 4);
    assert!(!eax.is_virtual());
    assert_eq!(eax.as_physical().map(|p| p.physical_id()), Some(0));

    assert_eq!(v.kind(), GP);
    assert_eq!(v.bytes(), 2);
    assert!(v.is_virtual());
    assert_eq!(v.as_virtual().map(Virtual::virtual_id), Some(3));
}

#[test]
fn family_overlap_rules() {
    let fam = toy_family();
    let get = |n: &str| fam.lookup(n).unwrap();
    assert!(get("rax").overlaps(get("eax")));
    assert!(get("rax").overlaps(get("ah")));
    assert!(!get("al").overlaps(get("ah")));
    assert!(!get("rax").overlaps(get("rcx")));
}

#[test]
fn family_keeps_duplicate_ids() {
    let mut fam = Family::new(GP);
    fam.define(Spec::S64, 5, "a");
    fam.define(Spec::S64, 5, "b");
    assert_eq!(fam.registers().len(), 2);
    let v1 = fam.virtual_register(1, Size::B32);
    let v2 = fam.virtual_register(1, Size::B32);
    assert_eq!(v1, v2);
}

// ============================================================================
// Builders and decorators
// ============================================================================

#[test]
fn builder_table() {
    let builders: Vec<(&str, Box<dyn Builder<&'static str>>)> = vec![
        ("text", Box::new(asm_text::<&'static str>)),
        (
            "none",
            Box::new(|_: Config| -> Box<dyn Generator<&'static str>> {
                Box::new(Unsupported::new(GenError::custom("target not built")))
            }),
        ),
    ];

    let text = builders[0].1.build(Config::named("tbl"));
    assert!(text.generate(&["nop"]).is_ok());

    let none = builders[1].1.build(Config::named("tbl"));
    assert_eq!(
        none.generate(&["nop"]),
        Err(GenError::custom("target not built"))
    );
}

#[test]
fn asmfmt_over_custom_emitter() {
    let emitter = |is: &[&str]| -> Result<Vec<u8>, GenError> {
        let mut acc = Accumulator::new();
        acc.printf(format_args!("entry:   "));
        for i in is {
            acc.printf(format_args!("{}  // emitted\n\n\n", i));
        }
        acc.into_result()
    };
    let g = asmfmt(emitter, FormatOptions::default());
    let out = g.generate(&["NOP", "RET"]).unwrap();
    assert_eq!(out, b"entry:\n\tNOP // emitted\n\n\tRET // emitted\n");
}

#[test]
fn asmfmt_options_apply() {
    let opts = FormatOptions {
        indent: "    ".into(),
        max_blank_lines: 0,
        lowercase_mnemonics: true,
    };
    let g = asmfmt(AsmText::new(Config::named("t")), opts);
    let out = g.generate(&["MOV rax, 1", "RET"]).unwrap();
    assert_eq!(
        out,
        b"// Code generated by t. DO NOT EDIT.\n    mov rax, 1\n    ret\n"
    );
}

#[test]
fn formatted_over_asmfmt() {
    let g = formatted(
        asmfmt(AsmText::new(Config::named("t")), FormatOptions::default()),
        |b: &[u8]| -> Result<Vec<u8>, GenError> {
            let mut v = b.to_vec();
            v.extend_from_slice(b"; end\n");
            Ok(v)
        },
    );
    let out = g.generate(&["nop"]).unwrap();
    assert!(out.ends_with(b"\tnop\n; end\n"));
}

#[test]
fn emitter_fault_skips_formatting() {
    let emitter = |is: &[u8]| -> Result<Vec<u8>, GenError> {
        let mut acc = Accumulator::new();
        for &b in is {
            if b == 0 {
                acc.add_error(GenError::custom("zero opcode"));
            }
            acc.printf(format_args!("db {}\n", b));
        }
        acc.into_result()
    };
    let g = asmfmt(emitter, FormatOptions::default());
    assert_eq!(g.generate(&[1u8, 2]).unwrap(), b"\tdb 1\n\tdb 2\n");
    assert_eq!(g.generate(&[1u8, 0, 2]), Err(GenError::custom("zero opcode")));
}

// ============================================================================
// x86-64 families
// ============================================================================

#[cfg(feature = "x86")]
mod x86_families {
    use super::*;
    use asmgen::x86;

    #[test]
    fn x86_registers_render() {
        let rdi = Register::from(x86::lookup("rdi").cloned().unwrap());
        let v = Register::from(x86::vector().virtual_register(0, Size::B256));
        let prog = [Inst {
            op: "vmovdqa",
            dst: v,
            src: rdi,
        }];
        let out = generate(Config::named("t"), &prog).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("\tvmovdqa <virtual:0:2:32>, rdi\n"));
    }

    #[test]
    fn x86_families_are_distinct_kinds() {
        let [gp, vec, mask] = x86::families();
        assert_ne!(gp.kind(), vec.kind());
        assert_ne!(vec.kind(), mask.kind());
        assert_ne!(gp.kind(), mask.kind());
    }

    #[test]
    fn x86_families_are_shared() {
        assert!(std::ptr::eq(x86::general_purpose(), x86::general_purpose()));
    }
}
