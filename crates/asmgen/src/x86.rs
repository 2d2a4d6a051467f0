//! x86-64 register families.
//!
//! The families are process-lifetime registries: each is defined once, on
//! first access, and only read afterwards.

use once_cell::sync::Lazy;

use crate::reg::{Family, Kind, Physical, Spec};

/// General-purpose registers.
pub const GP: Kind = Kind::new(1);
/// SSE/AVX/AVX-512 vector registers.
pub const VECTOR: Kind = Kind::new(2);
/// AVX-512 opmask registers.
pub const MASK: Kind = Kind::new(3);

// Indexed by hardware id.
const GP64: [&str; 16] = [
    "rax", "rcx", "rdx", "rbx", "rsp", "rbp", "rsi", "rdi", "r8", "r9", "r10", "r11", "r12",
    "r13", "r14", "r15",
];
const GP32: [&str; 16] = [
    "eax", "ecx", "edx", "ebx", "esp", "ebp", "esi", "edi", "r8d", "r9d", "r10d", "r11d", "r12d",
    "r13d", "r14d", "r15d",
];
const GP16: [&str; 16] = [
    "ax", "cx", "dx", "bx", "sp", "bp", "si", "di", "r8w", "r9w", "r10w", "r11w", "r12w", "r13w",
    "r14w", "r15w",
];
const GP8L: [&str; 16] = [
    "al", "cl", "dl", "bl", "spl", "bpl", "sil", "dil", "r8b", "r9b", "r10b", "r11b", "r12b",
    "r13b", "r14b", "r15b",
];
const GP8H: [&str; 4] = ["ah", "ch", "dh", "bh"];

static GENERAL_PURPOSE: Lazy<Family> = Lazy::new(|| {
    let mut f = Family::new(GP);
    for (id, names) in (0u16..).zip(GP64.into_iter().zip(GP32).zip(GP16).zip(GP8L)) {
        let (((r64, r32), r16), r8) = names;
        f.define(Spec::S64, id, r64);
        f.define(Spec::S32, id, r32);
        f.define(Spec::S16, id, r16);
        f.define(Spec::S8L, id, r8);
    }
    for (id, name) in (0u16..).zip(GP8H) {
        f.define(Spec::S8H, id, name);
    }
    log::trace!("x86 general-purpose family: {} registers", f.registers().len());
    f
});

static VECTORS: Lazy<Family> = Lazy::new(|| {
    let mut f = Family::new(VECTOR);
    for (prefix, spec) in [("xmm", Spec::S128), ("ymm", Spec::S256), ("zmm", Spec::S512)] {
        for id in 0u16..32 {
            f.define(spec, id, alloc::format!("{prefix}{id}"));
        }
    }
    log::trace!("x86 vector family: {} registers", f.registers().len());
    f
});

static MASKS: Lazy<Family> = Lazy::new(|| {
    let mut f = Family::new(MASK);
    for id in 0u16..8 {
        f.define(Spec::S64, id, alloc::format!("k{id}"));
    }
    f
});

/// The general-purpose family: 64/32/16-bit and low-byte registers for ids
/// 0 to 15, then the high-byte registers `ah`, `ch`, `dh`, `bh`.
pub fn general_purpose() -> &'static Family {
    &GENERAL_PURPOSE
}

/// The vector family: `xmm`, `ymm` and `zmm` 0 to 31.
pub fn vector() -> &'static Family {
    &VECTORS
}

/// The opmask family: `k0` to `k7`.
pub fn mask() -> &'static Family {
    &MASKS
}

/// All x86-64 families.
pub fn families() -> [&'static Family; 3] {
    [general_purpose(), vector(), mask()]
}

/// Find a physical register by name, ignoring ASCII case.
pub fn lookup(name: &str) -> Option<&'static Physical> {
    families()
        .into_iter()
        .flat_map(Family::registers)
        .find(|r| r.asm().eq_ignore_ascii_case(name))
}
