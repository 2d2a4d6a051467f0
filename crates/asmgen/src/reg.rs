//! Register model: sizes, byte-occupancy specs, register classes and the
//! two register variants.
//!
//! A [`Family`] owns the physical registers of one register class ([`Kind`])
//! and mints [`Virtual`] registers for the same class on demand. Both variants
//! are wrapped by the closed [`Register`] sum type.

use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// Register width in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Size {
    /// 1 byte.
    B8 = 1,
    /// 2 bytes.
    B16 = 2,
    /// 4 bytes.
    B32 = 4,
    /// 8 bytes.
    B64 = 8,
    /// 16 bytes.
    B128 = 16,
    /// 32 bytes.
    B256 = 32,
    /// 64 bytes.
    B512 = 64,
}

impl Size {
    /// All sizes, smallest first.
    pub const ALL: [Size; 7] = [
        Size::B8,
        Size::B16,
        Size::B32,
        Size::B64,
        Size::B128,
        Size::B256,
        Size::B512,
    ];

    /// Width in bytes.
    pub const fn bytes(self) -> u32 {
        self as u32
    }

    /// The size with exactly `n` bytes, if there is one.
    pub fn from_bytes(n: u32) -> Option<Size> {
        Size::ALL.into_iter().find(|s| s.bytes() == n)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bytes() * 8)
    }
}

/// Byte-occupancy mask of a physical register within its underlying
/// hardware register.
///
/// If bit `n` of the mask is set, bytes `2^(n-1)` to `2^n - 1` are used (bit 0
/// covers byte 0). This is almost always the low bytes, except for the
/// high-byte registers, so [`Spec::S8L`] and [`Spec::S8H`] are both one byte
/// wide but are not interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Spec(u16);

impl Spec {
    /// Low byte (`al`).
    pub const S8L: Spec = Spec(0x1);
    /// High byte of the low word (`ah`).
    pub const S8H: Spec = Spec(0x2);
    /// Alias for [`Spec::S8L`].
    pub const S8: Spec = Spec::S8L;
    /// 16-bit.
    pub const S16: Spec = Spec(0x3);
    /// 32-bit.
    pub const S32: Spec = Spec(0x7);
    /// 64-bit.
    pub const S64: Spec = Spec(0xf);
    /// 128-bit.
    pub const S128: Spec = Spec(0x1f);
    /// 256-bit.
    pub const S256: Spec = Spec(0x3f);
    /// 512-bit.
    pub const S512: Spec = Spec(0x7f);

    /// Raw byte-occupancy mask.
    pub const fn mask(self) -> u16 {
        self.0
    }

    /// Register width in bytes.
    pub const fn bytes(self) -> u32 {
        let x = self.0 as u32;
        (x >> 1) + (x & 1)
    }

    /// The register width as a [`Size`].
    pub fn size(self) -> Option<Size> {
        Size::from_bytes(self.bytes())
    }
}

/// Opaque register-class tag (general purpose, vector, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Kind(u8);

impl Kind {
    /// Create a register class tag.
    pub const fn new(tag: u8) -> Self {
        Kind(tag)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A concrete hardware register with a fixed assembly name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Physical {
    id: u16,
    kind: Kind,
    name: Cow<'static, str>,
    spec: Spec,
}

impl Physical {
    /// Hardware id within the register's family.
    pub fn physical_id(&self) -> u16 {
        self.id
    }

    /// Register class.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Byte-occupancy spec.
    pub fn spec(&self) -> Spec {
        self.spec
    }

    /// Byte-occupancy mask, see [`Spec::mask`].
    pub fn mask(&self) -> u16 {
        self.spec.mask()
    }

    /// Width in bytes.
    pub fn bytes(&self) -> u32 {
        self.spec.bytes()
    }

    /// The register's assembly name.
    pub fn asm(&self) -> &str {
        &self.name
    }

    /// Whether writing `self` may clobber bytes of `other`.
    ///
    /// `al` overlaps `rax` but not `ah`.
    pub fn overlaps(&self, other: &Physical) -> bool {
        self.kind == other.kind && self.id == other.id && self.mask() & other.mask() != 0
    }
}

impl fmt::Display for Physical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.asm())
    }
}

/// A placeholder register awaiting assignment by a register allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Virtual {
    id: u16,
    kind: Kind,
    size: Size,
}

impl Virtual {
    /// Caller-assigned virtual id.
    pub fn virtual_id(&self) -> u16 {
        self.id
    }

    /// Register class.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Requested width.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Width in bytes.
    pub fn bytes(&self) -> u32 {
        self.size.bytes()
    }

    /// Diagnostic rendering encoding id, kind and width.
    ///
    /// The syntax is provisional: virtual registers are replaced by the
    /// allocator before assembly, so nothing should parse this text.
    pub fn asm(&self) -> String {
        alloc::format!("<virtual:{}:{}:{}>", self.id, self.kind, self.bytes())
    }
}

impl fmt::Display for Virtual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<virtual:{}:{}:{}>", self.id, self.kind, self.bytes())
    }
}

/// Either a physical or a virtual register.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Register {
    /// A hardware register.
    Physical(Physical),
    /// An unallocated placeholder.
    Virtual(Virtual),
}

impl Register {
    /// Register class.
    pub fn kind(&self) -> Kind {
        match self {
            Register::Physical(p) => p.kind(),
            Register::Virtual(v) => v.kind(),
        }
    }

    /// Width in bytes.
    pub fn bytes(&self) -> u32 {
        match self {
            Register::Physical(p) => p.bytes(),
            Register::Virtual(v) => v.bytes(),
        }
    }

    /// Textual rendering: the hardware name, or the provisional virtual
    /// placeholder.
    pub fn asm(&self) -> Cow<'_, str> {
        match self {
            Register::Physical(p) => Cow::Borrowed(p.asm()),
            Register::Virtual(v) => Cow::Owned(v.asm()),
        }
    }

    /// The physical register, if this is one.
    pub fn as_physical(&self) -> Option<&Physical> {
        match self {
            Register::Physical(p) => Some(p),
            Register::Virtual(_) => None,
        }
    }

    /// The virtual register, if this is one.
    pub fn as_virtual(&self) -> Option<&Virtual> {
        match self {
            Register::Physical(_) => None,
            Register::Virtual(v) => Some(v),
        }
    }

    /// Whether the register still awaits allocation.
    pub fn is_virtual(&self) -> bool {
        matches!(self, Register::Virtual(_))
    }
}

impl From<Physical> for Register {
    fn from(p: Physical) -> Self {
        Register::Physical(p)
    }
}

impl From<Virtual> for Register {
    fn from(v: Virtual) -> Self {
        Register::Virtual(v)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Register::Physical(p) => fmt::Display::fmt(p, f),
            Register::Virtual(v) => fmt::Display::fmt(v, f),
        }
    }
}

/// The registers of one register class.
///
/// Physical registers are added with [`Family::define`] while the family is
/// set up; afterwards the family is only read. Neither `define` nor
/// [`Family::virtual_register`] checks ids for uniqueness: physical ids are
/// the definer's responsibility and virtual ids the register allocator's.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Family {
    kind: Kind,
    registers: Vec<Physical>,
}

impl Family {
    /// An empty family for `kind`.
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            registers: Vec::new(),
        }
    }

    /// Register class of every register in the family.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Defined physical registers, in definition order.
    pub fn registers(&self) -> &[Physical] {
        &self.registers
    }

    /// First physical register named `name`.
    pub fn lookup(&self, name: &str) -> Option<&Physical> {
        self.registers.iter().find(|r| r.asm() == name)
    }

    /// Define a physical register and return it.
    pub fn define(
        &mut self,
        spec: Spec,
        id: u16,
        name: impl Into<Cow<'static, str>>,
    ) -> Physical {
        let r = Physical {
            id,
            kind: self.kind,
            name: name.into(),
            spec,
        };
        log::trace!(
            "define {} (kind {}, id {}, mask {:#x})",
            r.name,
            r.kind,
            r.id,
            r.mask()
        );
        self.registers.push(r.clone());
        r
    }

    /// A virtual register of this family's class. Nothing is recorded.
    pub fn virtual_register(&self, id: u16, size: Size) -> Virtual {
        Virtual {
            id,
            kind: self.kind,
            size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[allow(unused_imports)]
    use alloc::{string::ToString, vec};

    const K: Kind = Kind::new(7);

    #[test]
    fn spec_masks_are_fixed() {
        assert_eq!(Spec::S8L.mask(), 0x1);
        assert_eq!(Spec::S8H.mask(), 0x2);
        assert_eq!(Spec::S8.mask(), 0x1);
        assert_eq!(Spec::S16.mask(), 0x3);
        assert_eq!(Spec::S32.mask(), 0x7);
        assert_eq!(Spec::S64.mask(), 0xf);
        assert_eq!(Spec::S128.mask(), 0x1f);
        assert_eq!(Spec::S256.mask(), 0x3f);
        assert_eq!(Spec::S512.mask(), 0x7f);
    }

    #[test]
    fn spec_bytes() {
        let cases = [
            (Spec::S8L, 1),
            (Spec::S8H, 1),
            (Spec::S16, 2),
            (Spec::S32, 4),
            (Spec::S64, 8),
            (Spec::S128, 16),
            (Spec::S256, 32),
            (Spec::S512, 64),
        ];
        for (spec, bytes) in cases {
            assert_eq!(spec.bytes(), bytes, "{:?}", spec);
        }
    }

    #[test]
    fn high_and_low_byte_are_distinct() {
        assert_eq!(Spec::S8L.bytes(), Spec::S8H.bytes());
        assert_ne!(Spec::S8L, Spec::S8H);
        assert_eq!(Spec::S8H.size(), Some(Size::B8));
    }

    #[test]
    fn size_bytes() {
        let bytes: Vec<u32> = Size::ALL.iter().map(|s| s.bytes()).collect();
        assert_eq!(bytes, vec![1, 2, 4, 8, 16, 32, 64]);
        assert_eq!(Size::from_bytes(16), Some(Size::B128));
        assert_eq!(Size::from_bytes(3), None);
        assert_eq!(Size::B256.to_string(), "256");
    }

    #[test]
    fn define_appends_in_order() {
        let mut f = Family::new(K);
        let a = f.define(Spec::S64, 0, "ra");
        let b = f.define(Spec::S32, 0, "rb");
        assert_ne!(a, b);
        assert_eq!(a.kind(), K);
        assert_eq!(a.asm(), "ra");
        assert_eq!(b.asm(), "rb");
        assert_eq!(f.registers(), &[a, b]);
    }

    #[test]
    fn define_does_not_check_duplicate_ids() {
        let mut f = Family::new(K);
        f.define(Spec::S64, 3, "x");
        f.define(Spec::S64, 3, "y");
        assert_eq!(f.registers().len(), 2);
        assert_eq!(f.lookup("y").map(Physical::physical_id), Some(3));
        assert!(f.lookup("z").is_none());
    }

    #[test]
    fn virtual_register_is_not_recorded() {
        let f = Family::new(K);
        let v = f.virtual_register(42, Size::B32);
        assert_eq!(v.virtual_id(), 42);
        assert_eq!(v.kind(), K);
        assert_eq!(v.bytes(), 4);
        assert!(f.registers().is_empty());
        assert_eq!(f.virtual_register(42, Size::B32), v);
    }

    #[test]
    fn virtual_asm_encodes_id_kind_and_width() {
        let v = Family::new(K).virtual_register(9, Size::B64);
        assert_eq!(v.asm(), "<virtual:9:7:8>");
        assert_eq!(v.to_string(), v.asm());
    }

    #[test]
    fn overlap_respects_byte_halves() {
        let mut f = Family::new(K);
        let rax = f.define(Spec::S64, 0, "rax");
        let al = f.define(Spec::S8L, 0, "al");
        let ah = f.define(Spec::S8H, 0, "ah");
        let cl = f.define(Spec::S8L, 1, "cl");
        assert!(al.overlaps(&rax));
        assert!(ah.overlaps(&rax));
        assert!(!al.overlaps(&ah));
        assert!(!al.overlaps(&cl));

        let mut other = Family::new(Kind::new(8));
        let x = other.define(Spec::S64, 0, "x0");
        assert!(!x.overlaps(&rax));
    }

    #[test]
    fn register_dispatch() {
        let mut f = Family::new(K);
        let p: Register = f.define(Spec::S16, 1, "cx").into();
        let v: Register = f.virtual_register(1, Size::B16).into();

        assert_eq!(p.kind(), K);
        assert_eq!(v.kind(), K);
        assert_eq!(p.bytes(), 2);
        assert_eq!(v.bytes(), 2);
        assert_eq!(p.asm(), "cx");
        assert_eq!(v.asm(), "<virtual:1:7:2>");
        assert_eq!(p.to_string(), "cx");
        assert!(!p.is_virtual());
        assert!(v.is_virtual());
        assert_eq!(p.as_physical().map(Physical::mask), Some(0x3));
        assert_eq!(v.as_virtual().map(Virtual::virtual_id), Some(1));
        assert!(p.as_virtual().is_none());
        assert!(v.as_physical().is_none());
    }
}
