//! # asmgen: Register Model and Code-Generation Pipeline
//!
//! `asmgen` provides the pieces shared by assembly code generators: a typed
//! register model that distinguishes hardware registers from allocator
//! placeholders, and a small pipeline that turns instruction sequences into
//! formatted, provenance-stamped output.
//!
//! ## Quick Start
//!
//! ```rust
//! use asmgen::{generate, Config};
//!
//! let out = generate(Config::named("demo"), &["xor  eax,eax", "ret"])?;
//! assert_eq!(
//!     out,
//!     b"// Code generated by demo. DO NOT EDIT.\n\n\txor eax, eax\n\tret\n"
//! );
//! # Ok::<(), asmgen::GenError>(())
//! ```
//!
//! ## Features
//!
//! - **Closed register model**: a [`Register`] is either [`Physical`] or
//!   [`Virtual`], with byte-occupancy [`Spec`]s for overlap checks.
//! - **Composable generators**: any closure is a [`Generator`], decorators
//!   such as [`asmfmt`] wrap one generator in another.
//! - **Sticky errors**: [`Accumulator`] lets emitters write unconditionally
//!   and check once.
//! - **`no_std` + `alloc`**: disable the default `std` feature.
//! - **x86-64 families**: ready-made register families behind the `x86`
//!   feature.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::uninlined_format_args,
    clippy::doc_markdown,
    clippy::missing_errors_doc,
    clippy::return_self_not_must_use
)]

extern crate alloc;

/// Sticky-error output buffer for concrete generators.
pub mod accumulator;
/// Assembly text formatter used by the [`asmfmt`] decorator.
pub mod asmfmt;
/// Error types and source-span diagnostics.
pub mod error;
/// Generators, builders, provenance and decorators.
pub mod gen;
/// Register sizes, specs, classes, families and the register sum type.
pub mod reg;
/// x86-64 register families.
#[cfg(feature = "x86")]
pub mod x86;

// Re-exports
pub use accumulator::Accumulator;
pub use asmfmt::FormatOptions;
pub use error::{GenError, Span};
pub use gen::{
    asm_text, asmfmt, formatted, AsmText, Builder, Config, Formatted, Generator, Unsupported,
};
pub use reg::{Family, Kind, Physical, Register, Size, Spec, Virtual};

use alloc::vec::Vec;
use core::fmt::Display;

/// Emit `instructions` as formatted assembly text stamped with `config`'s
/// provenance.
///
/// Equivalent to `asmfmt(AsmText::new(config), FormatOptions::default())`.
///
/// # Errors
///
/// Returns [`GenError::Write`] if an instruction's `Display` fails, or
/// [`GenError::Format`] if the emitted text cannot be formatted.
///
/// # Examples
///
/// ```rust
/// use asmgen::{generate, Config};
///
/// let out = generate(Config::command(["gen", "-x"]), &["nop"])?;
/// assert!(out.starts_with(b"// Code generated by command: gen -x. DO NOT EDIT.\n"));
/// # Ok::<(), asmgen::GenError>(())
/// ```
pub fn generate<I: Display>(config: Config, instructions: &[I]) -> Result<Vec<u8>, GenError> {
    asmfmt(AsmText::new(config), FormatOptions::default()).generate(instructions)
}
