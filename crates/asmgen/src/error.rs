//! Error types and source-span diagnostics for the generation pipeline.

use alloc::string::String;
use core::fmt;

/// Location inside generated source text.
///
/// Carried by [`GenError::Format`] so that a rejected formatting pass can
/// point at the offending line of generated output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number (byte offset within line).
    pub col: u32,
    /// 0-based byte offset from start of the generated text.
    pub offset: usize,
    /// Byte length of the spanned region.
    pub len: usize,
}

impl Span {
    /// Create a new span.
    #[must_use]
    pub fn new(line: u32, col: u32, offset: usize, len: usize) -> Self {
        Self {
            line,
            col,
            offset,
            len,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Error produced by a generator, a decorator or an [`Accumulator`](crate::Accumulator).
///
/// The pipeline never distinguishes between these beyond "the first fault of
/// the pass"; the variants exist for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GenError {
    /// Writing formatted text into the output buffer failed, typically
    /// because a `Display` implementation returned an error.
    #[error("formatted write to output buffer failed")]
    Write,

    /// Generated output is not valid UTF-8.
    #[error("generated output is not valid UTF-8 (at byte {offset})")]
    Encoding {
        /// Byte offset of the first invalid sequence.
        offset: usize,
    },

    /// The formatting pass rejected the generated source.
    #[error("{span}: {msg}")]
    Format {
        /// What was wrong with the source.
        msg: String,
        /// Where in the generated source it was found.
        span: Span,
    },

    /// Error raised by a concrete generator.
    #[error("{msg}")]
    Custom {
        /// Error message.
        msg: String,
    },
}

impl GenError {
    /// Build a [`GenError::Custom`] from any message.
    pub fn custom(msg: impl Into<String>) -> Self {
        GenError::Custom { msg: msg.into() }
    }
}

impl From<fmt::Error> for GenError {
    fn from(_: fmt::Error) -> Self {
        GenError::Write
    }
}
