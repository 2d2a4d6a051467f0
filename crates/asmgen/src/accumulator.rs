//! Sticky-error output buffer for concrete generators.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{self, Write as _};

use crate::error::GenError;

/// Output buffer for one generation pass.
///
/// The first error recorded is kept and every later write becomes a no-op,
/// so a generator can emit unconditionally and check once at the end with
/// [`Accumulator::result`]. Text written before the fault is preserved.
///
/// # Examples
///
/// ```rust
/// use asmgen::{Accumulator, GenError};
///
/// let mut acc = Accumulator::new();
/// acc.printf(format_args!("mov {}, {}\n", "rax", 1));
/// acc.add_error(GenError::custom("bad operand"));
/// acc.printf(format_args!("ret\n"));
///
/// let (bytes, err) = acc.result();
/// assert_eq!(bytes, b"mov rax, 1\n");
/// assert_eq!(err, Some(GenError::custom("bad operand")));
/// ```
#[derive(Debug, Default)]
pub struct Accumulator {
    buf: String,
    err: Option<GenError>,
}

impl Accumulator {
    /// An empty, clean accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append formatted text. Does nothing once an error has been recorded.
    ///
    /// If formatting fails the buffer is left as it was and
    /// [`GenError::Write`] is recorded.
    pub fn printf(&mut self, args: fmt::Arguments<'_>) {
        if self.err.is_some() {
            return;
        }
        if let Some(s) = args.as_str() {
            self.buf.push_str(s);
            return;
        }
        let mut chunk = String::new();
        match chunk.write_fmt(args) {
            Ok(()) => self.buf.push_str(&chunk),
            Err(e) => self.add_error(GenError::from(e)),
        }
    }

    /// Record `err` unless an error is already recorded. `None` is ignored.
    pub fn add_error(&mut self, err: impl Into<Option<GenError>>) {
        let Some(err) = err.into() else {
            return;
        };
        if self.err.is_none() {
            log::debug!("generation pass faulted after {} bytes: {}", self.buf.len(), err);
            self.err = Some(err);
        }
    }

    /// Whether an error has been recorded.
    pub fn is_faulted(&self) -> bool {
        self.err.is_some()
    }

    /// The recorded error, if any.
    pub fn error(&self) -> Option<&GenError> {
        self.err.as_ref()
    }

    /// Bytes buffered so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been buffered.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consume the accumulator, returning the buffered bytes and the sticky
    /// error.
    pub fn result(self) -> (Vec<u8>, Option<GenError>) {
        (self.buf.into_bytes(), self.err)
    }

    /// Consume the accumulator, discarding the buffer on error.
    pub fn into_result(self) -> Result<Vec<u8>, GenError> {
        match self.err {
            Some(err) => Err(err),
            None => Ok(self.buf.into_bytes()),
        }
    }
}
