//! Generation pipeline: generators, builders, provenance and decorators.
//!
//! A [`Builder`] turns a [`Config`] into a boxed [`Generator`]. Generators
//! map a slice of instructions to output bytes and compose through
//! decorators such as [`formatted`] and [`asmfmt`], which accept a generator
//! and return one with the same contract.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::marker::PhantomData;

use crate::accumulator::Accumulator;
use crate::asmfmt::{format_source, FormatOptions};
use crate::error::GenError;

/// Turns an instruction sequence into output bytes.
///
/// `generate` must be deterministic for a given input and must not carry
/// state from one call to the next. Any `Fn(&[I]) -> Result<Vec<u8>, GenError>`
/// is a generator.
///
/// # Examples
///
/// ```rust
/// use asmgen::{GenError, Generator};
///
/// let count = |is: &[u32]| -> Result<Vec<u8>, GenError> { Ok(vec![is.len() as u8]) };
/// assert_eq!(count.generate(&[7, 8, 9])?, vec![3]);
/// # Ok::<(), GenError>(())
/// ```
pub trait Generator<I> {
    /// Generate output for `instructions`.
    ///
    /// # Errors
    ///
    /// Returns the first fault of the pass.
    fn generate(&self, instructions: &[I]) -> Result<Vec<u8>, GenError>;
}

impl<I, F> Generator<I> for F
where
    F: Fn(&[I]) -> Result<Vec<u8>, GenError>,
{
    fn generate(&self, instructions: &[I]) -> Result<Vec<u8>, GenError> {
        self(instructions)
    }
}

impl<I> Generator<I> for Box<dyn Generator<I> + '_> {
    fn generate(&self, instructions: &[I]) -> Result<Vec<u8>, GenError> {
        (**self).generate(instructions)
    }
}

/// Provenance of generated output.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Name of the generating tool, used when there is no command line.
    pub name: String,
    /// Command line of the generating tool. `Some(vec![])` is an empty
    /// command line, distinct from `None`.
    pub argv: Option<Vec<String>>,
}

impl Config {
    /// Provenance given by tool name only.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            argv: None,
        }
    }

    /// Provenance given by command line.
    pub fn command<S: Into<String>>(argv: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: String::new(),
            argv: Some(argv.into_iter().map(Into::into).collect()),
        }
    }

    /// What generated the output: `"command: <argv joined by spaces>"` when
    /// there is a command line, else the name.
    pub fn generated_by(&self) -> String {
        match &self.argv {
            Some(argv) => alloc::format!("command: {}", argv.join(" ")),
            None => self.name.clone(),
        }
    }

    /// The standard generated-file marker. Other tools match this text
    /// exactly.
    ///
    /// ```rust
    /// use asmgen::Config;
    ///
    /// let cfg = Config::command(["make", "gen"]);
    /// assert_eq!(
    ///     cfg.generated_warning(),
    ///     "Code generated by command: make gen. DO NOT EDIT."
    /// );
    /// ```
    pub fn generated_warning(&self) -> String {
        alloc::format!("Code generated by {}. DO NOT EDIT.", self.generated_by())
    }
}

/// Constructs a generator from a [`Config`].
///
/// Any `Fn(Config) -> Box<dyn Generator<I>>` is a builder, including the
/// [`asm_text`] function.
pub trait Builder<I> {
    /// Build a generator for `config`.
    fn build(&self, config: Config) -> Box<dyn Generator<I>>;
}

impl<I, F> Builder<I> for F
where
    F: Fn(Config) -> Box<dyn Generator<I>>,
{
    fn build(&self, config: Config) -> Box<dyn Generator<I>> {
        self(config)
    }
}

/// A generator whose output is post-processed by a formatting routine.
///
/// Built by [`formatted`] and [`asmfmt`].
#[derive(Debug, Clone)]
pub struct Formatted<G, F> {
    inner: G,
    format: F,
}

impl<G, F> Formatted<G, F> {
    /// The wrapped generator.
    pub fn inner(&self) -> &G {
        &self.inner
    }
}

impl<I, G, F> Generator<I> for Formatted<G, F>
where
    G: Generator<I>,
    F: Fn(&[u8]) -> Result<Vec<u8>, GenError>,
{
    fn generate(&self, instructions: &[I]) -> Result<Vec<u8>, GenError> {
        let raw = match self.inner.generate(instructions) {
            Ok(raw) => raw,
            Err(e) => {
                log::debug!("inner generator failed, skipping formatting: {}", e);
                return Err(e);
            }
        };
        log::debug!("formatting {} bytes of generated output", raw.len());
        (self.format)(&raw)
    }
}

/// Wrap `inner` so its output is passed through `format`.
///
/// If `inner` fails its error is returned and `format` is not called. If
/// `format` fails its error replaces the output.
///
/// # Examples
///
/// ```rust
/// use asmgen::{formatted, GenError, Generator};
///
/// let gen = |_: &[()]| -> Result<Vec<u8>, GenError> { Ok(b"nop".to_vec()) };
/// let upper = formatted(gen, |b: &[u8]| -> Result<Vec<u8>, GenError> {
///     Ok(b.to_ascii_uppercase())
/// });
/// assert_eq!(upper.generate(&[])?, b"NOP");
/// # Ok::<(), GenError>(())
/// ```
pub fn formatted<G, F>(inner: G, format: F) -> Formatted<G, F>
where
    F: Fn(&[u8]) -> Result<Vec<u8>, GenError>,
{
    Formatted { inner, format }
}

/// Wrap `inner` so its output is laid out by the assembly text formatter.
pub fn asmfmt<G>(
    inner: G,
    options: FormatOptions,
) -> Formatted<G, impl Fn(&[u8]) -> Result<Vec<u8>, GenError>> {
    formatted(inner, move |src: &[u8]| format_source(src, &options))
}

/// Emits assembly text: a generated-file header comment followed by each
/// instruction's `Display` form on its own line.
///
/// # Examples
///
/// ```rust
/// use asmgen::{AsmText, Config, Generator};
///
/// let gen = AsmText::new(Config::named("demo"));
/// let out = gen.generate(&["xor eax, eax", "ret"])?;
/// assert_eq!(
///     out,
///     b"// Code generated by demo. DO NOT EDIT.\n\n\txor eax, eax\n\tret\n"
/// );
/// # Ok::<(), asmgen::GenError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsmText {
    config: Config,
}

impl AsmText {
    /// Emitter with the given provenance.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Provenance written into the header.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl<I: fmt::Display> Generator<I> for AsmText {
    fn generate(&self, instructions: &[I]) -> Result<Vec<u8>, GenError> {
        let mut acc = Accumulator::new();
        acc.printf(format_args!("// {}\n\n", self.config.generated_warning()));
        for inst in instructions {
            acc.printf(format_args!("\t{}\n", inst));
        }
        acc.into_result()
    }
}

/// [`Builder`] for [`AsmText`].
pub fn asm_text<I: fmt::Display>(config: Config) -> Box<dyn Generator<I>> {
    Box::new(AsmText::new(config))
}

/// A generator that always fails with the same error.
///
/// Useful as a placeholder in a builder table for targets that cannot be
/// generated in the current configuration.
#[derive(Debug, Clone)]
pub struct Unsupported<I> {
    err: GenError,
    _instructions: PhantomData<fn(&I)>,
}

impl<I> Unsupported<I> {
    /// A generator failing with `err`.
    pub fn new(err: GenError) -> Self {
        Self {
            err,
            _instructions: PhantomData,
        }
    }
}

impl<I> Generator<I> for Unsupported<I> {
    fn generate(&self, _: &[I]) -> Result<Vec<u8>, GenError> {
        Err(self.err.clone())
    }
}
