//! Canonical layout for generated assembly text.
//!
//! [`format_source`] is the formatting pass applied by the
//! [`asmfmt`](crate::gen::asmfmt) decorator. It rewrites whitespace only:
//!
//! - labels (`name:`) flush left, each on its own line;
//! - statements indented, with operands separated by `", "`;
//! - runs of whitespace outside string literals collapsed to one space;
//! - string literals (`"..."` and `'...'`, with `\` escapes) copied byte for
//!   byte;
//! - trailing comments kept after a single space;
//! - blank lines trimmed at both ends and collapsed in between.
//!
//! Comments start at `//` or `#` outside string literals. Unterminated
//! strings and unbalanced brackets are rejected with a [`GenError::Format`].
//! Formatting is idempotent as long as the indent is whitespace.

use alloc::string::String;
use alloc::vec::Vec;
use core::str;

use crate::error::{GenError, Span};

/// Layout options for [`format_source`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FormatOptions {
    /// Prefix for statements and indented comments. Default: one tab.
    pub indent: String,
    /// Maximum consecutive blank lines kept between two non-blank lines.
    /// Default: 1.
    pub max_blank_lines: usize,
    /// Lowercase the mnemonic of every statement. Default: off.
    pub lowercase_mnemonics: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent: String::from("\t"),
            max_blank_lines: 1,
            lowercase_mnemonics: false,
        }
    }
}

/// One source line split into code and comment.
struct Line<'a> {
    code: &'a str,
    comment: Option<&'a str>,
    indented: bool,
}

/// Format generated assembly text.
///
/// # Errors
///
/// Returns [`GenError::Encoding`] if `src` is not UTF-8, and
/// [`GenError::Format`] on an unterminated string literal or an unbalanced
/// bracket.
///
/// # Examples
///
/// ```rust
/// use asmgen::asmfmt::{format_source, FormatOptions};
///
/// let out = format_source(b"entry:   mov  rax ,[rbx +  8]\n\n\n  ret", &FormatOptions::default())?;
/// assert_eq!(out, b"entry:\n\tmov rax, [rbx + 8]\n\n\tret\n");
/// # Ok::<(), asmgen::GenError>(())
/// ```
pub fn format_source(src: &[u8], options: &FormatOptions) -> Result<Vec<u8>, GenError> {
    let text = str::from_utf8(src).map_err(|e| GenError::Encoding {
        offset: e.valid_up_to(),
    })?;

    let mut out = String::with_capacity(text.len());
    let mut blanks = 0usize;
    let mut offset = 0usize;

    for (idx, raw) in text.split('\n').enumerate() {
        let line_no = u32::try_from(idx + 1).unwrap_or(u32::MAX);
        let content = raw.strip_suffix('\r').unwrap_or(raw);
        let line = split_line(content, line_no, offset)?;
        offset += raw.len() + 1;

        let rendered = render(&line, options);
        if rendered.is_empty() {
            blanks += 1;
            continue;
        }
        if !out.is_empty() {
            for _ in 0..blanks.min(options.max_blank_lines) {
                out.push('\n');
            }
        }
        blanks = 0;
        out.push_str(&rendered);
    }

    Ok(out.into_bytes())
}

/// Length of the string literal opened by the quote at `i`, closing quote
/// included. `"` and `'` both open a literal that runs to the next unescaped
/// quote of the same kind.
///
/// `None` if the literal is unterminated.
fn literal_len(bytes: &[u8], i: usize) -> Option<usize> {
    let quote = bytes[i];
    let mut escaped = false;
    for (n, &b) in bytes[i + 1..].iter().enumerate() {
        if escaped {
            escaped = false;
        } else if b == b'\\' {
            escaped = true;
        } else if b == quote {
            return Some(n + 2);
        }
    }
    None
}

/// Split `s` into code and literal runs, in order. Literals are flagged
/// `true`. An unterminated literal runs to the end of `s`.
fn segments(s: &str) -> Vec<(bool, &str)> {
    let bytes = s.as_bytes();
    let mut out = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if matches!(bytes[i], b'"' | b'\'') {
            if start < i {
                out.push((false, &s[start..i]));
            }
            let end = i + literal_len(bytes, i).unwrap_or(bytes.len() - i);
            out.push((true, &s[i..end]));
            i = end;
            start = end;
        } else {
            i += 1;
        }
    }
    if start < bytes.len() {
        out.push((false, &s[start..]));
    }
    out
}

/// Byte index of the first whitespace outside string literals.
fn find_unquoted_whitespace(s: &str) -> Option<usize> {
    let mut at = 0;
    for (literal, seg) in segments(s) {
        if !literal {
            if let Some(n) = seg.find(char::is_whitespace) {
                return Some(at + n);
            }
        }
        at += seg.len();
    }
    None
}

/// Separate code from a trailing comment, checking strings and brackets.
fn split_line(content: &str, line: u32, offset: usize) -> Result<Line<'_>, GenError> {
    let bytes = content.as_bytes();
    let mut open: Vec<(u8, usize)> = Vec::new();
    let mut comment_at = None;

    let err = |msg: String, at: usize| GenError::Format {
        msg,
        span: Span::new(line, u32::try_from(at + 1).unwrap_or(u32::MAX), offset + at, 1),
    };

    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'"' | b'\'' => match literal_len(bytes, i) {
                Some(n) => {
                    i += n;
                    continue;
                }
                None => return Err(err("unterminated string literal".into(), i)),
            },
            b'#' => {
                comment_at = Some(i);
                break;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                comment_at = Some(i);
                break;
            }
            b'(' | b'[' | b'{' => open.push((b, i)),
            b')' | b']' | b'}' => {
                let expected = match b {
                    b')' => b'(',
                    b']' => b'[',
                    _ => b'{',
                };
                match open.pop() {
                    Some((o, _)) if o == expected => {}
                    _ => return Err(err(alloc::format!("unbalanced '{}'", b as char), i)),
                }
            }
            _ => {}
        }
        i += 1;
    }

    if let Some(&(o, at)) = open.last() {
        return Err(err(alloc::format!("unclosed '{}'", o as char), at));
    }

    let (code, comment) = match comment_at {
        Some(at) => (&content[..at], Some(content[at..].trim_end())),
        None => (content, None),
    };
    Ok(Line {
        code: code.trim(),
        comment,
        indented: content.starts_with(|c: char| c.is_whitespace()),
    })
}

/// Render one line; the result is empty for blank lines and otherwise ends
/// with a newline.
fn render(line: &Line<'_>, options: &FormatOptions) -> String {
    let mut out = String::new();
    let mut code = line.code;

    while let Some((label, rest)) = split_label(code) {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(label);
        out.push(':');
        code = rest.trim_start();
    }

    if !code.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&options.indent);
        let (mnemonic, operands) = match find_unquoted_whitespace(code) {
            Some(at) => (&code[..at], code[at..].trim()),
            None => (code, ""),
        };
        if options.lowercase_mnemonics {
            for (literal, seg) in segments(mnemonic) {
                if literal {
                    out.push_str(seg);
                } else {
                    out.push_str(&seg.to_ascii_lowercase());
                }
            }
        } else {
            out.push_str(mnemonic);
        }
        if !operands.is_empty() {
            out.push(' ');
            let ops: Vec<String> = split_operands(operands)
                .into_iter()
                .map(collapse_whitespace)
                .collect();
            out.push_str(ops.join(", ").trim_end());
        }
    }

    if let Some(comment) = line.comment {
        if out.is_empty() {
            if line.indented {
                out.push_str(&options.indent);
            }
        } else {
            out.push(' ');
        }
        out.push_str(comment);
    }

    if !out.is_empty() {
        out.push('\n');
    }
    out
}

/// `name: rest` where `name` is a label identifier.
fn split_label(code: &str) -> Option<(&str, &str)> {
    let colon = code.find(':')?;
    let name = &code[..colon];
    let is_ident = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$' | '@'));
    is_ident.then(|| (name, &code[colon + 1..]))
}

/// Split at commas that are outside brackets and literals.
fn split_operands(operands: &str) -> Vec<&str> {
    let bytes = operands.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                i += literal_len(bytes, i).unwrap_or(bytes.len() - i);
                continue;
            }
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => {
                parts.push(operands[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(operands[start..].trim());
    parts
}

/// Collapse whitespace runs outside literals to a single space.
fn collapse_whitespace(operand: &str) -> String {
    let mut out = String::with_capacity(operand.len());
    let mut pending_space = false;

    for (literal, seg) in segments(operand) {
        if literal {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push_str(seg);
            continue;
        }
        for c in seg.chars() {
            if c.is_whitespace() {
                pending_space = true;
                continue;
            }
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        }
    }
    out
}
