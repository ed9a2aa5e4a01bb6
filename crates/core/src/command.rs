//! Command frame construction.
//!
//! A frame is `VERB`, one space, the comma-joined arguments, and a CRLF
//! terminator. Arguments come in three shapes:
//!
//! - bare tokens (numbers, identifiers, `100 mm`) are written as-is;
//! - quoted text is wrapped in `"` with embedded quotes doubled;
//! - raw blobs (bitmap payloads) are copied byte-for-byte.
//!
//! Construction is pure: the same verb and arguments always produce the same
//! bytes, independent of the transport that will carry them.

use std::borrow::Cow;

use crate::{CommandError, Number};

/// Frame terminator.
pub const CRLF: &[u8] = b"\r\n";

/// Argument separator.
const COMMA: u8 = b',';

/// One argument of a command frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg<'a> {
    /// A number rendered in canonical decimal form.
    Number(Number),
    /// An unquoted token, written verbatim.
    Bare(Cow<'a, str>),
    /// User text, written through [`quote`].
    Text(Cow<'a, str>),
    /// Binary payload, written byte-for-byte with no escaping.
    Raw(Cow<'a, [u8]>),
}

impl Arg<'_> {
    /// Append the wire encoding of this argument to `out`.
    fn write_to(&self, out: &mut Vec<u8>) {
        match self {
            Arg::Number(n) => out.extend_from_slice(n.to_string().as_bytes()),
            Arg::Bare(s) => out.extend_from_slice(s.as_bytes()),
            Arg::Text(s) => out.extend_from_slice(quote(s).as_bytes()),
            Arg::Raw(b) => out.extend_from_slice(b),
        }
    }

    /// Build a quoted text argument.
    pub fn text<'s>(s: impl Into<Cow<'s, str>>) -> Arg<'s> {
        Arg::Text(s.into())
    }

    /// Build a raw binary argument.
    pub fn raw<'s>(b: impl Into<Cow<'s, [u8]>>) -> Arg<'s> {
        Arg::Raw(b.into())
    }
}

impl From<Number> for Arg<'_> {
    fn from(n: Number) -> Self {
        Arg::Number(n)
    }
}

macro_rules! arg_from_number {
    ($($t:ty),*) => {
        $(impl From<$t> for Arg<'_> {
            fn from(v: $t) -> Self {
                Arg::Number(Number::from(v))
            }
        })*
    };
}

arg_from_number!(i8, i16, i32, i64, u8, u16, u32, usize, f32, f64);

impl<'a> From<&'a str> for Arg<'a> {
    fn from(s: &'a str) -> Self {
        Arg::Bare(Cow::Borrowed(s))
    }
}

impl From<String> for Arg<'_> {
    fn from(s: String) -> Self {
        Arg::Bare(Cow::Owned(s))
    }
}

/// Wrap `text` in double quotes, doubling every embedded `"`.
///
/// This is the only escaping rule of the printer dialect; backslashes,
/// commas and control characters pass through untouched.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        if ch == '"' {
            out.push('"');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

/// Serialize a command verb and its arguments into one frame.
pub fn build(command: &str, args: &[Arg<'_>]) -> Vec<u8> {
    let mut out = Vec::with_capacity(command.len() + 3 + args.len() * 4);
    out.extend_from_slice(command.as_bytes());
    out.push(b' ');
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push(COMMA);
        }
        arg.write_to(&mut out);
    }
    out.extend_from_slice(CRLF);
    out
}

// ── Re-parsing ──────────────────────────────────────────────────────────

/// One argument recovered by [`parse_frame`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedArg {
    /// An unquoted token.
    Bare(String),
    /// A quoted string with its doubled quotes collapsed.
    Text(String),
}

/// A frame split back into its verb and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFrame {
    /// Command verb, e.g. `SIZE` or `SET TEAR OFF`.
    pub command: String,
    /// Arguments in wire order.
    pub args: Vec<ParsedArg>,
}

/// Lexer state for [`parse_frame`].
enum ArgState {
    /// At the start of an argument.
    Start,
    /// Inside an unquoted token.
    Bare,
    /// Inside a quoted string.
    Quoted,
    /// Just read a `"` inside a quoted string: either the closing quote or
    /// the first half of a doubled quote.
    QuoteSeen,
}

/// Split a text frame back into verb and arguments.
///
/// The verb ends at the last space that precedes the first argument, so
/// multi-word verbs like `SET TEAR OFF` survive. Frames carrying a raw
/// binary tail (`BITMAP`) are not supported.
pub fn parse_frame(frame: &[u8]) -> Result<ParsedFrame, CommandError> {
    let body = frame
        .strip_suffix(CRLF)
        .ok_or_else(|| CommandError::MalformedFrame("missing CRLF terminator".into()))?;
    let body = std::str::from_utf8(body)
        .map_err(|e| CommandError::MalformedFrame(format!("frame is not UTF-8: {e}")))?;

    let split = verb_end(body)
        .ok_or_else(|| CommandError::MalformedFrame("missing space after verb".into()))?;
    let command = body[..split].to_string();
    let rest = &body[split + 1..];

    let mut args = Vec::new();
    if rest.is_empty() {
        return Ok(ParsedFrame { command, args });
    }

    let mut state = ArgState::Start;
    let mut current = String::new();
    for ch in rest.chars() {
        state = match (state, ch) {
            (ArgState::Start, '"') => ArgState::Quoted,
            (ArgState::Start, ',') | (ArgState::Bare, ',') => {
                args.push(ParsedArg::Bare(std::mem::take(&mut current)));
                ArgState::Start
            }
            (ArgState::Start, c) | (ArgState::Bare, c) => {
                current.push(c);
                ArgState::Bare
            }
            (ArgState::Quoted, '"') => ArgState::QuoteSeen,
            (ArgState::Quoted, c) => {
                current.push(c);
                ArgState::Quoted
            }
            (ArgState::QuoteSeen, '"') => {
                current.push('"');
                ArgState::Quoted
            }
            (ArgState::QuoteSeen, ',') => {
                args.push(ParsedArg::Text(std::mem::take(&mut current)));
                ArgState::Start
            }
            (ArgState::QuoteSeen, c) => {
                return Err(CommandError::MalformedFrame(format!(
                    "unexpected {c:?} after closing quote"
                )));
            }
        };
    }

    match state {
        ArgState::Start | ArgState::Bare => args.push(ParsedArg::Bare(current)),
        ArgState::QuoteSeen => args.push(ParsedArg::Text(current)),
        ArgState::Quoted => {
            return Err(CommandError::MalformedFrame("unterminated quoted argument".into()));
        }
    }

    Ok(ParsedFrame { command, args })
}

/// Byte offset of the space separating the verb from its arguments.
///
/// Verbs are upper-case words joined by single spaces; the first space that
/// is not followed by another upper-case verb word ends the verb.
fn verb_end(body: &str) -> Option<usize> {
    let bytes = body.as_bytes();
    let mut candidate = None;
    for (i, &b) in bytes.iter().enumerate() {
        if b != b' ' {
            continue;
        }
        candidate = Some(i);
        let word: &[u8] = bytes[i + 1..]
            .split(|&c| c == b' ')
            .next()
            .unwrap_or_default();
        let next_is_verb_word = !word.is_empty()
            && word.iter().all(|c| c.is_ascii_uppercase())
            && bytes.len() > i + 1 + word.len()
            && bytes[i + 1 + word.len()] == b' ';
        if !next_is_verb_word {
            break;
        }
    }
    candidate
}
