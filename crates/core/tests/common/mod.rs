//! Shared helpers for `tspl_core` integration tests.

#![allow(unreachable_pub)]

use tspl_core::CRLF;

/// Count commas that separate arguments, skipping quoted spans.
///
/// A doubled quote inside a quoted span toggles twice, so it never ends
/// the span early.
pub fn top_level_commas(frame: &[u8]) -> usize {
    let body = frame.strip_suffix(CRLF).unwrap_or(frame);
    let mut in_quotes = false;
    let mut commas = 0;
    for &b in body {
        match b {
            b'"' => in_quotes = !in_quotes,
            b',' if !in_quotes => commas += 1,
            _ => {}
        }
    }
    commas
}
