//! Width-aware layout of console lines.
//!
//! Every width computed here ignores ANSI escape sequences, so colored
//! fragments line up in the same columns as plain ones.

use console::{measure_text_width, strip_ansi_codes};
use std::borrow::Cow;

/// Remove ANSI escape sequences from `text`.
#[inline]
pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    strip_ansi_codes(text)
}

/// Return the number of columns `text` occupies once printed.
#[inline]
pub fn visible_len(text: &str) -> usize {
    measure_text_width(text)
}

fn spaces(n: usize) -> String {
    " ".repeat(n)
}

/// Left-pad `text` so that it appears centered in a `cols`-wide line.
pub fn center(cols: usize, text: &str) -> String {
    let pad = cols.saturating_sub(visible_len(text)) / 2;
    format!("{}{}", spaces(pad), text)
}

/// Join `left` and `right` with enough spaces for `left` to hug the start
/// and `right` to hug the end of a `cols`-wide line.
///
/// When both sides do not fit, they are separated by a single space.
pub fn justify_space_between(cols: usize, left: &str, right: &str) -> String {
    let used = visible_len(left) + visible_len(right);
    let gap = match cols.checked_sub(used) {
        Some(gap) => gap,
        None => 1,
    };
    format!("{}{}{}", left, spaces(gap), right)
}

/// Pad `text` on the left up to `cols` columns.
pub fn left_pad(text: &str, cols: usize) -> String {
    format!("{}{}", spaces(cols.saturating_sub(visible_len(text))), text)
}

/// Pad `text` on the right up to `cols` columns.
pub fn right_pad(text: &str, cols: usize) -> String {
    format!("{}{}", text, spaces(cols.saturating_sub(visible_len(text))))
}

/// A horizontal rule `cols` columns wide.
pub fn rule(cols: usize) -> String {
    "-".repeat(cols)
}

/// Move the cursor to the beginning of the line `n` lines up.
pub fn cursor_up(n: usize) -> String {
    format!("\x1b[{}F", n)
}

/// Move the cursor to the beginning of the line `n` lines down.
pub fn cursor_down(n: usize) -> String {
    format!("\x1b[{}E", n)
}
