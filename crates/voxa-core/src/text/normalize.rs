//! Utterance normalization.
//!
//! Every utterance and every pattern example passes through [`normalize`]
//! before scoring, so matching is insensitive to case, diacritics,
//! punctuation and spacing.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Remove diacritics by NFD-decomposing and dropping combining marks.
///
/// `й` becomes `и`, `ё` becomes `е`, `é` becomes `e`. Case and punctuation
/// are left alone, which makes this safe to apply to regex sources.
pub fn strip_diacritics(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Canonical form used for matching. Pure and idempotent.
///
/// - lower-cased, diacritics stripped
/// - punctuation and whitespace runs collapse to a single space
/// - `+ * / ^` survive as standalone tokens, `-` survives as a token only
///   when the next non-space character is a digit
/// - `.` or `,` between two digits survives as a decimal point `.`
pub fn normalize(raw: &str) -> String {
    let chars: Vec<char> = strip_diacritics(&raw.to_lowercase()).chars().collect();
    let mut out = String::with_capacity(chars.len());
    let mut pending_space = false;

    for (i, &c) in chars.iter().enumerate() {
        if c.is_alphanumeric() {
            push_char(&mut out, &mut pending_space, c);
        } else if matches!(c, '+' | '*' | '/' | '^') {
            push_token(&mut out, &mut pending_space, c);
        } else if c == '-' && next_non_space(&chars, i).is_some_and(|n| n.is_ascii_digit()) {
            push_token(&mut out, &mut pending_space, c);
        } else if matches!(c, '.' | ',') && is_decimal_separator(&chars, i) {
            out.push('.');
        } else {
            pending_space = true;
        }
    }

    out
}

fn push_char(out: &mut String, pending_space: &mut bool, c: char) {
    if *pending_space && !out.is_empty() {
        out.push(' ');
    }
    *pending_space = false;
    out.push(c);
}

fn push_token(out: &mut String, pending_space: &mut bool, c: char) {
    *pending_space = true;
    push_char(out, pending_space, c);
    *pending_space = true;
}

fn next_non_space(chars: &[char], index: usize) -> Option<char> {
    chars[index + 1..].iter().copied().find(|c| !c.is_whitespace())
}

fn is_decimal_separator(chars: &[char], index: usize) -> bool {
    index > 0
        && chars[index - 1].is_ascii_digit()
        && chars.get(index + 1).is_some_and(|c| c.is_ascii_digit())
}
