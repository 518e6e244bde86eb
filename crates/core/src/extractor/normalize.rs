//! Text normalization used by every comparison.

/// Canonicalize `text` for matching.
///
/// ASCII-lowercases, then deletes every character outside
/// `a-z 0-9 ' / \ , ( ) [ ] { }`. Whitespace is deleted too, so
/// `"Max Power"` and `"max-power"` both become `"maxpower"`.
pub fn normalize(text: &str) -> String {
    text.chars()
        .map(|c| c.to_ascii_lowercase())
        .filter(|c| is_allowed(*c))
        .collect()
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_lowercase()
        || c.is_ascii_digit()
        || matches!(c, '\'' | '/' | '\\' | ',' | '(' | ')' | '[' | ']' | '{' | '}')
}
