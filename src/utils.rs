//! Text helpers shared across handlers.

use unicode_segmentation::UnicodeSegmentation;

/// Maximum message length accepted by Telegram, with a safety margin
/// for formatting added downstream.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4000;

/// Split a message into parts that each fit within `max_length` bytes.
///
/// Splits on line boundaries where possible; a single line longer than
/// the limit is split on grapheme clusters so multi-byte text is never
/// cut mid-character.
#[must_use]
pub fn split_long_message(message: &str, max_length: usize) -> Vec<String> {
    if message.is_empty() {
        return Vec::new();
    }
    if message.len() <= max_length {
        return vec![message.to_string()];
    }

    let mut parts = Vec::new();
    let mut current = String::new();

    for line in message.lines() {
        if line.len() > max_length {
            if !current.is_empty() {
                parts.push(current.trim_end().to_string());
                current.clear();
            }
            let mut chunk = String::new();
            for grapheme in line.graphemes(true) {
                if chunk.len() + grapheme.len() > max_length {
                    parts.push(chunk.clone());
                    chunk.clear();
                }
                chunk.push_str(grapheme);
            }
            if !chunk.is_empty() {
                current.push_str(&chunk);
                current.push('\n');
            }
            continue;
        }

        if current.len() + line.len() + 1 > max_length && !current.is_empty() {
            parts.push(current.trim_end().to_string());
            current.clear();
        }
        current.push_str(line);
        current.push('\n');
    }

    if !current.is_empty() {
        parts.push(current.trim_end().to_string());
    }
    parts
}

/// Truncate a string to at most `max_chars` characters (not bytes).
///
/// UTF-8 safe; never panics on multi-byte characters.
#[must_use]
pub fn truncate_str(s: impl AsRef<str>, max_chars: usize) -> String {
    let s = s.as_ref();
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    s.char_indices()
        .nth(max_chars)
        .map_or_else(|| s.to_string(), |(pos, _)| s[..pos].to_string())
}
