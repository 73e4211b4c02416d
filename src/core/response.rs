//! Defensive parsing of generative-service output.
//!
//! The service is asked for bare JSON or bare HTML, but answers often arrive
//! wrapped in prose or Markdown fences. Nothing here trusts the answer's shape.

use regex::Regex;
use std::sync::LazyLock;

const FENCE: &str = "```";

// 語言標記後面一定要換行，否則 ```<p> 會被當成標記吃掉
static LANGUAGE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_+.-]*[ \t]*\r?\n").expect("valid regex"));

/// Returns the first balanced `{ ... }` object in `text`.
///
/// Braces inside JSON string literals (including escaped quotes) do not
/// count toward the balance. Returns `None` when no object closes.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Returns the contents of a leading ```lang ... ``` block, trimmed.
///
/// The closing fence may share a line with the content, may be missing, or
/// may be followed by prose; anything after it is dropped. Text that does
/// not open with a fence is only trimmed.
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix(FENCE) else {
        return trimmed.to_string();
    };

    let body = LANGUAGE_TAG.replace(rest, "");
    let body = match body.find(FENCE) {
        Some(end) => &body[..end],
        None => &body[..],
    };
    body.trim().to_string()
}
