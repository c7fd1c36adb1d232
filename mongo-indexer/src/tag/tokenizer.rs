//! Splits an index annotation into trimmed, non-empty tokens.
//!
//! Tokens are separated by top-level commas. A `partial=` token keeps commas
//! nested inside its JSON value, so multi-key filters survive splitting.

use super::PARTIAL_PREFIX;

pub(crate) fn tokenize(tag: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut rest = tag;

    loop {
        let trimmed = rest.trim_start();
        let end = if trimmed.starts_with(PARTIAL_PREFIX) {
            json_token_end(trimmed)
        } else {
            trimmed.find(',')
        };

        match end {
            Some(index) => {
                push_token(&mut tokens, &trimmed[..index]);
                rest = &trimmed[index + 1..];
            }
            None => {
                push_token(&mut tokens, trimmed);
                break;
            }
        }
    }

    tokens
}

fn push_token<'a>(tokens: &mut Vec<&'a str>, raw: &'a str) {
    let token = raw.trim();
    if !token.is_empty() {
        tokens.push(token);
    }
}

/// Byte offset of the first comma outside any JSON object, array or string.
///
/// Unbalanced input yields `None`: the remainder of the tag belongs to the
/// token and the JSON decoder reports the error.
fn json_token_end(token: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (index, ch) in token.char_indices() {
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
            '"' if depth > 0 => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return Some(index),
            _ => {}
        }
    }

    None
}
