//! Depth-aware scanner for `[label: value]` annotations.
//!
//! Nested brackets are tracked so `[Refs: heuristics[9], impact:Anxiety]`
//! is one block, not a block ending after `[9`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    /// Content between a `[` and its matching `]`, brackets excluded.
    Block(&'a str),
    /// A `[` at `offset` that never closes; `rest` runs from it to the end.
    Unterminated { offset: usize, rest: &'a str },
}

pub fn scan_brackets(text: &str) -> Vec<Segment<'_>> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'[' {
            i += 1;
            continue;
        }
        if text_start < i {
            segments.push(Segment::Text(&text[text_start..i]));
        }
        match matching_close(bytes, i) {
            Some(close) => {
                segments.push(Segment::Block(&text[i + 1..close]));
                i = close + 1;
                text_start = i;
            }
            None => {
                segments.push(Segment::Unterminated {
                    offset: i,
                    rest: &text[i..],
                });
                return segments;
            }
        }
    }

    if text_start < bytes.len() {
        segments.push(Segment::Text(&text[text_start..]));
    }
    segments
}

fn matching_close(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split block content at its first colon into a trimmed `(label, value)`.
pub fn split_label(content: &str) -> Option<(&str, &str)> {
    content
        .split_once(':')
        .map(|(label, value)| (label.trim(), value.trim()))
}

/// Canonical tag for a priority label, e.g. `long term` to `[Long-term]`.
pub fn priority_tag(label: &str) -> Option<&'static str> {
    let label = label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    match label.as_str() {
        "immediate" | "immediate actions" => Some("[Immediate]"),
        "long-term" | "long term" | "longterm" => Some("[Long-term]"),
        _ => None,
    }
}

/// Split on commas that are not inside brackets.
pub fn split_top_level_commas(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, c) in text.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(text[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(text[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}
