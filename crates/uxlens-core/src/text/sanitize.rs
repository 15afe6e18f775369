//! String sanitation shared by every normalizer.
//!
//! The upstream service embeds `OBS-<n>` evidence anchors in prose. They are
//! stripped here, once, before any string reaches the output model. All
//! coercion helpers in this module apply the stripping so callers never have
//! to remember it.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

/// Maximum number of sentences packed into one paragraph.
pub const PARAGRAPH_MAX_SENTENCES: usize = 2;

/// Maximum paragraph length, in characters, when packing sentences.
pub const PARAGRAPH_MAX_CHARS: usize = 260;

static OBS_PRESENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bOBS-\d+\b").unwrap());

static OBS_GROUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*\(\s*OBS-\d+(?:\s*[,;/&]\s*OBS-\d+)*\s*\)").unwrap()
});

static OBS_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bOBS-\d+\b(?:\s*,)?").unwrap());

static OPEN_PAREN_SEP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\s*(?:[,;|]\s*)+").unwrap());

static CLOSE_PAREN_SEP: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:\s*[,;|])+\s*\)").unwrap());

static EMPTY_PARENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\(\s*\)").unwrap());

static REPEATED_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r",(?:\s*,)+").unwrap());

static SPACE_BEFORE_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+([,.;:!?])").unwrap());

static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").unwrap());

static LEADING_SEP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\s,;|]+").unwrap());

static TRAILING_SEP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s,;|]+$").unwrap());

static SENTENCE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]\s+").unwrap());

/// Remove `OBS-<n>` evidence anchors from `text`.
///
/// Parenthetical groups made only of tokens (`(OBS-1, OBS-4)`) are removed
/// whole; remaining bare tokens are removed individually and the separators
/// they leave behind are cleaned up. Lines that end up empty are dropped.
///
/// Text without any token is returned unchanged. Otherwise the cleanup is
/// repeated until it settles, so the function is idempotent.
pub fn strip_observation_tokens(text: &str) -> String {
    if !OBS_PRESENT.is_match(text) {
        return text.to_string();
    }

    // Every rewrite in a pass only removes characters, so this terminates.
    let mut current = strip_pass(text);
    loop {
        let next = strip_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_pass(text: &str) -> String {
    text.split('\n')
        .filter_map(|line| {
            let line = OBS_GROUP.replace_all(line, "");
            let line = OBS_TOKEN.replace_all(&line, "");
            let line = OPEN_PAREN_SEP.replace_all(&line, "(");
            let line = CLOSE_PAREN_SEP.replace_all(&line, ")");
            let line = EMPTY_PARENS.replace_all(&line, "");
            let line = REPEATED_COMMA.replace_all(&line, ",");
            let line = SPACE_BEFORE_PUNCT.replace_all(&line, "$1");
            let line = MULTI_SPACE.replace_all(&line, " ");
            let line = LEADING_SEP.replace(&line, "");
            let line = TRAILING_SEP.replace(&line, "");
            let line = line.trim();
            (!line.is_empty()).then(|| line.to_string())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Trimmed, token-free string, or `None` for empty or non-string values.
pub fn as_string(value: &Value) -> Option<String> {
    clean_text(value.as_str()?)
}

/// Trimmed, token-free copy of `text`, or `None` when nothing is left.
pub fn clean_text(text: &str) -> Option<String> {
    let raw = text.trim();
    if raw.is_empty() {
        return None;
    }
    let cleaned = strip_observation_tokens(raw);
    let cleaned = cleaned.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

/// Every non-empty string entry of an array, sanitized.
///
/// A bare string counts as a one-entry list; anything else is empty.
pub fn as_string_array(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(as_string).collect(),
        Value::String(_) => as_string(value).into_iter().collect(),
        _ => Vec::new(),
    }
}

/// First key of `keys` holding a usable string.
pub fn first_string(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| obj.get(*k).and_then(as_string))
}

/// Split prose into display paragraphs.
///
/// Explicit newlines win. Otherwise the text is cut into sentences, which are
/// packed greedily into paragraphs of at most
/// [`PARAGRAPH_MAX_SENTENCES`] sentences and [`PARAGRAPH_MAX_CHARS`] characters.
pub fn split_into_paragraphs(text: &str) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    if text.contains('\n') {
        return text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
    }

    let sentences = split_sentences(text);
    if sentences.len() <= 1 {
        return vec![text.to_string()];
    }

    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0usize;

    for sentence in sentences {
        let len = sentence.chars().count();
        let would_overflow = current_len + 1 + len > PARAGRAPH_MAX_CHARS;
        if !current.is_empty() && (current.len() >= PARAGRAPH_MAX_SENTENCES || would_overflow) {
            paragraphs.push(current.join(" "));
            current.clear();
            current_len = 0;
        }
        if !current.is_empty() {
            current_len += 1;
        }
        current_len += len;
        current.push(sentence);
    }
    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }

    paragraphs
}

/// Sentence boundaries are terminal punctuation followed by whitespace and
/// an uppercase letter, a quote or an opening parenthesis.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for m in SENTENCE_BREAK.find_iter(text) {
        let starts_sentence = text[m.end()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_uppercase() || matches!(c, '"' | '\u{201c}' | '('));
        if !starts_sentence {
            continue;
        }
        // Terminal punctuation is a single ASCII byte.
        let sentence = text[start..m.start() + 1].trim();
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
        start = m.end();
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}
