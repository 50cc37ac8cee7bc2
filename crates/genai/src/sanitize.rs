//! Best-effort JSON recovery from model text
//!
//! Models asked for JSON sometimes wrap it in markdown fences, add prose
//! around it, or get cut off by the output token limit. `safe_json_parse`
//! salvages what it can (for a truncated array, every complete element) and
//! returns the caller's fallback instead of failing.

use serde::de::DeserializeOwned;
use tracing::error;

/// Inputs longer than this are logged as a prefix only.
const SNIPPET_LIMIT: usize = 500;
const SNIPPET_PREFIX_CHARS: usize = 200;

/// Rewrite model text into the most plausible JSON text.
///
/// Strips fences and leading prose. An array is cut after its last complete
/// object and closed with `]` (no object at all gives `[]`); an object is cut
/// after its last `}`. Text with no `[` or `{` is returned fence-stripped.
pub fn clean_json_text(text: &str) -> String {
    if text.is_empty() {
        return "[]".to_string();
    }
    let stripped = strip_fences(text);
    let stripped = stripped.trim();
    match first_open(stripped) {
        Some(start) => close_truncated(&stripped[start..]),
        None => stripped.to_string(),
    }
}

/// Parse model text as `T`, recovering from fences, prose and truncation.
///
/// Well-formed JSON (after fences and leading prose are removed) is parsed
/// as-is. Otherwise the `clean_json_text` heuristics apply, then for arrays
/// a trailing `]` and a trailing `}]` are tried. If nothing parses, or the
/// text holds no `[` or `{` at all, a bounded snippet is logged and
/// `fallback` is returned.
pub fn safe_json_parse<T: DeserializeOwned>(text: &str, fallback: T) -> T {
    if text.is_empty() {
        return serde_json::from_str("[]").unwrap_or(fallback);
    }

    let stripped = strip_fences(text);
    let stripped = stripped.trim();
    let Some(start) = first_open(stripped) else {
        log_failure(text);
        return fallback;
    };
    let body = &stripped[start..];

    if let Ok(value) = serde_json::from_str(body) {
        return value;
    }

    let cleaned = close_truncated(body);
    if let Ok(value) = serde_json::from_str(&cleaned) {
        return value;
    }

    log_failure(text);
    if cleaned.starts_with('[') {
        for suffix in ["]", "}]"] {
            if let Ok(value) = serde_json::from_str(&format!("{cleaned}{suffix}")) {
                return value;
            }
        }
    }
    fallback
}

/// Remove ```` ```json ```` (any case) and bare ```` ``` ```` markers.
fn strip_fences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find("```") {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 3..];
        if rest.get(..4).is_some_and(|tag| tag.eq_ignore_ascii_case("json")) {
            rest = &rest[4..];
        }
    }
    out.push_str(rest);
    out
}

fn first_open(text: &str) -> Option<usize> {
    text.find(['[', '{'])
}

/// `text` starts with `[` or `{`.
fn close_truncated(text: &str) -> String {
    let last_close = text.rfind('}');
    if text.starts_with('[') {
        match last_close {
            Some(end) => {
                let mut candidate = text[..=end].to_string();
                if !candidate.ends_with(']') {
                    candidate.push(']');
                }
                candidate
            }
            None => "[]".to_string(),
        }
    } else {
        match last_close {
            Some(end) => text[..=end].to_string(),
            None => text.to_string(),
        }
    }
}

fn log_failure(text: &str) {
    let snippet = if text.len() > SNIPPET_LIMIT {
        let prefix: String = text.chars().take(SNIPPET_PREFIX_CHARS).collect();
        format!("{prefix}... [TRUNCATED]")
    } else {
        text.to_string()
    };
    error!(length = text.len(), snippet = %snippet, "JSON parse failed");
}
