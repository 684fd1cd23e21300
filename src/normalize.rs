// src/normalize.rs
// Markup stripping and whitespace cleanup for raw items. Deterministic and
// total: malformed input degrades to an empty body, never an error.

use serde::{Deserialize, Serialize};

use crate::request::SourceKind;
use crate::sources::RawItem;

/// Hard cap applied to titles regardless of config.
const MAX_TITLE_CHARS: usize = 300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub source: SourceKind,
    pub title: String,
    pub text: String,
    pub fetched_at: u64,
}

/// Strip markup, collapse whitespace, cap length. Same input, same output.
pub fn normalize(item: &RawItem, max_record_chars: usize) -> NormalizedRecord {
    NormalizedRecord {
        source: item.source,
        title: clean_text(&item.title, MAX_TITLE_CHARS),
        text: clean_text(&item.body, max_record_chars),
        fetched_at: item.fetched_at,
    }
}

/// Normalize text: entity-decode, strip tags, collapse whitespace, cap chars.
pub fn clean_text(s: &str, max_chars: usize) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // 5) Length cap: silent truncation bounds downstream LLM input
    if out.chars().count() > max_chars {
        out = out.chars().take(max_chars).collect();
    }

    out
}
