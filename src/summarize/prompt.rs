// src/summarize/prompt.rs
// Fixed instruction templates for the briefing script. The wording is tuned
// for TTS output: no markdown, no preamble, spoken-language paragraphs.

use crate::aggregate::AggregatedDocument;
use crate::normalize::NormalizedRecord;
use crate::request::{BriefingRequest, SourceKind};

pub const SCRIPT_SYSTEM: &str = "\
You are a professional virtual news reporter writing a broadcast script. \
The output will be read aloud by a text-to-speech engine, so: \
no special characters, emojis, markdown, or formatting symbols; \
no preamble or framing like 'Here is your summary'; \
full, clear, spoken-language paragraphs in a neutral, professional tone. \
Present official news first, then online discussion reactions, with natural \
transitions such as 'Meanwhile, online discussions reveal'. \
Start directly with the content and end with a short wrap-up sentence.";

pub const CHUNK_SYSTEM: &str = "\
You are a news digest assistant. Condense the source material below into a \
short factual digest in plain prose. Keep concrete facts, names, and numbers; \
drop boilerplate. No markdown, no preamble.";

fn block_heading(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::Feed => "OFFICIAL NEWS CONTENT",
        SourceKind::Forum => "FORUM DISCUSSION CONTENT",
    }
}

pub fn render_records(records: &[NormalizedRecord]) -> String {
    let mut out = String::new();
    let mut current: Option<SourceKind> = None;
    for rec in records {
        if current != Some(rec.source) {
            if current.is_some() {
                out.push('\n');
            }
            out.push_str(block_heading(rec.source));
            out.push_str(":\n");
            current = Some(rec.source);
        }
        out.push_str("- ");
        out.push_str(&rec.title);
        if !rec.text.is_empty() {
            out.push_str(": ");
            out.push_str(&rec.text);
        }
        out.push('\n');
    }
    out
}

fn topics_line(request: &BriefingRequest) -> String {
    request
        .topics
        .iter()
        .chain(request.keywords.iter())
        .cloned()
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn briefing_prompt(request: &BriefingRequest, doc: &AggregatedDocument) -> String {
    format!(
        "Create broadcast segments for these topics using the source material below.\n\
         TOPICS: {}\n\n{}",
        topics_line(request),
        render_records(&doc.records)
    )
}

pub fn chunk_prompt(request: &BriefingRequest, records: &[NormalizedRecord]) -> String {
    format!(
        "Source material on the topics: {}.\n\n{}",
        topics_line(request),
        render_records(records)
    )
}

pub fn reduce_prompt(request: &BriefingRequest, digests: &[String]) -> String {
    format!(
        "Create broadcast segments for these topics from the partial digests \
         below, merging them into one coherent script.\n\
         TOPICS: {}\n\n{}",
        topics_line(request),
        digests.join("\n\n--- NEXT DIGEST ---\n\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn rec(kind: SourceKind, title: &str) -> NormalizedRecord {
        NormalizedRecord {
            source: kind,
            title: title.into(),
            text: "details".into(),
            fetched_at: 0,
        }
    }

    #[test]
    fn records_group_under_source_headings() {
        let txt = render_records(&[
            rec(SourceKind::Feed, "A"),
            rec(SourceKind::Feed, "B"),
            rec(SourceKind::Forum, "C"),
        ]);
        assert!(txt.contains("OFFICIAL NEWS CONTENT:\n- A: details\n- B: details"));
        assert!(txt.contains("FORUM DISCUSSION CONTENT:\n- C: details"));
    }

    #[test]
    fn briefing_prompt_names_topics() {
        let request = BriefingRequest {
            topics: ["elections".to_string()].into_iter().collect(),
            keywords: BTreeSet::new(),
            sources: vec![SourceKind::Feed],
            session_id: "t".into(),
        };
        let doc = AggregatedDocument {
            records: vec![rec(SourceKind::Feed, "A")],
        };
        let p = briefing_prompt(&request, &doc);
        assert!(p.contains("TOPICS: elections"));
    }
}
