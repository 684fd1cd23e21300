// src/aggregate.rs
// Merge normalized records from every selected source into one ordered
// document. Dedup is stable and first-wins on (source, title); order is the
// request's source priority, then recency within a source.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::normalize::NormalizedRecord;
use crate::request::BriefingRequest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedDocument {
    pub records: Vec<NormalizedRecord>,
}

impl AggregatedDocument {
    /// Zero records is a valid, reportable outcome, not an error.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Total character count of the record bodies, used for chunk decisions.
    pub fn text_chars(&self) -> usize {
        self.records.iter().map(|r| r.text.chars().count()).sum()
    }
}

pub fn aggregate(records: Vec<NormalizedRecord>, request: &BriefingRequest) -> AggregatedDocument {
    // First occurrence wins; input order decides which duplicate survives.
    let mut seen: HashSet<(crate::request::SourceKind, String)> = HashSet::new();
    let mut kept = Vec::with_capacity(records.len());
    for rec in records {
        if seen.insert((rec.source, rec.title.clone())) {
            kept.push(rec);
        }
    }

    // Stable sort: source priority from the request, then newest first.
    kept.sort_by(|a, b| {
        request
            .source_rank(a.source)
            .cmp(&request.source_rank(b.source))
            .then(b.fetched_at.cmp(&a.fetched_at))
    });

    AggregatedDocument { records: kept }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::SourceKind;
    use std::collections::BTreeSet;

    fn rec(source: SourceKind, title: &str, text: &str, at: u64) -> NormalizedRecord {
        NormalizedRecord {
            source,
            title: title.into(),
            text: text.into(),
            fetched_at: at,
        }
    }

    fn req(sources: Vec<SourceKind>) -> BriefingRequest {
        BriefingRequest {
            topics: ["elections".to_string()].into_iter().collect(),
            keywords: BTreeSet::new(),
            sources,
            session_id: "test".into(),
        }
    }

    #[test]
    fn duplicate_source_title_keeps_first_seen() {
        let r = req(vec![SourceKind::Feed]);
        let doc = aggregate(
            vec![
                rec(SourceKind::Feed, "Same headline", "first copy", 10),
                rec(SourceKind::Feed, "Same headline", "second copy", 99),
            ],
            &r,
        );
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.records[0].text, "first copy");
    }

    #[test]
    fn same_title_different_source_is_not_a_duplicate() {
        let r = req(vec![SourceKind::Feed, SourceKind::Forum]);
        let doc = aggregate(
            vec![
                rec(SourceKind::Feed, "Headline", "a", 1),
                rec(SourceKind::Forum, "Headline", "b", 1),
            ],
            &r,
        );
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn orders_by_source_priority_then_recency() {
        // Forum listed first, so forum records lead despite older timestamps.
        let r = req(vec![SourceKind::Forum, SourceKind::Feed]);
        let doc = aggregate(
            vec![
                rec(SourceKind::Feed, "f-new", "", 200),
                rec(SourceKind::Forum, "d-old", "", 10),
                rec(SourceKind::Feed, "f-old", "", 100),
                rec(SourceKind::Forum, "d-new", "", 20),
            ],
            &r,
        );
        let titles: Vec<&str> = doc.records.iter().map(|x| x.title.as_str()).collect();
        assert_eq!(titles, vec!["d-new", "d-old", "f-new", "f-old"]);
    }

    #[test]
    fn aggregate_is_idempotent() {
        let r = req(vec![SourceKind::Feed, SourceKind::Forum]);
        let input = vec![
            rec(SourceKind::Forum, "x", "1", 5),
            rec(SourceKind::Feed, "y", "2", 9),
            rec(SourceKind::Feed, "y", "3", 1),
        ];
        let a = aggregate(input.clone(), &r);
        let b = aggregate(input, &r);
        assert_eq!(a, b);
        let c = aggregate(a.records.clone(), &r);
        assert_eq!(a, c);
    }

    #[test]
    fn empty_input_yields_empty_document() {
        let r = req(vec![SourceKind::Feed]);
        let doc = aggregate(vec![], &r);
        assert!(doc.is_empty());
        assert_eq!(doc.text_chars(), 0);
    }
}
