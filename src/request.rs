// src/request.rs
// The inbound briefing request and the query handed to source connectors.
// Requests are immutable value objects; nothing here outlives the run.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::BriefingError;

/// Capability kind of a content source. The order in which kinds appear in a
/// request doubles as their aggregation priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Structured news feed (wire/API backed).
    Feed,
    /// Discussion forum threads.
    Forum,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Feed => write!(f, "feed"),
            SourceKind::Forum => write!(f, "forum"),
        }
    }
}

fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct BriefingRequest {
    #[serde(default)]
    pub topics: BTreeSet<String>,
    #[serde(default)]
    pub keywords: BTreeSet<String>,
    /// Priority-ordered; duplicates are ignored after the first occurrence.
    pub sources: Vec<SourceKind>,
    /// Correlation id for logs. Generated when the caller omits it.
    #[serde(default = "new_session_id")]
    pub session_id: String,
}

impl BriefingRequest {
    /// Reject malformed requests before the pipeline starts.
    pub fn validate(&self) -> Result<(), BriefingError> {
        if self.sources.is_empty() {
            return Err(BriefingError::Validation(
                "at least one source must be selected".into(),
            ));
        }
        let has_terms = self
            .topics
            .iter()
            .chain(self.keywords.iter())
            .any(|t| !t.trim().is_empty());
        if !has_terms {
            return Err(BriefingError::Validation(
                "at least one topic or keyword is required".into(),
            ));
        }
        Ok(())
    }

    /// Selected kinds in priority order, first occurrence wins.
    pub fn distinct_sources(&self) -> Vec<SourceKind> {
        let mut seen = Vec::with_capacity(self.sources.len());
        for k in &self.sources {
            if !seen.contains(k) {
                seen.push(*k);
            }
        }
        seen
    }

    /// Aggregation priority of a kind (position in the request's source list).
    pub fn source_rank(&self, kind: SourceKind) -> usize {
        self.distinct_sources()
            .iter()
            .position(|k| *k == kind)
            .unwrap_or(usize::MAX)
    }

    pub fn search_terms(&self) -> Vec<String> {
        self.topics
            .iter()
            .chain(self.keywords.iter())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// What a connector actually searches for. Built once per run and shared by
/// every connector attempt, primary and fallback alike.
#[derive(Debug, Clone)]
pub struct SourceQuery {
    pub terms: Vec<String>,
    pub page_size: usize,
}

impl SourceQuery {
    pub fn from_request(request: &BriefingRequest, page_size: usize) -> Self {
        Self {
            terms: request.search_terms(),
            page_size,
        }
    }

    /// Single query string for providers that take one `q` parameter.
    pub fn joined(&self) -> String {
        self.terms.join(" OR ")
    }
}
