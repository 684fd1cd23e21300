// src/error.rs
// Error taxonomy for a briefing run. Provider-internal errors stay `anyhow`
// inside the connectors/clients; only these tagged kinds cross the
// orchestrator/API seam.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BriefingError {
    /// Request rejected before the pipeline starts.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Every selected source kind failed, primary and fallback alike.
    #[error("no source could be reached: {0}")]
    Connector(String),

    /// LLM call failed after one retry. Fatal for the request.
    #[error("summarization failed: {0}")]
    Summarize(String),

    /// Both speech providers failed. Fatal for the request.
    #[error("speech rendering failed: {0}")]
    Render(String),

    /// Writing or reading the audio artifact failed.
    #[error("artifact storage failed: {0}")]
    Storage(String),
}

impl BriefingError {
    /// Stable machine-readable tag for API responses and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            BriefingError::Validation(_) => "validation",
            BriefingError::Connector(_) => "connector",
            BriefingError::Summarize(_) => "summarize",
            BriefingError::Render(_) => "render",
            BriefingError::Storage(_) => "storage",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable_tags() {
        assert_eq!(BriefingError::Validation("x".into()).kind(), "validation");
        assert_eq!(BriefingError::Connector("x".into()).kind(), "connector");
        assert_eq!(BriefingError::Summarize("x".into()).kind(), "summarize");
        assert_eq!(BriefingError::Render("x".into()).kind(), "render");
        assert_eq!(BriefingError::Storage("x".into()).kind(), "storage");
    }

    #[test]
    fn messages_do_not_leak_raw_provider_dumps() {
        let e = BriefingError::Render("primary and fallback unavailable".into());
        let msg = e.to_string();
        assert!(msg.starts_with("speech rendering failed"));
    }
}
