// src/summarize/mod.rs
// Four-stage run (fetch → normalize → aggregate → summarize) ends here: turn
// one aggregated document into one coherent script. The pipeline owns only
// input size bounding (chunk-and-reduce) and output validation; the language
// generation itself is delegated to the ChatClient.

pub mod llm;
pub mod prompt;

use std::sync::Arc;

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;

use crate::aggregate::AggregatedDocument;
use crate::config::Limits;
use crate::error::BriefingError;
use crate::normalize::NormalizedRecord;
use crate::request::BriefingRequest;
use llm::ChatClient;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("summarize_llm_calls_total", "Chat completions issued.");
        describe_counter!("summarize_llm_retries_total", "Chat completions retried once.");
        describe_counter!("summarize_chunked_runs_total", "Runs that used chunk-and-reduce.");
    });
}

/// Final script, owned solely by the pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub text: String,
}

pub struct ScriptWriter {
    chat: Arc<dyn ChatClient>,
    max_chunk_chars: usize,
    max_script_chars: usize,
}

impl ScriptWriter {
    pub fn new(chat: Arc<dyn ChatClient>, limits: &Limits) -> Self {
        Self {
            chat,
            max_chunk_chars: limits.max_chunk_chars,
            max_script_chars: limits.max_script_chars,
        }
    }

    /// Produce the script, or `None` for an empty document — in which case
    /// the LLM is never invoked.
    pub async fn compose(
        &self,
        request: &BriefingRequest,
        doc: &AggregatedDocument,
    ) -> Result<Option<Script>, BriefingError> {
        if doc.is_empty() {
            return Ok(None);
        }
        ensure_metrics_described();

        let user = prompt::briefing_prompt(request, doc);
        let raw = if user.chars().count() <= self.max_chunk_chars {
            self.call(prompt::SCRIPT_SYSTEM, &user).await?
        } else {
            counter!("summarize_chunked_runs_total").increment(1);
            self.chunk_and_reduce(request, doc).await?
        };

        let script = self.validate(raw, &request.session_id)?;
        Ok(Some(script))
    }

    /// Summarize each chunk of records, then summarize the digests.
    async fn chunk_and_reduce(
        &self,
        request: &BriefingRequest,
        doc: &AggregatedDocument,
    ) -> Result<String, BriefingError> {
        let chunks = split_records(&doc.records, self.max_chunk_chars);
        let mut digests = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let user = prompt::chunk_prompt(request, chunk);
            digests.push(self.call(prompt::CHUNK_SYSTEM, &user).await?);
        }
        let user = prompt::reduce_prompt(request, &digests);
        self.call(prompt::SCRIPT_SYSTEM, &user).await
    }

    /// One retry, then fail the request. No partial script ever escapes.
    async fn call(&self, system: &str, user: &str) -> Result<String, BriefingError> {
        counter!("summarize_llm_calls_total").increment(1);
        match self.chat.complete(system, user).await {
            Ok(text) => Ok(text),
            Err(first) => {
                counter!("summarize_llm_retries_total").increment(1);
                tracing::warn!(provider = self.chat.name(), error = ?first, "llm call failed, retrying once");
                self.chat
                    .complete(system, user)
                    .await
                    .map_err(|e| BriefingError::Summarize(e.to_string()))
            }
        }
    }

    fn validate(&self, raw: String, session_id: &str) -> Result<Script, BriefingError> {
        let mut text = raw.trim().to_string();
        if text.is_empty() {
            return Err(BriefingError::Summarize(
                "model returned an empty script".into(),
            ));
        }
        if text.chars().count() > self.max_script_chars {
            tracing::warn!(
                session_id,
                max = self.max_script_chars,
                "script over length cap, truncating"
            );
            text = text.chars().take(self.max_script_chars).collect();
        }
        Ok(Script { text })
    }
}

/// Greedy split preserving record order; every chunk stays under the budget
/// except when a single record alone exceeds it.
fn split_records(records: &[NormalizedRecord], max_chunk_chars: usize) -> Vec<Vec<NormalizedRecord>> {
    let mut chunks: Vec<Vec<NormalizedRecord>> = Vec::new();
    let mut current: Vec<NormalizedRecord> = Vec::new();
    let mut current_chars = 0usize;

    for rec in records {
        let cost = rec.title.chars().count() + rec.text.chars().count();
        if !current.is_empty() && current_chars + cost > max_chunk_chars {
            chunks.push(std::mem::take(&mut current));
            current_chars = 0;
        }
        current_chars += cost;
        current.push(rec.clone());
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
