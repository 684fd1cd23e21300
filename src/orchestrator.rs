// src/orchestrator.rs
// Drives one briefing end-to-end:
// RECEIVED → FETCHING → AGGREGATING → SUMMARIZING → RENDERING → DONE,
// with FAILED reachable from any non-terminal stage. No stage is re-entered;
// per-component failover happens inside the component, invisibly to this
// state machine.

use std::fmt;
use std::sync::Arc;

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;

use crate::aggregate::{aggregate, AggregatedDocument};
use crate::config::AppConfig;
use crate::error::BriefingError;
use crate::normalize::normalize;
use crate::request::{BriefingRequest, SourceKind, SourceQuery};
use crate::sources::{fetch_all, ConnectorChain, RawItem};
use crate::speech::providers::{CompactVoiceSynth, NaturalVoiceSynth};
use crate::speech::store::AudioStore;
use crate::speech::{AudioArtifact, SpeechRenderer, SpeechSynthesizer};
use crate::summarize::llm::OpenAiChat;
use crate::summarize::ScriptWriter;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("briefings_completed_total", "Briefings that reached DONE.");
        describe_counter!(
            "briefings_empty_total",
            "Briefings that finished with no matching content."
        );
        describe_counter!("briefings_failed_total", "Briefings that reached FAILED.");
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Fetching,
    Aggregating,
    Summarizing,
    Rendering,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Received => "RECEIVED",
            Stage::Fetching => "FETCHING",
            Stage::Aggregating => "AGGREGATING",
            Stage::Summarizing => "SUMMARIZING",
            Stage::Rendering => "RENDERING",
            Stage::Done => "DONE",
            Stage::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// Terminal result of a run. An empty aggregate is reported, not crashed on.
#[derive(Debug)]
pub enum BriefingOutcome {
    Rendered(AudioArtifact),
    NoContent,
}

pub struct Orchestrator {
    max_record_chars: usize,
    page_size: usize,
    feed: ConnectorChain,
    forum: ConnectorChain,
    writer: ScriptWriter,
    renderer: SpeechRenderer,
}

impl Orchestrator {
    /// Wire every component from explicit configuration. Fallbacks are fixed:
    /// newswire → feed RSS, forum listing → forum RSS, natural → compact voice.
    pub fn from_config(config: &AppConfig, store: AudioStore) -> Self {
        use crate::sources::feed::{FeedRssConnector, NewswireConnector};
        use crate::sources::forum::{ForumConnector, ForumRssConnector};

        let limits = &config.limits;
        let feed = ConnectorChain::new(
            SourceKind::Feed,
            vec![
                Box::new(NewswireConnector::new(&config.feed, limits)),
                Box::new(FeedRssConnector::new(&config.feed, limits)),
            ],
        );
        let forum = ConnectorChain::new(
            SourceKind::Forum,
            vec![
                Box::new(ForumConnector::new(&config.forum, limits)),
                Box::new(ForumRssConnector::new(&config.forum, limits)),
            ],
        );
        let writer = ScriptWriter::new(Arc::new(OpenAiChat::new(&config.llm, limits)), limits);
        let synths: Vec<Box<dyn SpeechSynthesizer>> = vec![
            Box::new(NaturalVoiceSynth::new(&config.speech, limits)),
            Box::new(CompactVoiceSynth::new(&config.speech, limits)),
        ];
        let renderer = SpeechRenderer::new(synths, store);

        Self {
            max_record_chars: limits.max_record_chars,
            page_size: limits.page_size,
            feed,
            forum,
            writer,
            renderer,
        }
    }

    /// Assemble from parts; used by tests to swap in scripted components.
    pub fn new(
        max_record_chars: usize,
        page_size: usize,
        feed: ConnectorChain,
        forum: ConnectorChain,
        writer: ScriptWriter,
        renderer: SpeechRenderer,
    ) -> Self {
        Self {
            max_record_chars,
            page_size,
            feed,
            forum,
            writer,
            renderer,
        }
    }

    fn chain(&self, kind: SourceKind) -> &ConnectorChain {
        match kind {
            SourceKind::Feed => &self.feed,
            SourceKind::Forum => &self.forum,
        }
    }

    fn enter(&self, session_id: &str, stage: Stage) {
        tracing::info!(session_id, stage = %stage, "briefing stage");
    }

    fn fail(&self, session_id: &str, err: BriefingError) -> BriefingError {
        self.enter(session_id, Stage::Failed);
        counter!("briefings_failed_total").increment(1);
        tracing::warn!(session_id, kind = err.kind(), error = %err, "briefing failed");
        err
    }

    pub async fn run(&self, request: BriefingRequest) -> Result<BriefingOutcome, BriefingError> {
        ensure_metrics_described();
        let sid = request.session_id.clone();
        self.enter(&sid, Stage::Received);
        request.validate().map_err(|e| self.fail(&sid, e))?;

        // Fetch every selected kind concurrently; each chain runs its own
        // failover. A kind that fails outright is skipped unless every kind
        // failed.
        self.enter(&sid, Stage::Fetching);
        let query = SourceQuery::from_request(&request, self.page_size);
        let kinds = request.distinct_sources();
        let chains: Vec<&ConnectorChain> = kinds.iter().map(|k| self.chain(*k)).collect();
        let results = fetch_all(&chains, &query).await;

        let mut items: Vec<RawItem> = Vec::new();
        let mut failures: Vec<String> = Vec::new();
        let mut any_ok = false;
        for (kind, res) in results {
            match res {
                Ok(mut v) => {
                    any_ok = true;
                    items.append(&mut v);
                }
                Err(e) => {
                    tracing::warn!(session_id = %sid, kind = %kind, error = ?e, "source kind skipped");
                    failures.push(format!("{kind}: {e}"));
                }
            }
        }
        if !any_ok {
            return Err(self.fail(&sid, BriefingError::Connector(failures.join("; "))));
        }

        self.enter(&sid, Stage::Aggregating);
        let records = items
            .iter()
            .map(|it| normalize(it, self.max_record_chars))
            .collect::<Vec<_>>();
        let doc: AggregatedDocument = aggregate(records, &request);
        if doc.is_empty() {
            self.enter(&sid, Stage::Done);
            counter!("briefings_empty_total").increment(1);
            tracing::info!(session_id = %sid, "no matching content; reporting empty briefing");
            return Ok(BriefingOutcome::NoContent);
        }

        self.enter(&sid, Stage::Summarizing);
        let script = match self
            .writer
            .compose(&request, &doc)
            .await
            .map_err(|e| self.fail(&sid, e))?
        {
            Some(s) => s,
            None => {
                self.enter(&sid, Stage::Done);
                counter!("briefings_empty_total").increment(1);
                return Ok(BriefingOutcome::NoContent);
            }
        };

        self.enter(&sid, Stage::Rendering);
        let artifact = self
            .renderer
            .render(&script)
            .await
            .map_err(|e| self.fail(&sid, e))?;

        self.enter(&sid, Stage::Done);
        counter!("briefings_completed_total").increment(1);
        tracing::info!(
            session_id = %sid,
            artifact = %artifact.id,
            provider = %artifact.provider,
            records = doc.len(),
            "briefing complete"
        );
        Ok(BriefingOutcome::Rendered(artifact))
    }
}
