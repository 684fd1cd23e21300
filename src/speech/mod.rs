// src/speech/mod.rs
// Script-to-audio rendering with hard failover: providers are tried in
// order, the first success is stored, and RenderError means every provider
// failed — in which case nothing is written to the store.

pub mod providers;
pub mod store;

use anyhow::Result;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::error::BriefingError;
use crate::summarize::Script;
use store::AudioStore;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("speech_render_bytes_total", "Audio bytes produced.");
        describe_counter!(
            "speech_provider_errors_total",
            "Speech synthesis errors (before failover)."
        );
        describe_counter!(
            "speech_failover_total",
            "Times the fallback voice served a render."
        );
    });
}

/// Raw synthesis output before it is stored.
pub struct AudioPayload {
    pub bytes: Vec<u8>,
    pub format: &'static str,
    pub provider: &'static str,
}

#[async_trait::async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<AudioPayload>;
    fn name(&self) -> &'static str;
}

/// Stored artifact reference handed back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct AudioArtifact {
    pub id: String,
    pub format: String,
    pub provider: String,
    pub bytes_len: usize,
    pub duration_secs: Option<f32>,
}

pub struct SpeechRenderer {
    synths: Vec<Box<dyn SpeechSynthesizer>>,
    store: AudioStore,
}

impl SpeechRenderer {
    pub fn new(synths: Vec<Box<dyn SpeechSynthesizer>>, store: AudioStore) -> Self {
        Self { synths, store }
    }

    pub async fn render(&self, script: &Script) -> Result<AudioArtifact, BriefingError> {
        ensure_metrics_described();

        let mut last_err: Option<anyhow::Error> = None;
        for (i, synth) in self.synths.iter().enumerate() {
            match synth.synthesize(&script.text).await {
                Ok(payload) => {
                    if i > 0 {
                        counter!("speech_failover_total").increment(1);
                        tracing::info!(
                            provider = payload.provider,
                            "fallback voice served the render"
                        );
                    }
                    counter!("speech_render_bytes_total").increment(payload.bytes.len() as u64);
                    let id = self
                        .store
                        .put(&payload.bytes)
                        .map_err(|e| BriefingError::Storage(e.to_string()))?;
                    return Ok(AudioArtifact {
                        id,
                        format: payload.format.to_string(),
                        provider: payload.provider.to_string(),
                        bytes_len: payload.bytes.len(),
                        duration_secs: None,
                    });
                }
                Err(e) => {
                    counter!("speech_provider_errors_total").increment(1);
                    tracing::warn!(provider = synth.name(), error = ?e, "speech provider failed, trying next");
                    last_err = Some(e);
                }
            }
        }
        Err(BriefingError::Render(
            last_err
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no speech providers configured".into()),
        ))
    }
}

// --- Test helpers ---

pub struct StaticSynth {
    pub name: &'static str,
    pub format: &'static str,
    pub fail: bool,
}

#[async_trait::async_trait]
impl SpeechSynthesizer for StaticSynth {
    async fn synthesize(&self, text: &str) -> Result<AudioPayload> {
        if self.fail {
            anyhow::bail!("{} synthesis unavailable", self.name);
        }
        Ok(AudioPayload {
            bytes: text.as_bytes().to_vec(),
            format: self.format,
            provider: self.name,
        })
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
