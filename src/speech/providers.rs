// src/speech/providers.rs
// The two speech providers: a hosted natural-voice API as primary and a
// deterministic lower-fidelity translate-TTS endpoint as fallback.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Serialize;

use crate::config::{Limits, SpeechConfig};
use crate::speech::{AudioPayload, SpeechSynthesizer};

/// The fallback endpoint only accepts short inputs per call.
const FALLBACK_CHUNK_CHARS: usize = 200;

fn build_http(limits: &Limits) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent("newsreel/0.1 (+news-to-audio briefing service)")
        .connect_timeout(Duration::from_secs(limits.connect_timeout_secs))
        .timeout(Duration::from_secs(limits.request_timeout_secs.max(30)))
        .build()
        .expect("reqwest client")
}

pub struct NaturalVoiceSynth {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    voice_id: String,
    voice_model: String,
}

impl NaturalVoiceSynth {
    pub fn new(cfg: &SpeechConfig, limits: &Limits) -> Self {
        Self {
            http: build_http(limits),
            api_url: cfg.api_url.clone(),
            api_key: cfg.api_key.clone(),
            voice_id: cfg.voice_id.clone(),
            voice_model: cfg.voice_model.clone(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for NaturalVoiceSynth {
    async fn synthesize(&self, text: &str) -> Result<AudioPayload> {
        if self.api_key.is_empty() {
            bail!("speech api key not configured");
        }

        #[derive(Serialize)]
        struct Req<'a> {
            text: &'a str,
            model_id: &'a str,
        }

        let url = format!("{}/v1/text-to-speech/{}", self.api_url, self.voice_id);
        let resp = self
            .http
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .query(&[("output_format", "mp3_44100_128")])
            .json(&Req {
                text,
                model_id: &self.voice_model,
            })
            .send()
            .await
            .context("speech request failed")?;
        if !resp.status().is_success() {
            bail!("speech provider returned {}", resp.status());
        }
        let bytes = resp.bytes().await.context("speech response body")?.to_vec();
        if bytes.is_empty() {
            bail!("speech provider returned no audio");
        }
        Ok(AudioPayload {
            bytes,
            format: "mp3_44100_128",
            provider: self.name(),
        })
    }

    fn name(&self) -> &'static str {
        "naturalvoice"
    }
}

pub struct CompactVoiceSynth {
    http: reqwest::Client,
    api_url: String,
    language: String,
}

impl CompactVoiceSynth {
    pub fn new(cfg: &SpeechConfig, limits: &Limits) -> Self {
        Self {
            http: build_http(limits),
            api_url: cfg.fallback_url.clone(),
            language: cfg.language.clone(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for CompactVoiceSynth {
    async fn synthesize(&self, text: &str) -> Result<AudioPayload> {
        // The endpoint caps input length, so the script is synthesized in
        // pieces and the mp3 frames concatenated.
        let mut bytes = Vec::new();
        for piece in split_for_tts(text, FALLBACK_CHUNK_CHARS) {
            let resp = self
                .http
                .get(&self.api_url)
                .query(&[
                    ("ie", "UTF-8"),
                    ("client", "tw-ob"),
                    ("tl", self.language.as_str()),
                    ("q", piece.as_str()),
                ])
                .send()
                .await
                .context("fallback speech request failed")?;
            if !resp.status().is_success() {
                bail!("fallback speech provider returned {}", resp.status());
            }
            bytes.extend_from_slice(&resp.bytes().await.context("fallback speech body")?);
        }
        if bytes.is_empty() {
            bail!("fallback speech provider returned no audio");
        }
        Ok(AudioPayload {
            bytes,
            format: "mp3_24000_32",
            provider: self.name(),
        })
    }

    fn name(&self) -> &'static str {
        "compactvoice"
    }
}

/// Split on sentence ends, then hard-split anything still over the cap.
fn split_for_tts(text: &str, max_chars: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for sentence in text.split_inclusive(['.', '!', '?']) {
        if !current.is_empty() && current.chars().count() + sentence.chars().count() > max_chars {
            pieces.push(std::mem::take(&mut current));
        }
        current.push_str(sentence);
        while current.chars().count() > max_chars {
            let head: String = current.chars().take(max_chars).collect();
            let rest: String = current.chars().skip(max_chars).collect();
            pieces.push(head);
            current = rest;
        }
    }
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        pieces.push(trimmed.to_string());
    }
    pieces.retain(|p| !p.trim().is_empty());
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_piece() {
        let pieces = split_for_tts("Hello there.", 200);
        assert_eq!(pieces, vec!["Hello there.".to_string()]);
    }

    #[test]
    fn splits_on_sentence_boundaries() {
        let text = format!("{} {}", "a".repeat(150), "b".repeat(150));
        let with_dots = format!("{}. {}.", &text[..150], &text[151..]);
        let pieces = split_for_tts(&with_dots, 200);
        assert_eq!(pieces.len(), 2);
        for p in &pieces {
            assert!(p.chars().count() <= 200);
        }
    }

    #[test]
    fn hard_splits_run_on_text() {
        let pieces = split_for_tts(&"x".repeat(450), 200);
        assert_eq!(pieces.len(), 3);
        assert!(pieces.iter().all(|p| p.chars().count() <= 200));
    }
}
