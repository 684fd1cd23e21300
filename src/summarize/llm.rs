// src/summarize/llm.rs
// Hosted LLM boundary: one operation, generate text from instruction +
// context. The concrete provider speaks the chat-completions wire format.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{Limits, LlmConfig};

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Generate text for a bounded-length prompt, or a provider error.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
    fn name(&self) -> &'static str;
}

pub struct OpenAiChat {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiChat {
    pub fn new(cfg: &LlmConfig, limits: &Limits) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("newsreel/0.1 (+news-to-audio briefing service)")
            .connect_timeout(Duration::from_secs(limits.connect_timeout_secs))
            .timeout(Duration::from_secs(limits.request_timeout_secs.max(30)))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_url: cfg.api_url.clone(),
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
        }
    }
}

#[async_trait]
impl ChatClient for OpenAiChat {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        if self.api_key.is_empty() {
            bail!("llm api key not configured");
        }

        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
            max_tokens: u32,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: String,
        }

        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: system,
                },
                Msg {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.4,
            max_tokens: 1500,
        };

        let resp = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .context("llm request failed")?;
        if !resp.status().is_success() {
            bail!("llm returned {}", resp.status());
        }
        let body: Resp = resp.json().await.context("llm response body")?;
        let content = body
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .unwrap_or_default();
        if content.is_empty() {
            bail!("llm returned no content");
        }
        Ok(content)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

// --- Test helpers ---

/// Deterministic client: fails the first `fail_times` calls, then answers
/// with a fixed reply. Counts every call.
pub struct MockChat {
    pub reply: String,
    pub fail_times: usize,
    pub calls: AtomicUsize,
}

impl MockChat {
    pub fn fixed(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            fail_times: 0,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_first(fail_times: usize, reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            fail_times,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatClient for MockChat {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.fail_times {
            bail!("mock llm unavailable (call {})", n + 1);
        }
        Ok(self.reply.clone())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
