// src/config.rs
// Explicit configuration for every component, loaded once at startup and
// passed into constructors. API keys use "ENV" indirection so the TOML file
// never holds secrets; a missing env var leaves the key empty, which the
// owning provider reports as its own failure (degraded, not fatal).

use std::{env, fs, path::Path};

use serde::{Deserialize, Serialize};

pub const ENV_CONFIG_PATH: &str = "NEWSREEL_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/newsreel.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub forum: ForumConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_audio_dir")]
    pub audio_dir: String,
}

fn default_port() -> u16 {
    8080
}
fn default_audio_dir() -> String {
    "audio".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            audio_dir: default_audio_dir(),
        }
    }
}

/// Concrete bounds for the pipeline. The LLM input budget and the script cap
/// are deliberate cost controls, not provider limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Limits {
    #[serde(default = "default_max_record_chars")]
    pub max_record_chars: usize,
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,
    #[serde(default = "default_max_script_chars")]
    pub max_script_chars: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_max_record_chars() -> usize {
    1500
}
fn default_max_chunk_chars() -> usize {
    12_000
}
fn default_max_script_chars() -> usize {
    6000
}
fn default_page_size() -> usize {
    10
}
fn default_connect_timeout_secs() -> u64 {
    4
}
fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_record_chars: default_max_record_chars(),
            max_chunk_chars: default_max_chunk_chars(),
            max_script_chars: default_max_script_chars(),
            page_size: default_page_size(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_feed_api_url")]
    pub api_url: String,
    /// "ENV" means: read NEWSWIRE_API_KEY.
    #[serde(default = "default_env_key")]
    pub api_key: String,
    #[serde(default = "default_feed_rss_url")]
    pub rss_url: String,
}

fn default_feed_api_url() -> String {
    "https://newsapi.org/v2/everything".to_string()
}
fn default_feed_rss_url() -> String {
    "https://news.google.com/rss/search".to_string()
}
fn default_env_key() -> String {
    "ENV".to_string()
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            api_url: default_feed_api_url(),
            api_key: default_env_key(),
            rss_url: default_feed_rss_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForumConfig {
    #[serde(default = "default_forum_api_url")]
    pub api_url: String,
    #[serde(default = "default_forum_rss_url")]
    pub rss_url: String,
}

fn default_forum_api_url() -> String {
    "https://www.reddit.com/search.json".to_string()
}
fn default_forum_rss_url() -> String {
    "https://www.reddit.com/search.rss".to_string()
}

impl Default for ForumConfig {
    fn default() -> Self {
        Self {
            api_url: default_forum_api_url(),
            rss_url: default_forum_rss_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_api_url")]
    pub api_url: String,
    /// "ENV" means: read LLM_API_KEY, then OPENAI_API_KEY.
    #[serde(default = "default_env_key")]
    pub api_key: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
}

fn default_llm_api_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}
fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: default_llm_api_url(),
            api_key: default_env_key(),
            model: default_llm_model(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default = "default_speech_api_url")]
    pub api_url: String,
    /// "ENV" means: read SPEECH_API_KEY, then ELEVEN_API_KEY.
    #[serde(default = "default_env_key")]
    pub api_key: String,
    #[serde(default = "default_voice_id")]
    pub voice_id: String,
    #[serde(default = "default_voice_model")]
    pub voice_model: String,
    #[serde(default = "default_fallback_url")]
    pub fallback_url: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_speech_api_url() -> String {
    "https://api.elevenlabs.io".to_string()
}
fn default_voice_id() -> String {
    "JBFqnCBsd6RMkjVDRZzb".to_string()
}
fn default_voice_model() -> String {
    "eleven_multilingual_v2".to_string()
}
fn default_fallback_url() -> String {
    "https://translate.google.com/translate_tts".to_string()
}
fn default_language() -> String {
    "en".to_string()
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_url: default_speech_api_url(),
            api_key: default_env_key(),
            voice_id: default_voice_id(),
            voice_model: default_voice_model(),
            fallback_url: default_fallback_url(),
            language: default_language(),
        }
    }
}

impl AppConfig {
    /// Load from an explicit path. Parse errors are real errors; callers that
    /// want defaults-on-missing use `load_default`.
    pub fn load_from<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        let mut cfg: AppConfig = toml::from_str(&data)?;
        cfg.resolve_env_keys();
        Ok(cfg)
    }

    /// Load using env var + fallbacks:
    /// 1) $NEWSREEL_CONFIG_PATH
    /// 2) config/newsreel.toml
    /// 3) built-in defaults
    pub fn load_default() -> Self {
        let path = env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        match Self::load_from(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(error = ?e, path = %path, "config not loaded; using defaults");
                let mut cfg = Self::default();
                cfg.resolve_env_keys();
                cfg
            }
        }
    }

    fn resolve_env_keys(&mut self) {
        self.feed.api_key = resolve_key(&self.feed.api_key, &["NEWSWIRE_API_KEY"]);
        self.llm.api_key = resolve_key(&self.llm.api_key, &["LLM_API_KEY", "OPENAI_API_KEY"]);
        self.speech.api_key = resolve_key(&self.speech.api_key, &["SPEECH_API_KEY", "ELEVEN_API_KEY"]);
    }

    /// Configured feature names for the health probe.
    pub fn configured_features(&self) -> Vec<&'static str> {
        let mut features = vec!["feed_rss_fallback", "forum", "speech_fallback"];
        if !self.feed.api_key.is_empty() {
            features.push("feed_newswire");
        }
        if !self.llm.api_key.is_empty() {
            features.push("llm");
        }
        if !self.speech.api_key.is_empty() {
            features.push("speech_naturalvoice");
        }
        features
    }
}

fn resolve_key(configured: &str, env_names: &[&str]) -> String {
    if !configured.trim().eq_ignore_ascii_case("env") {
        return configured.to_string();
    }
    for name in env_names {
        if let Ok(v) = env::var(name) {
            if !v.trim().is_empty() {
                return v;
            }
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_documented_bounds() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.limits.max_record_chars, 1500);
        assert_eq!(cfg.limits.max_chunk_chars, 12_000);
        assert_eq!(cfg.limits.max_script_chars, 6000);
        assert_eq!(cfg.server.port, 8080);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let toml = r#"
            [limits]
            max_script_chars = 4000

            [speech]
            voice_id = "test-voice"
        "#;
        let cfg: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.limits.max_script_chars, 4000);
        assert_eq!(cfg.limits.max_record_chars, 1500);
        assert_eq!(cfg.speech.voice_id, "test-voice");
        assert_eq!(cfg.speech.language, "en");
    }

    #[serial_test::serial]
    #[test]
    fn env_indirection_resolves_or_empties() {
        env::remove_var("NEWSWIRE_API_KEY");
        assert_eq!(resolve_key("ENV", &["NEWSWIRE_API_KEY"]), "");

        env::set_var("NEWSWIRE_API_KEY", "k-123");
        assert_eq!(resolve_key("ENV", &["NEWSWIRE_API_KEY"]), "k-123");
        env::remove_var("NEWSWIRE_API_KEY");

        // Literal keys pass through untouched.
        assert_eq!(resolve_key("literal", &["NEWSWIRE_API_KEY"]), "literal");
    }

    #[serial_test::serial]
    #[test]
    fn missing_file_falls_back_to_defaults() {
        env::set_var(ENV_CONFIG_PATH, "/nonexistent/newsreel.toml");
        let cfg = AppConfig::load_default();
        assert_eq!(cfg.server.port, 8080);
        env::remove_var(ENV_CONFIG_PATH);
    }
}
