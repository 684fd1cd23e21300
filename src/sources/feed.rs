// src/sources/feed.rs
// Structured-feed connectors: a hosted newswire JSON API as primary, with a
// public headline RSS search as the designated fallback.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::config::{FeedConfig, Limits};
use crate::request::{SourceKind, SourceQuery};
use crate::sources::rss;
use crate::sources::{RawItem, SourceConnector};

fn build_http(limits: &Limits) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent("newsreel/0.1 (+news-to-audio briefing service)")
        .connect_timeout(Duration::from_secs(limits.connect_timeout_secs))
        .timeout(Duration::from_secs(limits.request_timeout_secs))
        .build()
        .expect("reqwest client")
}

// ---------- Primary: newswire JSON API ----------

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    articles: Vec<WireArticle>,
}

#[derive(Debug, Deserialize)]
struct WireArticle {
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    url: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
}

fn parse_rfc3339_to_unix(ts: &str) -> u64 {
    chrono::DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|dt| dt.timestamp())
        .and_then(|x| u64::try_from(x).ok())
        .unwrap_or(0)
}

fn wire_to_items(resp: WireResponse) -> Vec<RawItem> {
    let mut out = Vec::with_capacity(resp.articles.len());
    for a in resp.articles {
        let title = a.title.unwrap_or_default();
        if title.trim().is_empty() {
            continue;
        }
        let mut body = a.description.unwrap_or_default();
        if let Some(content) = a.content {
            if !content.trim().is_empty() {
                if !body.is_empty() {
                    body.push(' ');
                }
                body.push_str(&content);
            }
        }
        out.push(RawItem {
            source: SourceKind::Feed,
            url: a.url,
            title,
            body,
            fetched_at: a
                .published_at
                .as_deref()
                .map(parse_rfc3339_to_unix)
                .unwrap_or(0),
        });
    }
    out
}

pub struct NewswireConnector {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    page_size: usize,
}

impl NewswireConnector {
    pub fn new(cfg: &FeedConfig, limits: &Limits) -> Self {
        Self {
            http: build_http(limits),
            api_url: cfg.api_url.clone(),
            api_key: cfg.api_key.clone(),
            page_size: limits.page_size,
        }
    }
}

#[async_trait]
impl SourceConnector for NewswireConnector {
    async fn fetch(&self, query: &SourceQuery) -> Result<Vec<RawItem>> {
        if self.api_key.is_empty() {
            bail!("newswire api key not configured");
        }
        let page_size = query.page_size.min(self.page_size).max(1).to_string();
        let resp = self
            .http
            .get(&self.api_url)
            .header("X-Api-Key", &self.api_key)
            .query(&[
                ("q", query.joined().as_str()),
                ("pageSize", page_size.as_str()),
                ("language", "en"),
                ("sortBy", "publishedAt"),
            ])
            .send()
            .await
            .context("newswire request failed")?;
        if !resp.status().is_success() {
            bail!("newswire returned {}", resp.status());
        }
        let body: WireResponse = resp.json().await.context("newswire response body")?;
        Ok(wire_to_items(body))
    }

    fn name(&self) -> &'static str {
        "newswire"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Feed
    }
}

// ---------- Fallback: headline RSS search ----------

pub struct FeedRssConnector {
    http: reqwest::Client,
    rss_url: String,
}

impl FeedRssConnector {
    pub fn new(cfg: &FeedConfig, limits: &Limits) -> Self {
        Self {
            http: build_http(limits),
            rss_url: cfg.rss_url.clone(),
        }
    }
}

#[async_trait]
impl SourceConnector for FeedRssConnector {
    async fn fetch(&self, query: &SourceQuery) -> Result<Vec<RawItem>> {
        let resp = self
            .http
            .get(&self.rss_url)
            .query(&[("q", query.joined().as_str())])
            .send()
            .await
            .context("feed rss request failed")?;
        if !resp.status().is_success() {
            bail!("feed rss returned {}", resp.status());
        }
        let xml = resp.text().await.context("feed rss body")?;
        let entries = rss::parse_channel(&xml)?;
        let out = entries
            .into_iter()
            .take(query.page_size)
            .map(|e| RawItem {
                source: SourceKind::Feed,
                url: e.link,
                title: e.title,
                body: e.description,
                fetched_at: e.published_at,
            })
            .collect();
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "feed_rss"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Feed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_articles_map_to_raw_items() {
        let resp: WireResponse = serde_json::from_str(
            r#"{
                "status": "ok",
                "articles": [
                    {
                        "title": "Rates hold steady",
                        "description": "The bank held rates.",
                        "content": "Full text here.",
                        "url": "https://example.org/rates",
                        "publishedAt": "2025-08-05T09:30:00Z"
                    },
                    { "title": "", "description": "untitled is dropped" },
                    { "title": "No body at all" }
                ]
            }"#,
        )
        .unwrap();
        let items = wire_to_items(resp);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Rates hold steady");
        assert_eq!(items[0].body, "The bank held rates. Full text here.");
        assert!(items[0].fetched_at > 0);
        assert_eq!(items[1].body, "");
    }

    #[test]
    fn bad_timestamp_maps_to_zero() {
        assert_eq!(parse_rfc3339_to_unix("yesterday"), 0);
    }
}
