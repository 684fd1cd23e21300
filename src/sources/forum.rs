// src/sources/forum.rs
// Discussion-forum connectors: the forum's public JSON search listing as
// primary, its RSS search endpoint as the designated fallback.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::config::{ForumConfig, Limits};
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

// ---------- Primary: forum JSON listing ----------

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
struct Thing {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    title: Option<String>,
    #[serde(default)]
    selftext: String,
    permalink: Option<String>,
    #[serde(default)]
    created_utc: f64,
}

fn listing_to_items(listing: Listing) -> Vec<RawItem> {
    let mut out = Vec::with_capacity(listing.data.children.len());
    for thing in listing.data.children {
        let p = thing.data;
        let title = p.title.unwrap_or_default();
        if title.trim().is_empty() {
            continue;
        }
        out.push(RawItem {
            source: SourceKind::Forum,
            url: p.permalink,
            title,
            body: p.selftext,
            fetched_at: if p.created_utc > 0.0 {
                p.created_utc as u64
            } else {
                0
            },
        });
    }
    out
}

pub struct ForumConnector {
    http: reqwest::Client,
    api_url: String,
    page_size: usize,
}

impl ForumConnector {
    pub fn new(cfg: &ForumConfig, limits: &Limits) -> Self {
        Self {
            http: build_http(limits),
            api_url: cfg.api_url.clone(),
            page_size: limits.page_size,
        }
    }
}

#[async_trait]
impl SourceConnector for ForumConnector {
    async fn fetch(&self, query: &SourceQuery) -> Result<Vec<RawItem>> {
        let limit = query.page_size.min(self.page_size).max(1).to_string();
        let resp = self
            .http
            .get(&self.api_url)
            .query(&[
                ("q", query.joined().as_str()),
                ("limit", limit.as_str()),
                ("sort", "new"),
            ])
            .send()
            .await
            .context("forum request failed")?;
        if !resp.status().is_success() {
            bail!("forum returned {}", resp.status());
        }
        let listing: Listing = resp.json().await.context("forum response body")?;
        Ok(listing_to_items(listing))
    }

    fn name(&self) -> &'static str {
        "forum"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Forum
    }
}

// ---------- Fallback: forum RSS search ----------

pub struct ForumRssConnector {
    http: reqwest::Client,
    rss_url: String,
}

impl ForumRssConnector {
    pub fn new(cfg: &ForumConfig, limits: &Limits) -> Self {
        Self {
            http: build_http(limits),
            rss_url: cfg.rss_url.clone(),
        }
    }
}

#[async_trait]
impl SourceConnector for ForumRssConnector {
    async fn fetch(&self, query: &SourceQuery) -> Result<Vec<RawItem>> {
        let resp = self
            .http
            .get(&self.rss_url)
            .query(&[("q", query.joined().as_str()), ("sort", "new")])
            .send()
            .await
            .context("forum rss request failed")?;
        if !resp.status().is_success() {
            bail!("forum rss returned {}", resp.status());
        }
        let xml = resp.text().await.context("forum rss body")?;
        let entries = rss::parse_channel(&xml)?;
        let out = entries
            .into_iter()
            .take(query.page_size)
            .map(|e| RawItem {
                source: SourceKind::Forum,
                url: e.link,
                title: e.title,
                body: e.description,
                fetched_at: e.published_at,
            })
            .collect();
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "forum_rss"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Forum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_maps_to_raw_items() {
        let listing: Listing = serde_json::from_str(
            r#"{
                "data": {
                    "children": [
                        {
                            "data": {
                                "title": "What did everyone make of the debate?",
                                "selftext": "Thread body text.",
                                "permalink": "/r/politics/comments/abc",
                                "created_utc": 1754385000.0
                            }
                        },
                        { "data": { "title": "", "selftext": "untitled" } }
                    ]
                }
            }"#,
        )
        .unwrap();
        let items = listing_to_items(listing);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].source, SourceKind::Forum);
        assert_eq!(items[0].fetched_at, 1_754_385_000);
        assert_eq!(items[0].body, "Thread body text.");
    }
}
