// src/sources/rss.rs
// Minimal RSS 2.0 channel parsing shared by the fallback connectors.

use anyhow::{Context, Result};
use quick_xml::de::from_str;
use serde::Deserialize;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

/// One channel entry, markup left intact for the normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RssEntry {
    pub title: String,
    pub link: Option<String>,
    pub description: String,
    pub published_at: u64,
}

pub fn parse_rfc2822_to_unix(ts: &str) -> u64 {
    OffsetDateTime::parse(ts, &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
        .and_then(|x| u64::try_from(x).ok())
        .unwrap_or(0)
}

pub fn parse_channel(xml: &str) -> Result<Vec<RssEntry>> {
    let rss: Rss = from_str(xml).context("parsing rss xml")?;
    let mut out = Vec::with_capacity(rss.channel.item.len());
    for it in rss.channel.item {
        let title = it.title.unwrap_or_default();
        if title.trim().is_empty() {
            continue;
        }
        out.push(RssEntry {
            title,
            link: it.link,
            description: it.description.unwrap_or_default(),
            published_at: it
                .pub_date
                .as_deref()
                .map(parse_rfc2822_to_unix)
                .unwrap_or(0),
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Search results</title>
    <item>
      <title>Election turnout hits record</title>
      <link>https://example.org/a</link>
      <pubDate>Tue, 05 Aug 2025 09:30:00 GMT</pubDate>
      <description>&lt;b&gt;Turnout&lt;/b&gt; climbed in early voting.</description>
    </item>
    <item>
      <title></title>
      <description>no title, dropped</description>
    </item>
    <item>
      <title>Second story</title>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn parses_items_and_skips_untitled() {
        let entries = parse_channel(FIXTURE).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Election turnout hits record");
        assert_eq!(entries[0].link.as_deref(), Some("https://example.org/a"));
        assert!(entries[0].published_at > 0);
        // Missing fields default rather than fail.
        assert_eq!(entries[1].description, "");
        assert_eq!(entries[1].published_at, 0);
    }

    #[test]
    fn bad_pub_date_maps_to_zero() {
        assert_eq!(parse_rfc2822_to_unix("not a date"), 0);
    }

    #[test]
    fn garbage_xml_is_an_error() {
        assert!(parse_channel("not xml at all").is_err());
    }
}
