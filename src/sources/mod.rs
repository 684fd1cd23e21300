// src/sources/mod.rs
pub mod feed;
pub mod forum;
mod rss;

use anyhow::{anyhow, Result};
use futures::future::join_all;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;

use crate::request::{SourceKind, SourceQuery};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("source_items_total", "Raw items returned by connectors.");
        describe_counter!(
            "source_connector_errors_total",
            "Connector fetch/parse errors (before failover)."
        );
        describe_counter!(
            "source_failover_total",
            "Times a fallback connector was invoked after a primary error."
        );
    });
}

/// Raw item as fetched from one external provider. Body may still carry
/// markup; the normalizer owns cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItem {
    pub source: SourceKind,
    pub url: Option<String>,
    pub title: String,
    pub body: String,
    pub fetched_at: u64,
}

#[async_trait::async_trait]
pub trait SourceConnector: Send + Sync {
    /// Fetch raw items for the query. An empty Vec is success, not an error.
    async fn fetch(&self, query: &SourceQuery) -> Result<Vec<RawItem>>;
    fn name(&self) -> &'static str;
    fn kind(&self) -> SourceKind;
}

/// Ordered failover chain for one source kind: connectors are tried in
/// sequence until one returns Ok. An Ok with zero items stops the chain —
/// emptiness alone never triggers the fallback.
pub struct ConnectorChain {
    kind: SourceKind,
    connectors: Vec<Box<dyn SourceConnector>>,
}

impl ConnectorChain {
    pub fn new(kind: SourceKind, connectors: Vec<Box<dyn SourceConnector>>) -> Self {
        Self { kind, connectors }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub async fn fetch(&self, query: &SourceQuery) -> Result<Vec<RawItem>> {
        ensure_metrics_described();

        let mut last_err: Option<anyhow::Error> = None;
        for (i, c) in self.connectors.iter().enumerate() {
            match c.fetch(query).await {
                Ok(items) => {
                    counter!("source_items_total").increment(items.len() as u64);
                    if i > 0 {
                        counter!("source_failover_total").increment(1);
                        tracing::info!(
                            kind = %self.kind,
                            connector = c.name(),
                            items = items.len(),
                            "fallback connector served the fetch"
                        );
                    }
                    return Ok(items);
                }
                Err(e) => {
                    counter!("source_connector_errors_total").increment(1);
                    tracing::warn!(
                        kind = %self.kind,
                        connector = c.name(),
                        error = ?e,
                        "connector error, trying next"
                    );
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| anyhow!("no connectors configured for {}", self.kind)))
    }
}

/// Fan out one query to every selected chain concurrently and join. Each
/// chain's failover runs inside its own branch.
pub async fn fetch_all(
    chains: &[&ConnectorChain],
    query: &SourceQuery,
) -> Vec<(SourceKind, Result<Vec<RawItem>>)> {
    let futs = chains.iter().map(|c| async move {
        let res = c.fetch(query).await;
        (c.kind(), res)
    });
    join_all(futs).await
}

// --- Test helpers ---

/// Scripted connector for failover and orchestration tests. The call counter
/// stays observable after the connector is boxed into a chain.
pub struct StaticConnector {
    pub kind: SourceKind,
    pub name: &'static str,
    pub items: Vec<RawItem>,
    pub fail: bool,
    pub calls: std::sync::Arc<std::sync::atomic::AtomicUsize>,
}

impl StaticConnector {
    pub fn ok(kind: SourceKind, name: &'static str, items: Vec<RawItem>) -> Self {
        Self {
            kind,
            name,
            items,
            fail: false,
            calls: std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0)),
        }
    }

    pub fn failing(kind: SourceKind, name: &'static str) -> Self {
        Self {
            kind,
            name,
            items: vec![],
            fail: true,
            calls: std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0)),
        }
    }

    pub fn call_handle(&self) -> std::sync::Arc<std::sync::atomic::AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait::async_trait]
impl SourceConnector for StaticConnector {
    async fn fetch(&self, _query: &SourceQuery) -> Result<Vec<RawItem>> {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("{} provider unavailable", self.name);
        }
        Ok(self.items.clone())
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn kind(&self) -> SourceKind {
        self.kind
    }
}
