// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregate;
pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod normalize;
pub mod orchestrator;
pub mod request;
pub mod sources;
pub mod speech;
pub mod summarize;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::error::BriefingError;
pub use crate::orchestrator::{BriefingOutcome, Orchestrator};
pub use crate::request::{BriefingRequest, SourceKind};
