//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! resilience / transaction / api produce:
//!     → logging.rs (structured events, one span per submission)
//!     → metrics.rs (attempt, retry, duration and outcome series)
//! ```
//!
//! # Design Decisions
//! - Submission spans carry a UUID v4 `submission_id`
//! - Metrics go through the `metrics` facade; the embedder picks the recorder

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
