//! Transaction submission subsystem.
//!
//! # Data Flow
//! ```text
//! TransactionRequest
//!     → validate (local, no network)
//!     → build    (retried, deadline per attempt)
//!     → normalize + hex length check
//!     → broadcast (retried, 400 surfaced immediately)
//!     → BroadcastResult { txid, explorer_url, build_txid, raw_tx_hex }
//! ```

pub mod orchestrator;
pub mod types;

pub use orchestrator::Orchestrator;
pub use types::{BroadcastResult, BuildResult, TransactionRequest};
