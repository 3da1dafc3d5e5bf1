//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Remote call:
//!     → timeouts.rs (per-call deadline; elapsed = transient failure)
//!     → On failure: retries.rs (classify, back off, retry or surface)
//!     → backoff.rs (pure delay schedule + optional jitter)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Permanent rejections and malformed payloads are never retried
//! - Backoff computation is a pure function of the attempt number
//! - Retries observe the caller's cancellation token

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use retries::{Retrier, RetryPolicy, Sleeper, TokioSleeper};
