//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Caller (CLI / embedding app)
//!     → shutdown.rs (CancelToken handed to every submission)
//!     → signals.rs (Ctrl-C trips the token)
//!     → resilience::retries (checks token before attempts and sleeps)
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::CancelToken;
