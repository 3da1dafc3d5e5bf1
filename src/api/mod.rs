//! Wallet API boundary.
//!
//! # Data Flow
//! ```text
//! caller
//!     → client.rs (reqwest, one attempt per call, deadlines)
//!     → wire.rs (exact JSON shapes the server speaks)
//!     → normalize.rs (shape variants resolved, failures classified)
//!     → typed model (transaction::types, wallet::types)
//! ```
//!
//! # Design Decisions
//! - Nothing outside this module sees a wire type
//! - HTTP statuses are classified exactly once, in `normalize::classify_failure`

pub mod client;
pub mod normalize;
pub mod types;
pub mod wire;

pub use client::{HttpWalletApi, TransactionGateway};
pub use types::{WalletError, WalletResult};
