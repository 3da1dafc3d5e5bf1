//! Wallet view-model subsystem.
//!
//! # Data Flow
//! ```text
//! api::client (fetch, already normalized)
//!     → types.rs (Wallet, Utxo, Balance, TransactionRecord, ...)
//!     → utxos.rs / history.rs (totals, search, date filters)
//!     → units.rs (satoshi ↔ BTC for display)
//!     → keys.rs (key generation requests, into a Wallet record)
//!     → export.rs (CSV / JSON files)
//! ```
//!
//! # Security Constraints
//! - Private keys and mnemonics are never printed by `Debug`
//! - Nothing here touches the network or persists wallet state

pub mod export;
pub mod history;
pub mod keys;
pub mod types;
pub mod units;
pub mod utxos;

pub use export::{ExportError, ExportFormat};
pub use keys::{GeneratedKeys, KeyFormat, KeyMethod, KeyRequest};
pub use types::{Balance, FeeEstimate, FeePriority, Network, TransactionRecord, TxStatus, Utxo, ValidationReport, Wallet};
