//! Bitcoin wallet API client library.

pub mod api;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod transaction;
pub mod wallet;

pub use api::{HttpWalletApi, TransactionGateway, WalletError, WalletResult};
pub use config::schema::ClientConfig;
pub use lifecycle::CancelToken;
pub use transaction::{BroadcastResult, BuildResult, Orchestrator, TransactionRequest};
