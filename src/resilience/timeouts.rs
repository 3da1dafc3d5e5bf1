//! Timeout enforcement.
//!
//! Every remote call runs under a deadline. An elapsed deadline is a
//! transient failure with no status, so the retry layer treats it like a
//! dropped connection.

use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

use crate::api::types::{WalletError, WalletResult};

/// Run `fut` with a deadline of `limit`.
pub async fn with_timeout<T, Fut>(call: &'static str, limit: Duration, fut: Fut) -> WalletResult<T>
where
    Fut: Future<Output = WalletResult<T>>,
{
    match timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(call, timeout_ms = limit.as_millis() as u64, "Call timed out");
            Err(WalletError::Transient {
                status: None,
                message: format!("{} timed out after {:?}", call, limit),
            })
        }
    }
}
