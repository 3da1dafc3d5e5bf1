//! Metrics collection.
//!
//! # Metrics
//! - `wallet_client_attempts_total` (counter): remote call attempts by call
//! - `wallet_client_retries_total` (counter): scheduled retries by call
//! - `wallet_client_call_duration_seconds` (histogram): latency by call and outcome
//! - `wallet_client_submissions_total` (counter): submit outcomes
//!
//! Recording goes through the `metrics` facade. Without an installed
//! recorder every call is a no-op.

use std::time::Duration;

use crate::api::types::WalletError;

/// Record one attempt of a remote call.
pub fn record_attempt(call: &'static str) {
    metrics::counter!("wallet_client_attempts_total", "call" => call).increment(1);
}

/// Record a scheduled retry.
pub fn record_retry(call: &'static str) {
    metrics::counter!("wallet_client_retries_total", "call" => call).increment(1);
}

/// Record how long a single remote call took.
pub fn record_call_duration(call: &'static str, elapsed: Duration, success: bool) {
    let outcome = if success { "ok" } else { "error" };
    metrics::histogram!(
        "wallet_client_call_duration_seconds",
        "call" => call,
        "outcome" => outcome
    )
    .record(elapsed.as_secs_f64());
}

/// Record the final outcome of a submission.
pub fn record_submission(result: Result<(), &WalletError>) {
    metrics::counter!("wallet_client_submissions_total", "outcome" => outcome_label(result))
        .increment(1);
}

fn outcome_label(result: Result<(), &WalletError>) -> &'static str {
    match result {
        Ok(()) => "success",
        Err(WalletError::Validation(_)) => "validation",
        Err(WalletError::Protocol(_)) => "protocol",
        Err(WalletError::Transient { .. }) => "transient",
        Err(WalletError::PermanentRejection { .. }) => "rejected",
        Err(WalletError::NotFound(_)) => "not_found",
        Err(WalletError::Cancelled) => "cancelled",
    }
}
