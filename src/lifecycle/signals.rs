//! OS signal handling.
//!
//! Ctrl-C trips the cancellation token so in-flight retries stop at their
//! next checkpoint instead of the process dying mid-request.

use crate::lifecycle::shutdown::CancelToken;

/// Spawn a task that cancels `token` on the first Ctrl-C.
pub fn cancel_on_ctrl_c(token: CancelToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Interrupt received, abandoning in-flight operations");
                token.cancel();
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl-C"),
        }
    })
}
