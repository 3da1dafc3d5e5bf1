//! Build → validate → broadcast pipeline.
//!
//! # Responsibilities
//! - Validate the request before any network call
//! - Run build and broadcast strictly in sequence, each under its own
//!   retry schedule and per-attempt deadline
//! - Refuse to broadcast hex that cannot be a transaction
//! - Tie the broadcast result back to the build that produced it

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;
use uuid::Uuid;

use crate::api::client::TransactionGateway;
use crate::api::normalize::{normalize_broadcast, normalize_build, normalize_raw_broadcast};
use crate::api::types::WalletResult;
use crate::api::wire::{BroadcastRequestWire, BroadcastResponseWire};
use crate::config::schema::ClientConfig;
use crate::lifecycle::CancelToken;
use crate::observability::metrics;
use crate::resilience::timeouts::with_timeout;
use crate::resilience::{Retrier, RetryPolicy};
use crate::transaction::types::{broadcast_wire, BroadcastResult, TransactionRequest};

/// Submits transactions through a `TransactionGateway`.
///
/// Holds no mutable state; clones share the gateway and can submit
/// concurrently.
pub struct Orchestrator<G> {
    gateway: Arc<G>,
    build: Retrier,
    broadcast: Retrier,
    build_timeout: Duration,
    broadcast_timeout: Duration,
}

impl<G> Clone for Orchestrator<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            build: self.build.clone(),
            broadcast: self.broadcast.clone(),
            build_timeout: self.build_timeout,
            broadcast_timeout: self.broadcast_timeout,
        }
    }
}

impl<G: TransactionGateway> Orchestrator<G> {
    /// Create an orchestrator with the build/broadcast schedules of `config`.
    pub fn new(gateway: Arc<G>, config: &ClientConfig) -> Self {
        Self::with_retriers(
            gateway,
            Retrier::new(RetryPolicy::from(&config.build.retry)),
            Retrier::new(RetryPolicy::from(&config.broadcast.retry)),
            config.build.timeout(),
            config.broadcast.timeout(),
        )
    }

    pub fn with_retriers(
        gateway: Arc<G>,
        build: Retrier,
        broadcast: Retrier,
        build_timeout: Duration,
        broadcast_timeout: Duration,
    ) -> Self {
        Self {
            gateway,
            build,
            broadcast,
            build_timeout,
            broadcast_timeout,
        }
    }

    /// Build and broadcast `request`.
    pub async fn submit(&self, request: &TransactionRequest) -> WalletResult<BroadcastResult> {
        self.submit_with_cancel(request, &CancelToken::new()).await
    }

    /// Build and broadcast `request`, giving up with `Cancelled` once
    /// `cancel` is tripped.
    pub async fn submit_with_cancel(
        &self,
        request: &TransactionRequest,
        cancel: &CancelToken,
    ) -> WalletResult<BroadcastResult> {
        let submission_id = Uuid::new_v4();
        let span = tracing::info_span!("submit", %submission_id);
        let started = Instant::now();

        let result = self.run_submission(request, cancel).instrument(span.clone()).await;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        span.in_scope(|| match &result {
            Ok(done) => tracing::info!(txid = %done.txid, elapsed_ms, "Submission complete"),
            Err(e) => tracing::warn!(error = %e, elapsed_ms, "Submission failed"),
        });
        metrics::record_submission(result.as_ref().map(|_| ()));
        result
    }

    /// Broadcast caller-supplied raw hex without a build step.
    pub async fn broadcast_raw(
        &self,
        raw_tx_hex: &str,
        cancel: &CancelToken,
    ) -> WalletResult<BroadcastResult> {
        let wire = broadcast_wire(raw_tx_hex)?;
        let response = self.broadcast_step(&wire, cancel).await?;
        normalize_raw_broadcast(response, raw_tx_hex)
    }

    async fn run_submission(
        &self,
        request: &TransactionRequest,
        cancel: &CancelToken,
    ) -> WalletResult<BroadcastResult> {
        request.validate()?;
        tracing::info!(
            amount_sats = request.amount_sats,
            fee_rate = request.fee_rate_sat_per_byte,
            "Submitting transaction"
        );

        let build_request = request.to_wire();
        let timeout = self.build_timeout;
        let built = self
            .build
            .run("build", cancel, |_| {
                with_timeout("build", timeout, self.gateway.build(&build_request))
            })
            .await?;
        let build = normalize_build(built)?;
        tracing::info!(
            build_txid = %build.txid,
            raw_len = build.raw_tx_hex.len(),
            "Transaction built"
        );
        tracing::debug!(raw_tx_hex = %build.raw_tx_hex, "Built raw transaction");

        let wire = broadcast_wire(&build.raw_tx_hex)?;
        let response = self.broadcast_step(&wire, cancel).await?;
        Ok(normalize_broadcast(response, &build))
    }

    async fn broadcast_step(
        &self,
        wire: &BroadcastRequestWire,
        cancel: &CancelToken,
    ) -> WalletResult<BroadcastResponseWire> {
        let timeout = self.broadcast_timeout;
        self.broadcast
            .run("broadcast", cancel, |_| {
                with_timeout("broadcast", timeout, self.gateway.broadcast(wire))
            })
            .await
    }
}

impl<G> std::fmt::Debug for Orchestrator<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("build", &self.build)
            .field("broadcast", &self.broadcast)
            .field("build_timeout", &self.build_timeout)
            .field("broadcast_timeout", &self.broadcast_timeout)
            .finish()
    }
}
