//! Submission data model.

use serde::{Deserialize, Serialize};

use crate::api::types::{WalletError, WalletResult};
use crate::api::wire::{BroadcastRequestWire, BuildRequestWire, OutputWire};

/// Shortest raw transaction hex accepted for broadcast.
pub const MIN_RAW_TX_HEX_LEN: usize = 20;

/// A payment to submit. Immutable once handed to the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub source_address: String,
    pub destination_address: String,
    pub amount_sats: u64,
    pub fee_rate_sat_per_byte: f64,
}

impl TransactionRequest {
    pub fn new(
        source_address: impl Into<String>,
        destination_address: impl Into<String>,
        amount_sats: u64,
        fee_rate_sat_per_byte: f64,
    ) -> Self {
        Self {
            source_address: source_address.into(),
            destination_address: destination_address.into(),
            amount_sats,
            fee_rate_sat_per_byte,
        }
    }

    /// Check the request before anything goes on the wire.
    pub fn validate(&self) -> WalletResult<()> {
        if self.source_address.trim().is_empty() {
            return Err(WalletError::Validation("source address is empty".to_string()));
        }
        if self.destination_address.trim().is_empty() {
            return Err(WalletError::Validation("destination address is empty".to_string()));
        }
        if self.amount_sats < 1 {
            return Err(WalletError::Validation(
                "amount must be at least 1 satoshi".to_string(),
            ));
        }
        if !self.fee_rate_sat_per_byte.is_finite() || self.fee_rate_sat_per_byte <= 0.0 {
            return Err(WalletError::Validation(format!(
                "fee rate must be positive, got {}",
                self.fee_rate_sat_per_byte
            )));
        }
        Ok(())
    }

    /// Wire shape of the build call: one output per destination.
    pub fn to_wire(&self) -> BuildRequestWire {
        BuildRequestWire {
            from_address: self.source_address.trim().to_string(),
            outputs: vec![OutputWire {
                address: self.destination_address.trim().to_string(),
                value: self.amount_sats,
            }],
            fee_rate: self.fee_rate_sat_per_byte,
        }
    }
}

/// Output of the build step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildResult {
    pub txid: String,
    pub raw_tx_hex: String,
}

/// Output of the broadcast step, tied to the build that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastResult {
    pub txid: String,
    pub explorer_url: Option<String>,
    /// Txid reported by the build step.
    pub build_txid: String,
    pub raw_tx_hex: String,
}

/// Reject raw hex too short to be a transaction.
pub fn validate_raw_tx_hex(raw_tx_hex: &str) -> WalletResult<()> {
    let hex = raw_tx_hex.trim();
    if hex.len() < MIN_RAW_TX_HEX_LEN {
        return Err(WalletError::Validation(format!(
            "raw transaction hex too short ({} < {} characters)",
            hex.len(),
            MIN_RAW_TX_HEX_LEN
        )));
    }
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(WalletError::Validation(
            "raw transaction is not hex-encoded".to_string(),
        ));
    }
    Ok(())
}

/// Wire shape of the broadcast call, after validation.
pub fn broadcast_wire(raw_tx_hex: &str) -> WalletResult<BroadcastRequestWire> {
    validate_raw_tx_hex(raw_tx_hex)?;
    Ok(BroadcastRequestWire {
        tx_hex: raw_tx_hex.trim().to_string(),
    })
}
