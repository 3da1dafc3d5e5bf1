//! Wallet-side view model: wallets, UTXOs, history records, fee estimates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bitcoin network a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Testnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            other => Err(format!("unknown network '{}'", other)),
        }
    }
}

/// A wallet record as stored by the API.
///
/// Key material is never printed by `Debug`.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Wallet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_type: Option<String>,
    /// `entropy`, `bip39` or `bip32`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_generation_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derivation_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mnemonic: Option<String>,
    #[serde(default)]
    pub network: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Wallet {
    /// Name to show for the wallet, falling back to a shortened address.
    pub fn display_name(&self) -> String {
        if !self.name.trim().is_empty() {
            return self.name.clone();
        }
        let short: String = self.address.chars().take(8).collect();
        format!("Wallet {}", short)
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("address", &self.address)
            .field("network", &self.network)
            .field("has_private_key", &self.private_key.is_some())
            .field("has_mnemonic", &self.mnemonic.is_some())
            .finish()
    }
}

/// A spendable output, normalized from whatever shape the API returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub txid: String,
    pub vout: u32,
    /// Value in satoshis.
    pub value_sats: u64,
    pub address: Option<String>,
    pub confirmations: u64,
    pub script: Option<String>,
    pub spendable: bool,
}

/// Confirmed balance of an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    pub confirmed_sats: u64,
    /// UTXOs embedded in the balance response, when the server sent them.
    pub utxos: Option<Vec<Utxo>>,
}

/// One entry of a wallet's transaction history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub wallet_id: Option<i64>,
    pub txid: String,
    /// Signed amount in satoshis (negative for spends).
    pub amount: i64,
    #[serde(default)]
    pub fee: u64,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub status: String,
    pub timestamp: String,
}

/// Confirmation target for fee estimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeePriority {
    High,
    Medium,
    Low,
}

impl FromStr for FeePriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(FeePriority::High),
            "medium" => Ok(FeePriority::Medium),
            "low" => Ok(FeePriority::Low),
            other => Err(format!("unknown fee priority '{}'", other)),
        }
    }
}

/// Fee rates suggested by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeEstimate {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default = "default_fee_unit")]
    pub unit: String,
}

fn default_fee_unit() -> String {
    "sat/vB".to_string()
}

impl FeeEstimate {
    /// Rate for the given priority.
    pub fn rate(&self, priority: FeePriority) -> f64 {
        match priority {
            FeePriority::High => self.high,
            FeePriority::Medium => self.medium,
            FeePriority::Low => self.low,
        }
    }
}

/// Server-side validation verdict for a raw transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    #[serde(default)]
    pub details: serde_json::Value,
    #[serde(default)]
    pub issues: Option<Vec<String>>,
}

impl ValidationReport {
    /// Issues joined for display.
    pub fn issues_summary(&self) -> String {
        match &self.issues {
            Some(issues) if !issues.is_empty() => issues.join(", "),
            _ => "unknown validation problem".to_string(),
        }
    }
}

/// On-chain status of a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxStatus {
    pub txid: String,
    /// `confirmed`, `pending` or `not_found`.
    pub status: String,
    #[serde(default)]
    pub confirmations: Option<u64>,
    #[serde(default)]
    pub block_height: Option<u64>,
    #[serde(default)]
    pub block_hash: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub explorer_url: Option<String>,
}
