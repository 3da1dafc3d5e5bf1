//! Wire schema of the wallet API.
//!
//! These types mirror the JSON the server speaks and nothing else. They are
//! turned into the internal model exactly once, in `normalize.rs`.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/tx/build`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildRequestWire {
    pub from_address: String,
    pub outputs: Vec<OutputWire>,
    pub fee_rate: f64,
}

/// One destination/amount pair of a build request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputWire {
    pub address: String,
    /// Amount in satoshis.
    pub value: u64,
}

/// Success body of `POST /api/tx/build`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildResponseWire {
    #[serde(default)]
    pub txid: Option<String>,
    #[serde(default)]
    pub raw_transaction: Option<String>,
}

/// Body of `POST /api/broadcast`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastRequestWire {
    pub tx_hex: String,
}

/// Success body of `POST /api/broadcast`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BroadcastResponseWire {
    #[serde(default)]
    pub txid: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub explorer_url: Option<String>,
}

/// Error body. FastAPI puts a string or a list of issues under `detail`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBodyWire {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<serde_json::Value>,
}

/// A UTXO as any of the API's endpoints may spell it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UtxoWire {
    #[serde(default)]
    pub txid: Option<String>,
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub vout: Option<u32>,
    #[serde(default)]
    pub output_index: Option<u32>,
    #[serde(default)]
    pub value: Option<u64>,
    #[serde(default)]
    pub amount: Option<u64>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub confirmations: Option<u64>,
    #[serde(default)]
    pub script: Option<String>,
    #[serde(default, rename = "scriptPubKey")]
    pub script_pub_key: Option<String>,
    #[serde(default)]
    pub script_pubkey: Option<String>,
    #[serde(default)]
    pub spendable: Option<bool>,
}

/// A history amount: integers are satoshis, decimals are BTC.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AmountWire {
    Sats(i64),
    Btc(f64),
}

/// One entry of `GET /api/wallets/{address}/transactions`.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionRecordWire {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub wallet_id: Option<i64>,
    pub txid: String,
    pub amount: AmountWire,
    #[serde(default)]
    pub fee: Option<AmountWire>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub status: String,
    pub timestamp: String,
}

/// `GET /api/wallets/{address}/utxos` returns either a bare list or a wrapper.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UtxoListWire {
    List(Vec<UtxoWire>),
    Wrapped {
        #[serde(default)]
        utxos: Option<Vec<UtxoWire>>,
        #[serde(default)]
        result: Option<Vec<UtxoWire>>,
    },
}

/// `GET /api/balance/{address}` returns either a bare number or an object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BalanceWire {
    Sats(u64),
    Object {
        #[serde(default)]
        confirmed: Option<u64>,
        #[serde(default)]
        balance: Option<u64>,
        #[serde(default)]
        result: Option<u64>,
        #[serde(default)]
        utxos: Option<Vec<UtxoWire>>,
    },
}

/// Body of `POST /api/validate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidateRequestWire {
    pub tx_hex: String,
    pub network: String,
}

/// Body of `POST /api/keys/export-file`.
#[derive(Clone, PartialEq, Serialize)]
pub struct KeyExportRequestWire {
    pub private_key: String,
    pub public_key: String,
    pub address: String,
    pub network: String,
    pub file_format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Answer to `POST /api/keys/export-file`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KeyExportResponseWire {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
