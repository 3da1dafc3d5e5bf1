//! Wire schema → internal model.
//!
//! Every shape variation the API is known to produce is resolved here, once.
//! Callers past this module only ever see the typed model.

use crate::api::types::{WalletError, WalletResult};
use crate::api::wire::{
    AmountWire, BalanceWire, BroadcastResponseWire, BuildResponseWire, ErrorBodyWire,
    TransactionRecordWire, UtxoListWire, UtxoWire,
};
use crate::transaction::types::{BroadcastResult, BuildResult};
use crate::wallet::types::{Balance, TransactionRecord, Utxo};
use crate::wallet::units::btc_to_sats;

/// Turn a build response into a `BuildResult`.
///
/// A missing or empty `raw_transaction` is a protocol error: the build
/// already happened server-side and asking again cannot repair the payload.
pub fn normalize_build(wire: BuildResponseWire) -> WalletResult<BuildResult> {
    let raw_tx_hex = wire
        .raw_transaction
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| WalletError::Protocol("missing raw transaction".to_string()))?;

    let txid = wire
        .txid
        .filter(|txid| !txid.trim().is_empty())
        .ok_or_else(|| WalletError::Protocol("build response missing txid".to_string()))?;

    Ok(BuildResult { txid, raw_tx_hex })
}

/// Turn a broadcast response into a `BroadcastResult` tied to its build.
///
/// The server's txid wins when present; the build's is used otherwise.
pub fn normalize_broadcast(wire: BroadcastResponseWire, build: &BuildResult) -> BroadcastResult {
    let txid = wire
        .txid
        .filter(|txid| !txid.trim().is_empty())
        .unwrap_or_else(|| build.txid.clone());

    BroadcastResult {
        txid,
        explorer_url: wire.explorer_url.filter(|url| !url.is_empty()),
        build_txid: build.txid.clone(),
        raw_tx_hex: build.raw_tx_hex.clone(),
    }
}

/// Turn the response to a broadcast of caller-supplied hex into a result.
///
/// With no build step to fall back on, the server must report the txid.
pub fn normalize_raw_broadcast(
    wire: BroadcastResponseWire,
    raw_tx_hex: &str,
) -> WalletResult<BroadcastResult> {
    let txid = wire
        .txid
        .filter(|txid| !txid.trim().is_empty())
        .ok_or_else(|| WalletError::Protocol("broadcast response missing txid".to_string()))?;

    Ok(BroadcastResult {
        build_txid: txid.clone(),
        txid,
        explorer_url: wire.explorer_url.filter(|url| !url.is_empty()),
        raw_tx_hex: raw_tx_hex.trim().to_string(),
    })
}

/// Normalize a single UTXO entry.
pub fn normalize_utxo(wire: UtxoWire) -> WalletResult<Utxo> {
    let txid = wire
        .txid
        .or(wire.tx_hash)
        .filter(|txid| !txid.is_empty())
        .ok_or_else(|| WalletError::Protocol("UTXO entry missing txid".to_string()))?;
    let vout = wire
        .vout
        .or(wire.output_index)
        .ok_or_else(|| WalletError::Protocol(format!("UTXO {} missing output index", txid)))?;
    let value_sats = wire
        .value
        .or(wire.amount)
        .ok_or_else(|| WalletError::Protocol(format!("UTXO {}:{} missing value", txid, vout)))?;
    let confirmations = wire.confirmations.unwrap_or(0);

    Ok(Utxo {
        txid,
        vout,
        value_sats,
        address: wire.address,
        confirmations,
        script: wire.script.or(wire.script_pub_key).or(wire.script_pubkey),
        spendable: wire.spendable.unwrap_or(confirmations > 0),
    })
}

/// Normalize a UTXO listing, bare or wrapped.
pub fn normalize_utxo_list(wire: UtxoListWire) -> WalletResult<Vec<Utxo>> {
    let entries = match wire {
        UtxoListWire::List(entries) => entries,
        UtxoListWire::Wrapped { utxos, result } => utxos.or(result).unwrap_or_default(),
    };
    entries.into_iter().map(normalize_utxo).collect()
}

/// Normalize a balance response.
///
/// Object responses are read as `confirmed`, then `balance`, then `result`.
pub fn normalize_balance(wire: BalanceWire) -> WalletResult<Balance> {
    match wire {
        BalanceWire::Sats(confirmed_sats) => Ok(Balance {
            confirmed_sats,
            utxos: None,
        }),
        BalanceWire::Object {
            confirmed,
            balance,
            result,
            utxos,
        } => {
            let confirmed_sats = confirmed.or(balance).or(result).ok_or_else(|| {
                WalletError::Protocol(
                    "balance response has no confirmed, balance or result field".to_string(),
                )
            })?;
            let utxos = match utxos {
                Some(entries) if !entries.is_empty() => Some(
                    entries
                        .into_iter()
                        .map(normalize_utxo)
                        .collect::<WalletResult<Vec<_>>>()?,
                ),
                _ => None,
            };
            Ok(Balance {
                confirmed_sats,
                utxos,
            })
        }
    }
}

/// Signed satoshis of a history amount.
pub fn amount_sats(amount: AmountWire) -> WalletResult<i64> {
    match amount {
        AmountWire::Sats(sats) => Ok(sats),
        AmountWire::Btc(btc) => {
            let sats = btc_to_sats(btc.abs())
                .map_err(|_| WalletError::Protocol(format!("invalid amount {} BTC", btc)))?;
            let sats = i64::try_from(sats)
                .map_err(|_| WalletError::Protocol(format!("invalid amount {} BTC", btc)))?;
            Ok(if btc < 0.0 { -sats } else { sats })
        }
    }
}

/// Normalize one history entry.
pub fn normalize_transaction_record(wire: TransactionRecordWire) -> WalletResult<TransactionRecord> {
    let amount = amount_sats(wire.amount)?;
    let fee = match wire.fee {
        Some(fee) => u64::try_from(amount_sats(fee)?).map_err(|_| {
            WalletError::Protocol(format!("negative fee on transaction {}", wire.txid))
        })?,
        None => 0,
    };

    Ok(TransactionRecord {
        id: wire.id,
        wallet_id: wire.wallet_id,
        txid: wire.txid,
        amount,
        fee,
        kind: wire.kind,
        status: wire.status,
        timestamp: wire.timestamp,
    })
}

/// Normalize a history listing.
pub fn normalize_transaction_records(
    wire: Vec<TransactionRecordWire>,
) -> WalletResult<Vec<TransactionRecord>> {
    wire.into_iter().map(normalize_transaction_record).collect()
}

/// Extract the human-readable text of an error body.
///
/// `detail` wins over `message`; non-string values are rendered as JSON.
pub fn error_text(body: &str) -> Option<String> {
    let parsed: ErrorBodyWire = serde_json::from_str(body).ok()?;
    let value = parsed.detail.or(parsed.message)?;
    match value {
        serde_json::Value::String(text) if !text.is_empty() => Some(text),
        serde_json::Value::String(_) | serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Map a non-success response to a classified error.
pub fn classify_failure(status: u16, body: &str) -> WalletError {
    let message = error_text(body).unwrap_or_else(|| {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            format!("HTTP {}", status)
        } else {
            trimmed.chars().take(200).collect()
        }
    });
    WalletError::from_status(status, message)
}
