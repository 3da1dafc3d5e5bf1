//! Satoshi ↔ BTC conversion.

use crate::api::types::{WalletError, WalletResult};

/// Satoshis in one bitcoin.
pub const SATS_PER_BTC: u64 = 100_000_000;

/// Largest amount that can exist (21M BTC).
pub const MAX_SUPPLY_SATS: u64 = 21_000_000 * SATS_PER_BTC;

pub fn sats_to_btc(sats: u64) -> f64 {
    sats as f64 / SATS_PER_BTC as f64
}

/// Convert a BTC amount to satoshis, rounding to the nearest satoshi.
pub fn btc_to_sats(btc: f64) -> WalletResult<u64> {
    if !btc.is_finite() || btc < 0.0 {
        return Err(WalletError::Validation(format!("invalid BTC amount {}", btc)));
    }
    let sats = (btc * SATS_PER_BTC as f64).round();
    if sats > MAX_SUPPLY_SATS as f64 {
        return Err(WalletError::Validation(format!(
            "{} BTC exceeds the total supply",
            btc
        )));
    }
    Ok(sats as u64)
}

/// Render satoshis as BTC with all 8 decimals, e.g. `0.00150000`.
///
/// Integer arithmetic, so no float rounding artefacts.
pub fn format_btc(sats: u64) -> String {
    format!("{}.{:08}", sats / SATS_PER_BTC, sats % SATS_PER_BTC)
}

/// Signed variant of [`format_btc`] for history amounts.
pub fn format_btc_signed(sats: i64) -> String {
    let formatted = format_btc(sats.unsigned_abs());
    if sats < 0 {
        format!("-{}", formatted)
    } else {
        formatted
    }
}
