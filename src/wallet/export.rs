//! CSV / JSON export of already-fetched wallet data.

use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use crate::wallet::types::{TransactionRecord, Utxo};
use crate::wallet::units::{format_btc, format_btc_signed};

/// Output format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unsupported export format '{}'", other)),
        }
    }
}

/// Errors that can occur while exporting.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Flat CSV row for a UTXO.
#[derive(Debug, Serialize)]
struct UtxoRow<'a> {
    txid: &'a str,
    vout: u32,
    value_sats: u64,
    value_btc: String,
    address: &'a str,
    confirmations: u64,
    spendable: bool,
}

impl<'a> From<&'a Utxo> for UtxoRow<'a> {
    fn from(utxo: &'a Utxo) -> Self {
        Self {
            txid: &utxo.txid,
            vout: utxo.vout,
            value_sats: utxo.value_sats,
            value_btc: format_btc(utxo.value_sats),
            address: utxo.address.as_deref().unwrap_or(""),
            confirmations: utxo.confirmations,
            spendable: utxo.spendable,
        }
    }
}

/// Flat CSV row for a history record.
#[derive(Debug, Serialize)]
struct HistoryRow<'a> {
    timestamp: &'a str,
    txid: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    status: &'a str,
    amount_sats: i64,
    amount_btc: String,
    fee_sats: u64,
}

impl<'a> From<&'a TransactionRecord> for HistoryRow<'a> {
    fn from(record: &'a TransactionRecord) -> Self {
        Self {
            timestamp: &record.timestamp,
            txid: &record.txid,
            kind: &record.kind,
            status: &record.status,
            amount_sats: record.amount,
            amount_btc: format_btc_signed(record.amount),
            fee_sats: record.fee,
        }
    }
}

/// Write UTXOs to `out`.
pub fn export_utxos<W: Write>(utxos: &[Utxo], format: ExportFormat, out: W) -> Result<(), ExportError> {
    match format {
        ExportFormat::Csv => write_csv(utxos.iter().map(UtxoRow::from), out),
        ExportFormat::Json => write_json(utxos, out),
    }
}

/// Write history records to `out`.
pub fn export_history<W: Write>(
    records: &[&TransactionRecord],
    format: ExportFormat,
    out: W,
) -> Result<(), ExportError> {
    match format {
        ExportFormat::Csv => write_csv(records.iter().map(|r| HistoryRow::from(*r)), out),
        ExportFormat::Json => write_json(records, out),
    }
}

/// Create `path` and hand a buffered writer to `write`.
pub fn export_to_file<F>(path: &Path, write: F) -> Result<(), ExportError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), ExportError>,
{
    let mut out = BufWriter::new(File::create(path)?);
    write(&mut out)?;
    out.flush()?;
    tracing::info!(path = %path.display(), "Export written");
    Ok(())
}

fn write_csv<R, I, W>(rows: I, out: W) -> Result<(), ExportError>
where
    R: Serialize,
    I: Iterator<Item = R>,
    W: Write,
{
    let mut writer = csv::Writer::from_writer(out);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_json<T: Serialize + ?Sized, W: Write>(value: &T, mut out: W) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut out, value)?;
    out.write_all(b"\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utxos() -> Vec<Utxo> {
        vec![Utxo {
            txid: "7a1ae0dc".to_string(),
            vout: 0,
            value_sats: 50_000,
            address: Some("mrS9zLDa".to_string()),
            confirmations: 6,
            script: None,
            spendable: true,
        }]
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>(), Ok(ExportFormat::Csv));
        assert_eq!("json".parse::<ExportFormat>(), Ok(ExportFormat::Json));
        assert!("excel".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_utxo_csv() {
        let mut out = Vec::new();
        export_utxos(&utxos(), ExportFormat::Csv, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("txid,vout,value_sats,value_btc,address,confirmations,spendable")
        );
        assert_eq!(lines.next(), Some("7a1ae0dc,0,50000,0.00050000,mrS9zLDa,6,true"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_utxo_json() {
        let mut out = Vec::new();
        export_utxos(&utxos(), ExportFormat::Json, &mut out).unwrap();
        let parsed: Vec<Utxo> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed, utxos());
    }

    #[test]
    fn test_history_csv_escapes_and_signs() {
        let record = TransactionRecord {
            id: Some(1),
            wallet_id: Some(2),
            txid: "abc".to_string(),
            amount: -10_000,
            fee: 250,
            kind: "send".to_string(),
            status: "pending, unconfirmed".to_string(),
            timestamp: "2024-03-10".to_string(),
        };
        let mut out = Vec::new();
        export_history(&[&record], ExportFormat::Csv, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("timestamp,txid,type,status,amount_sats,amount_btc,fee_sats\n"));
        assert!(text.contains("2024-03-10,abc,send,\"pending, unconfirmed\",-10000,-0.00010000,250"));
    }

    #[test]
    fn test_export_to_file() {
        let path = std::env::temp_dir().join(format!("utxos-{}.json", uuid::Uuid::new_v4()));
        export_to_file(&path, |out| export_utxos(&utxos(), ExportFormat::Json, out)).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"value_sats\": 50000"));
        std::fs::remove_file(&path).unwrap();
    }
}
