//! Transaction history filtering.

use chrono::{DateTime, NaiveDate};

use crate::wallet::types::TransactionRecord;

/// Calendar date of a history record.
///
/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates.
pub fn record_date(record: &TransactionRecord) -> Option<NaiveDate> {
    let ts = record.timestamp.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(ts.get(..10).unwrap_or(ts), "%Y-%m-%d").ok()
}

/// Records dated within `from..=to`. Either bound may be open.
///
/// Records whose timestamp cannot be read are left out of bounded queries.
pub fn filter_by_date<'a>(
    records: &'a [TransactionRecord],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<&'a TransactionRecord> {
    if from.is_none() && to.is_none() {
        return records.iter().collect();
    }
    records
        .iter()
        .filter(|record| match record_date(record) {
            Some(date) => from.map_or(true, |f| date >= f) && to.map_or(true, |t| date <= t),
            None => {
                tracing::debug!(txid = %record.txid, timestamp = %record.timestamp, "Unreadable history timestamp");
                false
            }
        })
        .collect()
}
