//! UTXO aggregation and search.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::wallet::types::Utxo;

/// Sum of UTXO values in satoshis.
pub fn total_sats(utxos: &[Utxo]) -> u64 {
    utxos.iter().map(|u| u.value_sats).sum()
}

/// Sum of the spendable UTXOs only.
pub fn spendable_sats(utxos: &[Utxo]) -> u64 {
    utxos.iter().filter(|u| u.spendable).map(|u| u.value_sats).sum()
}

/// UTXOs with any field containing `term`.
///
/// Case-insensitive, and accents on Latin letters are ignored. An empty or
/// blank term matches everything.
pub fn search<'a>(utxos: &'a [Utxo], term: &str) -> Vec<&'a Utxo> {
    let needle = fold(term.trim());
    if needle.is_empty() {
        return utxos.iter().collect();
    }
    utxos
        .iter()
        .filter(|utxo| searchable_fields(utxo).any(|field| fold(&field).contains(&needle)))
        .collect()
}

fn searchable_fields(utxo: &Utxo) -> impl Iterator<Item = String> + '_ {
    [
        Some(utxo.txid.clone()),
        Some(utxo.vout.to_string()),
        Some(utxo.value_sats.to_string()),
        Some(utxo.confirmations.to_string()),
        utxo.address.clone(),
        utxo.script.clone(),
    ]
    .into_iter()
    .flatten()
}

/// Lowercase and drop combining marks after canonical decomposition.
///
/// Letters with no decomposition (`ł`, `ø`, `đ`) keep their own form.
fn fold(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utxo(txid: &str, vout: u32, value: u64, confirmations: u64, address: Option<&str>) -> Utxo {
        Utxo {
            txid: txid.to_string(),
            vout,
            value_sats: value,
            address: address.map(String::from),
            confirmations,
            script: None,
            spendable: confirmations > 0,
        }
    }

    fn sample() -> Vec<Utxo> {
        vec![
            utxo("7a1ae0dc85ea", 0, 50_000, 6, Some("mrS9zLDazNbgc5YDrLWuEhyPwbsKC8VHA2")),
            utxo("8b9ae0dc85eb", 1, 100_000, 0, Some("tb1qw508d6qejxtdg4y5r3zarvary0c5xw7k")),
        ]
    }

    #[test]
    fn test_totals() {
        let utxos = sample();
        assert_eq!(total_sats(&utxos), 150_000);
        assert_eq!(spendable_sats(&utxos), 50_000);
        assert_eq!(total_sats(&[]), 0);
    }

    #[test]
    fn test_search_matches_any_field() {
        let utxos = sample();
        assert_eq!(search(&utxos, "").len(), 2);
        assert_eq!(search(&utxos, "  ").len(), 2);
        assert_eq!(search(&utxos, "7A1AE")[0].vout, 0);
        assert_eq!(search(&utxos, "100000")[0].txid, "8b9ae0dc85eb");
        assert_eq!(search(&utxos, "tb1q").len(), 1);
        assert!(search(&utxos, "nothing-here").is_empty());
    }

    #[test]
    fn test_fold_strips_accents() {
        assert_eq!(fold("Transação"), "transacao");
        assert_eq!(fold("ÉCLAIR"), "eclair");
    }

    #[test]
    fn test_fold_beyond_western_latin() {
        assert_eq!(fold("Škoda Ýmir"), "skoda ymir");
        assert_eq!(fold("Łódź"), "łodz");
        assert_eq!(fold("Ελλάδα"), "ελλαδα");
        // Precomposed and decomposed spellings fold alike.
        assert_eq!(fold("Cafe\u{301}"), fold("Café"));
    }

    #[test]
    fn test_search_ignores_extended_accents() {
        let utxos = vec![utxo("a1", 0, 1000, 3, Some("Šárka"))];
        assert_eq!(search(&utxos, "sarka").len(), 1);
        assert_eq!(search(&utxos, "ŠÁRKA").len(), 1);
    }
}
