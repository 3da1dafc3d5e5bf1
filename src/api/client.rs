//! HTTP client for the wallet API.
//!
//! # Responsibilities
//! - Speak the wire schema over reqwest
//! - Turn non-success statuses into classified `WalletError`s
//! - Run plain lookups with retry-once-then-surface semantics
//! - Expose build/broadcast as single attempts for the orchestrator

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::{Duration, Instant};

use crate::api::normalize::{
    classify_failure, normalize_balance, normalize_transaction_records, normalize_utxo_list,
};
use crate::api::types::{ApiConfig, WalletError, WalletResult};
use crate::api::wire::{
    BalanceWire, BroadcastRequestWire, BroadcastResponseWire, BuildRequestWire, BuildResponseWire,
    KeyExportRequestWire, KeyExportResponseWire, TransactionRecordWire, UtxoListWire,
    ValidateRequestWire,
};
use crate::config::schema::CallConfig;
use crate::lifecycle::CancelToken;
use crate::observability::metrics;
use crate::resilience::timeouts::with_timeout;
use crate::resilience::{Retrier, RetryPolicy};
use crate::transaction::types::validate_raw_tx_hex;
use crate::wallet::keys::{GeneratedKeys, KeyRequest};
use crate::wallet::types::{
    Balance, FeeEstimate, Network, TransactionRecord, TxStatus, Utxo, ValidationReport, Wallet,
};

/// The two remote steps of a submission.
///
/// Each method performs exactly one attempt with no deadline of its own;
/// retries and timeouts belong to the caller.
pub trait TransactionGateway: Send + Sync {
    fn build(
        &self,
        request: &BuildRequestWire,
    ) -> impl Future<Output = WalletResult<BuildResponseWire>> + Send;

    fn broadcast(
        &self,
        request: &BroadcastRequestWire,
    ) -> impl Future<Output = WalletResult<BroadcastResponseWire>> + Send;
}

/// reqwest-backed wallet API client.
#[derive(Clone)]
pub struct HttpWalletApi {
    client: Client,
    base_url: String,
    network: Network,
    lookup_retrier: Retrier,
    lookup_timeout: Duration,
    cancel: CancelToken,
}

impl HttpWalletApi {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `api` - Endpoint configuration (base URL is injected here, never read from the environment)
    /// * `lookups` - Deadline and retry schedule for plain lookups
    pub fn new(api: &ApiConfig, lookups: &CallConfig) -> WalletResult<Self> {
        let base_url = api.normalized_base_url();
        url::Url::parse(&base_url)
            .map_err(|e| WalletError::Validation(format!("Invalid API base URL '{}': {}", base_url, e)))?;
        let network = api.network.parse::<Network>().map_err(WalletError::Validation)?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(api.connect_timeout_secs))
            .user_agent(api.user_agent.clone())
            .build()
            .map_err(|e| WalletError::Validation(format!("Failed to create HTTP client: {}", e)))?;

        tracing::debug!(base_url = %base_url, network = %network, "Wallet API client initialized");

        Ok(Self {
            client,
            base_url,
            network,
            lookup_retrier: Retrier::new(RetryPolicy::from(&lookups.retry)),
            lookup_timeout: lookups.timeout(),
            cancel: CancelToken::new(),
        })
    }

    /// Use `cancel` to abandon lookups in flight.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn network(&self) -> Network {
        self.network
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send one request and return the success body.
    async fn fetch(&self, call: &'static str, request: RequestBuilder) -> WalletResult<String> {
        let started = Instant::now();
        let result = send(request).await;
        let elapsed = started.elapsed();
        metrics::record_call_duration(call, elapsed, result.is_ok());
        match &result {
            Ok(_) => tracing::debug!(call, elapsed_ms = elapsed.as_millis() as u64, "Call succeeded"),
            Err(e) => tracing::debug!(call, elapsed_ms = elapsed.as_millis() as u64, error = %e, "Call failed"),
        }
        result
    }

    /// Idempotent lookup: deadline per attempt, retried per the lookup policy.
    async fn lookup<T, F>(&self, call: &'static str, make_request: F) -> WalletResult<T>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        let body = self
            .lookup_retrier
            .run(call, &self.cancel, |_| {
                with_timeout(call, self.lookup_timeout, self.fetch(call, make_request()))
            })
            .await?;
        parse_json(&body)
    }

    /// Non-idempotent call: a single attempt under the lookup deadline.
    async fn mutate(&self, call: &'static str, request: RequestBuilder) -> WalletResult<String> {
        if self.cancel.is_cancelled() {
            return Err(WalletError::Cancelled);
        }
        metrics::record_attempt(call);
        with_timeout(call, self.lookup_timeout, self.fetch(call, request)).await
    }

    /// List all wallets.
    pub async fn list_wallets(&self) -> WalletResult<Vec<Wallet>> {
        let url = self.endpoint("/api/wallets");
        self.lookup("list_wallets", || self.client.get(&url)).await
    }

    /// Fetch one wallet by address.
    pub async fn get_wallet(&self, address: &str) -> WalletResult<Wallet> {
        let url = self.endpoint(&format!("/api/wallets/{}", require_address(address)?));
        self.lookup("get_wallet", || self.client.get(&url))
            .await
            .map_err(|e| not_found_on_404(e, format!("wallet {}", address)))
    }

    /// Store a wallet record.
    pub async fn save_wallet(&self, wallet: &Wallet) -> WalletResult<Wallet> {
        require_address(&wallet.address)?;
        let request = self.client.post(self.endpoint("/api/wallets")).json(wallet);
        let body = self.mutate("save_wallet", request).await?;
        parse_json(&body)
    }

    /// Delete a wallet record.
    pub async fn delete_wallet(&self, address: &str) -> WalletResult<()> {
        let url = self.endpoint(&format!("/api/wallets/{}", require_address(address)?));
        self.mutate("delete_wallet", self.client.delete(url))
            .await
            .map_err(|e| not_found_on_404(e, format!("wallet {}", address)))?;
        Ok(())
    }

    /// Ask the server for a fresh key pair (single attempt).
    pub async fn generate_keys(&self, request: &KeyRequest) -> WalletResult<GeneratedKeys> {
        let http = self.client.post(self.endpoint("/api/keys")).json(request);
        let body = self.mutate("generate_keys", http).await?;
        let keys: GeneratedKeys = parse_json(&body)?;
        if keys.private_key.trim().is_empty() || keys.public_key.trim().is_empty() {
            return Err(WalletError::Protocol("key response without key material".to_string()));
        }
        require_address(&keys.address)
            .map_err(|_| WalletError::Protocol("key response without a usable address".to_string()))?;
        tracing::info!(address = %keys.address, method = %request.method, "Keys generated");
        Ok(keys)
    }

    /// Generate keys and store them as a new named wallet.
    pub async fn create_wallet(&self, name: &str, request: &KeyRequest) -> WalletResult<Wallet> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WalletError::Validation("wallet name is empty".to_string()));
        }
        let keys = self.generate_keys(request).await?;
        self.save_wallet(&keys.into_wallet(name, request.method, request.network))
            .await
    }

    /// Have the server write a wallet's keys to a text file; returns the file path.
    pub async fn export_key_file(&self, wallet: &Wallet) -> WalletResult<String> {
        require_address(&wallet.address)?;
        let (Some(private_key), Some(public_key)) = (&wallet.private_key, &wallet.public_key) else {
            return Err(WalletError::Validation(format!(
                "wallet {} has no key pair to export",
                wallet.address
            )));
        };
        let body = KeyExportRequestWire {
            private_key: private_key.clone(),
            public_key: public_key.clone(),
            address: wallet.address.clone(),
            network: wallet.network.clone(),
            file_format: "txt".to_string(),
            format: wallet.format.clone(),
        };
        let http = self.client.post(self.endpoint("/api/keys/export-file")).json(&body);
        let response: KeyExportResponseWire =
            parse_json(&self.mutate("export_key_file", http).await?)?;
        match response {
            KeyExportResponseWire {
                success: true,
                file_path: Some(path),
                ..
            } if !path.trim().is_empty() => Ok(path),
            KeyExportResponseWire { message, .. } => Err(WalletError::Protocol(format!(
                "key export failed: {}",
                message.unwrap_or_else(|| "no file path returned".to_string())
            ))),
        }
    }

    /// Transaction history of a wallet.
    pub async fn transactions(&self, address: &str) -> WalletResult<Vec<TransactionRecord>> {
        let url = self.endpoint(&format!(
            "/api/wallets/{}/transactions",
            require_address(address)?
        ));
        let wire: Vec<TransactionRecordWire> =
            self.lookup("transactions", || self.client.get(&url)).await?;
        normalize_transaction_records(wire)
    }

    /// UTXOs of a wallet, normalized.
    pub async fn utxos(&self, address: &str) -> WalletResult<Vec<Utxo>> {
        let url = self.endpoint(&format!("/api/wallets/{}/utxos", require_address(address)?));
        let wire: UtxoListWire = self.lookup("utxos", || self.client.get(&url)).await?;
        normalize_utxo_list(wire)
    }

    /// Confirmed balance of an address, normalized.
    pub async fn balance(&self, address: &str) -> WalletResult<Balance> {
        let url = self.endpoint(&format!("/api/balance/{}", require_address(address)?));
        let wire: BalanceWire = self.lookup("balance", || self.client.get(&url)).await?;
        normalize_balance(wire)
    }

    /// Current fee-rate suggestions.
    pub async fn fee_estimate(&self) -> WalletResult<FeeEstimate> {
        let url = self.endpoint("/api/fee/estimate");
        let network = self.network.as_str();
        self.lookup("fee_estimate", || {
            self.client.get(&url).query(&[("network", network)])
        })
        .await
    }

    /// Ask the server whether a raw transaction is valid.
    pub async fn validate_transaction(&self, raw_tx_hex: &str) -> WalletResult<ValidationReport> {
        validate_raw_tx_hex(raw_tx_hex)?;
        let url = self.endpoint("/api/validate");
        let body = ValidateRequestWire {
            tx_hex: raw_tx_hex.trim().to_string(),
            network: self.network.as_str().to_string(),
        };
        self.lookup("validate", || self.client.post(&url).json(&body)).await
    }

    /// On-chain status of a transaction.
    pub async fn transaction_status(&self, txid: &str) -> WalletResult<TxStatus> {
        let txid = txid.trim();
        if txid.len() != 64 || !txid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(WalletError::Validation(
                "txid must be 64 hexadecimal characters".to_string(),
            ));
        }
        let url = self.endpoint(&format!("/api/tx/{}", txid));
        let network = self.network.as_str();
        self.lookup("tx_status", || {
            self.client.get(&url).query(&[("network", network)])
        })
        .await
        .map_err(|e| not_found_on_404(e, format!("transaction {}", txid)))
    }

    /// Server health document.
    pub async fn health(&self) -> WalletResult<serde_json::Value> {
        let url = self.endpoint("/api/health");
        self.lookup("health", || self.client.get(&url)).await
    }
}

impl TransactionGateway for HttpWalletApi {
    fn build(
        &self,
        request: &BuildRequestWire,
    ) -> impl Future<Output = WalletResult<BuildResponseWire>> + Send {
        let request = self.client.post(self.endpoint("/api/tx/build")).json(request);
        async move {
            let body = self.fetch("build", request).await?;
            parse_json(&body)
        }
    }

    fn broadcast(
        &self,
        request: &BroadcastRequestWire,
    ) -> impl Future<Output = WalletResult<BroadcastResponseWire>> + Send {
        let request = self.client.post(self.endpoint("/api/broadcast")).json(request);
        async move {
            let body = self.fetch("broadcast", request).await?;
            parse_json(&body)
        }
    }
}

impl std::fmt::Debug for HttpWalletApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpWalletApi")
            .field("base_url", &self.base_url)
            .field("network", &self.network)
            .field("lookup_timeout", &self.lookup_timeout)
            .finish()
    }
}

async fn send(request: RequestBuilder) -> WalletResult<String> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(classify_failure(status.as_u16(), &body))
    }
}

fn parse_json<T: DeserializeOwned>(body: &str) -> WalletResult<T> {
    serde_json::from_str(body)
        .map_err(|e| WalletError::Protocol(format!("malformed response body: {}", e)))
}

fn require_address(address: &str) -> WalletResult<&str> {
    let address = address.trim();
    if address.is_empty() {
        return Err(WalletError::Validation("address is empty".to_string()));
    }
    if !address.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(WalletError::Validation(format!(
            "address '{}' contains invalid characters",
            address
        )));
    }
    Ok(address)
}

fn not_found_on_404(err: WalletError, what: String) -> WalletError {
    match err {
        WalletError::PermanentRejection { status: 404, .. } => WalletError::NotFound(what),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HttpWalletApi {
        HttpWalletApi::new(&ApiConfig::default(), &CallConfig::passthrough_default()).unwrap()
    }

    #[test]
    fn test_client_creation() {
        let api = client();
        assert_eq!(api.base_url(), "http://localhost:8000");
        assert_eq!(api.network(), Network::Testnet);
        assert_eq!(api.endpoint("/api/tx/build"), "http://localhost:8000/api/tx/build");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let api = ApiConfig {
            base_url: "::not-a-url".to_string(),
            ..ApiConfig::default()
        };
        let result = HttpWalletApi::new(&api, &CallConfig::passthrough_default());
        assert!(matches!(result, Err(WalletError::Validation(_))));
    }

    #[test]
    fn test_require_address() {
        assert_eq!(require_address(" tb1qabc "), Ok("tb1qabc"));
        assert!(require_address("").is_err());
        assert!(require_address("../../etc").is_err());
    }

    #[test]
    fn test_not_found_mapping() {
        let err = not_found_on_404(WalletError::from_status(404, "nope"), "wallet x".into());
        assert_eq!(err, WalletError::NotFound("wallet x".into()));
        let err = not_found_on_404(WalletError::from_status(400, "bad"), "wallet x".into());
        assert_eq!(err.status(), Some(400));
    }

    #[tokio::test]
    async fn test_status_rejects_bad_txid_locally() {
        let err = client().transaction_status("abc").await.unwrap_err();
        assert!(matches!(err, WalletError::Validation(_)));
    }

    #[tokio::test]
    async fn test_validate_rejects_short_hex_locally() {
        let err = client().validate_transaction("0200").await.unwrap_err();
        assert!(matches!(err, WalletError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transient() {
        let api = ApiConfig {
            // Port 9 (discard) is closed on test machines.
            base_url: "http://127.0.0.1:9".to_string(),
            ..ApiConfig::default()
        };
        let api = HttpWalletApi::new(&api, &CallConfig::passthrough_default()).unwrap();
        let err = api.health().await.unwrap_err();
        assert!(err.is_retryable(), "expected transient error, got {:?}", err);
    }
}
