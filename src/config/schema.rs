//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

use crate::resilience::RetryPolicy;

/// Root configuration for the wallet client.
///
/// Call sections are overlays: fields left out of `[build]`, `[broadcast]`
/// or `[passthrough]` keep that call's own defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(from = "ClientConfigFile")]
pub struct ClientConfig {
    /// Wallet API endpoint settings.
    pub api: ApiConfig,

    /// Transaction build call.
    pub build: CallConfig,

    /// Transaction broadcast call.
    pub broadcast: CallConfig,

    /// Plain lookups (wallets, UTXOs, balance, fees, status).
    pub passthrough: CallConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Export defaults.
    pub export: ExportConfig,
}

impl Default for ClientConfig {
    /// Defaults with the per-call schedules of the wallet API.
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            build: CallConfig::build_default(),
            broadcast: CallConfig::broadcast_default(),
            passthrough: CallConfig::passthrough_default(),
            observability: ObservabilityConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

/// On-disk shape of `ClientConfig`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ClientConfigFile {
    api: ApiConfig,
    build: CallOverlay,
    broadcast: CallOverlay,
    passthrough: CallOverlay,
    observability: ObservabilityConfig,
    export: ExportConfig,
}

impl From<ClientConfigFile> for ClientConfig {
    fn from(file: ClientConfigFile) -> Self {
        Self {
            api: file.api,
            build: file.build.over(CallConfig::build_default()),
            broadcast: file.broadcast.over(CallConfig::broadcast_default()),
            passthrough: file.passthrough.over(CallConfig::passthrough_default()),
            observability: file.observability,
            export: file.export,
        }
    }
}

/// Fields given in a call section.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CallOverlay {
    timeout_secs: Option<u64>,
    retry: RetryOverlay,
}

impl CallOverlay {
    fn over(self, mut base: CallConfig) -> CallConfig {
        if let Some(timeout_secs) = self.timeout_secs {
            base.timeout_secs = timeout_secs;
        }
        base.retry = self.retry.over(base.retry);
        base
    }
}

/// Fields given in a `[<call>.retry]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RetryOverlay {
    max_retries: Option<u32>,
    base_delay_ms: Option<u64>,
    backoff_multiplier: Option<f64>,
    max_delay_ms: Option<u64>,
    non_retryable_status_codes: Option<BTreeSet<u16>>,
    jitter_ratio: Option<f64>,
}

impl RetryOverlay {
    fn over(self, base: RetryConfig) -> RetryConfig {
        RetryConfig {
            max_retries: self.max_retries.unwrap_or(base.max_retries),
            base_delay_ms: self.base_delay_ms.unwrap_or(base.base_delay_ms),
            backoff_multiplier: self.backoff_multiplier.unwrap_or(base.backoff_multiplier),
            max_delay_ms: self.max_delay_ms.unwrap_or(base.max_delay_ms),
            non_retryable_status_codes: self
                .non_retryable_status_codes
                .unwrap_or(base.non_retryable_status_codes),
            jitter_ratio: self.jitter_ratio.unwrap_or(base.jitter_ratio),
        }
    }
}

/// Wallet API endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server root, e.g. "http://localhost:8000". Paths start with `/api`.
    pub base_url: String,

    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,

    /// User-Agent header sent with every request.
    pub user_agent: String,

    /// Network passed to endpoints that take one.
    pub network: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            connect_timeout_secs: 10,
            user_agent: concat!("btc-wallet-client/", env!("CARGO_PKG_VERSION")).to_string(),
            network: "testnet".to_string(),
        }
    }
}

impl ApiConfig {
    /// Base URL without trailing slashes.
    pub fn normalized_base_url(&self) -> String {
        self.base_url.trim().trim_end_matches('/').to_string()
    }
}

/// Deadline and retry schedule of one kind of call.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CallConfig {
    /// Per-attempt deadline in seconds.
    pub timeout_secs: u64,

    /// Retry schedule.
    pub retry: RetryConfig,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            retry: RetryConfig::default(),
        }
    }
}

impl CallConfig {
    pub fn build_default() -> Self {
        Self {
            timeout_secs: 30,
            retry: RetryConfig::from(&RetryPolicy::build_default()),
        }
    }

    pub fn broadcast_default() -> Self {
        Self {
            timeout_secs: 45,
            retry: RetryConfig::from(&RetryPolicy::broadcast_default()),
        }
    }

    pub fn passthrough_default() -> Self {
        Self {
            timeout_secs: 30,
            retry: RetryConfig::from(&RetryPolicy::passthrough_default()),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,

    /// Delay before the first retry in milliseconds.
    pub base_delay_ms: u64,

    /// Growth factor per attempt.
    pub backoff_multiplier: f64,

    /// Cap for a single delay in milliseconds.
    pub max_delay_ms: u64,

    /// HTTP statuses never retried.
    pub non_retryable_status_codes: BTreeSet<u16>,

    /// Random extra delay as a fraction of the computed delay (0.0 - 1.0).
    pub jitter_ratio: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig::from(&RetryPolicy::default())
    }
}

impl From<&RetryPolicy> for RetryConfig {
    fn from(policy: &RetryPolicy) -> Self {
        Self {
            max_retries: policy.max_retries,
            base_delay_ms: policy.base_delay.as_millis() as u64,
            backoff_multiplier: policy.backoff_multiplier,
            max_delay_ms: policy.max_delay.as_millis() as u64,
            non_retryable_status_codes: policy.non_retryable_status_codes.clone(),
            jitter_ratio: policy.jitter_ratio,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
            backoff_multiplier: config.backoff_multiplier,
            max_delay: Duration::from_millis(config.max_delay_ms),
            non_retryable_status_codes: config.non_retryable_status_codes.clone(),
            jitter_ratio: config.jitter_ratio,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    pub log_level: String,

    /// `pretty` for terminals, `json` for machine parsing.
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

/// Export configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory exports are written to when no explicit path is given.
    pub directory: String,

    /// `csv` or `json`.
    pub default_format: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            default_format: "csv".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_call_schedules() {
        let config = ClientConfig::default();
        assert_eq!(config.build.timeout_secs, 30);
        assert_eq!(config.broadcast.timeout_secs, 45);
        assert_eq!(config.build.retry.base_delay_ms, 2000);
        assert_eq!(config.broadcast.retry.base_delay_ms, 4000);
        assert!(config.broadcast.retry.non_retryable_status_codes.contains(&400));
        assert_eq!(config.passthrough.retry.max_retries, 1);
    }

    #[test]
    fn test_policy_round_trip_through_config() {
        let policy = RetryPolicy::broadcast_default();
        let back = RetryPolicy::from(&RetryConfig::from(&policy));
        assert_eq!(back, policy);
    }

    #[test]
    fn test_call_sections_overlay_their_own_defaults() {
        let config: ClientConfig = toml::from_str("[broadcast]\ntimeout_secs = 60\n").unwrap();
        assert_eq!(config.broadcast.timeout_secs, 60);
        assert_eq!(config.broadcast.retry.base_delay_ms, 4000);
        assert!(config.broadcast.retry.non_retryable_status_codes.contains(&400));

        let config: ClientConfig = toml::from_str("[broadcast.retry]\nmax_retries = 3\n").unwrap();
        assert_eq!(config.broadcast.retry.max_retries, 3);
        assert_eq!(config.broadcast.timeout_secs, 45);
        assert_eq!(config.broadcast.retry.base_delay_ms, 4000);

        let config: ClientConfig = toml::from_str("[build.retry]\nbase_delay_ms = 100\n").unwrap();
        assert_eq!(config.build.retry.base_delay_ms, 100);
        assert_eq!(config.build.retry.max_retries, 2);
        assert_eq!(config.passthrough.retry.max_retries, 1);
    }

    #[test]
    fn test_unknown_call_field_rejected() {
        assert!(toml::from_str::<ClientConfig>("[build]\ntimeout = 5\n").is_err());
    }

    #[test]
    fn test_normalized_base_url() {
        let api = ApiConfig {
            base_url: " http://wallet:8000// ".to_string(),
            ..ApiConfig::default()
        };
        assert_eq!(api.normalized_base_url(), "http://wallet:8000");
    }
}
