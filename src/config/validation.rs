//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, multipliers >= 1, status codes)
//! - Check the API base URL is an absolute http(s) URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;

use crate::config::schema::{CallConfig, ClientConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match url::Url::parse(&config.api.normalized_base_url()) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            "api.base_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("api.base_url", e.to_string())),
    }

    if config.api.connect_timeout_secs == 0 {
        errors.push(ValidationError::new("api.connect_timeout_secs", "must be > 0"));
    }

    if config.api.network.parse::<crate::wallet::types::Network>().is_err() {
        errors.push(ValidationError::new(
            "api.network",
            format!("unknown network '{}'", config.api.network),
        ));
    }

    validate_call("build", &config.build, &mut errors);
    validate_call("broadcast", &config.broadcast, &mut errors);
    validate_call("passthrough", &config.passthrough, &mut errors);

    match config.observability.log_format.as_str() {
        "pretty" | "json" => {}
        other => errors.push(ValidationError::new(
            "observability.log_format",
            format!("expected 'pretty' or 'json', got '{}'", other),
        )),
    }

    if config.export.default_format.parse::<crate::wallet::export::ExportFormat>().is_err() {
        errors.push(ValidationError::new(
            "export.default_format",
            format!("expected 'csv' or 'json', got '{}'", config.export.default_format),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_call(name: &str, call: &CallConfig, errors: &mut Vec<ValidationError>) {
    if call.timeout_secs == 0 {
        errors.push(ValidationError::new(format!("{}.timeout_secs", name), "must be > 0"));
    }

    let retry = &call.retry;
    if !retry.backoff_multiplier.is_finite() || retry.backoff_multiplier < 1.0 {
        errors.push(ValidationError::new(
            format!("{}.retry.backoff_multiplier", name),
            "must be >= 1.0",
        ));
    }
    if !(0.0..=1.0).contains(&retry.jitter_ratio) {
        errors.push(ValidationError::new(
            format!("{}.retry.jitter_ratio", name),
            "must be within 0.0..=1.0",
        ));
    }
    if retry.max_delay_ms < retry.base_delay_ms {
        errors.push(ValidationError::new(
            format!("{}.retry.max_delay_ms", name),
            "must be >= base_delay_ms",
        ));
    }
    for code in &retry.non_retryable_status_codes {
        if !(100..=599).contains(code) {
            errors.push(ValidationError::new(
                format!("{}.retry.non_retryable_status_codes", name),
                format!("{} is not an HTTP status", code),
            ));
        }
    }
}
