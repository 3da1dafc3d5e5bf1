//! Server-side key generation requests and results.
//!
//! Keys are derived by the API; this module only describes what to ask for
//! and carries the answer into a `Wallet` record.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::wallet::types::{Network, Wallet};

/// How the server should generate the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyMethod {
    #[default]
    Entropy,
    Bip39,
    Bip32,
}

impl KeyMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyMethod::Entropy => "entropy",
            KeyMethod::Bip39 => "bip39",
            KeyMethod::Bip32 => "bip32",
        }
    }
}

impl fmt::Display for KeyMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "entropy" => Ok(KeyMethod::Entropy),
            "bip39" => Ok(KeyMethod::Bip39),
            "bip32" => Ok(KeyMethod::Bip32),
            other => Err(format!("unknown key method '{}'", other)),
        }
    }
}

/// Address format of a generated key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyFormat {
    P2pkh,
    P2sh,
    P2wpkh,
    P2tr,
}

impl KeyFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyFormat::P2pkh => "p2pkh",
            KeyFormat::P2sh => "p2sh",
            KeyFormat::P2wpkh => "p2wpkh",
            KeyFormat::P2tr => "p2tr",
        }
    }
}

impl fmt::Display for KeyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "p2pkh" => Ok(KeyFormat::P2pkh),
            "p2sh" => Ok(KeyFormat::P2sh),
            "p2wpkh" => Ok(KeyFormat::P2wpkh),
            "p2tr" => Ok(KeyFormat::P2tr),
            other => Err(format!("unknown key format '{}'", other)),
        }
    }
}

/// Body of `POST /api/keys`.
#[derive(Clone, PartialEq, Serialize)]
pub struct KeyRequest {
    pub method: KeyMethod,
    pub network: Network,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_format: Option<KeyFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mnemonic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derivation_path: Option<String>,
}

/// Derivation path asked for when the method is BIP32 and none is given.
pub const DEFAULT_BIP32_PATH: &str = "m/44'/0'/0'/0/0";

impl KeyRequest {
    pub fn new(method: KeyMethod, network: Network, key_format: Option<KeyFormat>) -> Self {
        let derivation_path = match method {
            KeyMethod::Bip32 => Some(DEFAULT_BIP32_PATH.to_string()),
            _ => None,
        };
        Self {
            method,
            network,
            key_format,
            mnemonic: None,
            derivation_path,
        }
    }
}

/// Key material returned by `POST /api/keys`.
#[derive(Clone, PartialEq, Deserialize)]
pub struct GeneratedKeys {
    pub private_key: String,
    pub public_key: String,
    pub address: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub derivation_path: Option<String>,
    #[serde(default)]
    pub mnemonic: Option<String>,
}

impl GeneratedKeys {
    /// Wallet record to store for these keys.
    pub fn into_wallet(self, name: impl Into<String>, method: KeyMethod, network: Network) -> Wallet {
        Wallet {
            name: name.into(),
            address: self.address,
            private_key: Some(self.private_key),
            public_key: Some(self.public_key),
            key_type: self.format.clone(),
            key_generation_method: Some(method.to_string()),
            format: self.format,
            derivation_path: self.derivation_path,
            mnemonic: self.mnemonic,
            network: self.network.unwrap_or_else(|| network.to_string()),
            ..Wallet::default()
        }
    }
}

impl fmt::Debug for GeneratedKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedKeys")
            .field("address", &self.address)
            .field("public_key", &self.public_key)
            .field("format", &self.format)
            .field("network", &self.network)
            .field("private_key", &"<redacted>")
            .field("mnemonic", &self.mnemonic.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
