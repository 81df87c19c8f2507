//! Per-process state shared read-only by every request

use ecdn_core::{EcdnError, EcdnResult};
use ecdn_crypto::SymmetricKey;
use secrecy::SecretString;
use std::path::PathBuf;
use std::sync::Arc;

use crate::metrics::DeliveryMetrics;

/// Secrets read from the environment at startup.
#[derive(Debug)]
pub struct Secrets {
    pub api_key: SecretString,
    pub key: SymmetricKey,
}

impl Secrets {
    /// Validate the raw `API_KEY` and `AES_KEY` values. Either one missing or
    /// blank is a startup error.
    pub fn from_values(api_key: Option<String>, aes_key: Option<String>) -> EcdnResult<Self> {
        let api_key = require("API_KEY", api_key)?;
        let aes_key = require("AES_KEY", aes_key)?;
        let key = SymmetricKey::derive_from_secret(&aes_key)?;
        Ok(Self { api_key, key })
    }
}

fn require(name: &str, value: Option<String>) -> EcdnResult<SecretString> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(SecretString::from(v)),
        _ => Err(EcdnError::Config(format!("{name} is not set"))),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub api_key: Arc<SecretString>,
    pub key: Arc<SymmetricKey>,
    pub base_dir: Arc<PathBuf>,
    pub metrics: DeliveryMetrics,
}

impl AppState {
    pub fn new(secrets: Secrets, base_dir: PathBuf, metrics: DeliveryMetrics) -> Self {
        Self {
            api_key: Arc::new(secrets.api_key),
            key: Arc::new(secrets.key),
            base_dir: Arc::new(base_dir),
            metrics,
        }
    }
}
