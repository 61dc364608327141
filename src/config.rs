//! Client configuration
//!
//! Loaded from a JSON file or from `FERRUM_*` environment variables. Every
//! field has a default, so an empty file or an empty environment yields a
//! client for a local server on the default port.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Environment variable naming a JSON config file
pub const CONFIG_PATH_VAR: &str = "FERRUM_CONFIG";

/// Where and how to connect
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// `host:port` of the store
    pub addr: String,

    /// Sent with AUTH after connecting
    pub password: Option<String>,

    /// Selected after connecting when not 0
    pub database: u32,

    pub connect_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            addr: "127.0.0.1:6379".to_string(),
            password: None,
            database: 0,
            connect_timeout_ms: 3000,
        }
    }
}

impl ClientConfig {
    /// Read a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read(path.as_ref())?;
        serde_json::from_slice(&raw).map_err(|e| {
            Error::Config(format!("{}: {}", path.as_ref().display(), e))
        })
    }

    /// Read `FERRUM_ADDR`, `FERRUM_PASSWORD`, `FERRUM_DB` and
    /// `FERRUM_CONNECT_TIMEOUT_MS`, defaulting whatever is unset
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// `FERRUM_CONFIG` when set, the other variables otherwise
    pub fn load() -> Result<Self> {
        match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::from_file(path),
            Err(_) => Self::from_env(),
        }
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = ClientConfig::default();

        if let Some(addr) = lookup("FERRUM_ADDR") {
            config.addr = addr;
        }
        if let Some(password) = lookup("FERRUM_PASSWORD").filter(|p| !p.is_empty()) {
            config.password = Some(password);
        }
        if let Some(db) = lookup("FERRUM_DB") {
            config.database = db
                .parse()
                .map_err(|_| Error::Config(format!("FERRUM_DB is not a database index: {:?}", db)))?;
        }
        if let Some(ms) = lookup("FERRUM_CONNECT_TIMEOUT_MS") {
            config.connect_timeout_ms = ms.parse().map_err(|_| {
                Error::Config(format!("FERRUM_CONNECT_TIMEOUT_MS is not a number: {:?}", ms))
            })?;
        }

        Ok(config)
    }
}
