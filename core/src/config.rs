//! Session configuration.
//!
//! # Design
//! `SessionConfig` is plain serde data so it can come from a file, from the
//! environment, or be written inline. [`Session::from_config`](crate::Session::from_config)
//! validates it; nothing here touches the network.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::http::CachePolicy;

/// Environment variable holding the session base URL.
pub const BASE_URL_VAR: &str = "COURIER_BASE_URL";
/// Environment variable holding the default timeout in whole seconds.
pub const TIMEOUT_VAR: &str = "COURIER_TIMEOUT_SECS";

/// Defaults shared by every request a session creates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub headers: Vec<(String, String)>,
    pub cache_policy: Option<CachePolicy>,
}

impl SessionConfig {
    /// Read `COURIER_BASE_URL` and `COURIER_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) but reading through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let base_url = lookup(BASE_URL_VAR).filter(|url| !url.trim().is_empty());
        let timeout_secs = lookup(TIMEOUT_VAR)
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .map_err(|e| Error::Config(format!("{TIMEOUT_VAR}={raw:?}: {e}")))
            })
            .transpose()?;

        Ok(Self {
            base_url,
            timeout_secs,
            ..Self::default()
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
