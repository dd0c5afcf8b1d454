//! Client configuration.
//!
//! Resolved once from `TELESYNC_*` environment variables, optionally adjusted
//! with [`Overrides`], then handed to a site. A site never re-reads the
//! environment; build a new one to pick up new settings.

use std::time::Duration;

use crate::error::{ClientError, Result};

pub const DEFAULT_INTERNAL_ADDRESS: &str = "ws://localhost:55556";
pub const DEFAULT_HUB_ADDRESS: &str = "http://localhost:55555";
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(3);

const ENV_PREFIX: &str = "TELESYNC_";

/// Addresses and credentials for talking to the hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address the app's channel connects to
    pub internal_address: String,
    /// Address advertised to the hub for this app
    pub external_address: String,
    /// Base URL for page and file requests
    pub hub_address: String,
    pub hub_access_key_id: String,
    pub hub_access_key_secret: String,
    /// How long closing a channel may wait for queued messages
    pub shutdown_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            internal_address: DEFAULT_INTERNAL_ADDRESS.to_string(),
            external_address: DEFAULT_INTERNAL_ADDRESS.to_string(),
            hub_address: DEFAULT_HUB_ADDRESS.to_string(),
            hub_access_key_id: "access_key_id".to_string(),
            hub_access_key_secret: "access_key_secret".to_string(),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

/// Call-time overrides; `None` (or an empty string) keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub internal_address: Option<String>,
    pub external_address: Option<String>,
    pub hub_address: Option<String>,
    pub hub_access_key_id: Option<String>,
    pub hub_access_key_secret: Option<String>,
    pub shutdown_timeout: Option<Duration>,
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve from an arbitrary variable lookup, keyed by full variable name.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |name: &str| non_empty(lookup(&format!("{ENV_PREFIX}{name}")));
        let defaults = Self::default();

        let internal_address = get("INTERNAL_ADDRESS").unwrap_or(defaults.internal_address);
        let external_address = get("EXTERNAL_ADDRESS").unwrap_or_else(|| internal_address.clone());
        let shutdown_timeout = match get("SHUTDOWN_TIMEOUT") {
            Some(s) => s.trim().parse::<u64>().map(Duration::from_secs).map_err(|e| {
                ClientError::Config(format!("{ENV_PREFIX}SHUTDOWN_TIMEOUT={s:?}: {e}"))
            })?,
            None => defaults.shutdown_timeout,
        };

        Ok(Self {
            internal_address,
            external_address,
            hub_address: get("ADDRESS").unwrap_or(defaults.hub_address),
            hub_access_key_id: get("ACCESS_KEY_ID").unwrap_or(defaults.hub_access_key_id),
            hub_access_key_secret: get("ACCESS_KEY_SECRET")
                .unwrap_or(defaults.hub_access_key_secret),
            shutdown_timeout,
        })
    }

    /// Apply overrides.
    ///
    /// When only the internal address changes and the external address is
    /// still the default internal address, the external address follows it.
    pub fn configure(mut self, overrides: Overrides) -> Self {
        let internal = non_empty(overrides.internal_address);
        if let Some(addr) = &internal {
            self.internal_address = addr.clone();
        }

        match (non_empty(overrides.external_address), internal) {
            (Some(addr), _) => self.external_address = addr,
            (None, Some(addr)) if self.external_address == DEFAULT_INTERNAL_ADDRESS => {
                self.external_address = addr;
            }
            _ => {}
        }

        if let Some(addr) = non_empty(overrides.hub_address) {
            self.hub_address = addr;
        }
        if let Some(id) = non_empty(overrides.hub_access_key_id) {
            self.hub_access_key_id = id;
        }
        if let Some(secret) = non_empty(overrides.hub_access_key_secret) {
            self.hub_access_key_secret = secret;
        }
        if let Some(timeout) = overrides.shutdown_timeout {
            self.shutdown_timeout = timeout;
        }
        self
    }
}
