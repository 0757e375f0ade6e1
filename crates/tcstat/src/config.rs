//! Exporter configuration.
//!
//! Loaded from YAML; every field is optional.
//!
//! ```yaml
//! listen_address: "0.0.0.0:9704"
//! metric_prefix: tc
//! log_level: info
//! fetch_timeout_ms: 5000
//! netns:
//!   default:
//!     interfaces: [eth0]
//!   blue:
//! ```

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};
use crate::schema::{DEFAULT_PREFIX, Schema};

/// Default HTTP listen address.
pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0:9704";

/// Configuration key for the exporter's own namespace.
pub const DEFAULT_NETNS_KEY: &str = "default";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub listen_address: String,
    /// First component of every metric name.
    pub metric_prefix: String,
    /// Log filter used when `RUST_LOG` is not set.
    pub log_level: Option<String>,
    /// Bound on each per-interface kernel query, in milliseconds.
    pub fetch_timeout_ms: u64,
    /// Fixed value for the `host` label instead of the system host name.
    pub hostname: Option<String>,
    /// Namespaces to watch, keyed by name. `default` is the exporter's own.
    #[serde(deserialize_with = "deserialize_netns")]
    pub netns: BTreeMap<String, NetnsConfig>,
}

/// Per-namespace settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetnsConfig {
    /// Interface names to watch. Empty means every interface.
    pub interfaces: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_address: DEFAULT_LISTEN_ADDRESS.to_string(),
            metric_prefix: DEFAULT_PREFIX.to_string(),
            log_level: None,
            fetch_timeout_ms: 5000,
            hostname: None,
            netns: BTreeMap::new(),
        }
    }
}

// `blue:` with no body is a namespace with every interface.
fn deserialize_netns<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, NetnsConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Option<NetnsConfig>>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(name, cfg)| (name, cfg.unwrap_or_default()))
        .collect())
}

impl Config {
    /// Parse and validate a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&yaml)
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        Schema::new(&self.metric_prefix)
            .map_err(|e| Error::Config(format!("invalid metric_prefix '{}': {}", self.metric_prefix, e)))?;
        if self.fetch_timeout_ms == 0 {
            return Err(Error::Config("fetch_timeout_ms must be greater than 0".into()));
        }
        if let Some(name) = self.netns.keys().find(|n| n.is_empty()) {
            return Err(Error::Config(format!("invalid namespace name '{name}'")));
        }
        Ok(())
    }

    /// The parsed listen address.
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen_address.parse().map_err(|_| {
            Error::Config(format!("invalid listen_address '{}'", self.listen_address))
        })
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Watch every interface of `name`, unless it is already configured.
    pub fn add_netns(&mut self, name: impl Into<String>) {
        self.netns.entry(name.into()).or_default();
    }

    /// The namespaces to watch as `(identifier, interfaces)` pairs.
    ///
    /// `default` becomes the empty identifier. With nothing configured the
    /// default namespace is watched with every interface.
    pub fn targets(&self) -> Vec<(String, Vec<String>)> {
        if self.netns.is_empty() {
            return vec![(String::new(), Vec::new())];
        }
        self.netns
            .iter()
            .map(|(name, cfg)| (netns_id(name).to_string(), cfg.interfaces.clone()))
            .collect()
    }
}

/// Map a configuration key to a namespace identifier.
pub fn netns_id(name: &str) -> &str {
    if name == DEFAULT_NETNS_KEY { "" } else { name }
}
