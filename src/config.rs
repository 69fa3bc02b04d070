//! Constants, backend selection, and environment-driven configuration.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{InventoryError, Result};
use crate::remote::{HttpRemote, RemoteStore};

/// Versioned key the local snapshot is stored under.
pub const STORAGE_KEY: &str = "inventory_flow_data_v1";

/// Number of empty entries a new color variant starts with.
pub const DEFAULT_ENTRY_BATCH: usize = 5;

/// Quiescence window before a burst of edits is persisted.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Upper bound on a single remote read or write.
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(5);

pub const ENV_REMOTE_URL: &str = "INVENTORY_FLOW_REMOTE_URL";
pub const ENV_DATA_DIR: &str = "INVENTORY_FLOW_DATA_DIR";
pub const ENV_DEBOUNCE_MS: &str = "INVENTORY_FLOW_DEBOUNCE_MS";

pub fn default_data_dir() -> PathBuf {
    if let Some(data) = dirs::data_local_dir() {
        data.join("inventory-flow")
    } else {
        PathBuf::from(".inventory-flow")
    }
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// Which stores a save cycle reaches. Chosen once when the engine is built.
#[derive(Clone)]
pub enum Backend {
    LocalOnly,
    LocalAndRemote(Arc<dyn RemoteStore>),
}

impl Backend {
    /// Build an HTTP-backed remote for `endpoint`.
    pub fn http(endpoint: &str, timeout: Duration) -> Result<Self> {
        let remote = HttpRemote::new(endpoint, timeout)?;
        Ok(Backend::LocalAndRemote(Arc::new(remote)))
    }

    pub fn remote(&self) -> Option<&Arc<dyn RemoteStore>> {
        match self {
            Backend::LocalOnly => None,
            Backend::LocalAndRemote(remote) => Some(remote),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Backend::LocalAndRemote(_))
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::LocalOnly => write!(f, "LocalOnly"),
            Backend::LocalAndRemote(remote) => {
                write!(f, "LocalAndRemote({})", remote.describe())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// Plain settings for a sync engine, before any store is opened.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub data_dir: PathBuf,
    pub storage_key: String,
    pub remote_url: Option<String>,
    pub debounce: Duration,
    pub remote_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            storage_key: STORAGE_KEY.to_string(),
            remote_url: None,
            debounce: DEFAULT_DEBOUNCE,
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }
}

impl EngineConfig {
    /// Read overrides from the process environment.
    ///
    /// Unset variables keep their defaults. An empty remote URL counts as
    /// unset, so the engine runs local-only.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|s| !s.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }

        config.remote_url = lookup(ENV_REMOTE_URL)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        if let Some(raw) = lookup(ENV_DEBOUNCE_MS) {
            let ms: u64 = raw.trim().parse().map_err(|_| {
                InventoryError::InvalidArgument(format!(
                    "{} must be a whole number of milliseconds, got {:?}",
                    ENV_DEBOUNCE_MS, raw
                ))
            })?;
            config.debounce = Duration::from_millis(ms);
        }

        Ok(config)
    }

    /// Resolve the configured remote URL into a [`Backend`].
    pub fn backend(&self) -> Result<Backend> {
        match &self.remote_url {
            Some(url) => Backend::http(url, self.remote_timeout),
            None => Ok(Backend::LocalOnly),
        }
    }
}
