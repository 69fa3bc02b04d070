//! Local-first persistence and sync for variant-based retail inventory.
//!
//! Products own color variants, and each variant owns stock slots
//! ("entries") that cycle `empty -> stocked -> sold -> empty`. The
//! [`SyncEngine`] keeps the whole inventory as one snapshot, writes it to a
//! local store after every burst of edits, and mirrors it to an optional
//! remote endpoint on a best-effort basis.
//!
//! # Quick start
//!
//! ```no_run
//! use inventory_flow::{InventoryCommand, SyncEngine};
//!
//! # async fn example() -> inventory_flow::Result<()> {
//! let mut engine = SyncEngine::builder()
//!     .data_dir("/tmp/inventory")
//!     .remote_endpoint("https://example.com/exec")
//!     .build()?;
//!
//! engine.load().await;
//!
//! let product_id = engine
//!     .apply(InventoryCommand::AddProduct { name: "Shirt".into(), category: None })?
//!     .unwrap();
//! engine.apply(InventoryCommand::AddVariant { product_id, name: "Blue".into() })?;
//!
//! // Saved automatically after the debounce window; or right now:
//! engine.flush().await?;
//! # Ok(())
//! # }
//! ```

pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod local;
pub mod models;
pub mod query;
pub mod remote;

pub use commands::InventoryCommand;
pub use config::{Backend, EngineConfig};
pub use engine::{
    InventoryView, LoadSource, RemoteOutcome, SaveReport, SyncEngine, SyncStatus,
};
pub use error::{InventoryError, Result};
pub use local::LocalStore;
pub use models::{next, ColorVariant, Entry, EntryStatus, InventoryData, Product};
pub use query::InventoryQuery;
pub use remote::{HttpRemote, RemoteStore};

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

// ---------------------------------------------------------------------------
// SyncEngineBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`SyncEngine`].
///
/// Use [`SyncEngine::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](SyncEngineBuilder::build).
#[derive(Default)]
pub struct SyncEngineBuilder {
    config: EngineConfig,
    remote_store: Option<Arc<dyn RemoteStore>>,
}

impl SyncEngineBuilder {
    /// Start from an existing configuration, e.g. [`EngineConfig::from_env`].
    pub fn from_config(config: EngineConfig) -> Self {
        Self {
            config,
            remote_store: None,
        }
    }

    /// Set the directory the local snapshot is stored in.
    ///
    /// If not set, the platform data directory is used (e.g.
    /// `~/.local/share/inventory-flow` on Linux).
    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.data_dir = path.as_ref().to_path_buf();
        self
    }

    /// Override the storage key. Defaults to [`config::STORAGE_KEY`].
    pub fn storage_key(mut self, key: &str) -> Self {
        self.config.storage_key = key.to_string();
        self
    }

    /// Mirror snapshots to an HTTP endpoint.
    ///
    /// Without this (or [`remote_store`](Self::remote_store)) the engine runs
    /// local-only.
    pub fn remote_endpoint(mut self, url: &str) -> Self {
        self.config.remote_url = Some(url.to_string());
        self
    }

    /// Mirror snapshots to a custom [`RemoteStore`]. Takes precedence over
    /// [`remote_endpoint`](Self::remote_endpoint).
    pub fn remote_store(mut self, store: Arc<dyn RemoteStore>) -> Self {
        self.remote_store = Some(store);
        self
    }

    /// Set the quiescence window before edits are saved.
    ///
    /// Defaults to one second.
    pub fn debounce(mut self, window: Duration) -> Self {
        self.config.debounce = window;
        self
    }

    /// Bound every remote call. Defaults to five seconds.
    pub fn remote_timeout(mut self, timeout: Duration) -> Self {
        self.config.remote_timeout = timeout;
        self
    }

    /// Build the engine. Nothing is read until [`SyncEngine::load`].
    pub fn build(self) -> Result<SyncEngine> {
        let local = LocalStore::new(Some(self.config.data_dir.clone()), &self.config.storage_key)?;
        let backend = match self.remote_store {
            Some(store) => Backend::LocalAndRemote(store),
            None => self.config.backend()?,
        };
        tracing::debug!(store = %local.path().display(), backend = ?backend, "building sync engine");
        Ok(SyncEngine::new(
            local,
            backend,
            self.config.debounce,
            self.config.remote_timeout,
        ))
    }
}

impl SyncEngine {
    /// Create a new builder for configuring the engine.
    pub fn builder() -> SyncEngineBuilder {
        SyncEngineBuilder::default()
    }
}
