//! The sync engine: load, debounce, persist, report.
//!
//! The engine holds the active snapshot in a `watch` channel. A single
//! background task owns the debounce timer and runs save cycles, so at most
//! one cycle is ever in flight. Edits that land while a cycle is running mark
//! the channel as changed and are picked up by the next cycle.
//!
//! ```text
//! Loading ──load()──> Idle ──cycle──> Syncing ──ok──> Idle
//!                                        └──remote failed──> Error ──next cycle──> ...
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::commands::InventoryCommand;
use crate::config::Backend;
use crate::error::{InventoryError, Result};
use crate::local::LocalStore;
use crate::models::InventoryData;

// ---------------------------------------------------------------------------
// Status and reports
// ---------------------------------------------------------------------------

/// Sync state shown to the UI as a passive indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// Initial load has not finished.
    Loading,
    Idle,
    /// A save cycle is running.
    Syncing,
    /// The last remote write failed. Advisory only.
    Error,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => write!(f, "Loading"),
            Self::Idle => write!(f, "Idle"),
            Self::Syncing => write!(f, "Syncing"),
            Self::Error => write!(f, "Error"),
        }
    }
}

/// Where the startup snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Remote,
    Local,
    /// Nothing stored anywhere, or the local record was unreadable.
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOutcome {
    NotConfigured,
    Written,
    Failed(String),
}

/// Result of one save cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    /// 1-based sequence number of the cycle.
    pub cycle: u64,
    /// Number of products in the persisted snapshot.
    pub products: usize,
    pub local_ok: bool,
    pub remote: RemoteOutcome,
}

impl SaveReport {
    /// Both stores that apply to this engine accepted the snapshot.
    pub fn is_clean(&self) -> bool {
        self.local_ok && !matches!(self.remote, RemoteOutcome::Failed(_))
    }
}

/// Everything the UI needs to render.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryView {
    pub snapshot: InventoryData,
    pub is_loading: bool,
    pub sync_status: SyncStatus,
    /// False after a local write failed, until the next local write succeeds.
    pub local_ok: bool,
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

struct Shared {
    local: LocalStore,
    backend: Backend,
    debounce: Duration,
    remote_timeout: Duration,
    status: watch::Sender<SyncStatus>,
    reports: watch::Sender<Option<SaveReport>>,
    local_ok: AtomicBool,
    cycles: AtomicU64,
}

impl Shared {
    fn set_status(&self, status: SyncStatus) {
        let previous = self.status.send_replace(status);
        if previous != status {
            tracing::debug!(from = %previous, to = %status, "sync status changed");
        }
    }

    async fn save_cycle(&self, snapshot: InventoryData) -> SaveReport {
        let cycle = self.cycles.fetch_add(1, Ordering::SeqCst) + 1;
        self.set_status(SyncStatus::Syncing);

        // Local first, unconditionally.
        let local_ok = self.local.save(&snapshot);
        self.local_ok.store(local_ok, Ordering::SeqCst);

        let remote = match self.backend.remote() {
            None => {
                self.set_status(SyncStatus::Idle);
                RemoteOutcome::NotConfigured
            }
            Some(remote) => {
                match tokio::time::timeout(self.remote_timeout, remote.write(&snapshot)).await {
                    Ok(Ok(())) => {
                        self.set_status(SyncStatus::Idle);
                        RemoteOutcome::Written
                    }
                    Ok(Err(e)) => {
                        tracing::warn!(cycle, remote = %remote.describe(), error = %e, "remote sync failed");
                        self.set_status(SyncStatus::Error);
                        RemoteOutcome::Failed(e.to_string())
                    }
                    Err(_) => {
                        let e = InventoryError::Timeout(self.remote_timeout);
                        tracing::warn!(cycle, remote = %remote.describe(), error = %e, "remote sync failed");
                        self.set_status(SyncStatus::Error);
                        RemoteOutcome::Failed(e.to_string())
                    }
                }
            }
        };

        let report = SaveReport {
            cycle,
            products: snapshot.len(),
            local_ok,
            remote,
        };
        tracing::info!(
            cycle,
            products = report.products,
            local_ok,
            remote = ?report.remote,
            "save cycle complete"
        );
        self.reports.send_replace(Some(report.clone()));
        report
    }
}

// ---------------------------------------------------------------------------
// Save task
// ---------------------------------------------------------------------------

enum Control {
    Flush(oneshot::Sender<SaveReport>),
    Shutdown,
}

struct Worker {
    control: mpsc::UnboundedSender<Control>,
    handle: JoinHandle<()>,
}

/// What ended a debounce window.
enum Settled {
    /// The window elapsed with no further edits.
    Quiet,
    /// A flush already persisted the latest snapshot.
    Flushed,
    Stop,
}

async fn run_saves(
    shared: Arc<Shared>,
    mut snapshots: watch::Receiver<InventoryData>,
    mut control: mpsc::UnboundedReceiver<Control>,
) {
    tracing::debug!("save task started");
    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            msg = control.recv() => match msg {
                Some(Control::Flush(reply)) => {
                    let snapshot = snapshots.borrow_and_update().clone();
                    let _ = reply.send(shared.save_cycle(snapshot).await);
                    continue;
                }
                Some(Control::Shutdown) | None => break,
            },
        }

        match debounce(&shared, &mut snapshots, &mut control).await {
            Settled::Quiet => {
                let snapshot = snapshots.borrow_and_update().clone();
                shared.save_cycle(snapshot).await;
            }
            Settled::Flushed => {}
            Settled::Stop => break,
        }
    }
    tracing::debug!("save task stopped");
}

/// Wait until edits have been quiet for the debounce window.
///
/// Each new edit restarts the window. A pending window is dropped without
/// saving on shutdown.
async fn debounce(
    shared: &Shared,
    snapshots: &mut watch::Receiver<InventoryData>,
    control: &mut mpsc::UnboundedReceiver<Control>,
) -> Settled {
    loop {
        tokio::select! {
            _ = tokio::time::sleep(shared.debounce) => return Settled::Quiet,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    return Settled::Stop;
                }
            }
            msg = control.recv() => match msg {
                Some(Control::Flush(reply)) => {
                    let snapshot = snapshots.borrow_and_update().clone();
                    let _ = reply.send(shared.save_cycle(snapshot).await);
                    return Settled::Flushed;
                }
                Some(Control::Shutdown) | None => return Settled::Stop,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// SyncEngine
// ---------------------------------------------------------------------------

/// Local-first persistence engine for an inventory snapshot.
///
/// Created via [`SyncEngine::builder()`](crate::SyncEngine::builder). Call
/// [`load`](Self::load) once inside a Tokio runtime before issuing edits.
pub struct SyncEngine {
    shared: Arc<Shared>,
    snapshot: watch::Sender<InventoryData>,
    loaded_from: Option<LoadSource>,
    worker: Option<Worker>,
}

impl SyncEngine {
    pub(crate) fn new(
        local: LocalStore,
        backend: Backend,
        debounce: Duration,
        remote_timeout: Duration,
    ) -> Self {
        let (status, _) = watch::channel(SyncStatus::Loading);
        let (reports, _) = watch::channel(None);
        let (snapshot, _) = watch::channel(InventoryData::default());
        Self {
            shared: Arc::new(Shared {
                local,
                backend,
                debounce,
                remote_timeout,
                status,
                reports,
                local_ok: AtomicBool::new(true),
                cycles: AtomicU64::new(0),
            }),
            snapshot,
            loaded_from: None,
            worker: None,
        }
    }

    /// Load the startup snapshot and start the save task.
    ///
    /// Tries the remote first when one is configured, mirroring a successful
    /// read into the local store. Falls back to the local store on any
    /// remote failure. Never fails: with nothing stored anywhere the
    /// snapshot is empty. The load itself is never saved back.
    ///
    /// Calling this again after a successful load returns the current
    /// snapshot without reloading.
    pub async fn load(&mut self) -> InventoryData {
        if self.worker.is_some() {
            return self.snapshot();
        }
        self.shared.set_status(SyncStatus::Loading);

        let (data, source) = self.read_startup_snapshot().await;
        tracing::info!(products = data.len(), source = ?source, "inventory loaded");

        // Publish before subscribing so the load itself is not seen as an edit.
        self.snapshot.send_replace(data.clone());
        let snapshots = self.snapshot.subscribe();
        let (control, control_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_saves(self.shared.clone(), snapshots, control_rx));

        self.worker = Some(Worker { control, handle });
        self.loaded_from = Some(source);
        self.shared.set_status(SyncStatus::Idle);
        data
    }

    async fn read_startup_snapshot(&self) -> (InventoryData, LoadSource) {
        if let Some(remote) = self.shared.backend.remote() {
            let read = tokio::time::timeout(self.shared.remote_timeout, remote.read()).await;
            match read {
                Ok(Ok(data)) => {
                    if !self.shared.local.save(&data) {
                        self.shared.local_ok.store(false, Ordering::SeqCst);
                    }
                    return (data, LoadSource::Remote);
                }
                Ok(Err(e)) => {
                    tracing::warn!(remote = %remote.describe(), error = %e, "remote load failed, falling back to local store");
                }
                Err(_) => {
                    tracing::warn!(
                        remote = %remote.describe(),
                        timeout = ?self.shared.remote_timeout,
                        "remote load timed out, falling back to local store"
                    );
                }
            }
        }

        match self.shared.local.load() {
            Some(data) => (data, LoadSource::Local),
            None => (InventoryData::default(), LoadSource::Empty),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.worker.is_some()
    }

    /// Where the startup snapshot came from, once loaded.
    pub fn loaded_from(&self) -> Option<LoadSource> {
        self.loaded_from
    }

    fn ensure_loaded(&self) -> Result<&Worker> {
        self.worker.as_ref().ok_or(InventoryError::NotLoaded)
    }

    // -- Mutations -----------------------------------------------------------

    /// Replace the whole snapshot and schedule a save.
    pub fn replace(&self, data: InventoryData) -> Result<()> {
        self.ensure_loaded()?;
        self.snapshot.send_replace(data);
        Ok(())
    }

    /// Build the next snapshot from a copy of the current one.
    ///
    /// If `f` fails, the active snapshot is left unchanged and no save is
    /// scheduled.
    pub fn update<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut InventoryData) -> Result<T>,
    {
        self.ensure_loaded()?;
        let mut next = self.snapshot();
        let out = f(&mut next)?;
        self.snapshot.send_replace(next);
        Ok(out)
    }

    /// Apply one UI command. Returns the id of any entity it created.
    pub fn apply(&self, command: InventoryCommand) -> Result<Option<String>> {
        self.update(|data| data.apply(command))
    }

    // -- Persistence control -------------------------------------------------

    /// Persist the current snapshot now, cancelling any pending window.
    pub async fn flush(&self) -> Result<SaveReport> {
        let worker = self.ensure_loaded()?;
        let (reply, rx) = oneshot::channel();
        worker
            .control
            .send(Control::Flush(reply))
            .map_err(|_| InventoryError::Storage("save task is not running".into()))?;
        rx.await
            .map_err(|_| InventoryError::Storage("save task stopped before flushing".into()))
    }

    /// Stop the save task. A pending debounce window is dropped unsaved.
    pub async fn shutdown(mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.control.send(Control::Shutdown);
            if let Err(e) = worker.handle.await {
                tracing::warn!(error = %e, "save task ended abnormally");
            }
        }
    }

    // -- Observation ---------------------------------------------------------

    /// Copy of the active snapshot.
    pub fn snapshot(&self) -> InventoryData {
        self.snapshot.borrow().clone()
    }

    pub fn status(&self) -> SyncStatus {
        *self.shared.status.borrow()
    }

    /// Receiver that observes every status change.
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.shared.status.subscribe()
    }

    /// Receiver that observes the report of every save cycle.
    pub fn subscribe_reports(&self) -> watch::Receiver<Option<SaveReport>> {
        self.shared.reports.subscribe()
    }

    pub fn last_report(&self) -> Option<SaveReport> {
        self.shared.reports.borrow().clone()
    }

    /// Number of save cycles run so far.
    pub fn save_cycles(&self) -> u64 {
        self.shared.cycles.load(Ordering::SeqCst)
    }

    pub fn view(&self) -> InventoryView {
        let sync_status = self.status();
        InventoryView {
            snapshot: self.snapshot(),
            is_loading: sync_status == SyncStatus::Loading,
            sync_status,
            local_ok: self.shared.local_ok.load(Ordering::SeqCst),
        }
    }

    pub fn local_store(&self) -> &LocalStore {
        &self.shared.local
    }

    pub fn backend(&self) -> &Backend {
        &self.shared.backend
    }

    pub fn debounce(&self) -> Duration {
        self.shared.debounce
    }
}

impl Drop for SyncEngine {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.handle.abort();
        }
    }
}

impl fmt::Display for SyncEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SyncEngine(store={}, backend={:?}, status={}, products={})",
            self.shared.local.path().display(),
            self.shared.backend,
            self.status(),
            self.snapshot.borrow().len()
        )
    }
}
