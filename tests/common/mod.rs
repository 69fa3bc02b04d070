//! Shared fixtures for the inventory-flow integration tests.
//!
//! Provides a sample snapshot, temp-dir backed stores, an in-process fake
//! remote, and a small axum server standing in for the sheet endpoint.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use inventory_flow::{InventoryData, InventoryError, LocalStore, RemoteStore, Result, SyncEngine};

/// Install a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub const SAMPLE_JSON: &str = r#"[{"id":"p1","name":"Shirt","category":"Tops","variants":[{"id":"v1","name":"Blue","entries":[{"id":"e1","status":"stocked"},{"id":"e2","status":"sold"},{"id":"e3","status":"empty"}]},{"id":"v2","name":"Red","entries":[]}],"updatedAt":"2024-05-01T09:30:00.123Z"},{"id":"p2","name":"Cap","variants":[{"id":"v3","name":"Black","entries":[{"id":"e4","status":"sold"}]}],"updatedAt":"2024-05-02T10:00:00.000Z"}]"#;

/// Two products: "Shirt" (Blue: stocked/sold/empty, Red: no entries) and
/// "Cap" (Black: one sold entry).
pub fn sample_inventory() -> InventoryData {
    serde_json::from_str(SAMPLE_JSON).unwrap()
}

pub fn temp_store() -> (LocalStore, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().unwrap();
    let store = LocalStore::open(tmp_dir.path()).unwrap();
    (store, tmp_dir)
}

/// Local-only engine over `dir` with the default one-second window.
pub fn local_engine(dir: &Path) -> SyncEngine {
    SyncEngine::builder().data_dir(dir).build().unwrap()
}

pub fn remote_engine(dir: &Path, remote: Arc<FakeRemote>) -> SyncEngine {
    SyncEngine::builder()
        .data_dir(dir)
        .remote_store(remote)
        .build()
        .unwrap()
}

// ---------------------------------------------------------------------------
// FakeRemote
// ---------------------------------------------------------------------------

/// In-memory [`RemoteStore`] that records every write.
pub struct FakeRemote {
    /// Snapshot served on read; `None` makes reads fail.
    pub stored: Mutex<Option<InventoryData>>,
    pub writes: Mutex<Vec<InventoryData>>,
    pub fail_writes: AtomicBool,
    pub write_delay: Mutex<Duration>,
    pub read_delay: Mutex<Duration>,
    pub reads: AtomicUsize,
}

impl FakeRemote {
    pub fn with_data(data: InventoryData) -> Arc<Self> {
        Arc::new(Self {
            stored: Mutex::new(Some(data)),
            writes: Mutex::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
            write_delay: Mutex::new(Duration::ZERO),
            read_delay: Mutex::new(Duration::ZERO),
            reads: AtomicUsize::new(0),
        })
    }

    pub fn unreachable() -> Arc<Self> {
        let remote = Self::with_data(InventoryData::default());
        *remote.stored.lock().unwrap() = None;
        remote
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }

    pub fn set_write_delay(&self, delay: Duration) {
        *self.write_delay.lock().unwrap() = delay;
    }

    pub fn set_read_delay(&self, delay: Duration) {
        *self.read_delay.lock().unwrap() = delay;
    }

    pub fn writes(&self) -> Vec<InventoryData> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteStore for FakeRemote {
    async fn read(&self) -> Result<InventoryData> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let delay = *self.read_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let stored = self.stored.lock().unwrap().clone();
        stored.ok_or_else(|| InventoryError::Http {
            status: 503,
            body: "unavailable".into(),
        })
    }

    async fn write(&self, data: &InventoryData) -> Result<()> {
        let delay = *self.write_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(InventoryError::Http {
                status: 500,
                body: "sheet error".into(),
            });
        }
        self.writes.lock().unwrap().push(data.clone());
        *self.stored.lock().unwrap() = Some(data.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "fake".to_string()
    }
}

// ---------------------------------------------------------------------------
// SheetServer
// ---------------------------------------------------------------------------

/// What the fake sheet endpoint serves and has received.
pub struct SheetState {
    pub body: String,
    pub get_status: StatusCode,
    pub post_status: StatusCode,
    pub posts: Vec<String>,
}

type SharedSheet = Arc<Mutex<SheetState>>;

/// Axum server on an ephemeral port answering `GET`/`POST /exec`.
pub struct SheetServer {
    pub url: String,
    pub state: SharedSheet,
    handle: tokio::task::JoinHandle<()>,
}

impl SheetServer {
    pub async fn spawn(body: &str) -> Self {
        let state = Arc::new(Mutex::new(SheetState {
            body: body.to_string(),
            get_status: StatusCode::OK,
            post_status: StatusCode::OK,
            posts: Vec::new(),
        }));

        let app = Router::new()
            .route("/exec", get(get_sheet).post(post_sheet))
            .with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}/exec", addr),
            state,
            handle,
        }
    }

    pub fn set_get_status(&self, status: StatusCode) {
        self.state.lock().unwrap().get_status = status;
    }

    pub fn set_post_status(&self, status: StatusCode) {
        self.state.lock().unwrap().post_status = status;
    }

    pub fn posts(&self) -> Vec<String> {
        self.state.lock().unwrap().posts.clone()
    }
}

impl Drop for SheetServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn get_sheet(State(state): State<SharedSheet>) -> (StatusCode, String) {
    let state = state.lock().unwrap();
    (state.get_status, state.body.clone())
}

async fn post_sheet(State(state): State<SharedSheet>, body: String) -> StatusCode {
    let mut state = state.lock().unwrap();
    if state.post_status.is_success() {
        state.body = body.clone();
    }
    state.posts.push(body);
    state.post_status
}
