//! End-to-end scenarios: engine, local store and HTTP remote together,
//! running on the real clock against a local sheet server.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use inventory_flow::{
    EntryStatus, InventoryCommand, InventoryData, LoadSource, SaveReport, SyncEngine, SyncStatus,
};
use tokio::sync::watch;

const WINDOW: Duration = Duration::from_millis(50);

fn http_engine(dir: &std::path::Path, url: &str) -> SyncEngine {
    SyncEngine::builder()
        .data_dir(dir)
        .remote_endpoint(url)
        .debounce(WINDOW)
        .remote_timeout(Duration::from_secs(2))
        .build()
        .unwrap()
}

/// Wait for the next save cycle report.
async fn next_report(reports: &mut watch::Receiver<Option<SaveReport>>) -> SaveReport {
    tokio::time::timeout(Duration::from_secs(5), reports.changed())
        .await
        .expect("no save cycle within five seconds")
        .unwrap();
    reports.borrow_and_update().clone().unwrap()
}

#[tokio::test]
async fn shirt_scenario_reaches_both_stores() {
    common::init_tracing();
    let tmp = tempfile::tempdir().unwrap();
    let srv = common::SheetServer::spawn("[]").await;
    let mut engine = http_engine(tmp.path(), &srv.url);
    let mut reports = engine.subscribe_reports();

    assert!(engine.load().await.is_empty());
    assert_eq!(engine.loaded_from(), Some(LoadSource::Remote));

    let shirt = engine
        .apply(InventoryCommand::AddProduct {
            name: "Shirt".into(),
            category: None,
        })
        .unwrap()
        .unwrap();
    assert_eq!(engine.snapshot().len(), 1);
    assert!(engine.snapshot().products[0].variants.is_empty());

    let blue = engine
        .apply(InventoryCommand::AddVariant {
            product_id: shirt.clone(),
            name: "Blue".into(),
        })
        .unwrap()
        .unwrap();
    let snapshot = engine.snapshot();
    let variant = snapshot.product(&shirt).unwrap().variant(&blue).unwrap();
    assert_eq!(variant.entries.len(), 5);
    let entry = variant.entries[0].id.clone();

    for _ in 0..2 {
        engine
            .apply(InventoryCommand::CycleEntry {
                product_id: shirt.clone(),
                variant_id: blue.clone(),
                entry_id: entry.clone(),
            })
            .unwrap();
    }
    let snapshot = engine.snapshot();
    let status = snapshot.product(&shirt).unwrap().variant(&blue).unwrap().entry(&entry).unwrap().status;
    assert_eq!(status, EntryStatus::Sold);

    engine
        .apply(InventoryCommand::RemoveEntry {
            product_id: shirt.clone(),
            variant_id: blue.clone(),
            entry_id: entry,
        })
        .unwrap();

    let report = next_report(&mut reports).await;
    assert!(report.is_clean());

    let expected = engine.snapshot();
    assert_eq!(expected.product(&shirt).unwrap().variant(&blue).unwrap().entries.len(), 4);
    assert_eq!(engine.local_store().load(), Some(expected.clone()));

    let posts = srv.posts();
    let last: InventoryData = serde_json::from_str(posts.last().unwrap()).unwrap();
    assert_eq!(last, expected);

    engine.shutdown().await;
}

#[tokio::test]
async fn http_500_on_save_sets_error_until_next_success() {
    let tmp = tempfile::tempdir().unwrap();
    let srv = common::SheetServer::spawn(common::SAMPLE_JSON).await;
    let mut engine = http_engine(tmp.path(), &srv.url);
    let mut reports = engine.subscribe_reports();
    engine.load().await;

    srv.set_post_status(StatusCode::INTERNAL_SERVER_ERROR);
    engine
        .apply(InventoryCommand::DeleteProduct {
            product_id: "p2".into(),
        })
        .unwrap();
    let report = next_report(&mut reports).await;

    assert!(!report.is_clean());
    assert_eq!(engine.status(), SyncStatus::Error);
    assert_eq!(engine.local_store().load(), Some(engine.snapshot()));
    assert_eq!(engine.snapshot().len(), 1);

    srv.set_post_status(StatusCode::OK);
    engine
        .apply(InventoryCommand::RenameProduct {
            product_id: "p1".into(),
            name: "Tee".into(),
        })
        .unwrap();
    let report = next_report(&mut reports).await;

    assert!(report.is_clean());
    assert_eq!(engine.status(), SyncStatus::Idle);
}

#[tokio::test]
async fn unreachable_sheet_falls_back_to_local_copy() {
    let tmp = tempfile::tempdir().unwrap();
    let srv = common::SheetServer::spawn("[]").await;
    srv.set_get_status(StatusCode::BAD_GATEWAY);

    let store = inventory_flow::LocalStore::open(tmp.path()).unwrap();
    assert!(store.save(&common::sample_inventory()));

    let mut engine = http_engine(tmp.path(), &srv.url);
    let data = engine.load().await;

    assert_eq!(data, common::sample_inventory());
    assert_eq!(engine.loaded_from(), Some(LoadSource::Local));
    assert!(srv.posts().is_empty());
}

#[tokio::test]
async fn engine_from_environment_style_config_runs_local_only() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().to_string_lossy().to_string();
    let config = inventory_flow::EngineConfig::from_lookup(move |key| match key {
        inventory_flow::config::ENV_DATA_DIR => Some(dir.clone()),
        inventory_flow::config::ENV_DEBOUNCE_MS => Some("20".into()),
        _ => None,
    })
    .unwrap();

    let mut engine = inventory_flow::SyncEngineBuilder::from_config(config).build().unwrap();
    let mut reports = engine.subscribe_reports();
    engine.load().await;
    engine.replace(common::sample_inventory()).unwrap();

    let report = next_report(&mut reports).await;
    assert_eq!(report.remote, inventory_flow::RemoteOutcome::NotConfigured);
    assert!(engine.to_string().contains("LocalOnly"));
}
