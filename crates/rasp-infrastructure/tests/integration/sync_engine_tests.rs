//! Sync engine boot and reload tests

use crate::test_utils::{raw, store, write_document};
use async_trait::async_trait;
use rasp_domain::error::{Error, Result};
use rasp_domain::ports::{RemoteConfigSource, SharedRemoteConfigSource};
use rasp_domain::{ConfigEvent, ConfigSnapshot, ConfigSource, RawConfigMap};
use rasp_infrastructure::sync::{AgentLayout, RemoteSourceFactory, SyncEngine, SyncMode};
use rasp_infrastructure::task::TaskState;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::broadcast::error::TryRecvError;

const RASP_ID: &str = "abcdefghij0123456789";

struct StaticRemote {
    config: RawConfigMap,
    fetches: AtomicU64,
}

#[async_trait]
impl RemoteConfigSource for StaticRemote {
    async fn fetch(&self) -> Result<RawConfigMap> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.config.clone())
    }

    fn source_name(&self) -> &str {
        "static"
    }
}

struct UnreachableRemote;

#[async_trait]
impl RemoteConfigSource for UnreachableRemote {
    async fn fetch(&self) -> Result<RawConfigMap> {
        Err(Error::transient_sync("connection refused"))
    }

    fn source_name(&self) -> &str {
        "unreachable"
    }
}

fn no_remote() -> RemoteSourceFactory {
    Box::new(|_: &ConfigSnapshot| -> Result<SharedRemoteConfigSource> {
        Err(Error::internal("remote source not expected in standalone mode"))
    })
}

fn remote(source: SharedRemoteConfigSource) -> RemoteSourceFactory {
    Box::new(move |_: &ConfigSnapshot| -> Result<SharedRemoteConfigSource> { Ok(source) })
}

fn wait_until<F: Fn() -> bool>(condition: F) -> bool {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(25));
    }
    condition()
}

#[test]
fn test_standalone_boot_applies_document() {
    let dir = tempfile::tempdir().unwrap();
    write_document(dir.path(), "block.status_code: 403\nclientip.header: X-Real-IP\n");

    let store = store();
    let engine =
        SyncEngine::boot(store.clone(), AgentLayout::new(dir.path()), no_remote()).unwrap();

    assert_eq!(engine.mode(), SyncMode::Standalone);
    assert!(engine.heartbeat().is_none());
    assert_eq!(engine.watcher().unwrap().watched().len(), 3);
    let snapshot = store.snapshot();
    assert_eq!(snapshot.block_status_code, 403);
    assert_eq!(snapshot.client_ip_header, "X-Real-IP");
    assert!(dir.path().join("assets").is_dir());
}

#[test]
fn test_missing_document_boots_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = store();
    let _engine =
        SyncEngine::boot(store.clone(), AgentLayout::new(dir.path()), no_remote()).unwrap();
    assert_eq!(store.snapshot().block_status_code, 302);
}

#[test]
fn test_malformed_document_boots_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    write_document(dir.path(), "block.status_code: [403\n");
    let store = store();
    let engine = SyncEngine::boot(store.clone(), AgentLayout::new(dir.path()), no_remote());
    assert!(engine.is_ok());
    assert_eq!(store.snapshot().block_status_code, 302);
}

#[test]
fn test_bad_rasp_id_aborts_boot() {
    let dir = tempfile::tempdir().unwrap();
    write_document(dir.path(), "rasp.id: short-id\n");
    let err = SyncEngine::boot(store(), AgentLayout::new(dir.path()), no_remote()).unwrap_err();
    assert!(matches!(err, Error::CriticalBoot { .. }));
    assert!(err.is_fatal());
}

#[test]
fn test_manual_reload_publishes_event() {
    let dir = tempfile::tempdir().unwrap();
    write_document(dir.path(), "block.status_code: 403\n");
    let store = store();
    let engine =
        SyncEngine::boot(store.clone(), AgentLayout::new(dir.path()), no_remote()).unwrap();
    let mut events = engine.subscribe();

    write_document(dir.path(), "block.status_code: 500\ncpu.usage.percent: 15\n");
    let report = engine.reload_file();
    assert_eq!(store.snapshot().block_status_code, 500);
    assert_eq!(store.snapshot().cpu_usage_percent, 90);

    // The watcher may publish its own reloads too; find the manual one
    let mut found = false;
    loop {
        match events.try_recv() {
            Ok(ConfigEvent::Reloaded {
                source,
                generation,
                rejected,
            }) if generation == report.generation => {
                assert_eq!(source, ConfigSource::File);
                assert_eq!(rejected, vec!["cpu.usage.percent".to_string()]);
                found = true;
            }
            Ok(_) | Err(TryRecvError::Lagged(_)) => {}
            Err(_) => break,
        }
    }
    assert!(found);
}

#[test]
fn test_file_change_triggers_reload() {
    let dir = tempfile::tempdir().unwrap();
    write_document(dir.path(), "block.status_code: 403\n");
    let store = store();
    let _engine =
        SyncEngine::boot(store.clone(), AgentLayout::new(dir.path()), no_remote()).unwrap();

    write_document(dir.path(), "block.status_code: 404\n");
    assert!(wait_until(|| store.snapshot().block_status_code == 404));
}

#[test]
fn test_recreated_conf_dir_keeps_reloading() {
    let dir = tempfile::tempdir().unwrap();
    write_document(dir.path(), "block.status_code: 403\n");
    let store = store();
    let _engine =
        SyncEngine::boot(store.clone(), AgentLayout::new(dir.path()), no_remote()).unwrap();

    std::fs::remove_dir_all(dir.path().join("conf")).unwrap();
    assert!(wait_until(|| store.snapshot().block_status_code == 302));

    write_document(dir.path(), "block.status_code: 404\n");
    assert!(wait_until(|| store.snapshot().block_status_code == 404));

    // Only a watch on the new directory sees this edit
    write_document(dir.path(), "block.status_code: 405\n");
    assert!(wait_until(|| store.snapshot().block_status_code == 405));
}

#[test]
fn test_custom_page_follows_assets_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = store();
    let engine =
        SyncEngine::boot(store, AgentLayout::new(dir.path()), no_remote()).unwrap();
    assert!(engine.custom_page().get().is_none());

    let page = engine.custom_page().path().to_path_buf();
    std::fs::write(&page, "<script>alert(1)</script>").unwrap();
    assert!(wait_until(|| engine.custom_page().get().is_some()));
    assert_eq!(
        engine.custom_page().get().unwrap().as_str(),
        "<script>alert(1)</script>"
    );

    std::fs::remove_file(&page).unwrap();
    assert!(wait_until(|| engine.custom_page().get().is_none()));
}

#[test]
fn test_mode_is_fixed_at_boot() {
    let dir = tempfile::tempdir().unwrap();
    write_document(dir.path(), "cloud.enable: false\n");
    let store = store();
    let engine =
        SyncEngine::boot(store.clone(), AgentLayout::new(dir.path()), no_remote()).unwrap();

    write_document(dir.path(), "cloud.enable: true\ncloud.backend_url: http://127.0.0.1:1\n");
    engine.reload_file();
    assert!(store.snapshot().cloud_enable);
    assert_eq!(engine.mode(), SyncMode::Standalone);
    assert!(engine.heartbeat().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_managed_boot_polls_remote() {
    let dir = tempfile::tempdir().unwrap();
    write_document(
        dir.path(),
        &format!(
            "cloud.enable: true\ncloud.heartbeat_interval: 10\nrasp.id: {}\nblock.status_code: 403\n",
            RASP_ID
        ),
    );
    let source = Arc::new(StaticRemote {
        config: raw(json!({
            "block.status_code": 500,
            "rasp.id": "zzzzzzzzzzzzzzzzzzzz",
            "cloud.enable": false
        })),
        fetches: AtomicU64::new(0),
    });
    let seen = Arc::new(Mutex::new(None));
    let seen_in_factory = seen.clone();
    let source_for_factory: SharedRemoteConfigSource = source.clone();
    let factory: RemoteSourceFactory =
        Box::new(move |snapshot: &ConfigSnapshot| -> Result<SharedRemoteConfigSource> {
            *seen_in_factory.lock().unwrap() = Some(snapshot.heartbeat_interval);
            Ok(source_for_factory)
        });

    let store = store();
    let mut engine = SyncEngine::boot(store.clone(), AgentLayout::new(dir.path()), factory).unwrap();
    assert_eq!(engine.mode(), SyncMode::Managed);
    assert!(engine.watcher().is_none());
    assert_eq!(*seen.lock().unwrap(), Some(10));

    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    let snapshot = store.snapshot();
    assert_eq!(snapshot.block_status_code, 500);
    assert_eq!(snapshot.rasp_id, RASP_ID);
    assert!(snapshot.cloud_enable);

    tokio::time::sleep(Duration::from_secs(25)).await;
    assert_eq!(source.fetches.load(Ordering::SeqCst), 3);

    engine.shutdown();
    assert_eq!(engine.heartbeat().unwrap().state(), TaskState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_failures_skip_the_tick() {
    let dir = tempfile::tempdir().unwrap();
    write_document(dir.path(), "cloud.enable: true\nblock.status_code: 403\n");
    let store = store();
    let engine = SyncEngine::boot(
        store.clone(),
        AgentLayout::new(dir.path()),
        remote(Arc::new(UnreachableRemote)),
    )
    .unwrap();
    let mut events = engine.subscribe();

    tokio::time::sleep(Duration::from_secs(200)).await;
    let heartbeat = engine.heartbeat().unwrap();
    assert!(heartbeat.is_alive());
    assert_eq!(heartbeat.stats().failures, 3);
    assert_eq!(store.snapshot().block_status_code, 403);
    assert!(matches!(
        events.try_recv(),
        Ok(ConfigEvent::ReloadFailed(_))
    ));
}
