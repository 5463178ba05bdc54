/// Reload tests for `ConfigStore` and `ConfigWatcher`
///
/// These touch the filesystem and rely on native file notifications, so
/// they wait with generous timeouts.

use ambari_config::{ConfigEngine, ConfigStore, ConfigWatcher, FileProvider};
use std::sync::Arc;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(10);

fn open_store(path: &std::path::Path) -> Arc<ConfigStore> {
    let engine = ConfigEngine::for_ambari().unwrap().add_source(FileProvider::new(path));
    Arc::new(ConfigStore::open(engine).unwrap())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_file_change_publishes_new_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf.yaml");
    std::fs::write(&path, "instances:\n  - url: http://one:8080\n").unwrap();

    let store = open_store(&path);
    let mut updates = store.subscribe();
    let _watcher = ConfigWatcher::spawn(store.clone(), &path).unwrap();

    std::fs::write(
        &path,
        "init_config:\n  collect_service_status: true\ninstances:\n  - url: http://one:8080\n  - url: http://two:8080\n",
    )
    .unwrap();

    tokio::time::timeout(WAIT, updates.changed()).await.unwrap().unwrap();
    let config = updates.borrow_and_update().clone();
    assert_eq!(config.instances.len(), 2);
    assert!(config.init.collect_service_status);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_broken_file_keeps_last_good_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf.yaml");
    std::fs::write(&path, "instances:\n  - url: http://one:8080\n").unwrap();

    let store = open_store(&path);
    let before = store.current();
    let _watcher = ConfigWatcher::spawn(store.clone(), &path).unwrap();

    std::fs::write(&path, "instances: [\n").unwrap();
    tokio::time::sleep(Duration::from_millis(800)).await;

    assert!(Arc::ptr_eq(&before, &store.current()));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_other_files_in_directory_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf.yaml");
    std::fs::write(&path, "instances:\n  - url: http://one:8080\n").unwrap();

    let store = open_store(&path);
    let updates = store.subscribe();
    let _watcher = ConfigWatcher::spawn(store.clone(), &path).unwrap();

    std::fs::write(dir.path().join("notes.txt"), "unrelated").unwrap();
    tokio::time::sleep(Duration::from_millis(800)).await;

    assert!(!updates.has_changed().unwrap());
}
