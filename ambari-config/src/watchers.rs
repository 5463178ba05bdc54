// Configuration snapshots and file-change reloading
use crate::document::CheckConfig;
use crate::engine::ConfigEngine;
use crate::error::{ConfigError, Result};
use error_common::ErrorReporter;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Editors tend to produce several events per save
pub const RELOAD_DEBOUNCE: Duration = Duration::from_millis(200);

/// Holds the current configuration and publishes replacements.
///
/// Snapshots are immutable; a reload swaps in a new `Arc<CheckConfig>`.
pub struct ConfigStore {
    engine: ConfigEngine,
    sender: watch::Sender<Arc<CheckConfig>>,
}

impl ConfigStore {
    /// Builds the first snapshot.
    ///
    /// # Errors
    ///
    /// Fails when the engine cannot produce a configuration at all.
    pub fn open(engine: ConfigEngine) -> Result<Self> {
        let config = engine.build()?;
        let (sender, _receiver) = watch::channel(Arc::new(config));
        Ok(Self { engine, sender })
    }

    pub fn current(&self) -> Arc<CheckConfig> {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<CheckConfig>> {
        self.sender.subscribe()
    }

    pub fn engine(&self) -> &ConfigEngine {
        &self.engine
    }

    /// Rebuilds the configuration and publishes it.
    ///
    /// On failure the previous snapshot stays current and the error is returned.
    pub fn reload(&self) -> Result<Arc<CheckConfig>> {
        let config = Arc::new(self.engine.reload()?);
        ErrorReporter::new("ambari-config").report_all(config.diagnostics.iter());
        self.sender.send_replace(config.clone());
        Ok(config)
    }
}

/// Reloads a [`ConfigStore`] whenever its configuration file changes.
///
/// Must be created inside a tokio runtime. Watching stops when dropped.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl ConfigWatcher {
    pub fn spawn(store: Arc<ConfigStore>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(OsString::from)
            .ok_or_else(|| ConfigError::WatcherError(format!("{} is not a file path", path.display())))?;
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (events, mut received) = mpsc::unbounded_channel::<()>();
        let mut watcher = notify::recommended_watcher(move |event: notify::Result<Event>| match event {
            Ok(event) if concerns(&event, &file_name) => {
                let _ = events.send(());
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Configuration watch error: {}", e),
        })
        .map_err(|e| ConfigError::WatcherError(e.to_string()))?;

        // The parent is watched so that files replaced by rename are still seen
        watcher
            .watch(&directory, RecursiveMode::NonRecursive)
            .map_err(|e| ConfigError::WatcherError(format!("{}: {}", directory.display(), e)))?;

        let watched = path.display().to_string();
        tracing::info!(path = %watched, "Watching configuration file");

        let task = tokio::spawn(async move {
            while received.recv().await.is_some() {
                tokio::time::sleep(RELOAD_DEBOUNCE).await;
                while received.try_recv().is_ok() {}

                let reloading = store.clone();
                match tokio::task::spawn_blocking(move || reloading.reload()).await {
                    Ok(Ok(config)) => tracing::info!(
                        path = %watched,
                        valid = config.valid_instances().count(),
                        failed = config.failed_instances().count(),
                        "Configuration reloaded"
                    ),
                    // Parse errors can quote the offending value
                    Ok(Err(e)) => logger_redacted::redacted_error!(
                        "Reload of {} failed [{}], keeping previous configuration: {}",
                        watched,
                        e.code(),
                        e
                    ),
                    Err(e) => tracing::error!(path = %watched, "Reload task failed: {}", e),
                }
            }
        });

        Ok(Self {
            _watcher: watcher,
            task,
        })
    }
}

impl Drop for ConfigWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn concerns(event: &Event, file_name: &OsString) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event
            .paths
            .iter()
            .any(|path| path.file_name() == Some(file_name.as_os_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::FileProvider;

    fn store_for(path: &Path) -> ConfigStore {
        let engine = ConfigEngine::for_ambari().unwrap().add_source(FileProvider::new(path));
        ConfigStore::open(engine).unwrap()
    }

    #[test]
    fn test_failed_reload_keeps_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf.yaml");
        std::fs::write(&path, "instances:\n  - url: http://one:8080\n").unwrap();

        let store = store_for(&path);
        let before = store.current();

        std::fs::write(&path, "init_config: {}\n").unwrap();
        assert!(matches!(store.reload(), Err(ConfigError::ParseError(_))));
        assert!(Arc::ptr_eq(&before, &store.current()));
    }

    #[test]
    fn test_reload_publishes_to_subscribers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf.yaml");
        std::fs::write(&path, "instances:\n  - url: http://one:8080\n").unwrap();

        let store = store_for(&path);
        let mut receiver = store.subscribe();
        assert!(!receiver.has_changed().unwrap());

        std::fs::write(
            &path,
            "instances:\n  - url: http://one:8080\n  - url: http://two:8080\n",
        )
        .unwrap();
        store.reload().unwrap();

        assert!(receiver.has_changed().unwrap());
        assert_eq!(receiver.borrow_and_update().instances.len(), 2);
    }
}
