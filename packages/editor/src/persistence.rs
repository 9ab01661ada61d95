//! # Persistence
//!
//! Key-value storage backends and the periodic auto-save task.
//!
//! Auto-save writes the forest in tree form (roots with nested children) under
//! [`AUTOSAVE_KEY`]. The task reads whatever forest was last published, so a
//! save may lag the live state by up to one interval.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};
use wb_common::ComponentNode;

use crate::errors::BuilderError;

pub const AUTOSAVE_KEY: &str = "wb-autosave";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, BuilderError>;

    fn set(&self, key: &str, value: &str) -> Result<(), BuilderError>;

    fn remove(&self, key: &str) -> Result<(), BuilderError>;
}

/// In-memory store, cloneable handle to shared contents
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, BuilderError> {
        self.entries
            .lock()
            .map_err(|_| BuilderError::Storage("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, BuilderError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BuilderError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), BuilderError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, BuilderError> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BuilderError> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::write(self.path(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), BuilderError> {
        match std::fs::remove_file(self.path(key)) {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

/// Read the auto-saved forest, if any
pub fn load_forest(store: &dyn KeyValueStore) -> Result<Option<Vec<ComponentNode>>, BuilderError> {
    match store.get(AUTOSAVE_KEY)? {
        Some(data) => Ok(Some(ComponentNode::from_json_array(&data)?)),
        None => Ok(None),
    }
}

/// Running auto-save task. Stops on [`AutoSaveHandle::stop`] or drop.
#[derive(Debug)]
pub struct AutoSaveHandle {
    task: JoinHandle<()>,
}

impl AutoSaveHandle {
    pub fn stop(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for AutoSaveHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn the auto-save loop on the current tokio runtime
///
/// The first write happens one `period` after spawning. The loop ends on its
/// own once the publishing side of `forest` is dropped.
pub fn spawn_auto_save(
    store: Arc<dyn KeyValueStore>,
    mut forest: watch::Receiver<Arc<Vec<ComponentNode>>>,
    period: Duration,
) -> Result<AutoSaveHandle, BuilderError> {
    let runtime = Handle::try_current()
        .map_err(|err| BuilderError::Config(format!("auto-save needs a tokio runtime: {}", err)))?;

    let task = runtime.spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        // The forest present at spawn time has not been written yet
        let mut pending = true;

        loop {
            ticker.tick().await;
            match forest.has_changed() {
                Err(_) => {
                    debug!("Auto-save source dropped, stopping");
                    break;
                }
                Ok(false) if !pending => continue,
                Ok(_) => {}
            }

            let nodes = forest.borrow_and_update().clone();
            let result = ComponentNode::to_json_array(&nodes, false)
                .map_err(BuilderError::from)
                .and_then(|json| store.set(AUTOSAVE_KEY, &json));

            pending = result.is_err();
            match result {
                Ok(()) => debug!(roots = nodes.len(), "Auto-saved"),
                Err(err) => warn!(error = %err, "Auto-save failed"),
            }
        }
    });

    Ok(AutoSaveHandle { task })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v").unwrap();
        assert_eq!(store.clone().get("k").unwrap(), Some("v".to_string()));

        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("saves"));

        assert_eq!(store.get(AUTOSAVE_KEY).unwrap(), None);
        store.set(AUTOSAVE_KEY, "[]").unwrap();
        assert!(dir.path().join("saves/wb-autosave.json").exists());
        assert_eq!(store.get(AUTOSAVE_KEY).unwrap(), Some("[]".to_string()));

        store.remove(AUTOSAVE_KEY).unwrap();
        store.remove(AUTOSAVE_KEY).unwrap();
        assert_eq!(store.get(AUTOSAVE_KEY).unwrap(), None);
    }

    #[test]
    fn test_load_forest() {
        let store = MemoryStore::new();
        assert!(load_forest(&store).unwrap().is_none());

        store
            .set(AUTOSAVE_KEY, r#"[{"id": "a", "type": "text"}]"#)
            .unwrap();
        assert_eq!(load_forest(&store).unwrap().unwrap()[0].id, "a");
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_save_writes_each_interval() {
        let store = MemoryStore::new();
        let (tx, rx) = watch::channel(Arc::new(Vec::new()));
        let handle = spawn_auto_save(Arc::new(store.clone()), rx, Duration::from_secs(30)).unwrap();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(store.get(AUTOSAVE_KEY).unwrap(), None);

        tx.send_replace(Arc::new(vec![ComponentNode::new("text").with_id("t")]));
        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(load_forest(&store).unwrap().unwrap()[0].id, "t");

        handle.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_save_skips_unchanged_forest() {
        let store = MemoryStore::new();
        let (tx, rx) = watch::channel(Arc::new(vec![ComponentNode::new("text").with_id("a")]));
        let handle = spawn_auto_save(Arc::new(store.clone()), rx, Duration::from_secs(1)).unwrap();

        // initial forest is written on the first interval
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(load_forest(&store).unwrap().unwrap()[0].id, "a");

        store.remove(AUTOSAVE_KEY).unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(store.get(AUTOSAVE_KEY).unwrap(), None);

        tx.send_replace(Arc::new(vec![ComponentNode::new("text").with_id("b")]));
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(load_forest(&store).unwrap().unwrap()[0].id, "b");

        handle.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_save_stops_when_source_dropped() {
        let store = MemoryStore::new();
        let (tx, rx) = watch::channel(Arc::new(Vec::new()));
        let handle = spawn_auto_save(Arc::new(store.clone()), rx, Duration::from_secs(1)).unwrap();

        drop(tx);
        tokio::time::sleep(Duration::from_millis(2_500)).await;

        assert!(handle.is_finished());
        assert_eq!(store.get(AUTOSAVE_KEY).unwrap(), None);
    }

    #[test]
    fn test_spawn_without_runtime_fails() {
        let (_tx, rx) = watch::channel(Arc::new(Vec::new()));
        let result = spawn_auto_save(Arc::new(MemoryStore::new()), rx, Duration::from_secs(1));
        assert!(matches!(result, Err(BuilderError::Config(_))));
    }
}
