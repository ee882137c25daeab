use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Small persisted string map for panel flags.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Persist `value`. On error the previous value stays visible to `get`.
    async fn set(&self, key: &str, value: &str) -> Result<(), KvError>;

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON object on disk, rewritten on every `set`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
    /// Serializes writers so the file always holds the latest full map.
    write_lock: tokio::sync::Mutex<()>,
}

impl FileStore {
    /// Open `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, KvError> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read(&path) {
            Ok(raw) => serde_json::from_slice(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(KvError::Io(e)),
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
            write_lock: tokio::sync::Mutex::new(()),
        })
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        let _writer = self.write_lock.lock().await;

        let mut next = self.entries().clone();
        next.insert(key.to_string(), value.to_string());
        let raw = serde_json::to_vec_pretty(&next)?;
        tokio::fs::write(&self.path, raw).await?;

        // Visible only once it is on disk.
        *self.entries() = next;
        tracing::debug!(key, path = %self.path.display(), "State flag persisted");
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum KvError {
    #[error("State file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("State file is not a JSON object: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_memory_store_get_set_has() {
        let store = MemoryStore::new();
        assert!(!store.has("backgroundImageSet"));
        store.set("backgroundImageSet", "true").await.unwrap();
        assert!(store.has("backgroundImageSet"));
        assert_eq!(store.get("backgroundImageSet").as_deref(), Some("true"));
    }

    #[tokio::test]
    async fn test_file_store_persists_across_opens() {
        let path = std::env::temp_dir().join(format!("future-self-{}.json", Uuid::new_v4()));

        let store = FileStore::open(&path).unwrap();
        assert!(store.get("backgroundImageSet").is_none());
        store.set("backgroundImageSet", "true").await.unwrap();
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("backgroundImageSet").as_deref(), Some("true"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let path = std::env::temp_dir().join(format!("future-self-{}.json", Uuid::new_v4()));
        std::fs::write(&path, b"[1, 2, 3]").unwrap();

        assert!(matches!(FileStore::open(&path), Err(KvError::Serialize(_))));

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_failed_write_leaves_value_unset() {
        let dir = std::env::temp_dir().join(format!("future-self-missing-{}", Uuid::new_v4()));
        let store = FileStore::open(dir.join("state.json")).unwrap();

        let result = store.set("backgroundImageSet", "true").await;
        assert!(matches!(result, Err(KvError::Io(_))));
        assert!(store.get("backgroundImageSet").is_none());
        assert!(!store.has("backgroundImageSet"));
    }
}
