//! Key-value persistence behind the token and session stores.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::Context;
use tempfile::NamedTempFile;

/// String key-value capability (the browser-storage equivalent).
///
/// Implementations must be `Send + Sync`; concurrent writers are
/// last-write-wins per key.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;

    fn remove(&self, key: &str) -> anyhow::Result<()>;
}

/// Process-local store. Never fails.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// JSON-object file store.
///
/// The whole map is re-read on every access and rewritten on every change,
/// so several processes pointing at the same file see each other's writes.
/// A missing file reads as empty; a corrupt file is an error.
///
/// Writes go to a sibling temp file that is renamed over the store, so a
/// reader sees either the old map or the new one, never a partial file.
/// Writers in separate processes are not serialized against each other; the
/// last rename wins for the whole map.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Held for every read and for whole read-modify-write cycles.
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read_map(&self) -> anyhow::Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read store file at {:?}", self.path))?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&raw)
            .with_context(|| format!("store file at {:?} is not a JSON string map", self.path))
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> anyhow::Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create store directory at {:?}", parent))?;

        let mut staged = NamedTempFile::new_in(parent)
            .with_context(|| format!("failed to stage store file in {:?}", parent))?;
        serde_json::to_writer_pretty(&mut staged, map).context("failed to serialize store")?;
        staged
            .as_file()
            .sync_all()
            .with_context(|| format!("failed to flush staged store file for {:?}", self.path))?;
        staged
            .persist(&self.path)
            .with_context(|| format!("failed to replace store file at {:?}", self.path))?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

/// `<data_dir>/entbridge/store.json`, falling back to `~/.local/share`.
pub fn default_store_path() -> anyhow::Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")))
        .context("failed to resolve app data directory (tried data_dir and home_dir/.local/share)")?;

    Ok(base.join("entbridge").join("store.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));

        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let first = FileStore::new(&path);
        assert_eq!(first.get("Token").unwrap(), None);
        first.set("Token", "abc").unwrap();
        first.set("userInfo", r#"{"name":"Ada"}"#).unwrap();

        let second = FileStore::new(&path);
        assert_eq!(second.get("Token").unwrap().as_deref(), Some("abc"));
        second.remove("Token").unwrap();

        assert_eq!(first.get("Token").unwrap(), None);
        assert!(first.get("userInfo").unwrap().is_some());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "not json").unwrap();

        let store = FileStore::new(file.path());
        let err = store.get("Token").unwrap_err();
        assert!(err.to_string().contains("not a JSON string map"));
        assert!(store.set("Token", "x").is_err());
    }

    #[test]
    fn empty_file_reads_as_empty() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let store = FileStore::new(file.path());
        assert_eq!(store.get("anything").unwrap(), None);
    }

    #[test]
    fn other_keys_stay_readable_while_one_is_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        FileStore::new(&path).set("Authorization", "auth-1").unwrap();

        // Two handles on one file: the reader never shares the writer's lock.
        let writer = FileStore::new(&path);
        let reader = FileStore::new(&path);
        let big = "t".repeat(64 * 1024);

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for i in 0..100 {
                    writer.set("enterprise_token", &format!("{i}-{big}")).unwrap();
                }
            });

            for _ in 0..2_000 {
                assert_eq!(reader.get("Authorization").unwrap().as_deref(), Some("auth-1"));
            }
        });

        let last = reader.get("enterprise_token").unwrap().unwrap();
        assert!(last.starts_with("99-"));
    }

    #[test]
    fn rewrite_leaves_no_staging_files_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("store.json"));
        store.set("Token", "a").unwrap();
        store.set("Token", "b").unwrap();
        store.remove("Token").unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn default_path_ends_with_app_dir() {
        if let Ok(path) = default_store_path() {
            assert!(path.ends_with("entbridge/store.json"));
        }
    }
}
