use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

use super::{validate, PropertyError, PropertyStore};

/// Property store persisted as a flat JSON object on disk
pub struct FilePropertyStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FilePropertyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Default store location under the user's home directory
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let mut path = PathBuf::from(home);
        path.push(".dacctl");
        path.push("properties.json");
        path
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, PropertyError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(PropertyError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&content).map_err(|source| PropertyError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Replace the store file atomically so readers never see a partial write
    fn save(&self, values: &BTreeMap<String, String>) -> Result<(), PropertyError> {
        let io_err = |source| PropertyError::Io {
            path: self.path.clone(),
            source,
        };

        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content = serde_json::to_string_pretty(values).map_err(|source| PropertyError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        let mut staged = NamedTempFile::new_in(parent).map_err(io_err)?;
        staged.write_all(content.as_bytes()).map_err(io_err)?;
        staged.as_file().sync_all().map_err(io_err)?;
        staged.persist(&self.path).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}

impl PropertyStore for FilePropertyStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.load() {
            Ok(values) => values.get(key).cloned(),
            Err(e) => {
                warn!("Could not read property {}: {}", key, e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PropertyError> {
        validate(key, value)?;

        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values)?;

        debug!("Property {} = {} saved to {:?}", key, value, self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    #[test]
    fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("properties.json");

        let store = FilePropertyStore::new(&path);
        assert_eq!(store.get("persist.a"), None);
        store.set("persist.a", "-10").unwrap();
        store.set("persist.b", "2").unwrap();

        let reopened = FilePropertyStore::new(&path);
        assert_eq!(reopened.get("persist.a").as_deref(), Some("-10"));
        assert_eq!(reopened.get("persist.b").as_deref(), Some("2"));
    }

    #[test]
    fn test_corrupt_file_reads_as_absent_and_refuses_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("properties.json");
        fs::write(&path, "{ broken").unwrap();

        let store = FilePropertyStore::new(&path);
        assert_eq!(store.get("persist.a"), None);
        assert!(matches!(
            store.set("persist.a", "1"),
            Err(PropertyError::Corrupt { .. })
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ broken");
    }

    #[test]
    fn test_reads_never_see_partial_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("properties.json");
        let store = Arc::new(FilePropertyStore::new(&path));
        store.set("persist.a", "-7").unwrap();

        let writer = {
            let store = store.clone();
            thread::spawn(move || {
                for i in 0..500 {
                    store.set("persist.b", &i.to_string()).unwrap();
                }
            })
        };

        let mut misses = 0;
        while !writer.is_finished() {
            if store.get("persist.a").as_deref() != Some("-7") {
                misses += 1;
            }
        }
        writer.join().unwrap();

        assert_eq!(misses, 0);
        assert_eq!(store.get("persist.b").as_deref(), Some("499"));
    }

    #[test]
    fn test_save_leaves_no_staging_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("properties.json");
        let store = FilePropertyStore::new(&path);
        store.set("persist.a", "1").unwrap();
        store.set("persist.a", "2").unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(store.path(), path.as_path());
    }

    #[test]
    fn test_invalid_key_is_not_written() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("properties.json");
        let store = FilePropertyStore::new(&path);

        assert!(store.set("bad key", "1").is_err());
        assert!(!path.exists());
    }
}
