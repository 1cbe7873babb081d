use std::collections::HashMap;
use std::sync::Mutex;

use super::{validate, PropertyError, PropertyStore};

/// Process-local property store, lost on exit
#[derive(Debug, Default)]
pub struct MemoryPropertyStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPropertyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PropertyStore for MemoryPropertyStore {
    fn get(&self, key: &str) -> Option<String> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PropertyError> {
        validate(key, value)?;
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let store = MemoryPropertyStore::new();
        assert_eq!(store.get("persist.a"), None);
        store.set("persist.a", "1").unwrap();
        store.set("persist.a", "2").unwrap();
        assert_eq!(store.get("persist.a").as_deref(), Some("2"));
    }

    #[test]
    fn test_rejected_set_leaves_value() {
        let store = MemoryPropertyStore::new();
        store.set("persist.a", "1").unwrap();
        assert!(store.set("persist.a", &"x".repeat(200)).is_err());
        assert_eq!(store.get("persist.a").as_deref(), Some("1"));
    }
}
