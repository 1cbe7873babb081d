pub mod file;
pub mod memory;

pub use file::FilePropertyStore;
pub use memory::MemoryPropertyStore;

use log::warn;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Longest value a property may hold (`PROP_VALUE_MAX` minus the terminator)
pub const PROPERTY_VALUE_MAX: usize = 91;

#[derive(Debug, Error)]
pub enum PropertyError {
    #[error("invalid property name: {0:?}")]
    InvalidKey(String),
    #[error("value for {key} exceeds {max} bytes", max = PROPERTY_VALUE_MAX)]
    ValueTooLong { key: String },
    #[error("property store I/O on {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("corrupt property store {path:?}: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Persistent string key/value cache that survives service restarts
#[cfg_attr(test, mockall::automock)]
pub trait PropertyStore: Send + Sync {
    /// Current value of `key`, if set
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`
    fn set(&self, key: &str, value: &str) -> Result<(), PropertyError>;
}

/// Check the naming and size limits every backend enforces
pub(crate) fn validate(key: &str, value: &str) -> Result<(), PropertyError> {
    if key.is_empty() || key.chars().any(char::is_whitespace) {
        return Err(PropertyError::InvalidKey(key.to_string()));
    }
    if value.len() > PROPERTY_VALUE_MAX {
        return Err(PropertyError::ValueTooLong {
            key: key.to_string(),
        });
    }
    Ok(())
}

/// Read `key` as an `i32`, returning `default` when absent or unparsable
pub fn get_int32(store: &dyn PropertyStore, key: &str, default: i32) -> i32 {
    let Some(raw) = store.get(key) else {
        return default;
    };

    match raw.trim().parse::<i32>() {
        Ok(value) => value,
        Err(e) => {
            warn!("Ignoring malformed value {:?} for {}: {}", raw, key, e);
            default
        }
    }
}

/// Store an `i32` as its decimal string
pub fn set_int32(store: &dyn PropertyStore, key: &str, value: i32) -> Result<(), PropertyError> {
    store.set(key, &value.to_string())
}
