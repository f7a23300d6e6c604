use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::ConsoleError;

/// Storage key holding the session token.
pub const TOKEN_KEY: &str = "console-token";
/// Storage key holding the persisted visited views (JSON).
pub const VISITED_VIEWS_KEY: &str = "console-visited-views";
/// Storage key holding the persisted cached view names (JSON).
pub const CACHED_VIEWS_KEY: &str = "console-cached-views";

// 1. KeyValueStorage Contract
/// KeyValueStorage
///
/// The persisted local storage the console keeps its session token and tag views in.
/// Access is synchronous; an absent value is `Ok(None)`, and any other failure is
/// reported as `ConsoleError::StorageUnavailable` for the caller to downgrade.
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, ConsoleError>;

    fn set(&self, key: &str, value: &str) -> Result<(), ConsoleError>;

    /// Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), ConsoleError>;
}

/// StorageState
///
/// The shared handle every store receives.
pub type StorageState = Arc<dyn KeyValueStorage>;

// 2. The Real Implementation (one file per key)
/// FileStorage
///
/// Keeps each key in its own file below a directory, created lazily on first write.
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, ConsoleError> {
        let file_name = sanitize_key(key);
        if file_name.is_empty() {
            return Err(ConsoleError::invalid_argument(format!(
                "storage key '{key}' has no usable characters"
            )));
        }
        Ok(self.dir.join(file_name))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, ConsoleError> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ConsoleError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(path, value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ConsoleError> {
        match fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// sanitize_key
///
/// Keeps storage keys from escaping the storage directory: only ASCII
/// alphanumerics, `-`, `_` and `.` survive, and leading dots are dropped.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}

// 3. The In-Memory Implementation (tests, ephemeral consoles)
/// MemoryStorage
///
/// A map behind a mutex. `new_failing` builds an instance whose every
/// operation reports `StorageUnavailable`.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    values: Arc<Mutex<HashMap<String, String>>>,
    should_fail: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            values: Arc::default(),
            should_fail: true,
        }
    }

    /// Builds a storage already holding `key = value`.
    pub fn with_value(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage
            .values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        storage
    }

    fn check(&self) -> Result<(), ConsoleError> {
        if self.should_fail {
            return Err(ConsoleError::storage("memory storage configured to fail"));
        }
        Ok(())
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, ConsoleError> {
        self.check()?;
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ConsoleError> {
        self.check()?;
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ConsoleError> {
        self.check()?;
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.remove(key);
        Ok(())
    }
}
