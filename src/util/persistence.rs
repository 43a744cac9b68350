use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use directories::ProjectDirs;
use serde_json::Error as SerdeError;
use tracing::warn;

use crate::domain::Preferences;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "FreightSplitter";
const APP_NAME: &str = "FreightSplitter";

/// Key under which [`Preferences`] are stored.
pub const PREFERENCES_KEY: &str = "userPreferences";

/// String key/value storage for small pieces of user state.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError>;
    fn set(&self, key: &str, value: &str) -> Result<(), PersistError>;
    fn remove(&self, key: &str) -> Result<(), PersistError>;
}

/// JSON object on disk, one entry per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `preferences.json` in the platform config directory.
    pub fn default_location() -> Option<Self> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
            .map(|dirs| Self::new(dirs.config_dir().join("preferences.json")))
    }

    fn read_all(&self) -> Result<HashMap<String, String>, PersistError> {
        match fs::read_to_string(&self.path) {
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(error) => Err(error.into()),
        }
    }

    fn write_all(&self, entries: &HashMap<String, String>) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        let mut entries = match self.read_all() {
            Ok(entries) => entries,
            Err(PersistError::Serde(error)) => {
                warn!(%error, path = %self.path.display(), "replacing corrupt preferences file");
                HashMap::new()
            }
            Err(error) => return Err(error),
        };
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

/// Volatile store, used when no config directory exists and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, PersistError> {
        self.entries.lock().map_err(|_| PersistError::StorageUnavailable)
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        self.entries()?.remove(key);
        Ok(())
    }
}

/// Stored preferences, or `None` when absent or unreadable.
pub fn load_preferences(store: &dyn PreferenceStore) -> Option<Preferences> {
    let raw = match store.get(PREFERENCES_KEY) {
        Ok(raw) => raw?,
        Err(error) => {
            warn!(%error, "failed to read preferences");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(preferences) => Some(preferences),
        Err(error) => {
            warn!(%error, "discarding unreadable preferences");
            None
        }
    }
}

pub fn save_preferences(
    store: &dyn PreferenceStore,
    preferences: &Preferences,
) -> Result<(), PersistError> {
    let json = serde_json::to_string(preferences)?;
    store.set(PREFERENCES_KEY, &json)
}

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("storage unavailable")]
    StorageUnavailable,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] SerdeError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ShipType, SplitStrategy};
    use tempfile::tempdir;

    fn custom_preferences() -> Preferences {
        Preferences {
            max_volume: Some(ShipType::JumpFreighter.volume_preset()),
            max_value: Some(10_000_000_000.0),
            ship_type: ShipType::JumpFreighter,
            strategy: SplitStrategy::MinCost,
        }
    }

    #[test]
    fn file_store_keeps_entries_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config").join("preferences.json");

        let store = FileStore::new(&path);
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.remove("a").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("a").unwrap(), None);
        assert_eq!(reopened.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn preferences_round_trip_through_store() {
        let store = MemoryStore::default();
        assert_eq!(load_preferences(&store), None);

        let preferences = custom_preferences();
        save_preferences(&store, &preferences).unwrap();
        assert_eq!(load_preferences(&store), Some(preferences));
        assert!(store.get(PREFERENCES_KEY).unwrap().is_some());
    }

    #[test]
    fn unreadable_preferences_are_dropped() {
        let store = MemoryStore::default();
        store.set(PREFERENCES_KEY, "{broken").unwrap();
        assert_eq!(load_preferences(&store), None);
    }

    #[test]
    fn corrupt_file_is_overwritten_on_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "garbage").unwrap();

        let store = FileStore::new(&path);
        assert!(store.get(PREFERENCES_KEY).is_err());
        assert_eq!(load_preferences(&store), None);

        save_preferences(&store, &Preferences::default()).unwrap();
        assert_eq!(load_preferences(&store), Some(Preferences::default()));
    }

    #[test]
    fn unreadable_file_is_not_overwritten() {
        let dir = tempdir().unwrap();
        // A directory in place of the file fails to read with something other than NotFound.
        let path = dir.path().join("preferences.json");
        fs::create_dir(&path).unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(store.set("a", "1"), Err(PersistError::Io(_))));
        assert!(path.is_dir());
    }
}
