use directories::ProjectDirs;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;

use crate::utils::{BikeError, BikeResult};

/// String key/value storage, last write wins
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> BikeResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> BikeResult<()>;
}

/// Key/value pairs kept in a TOML file
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    /// Store file in the platform data directory (~/.local/share/mybike on Linux)
    pub fn in_data_dir() -> BikeResult<Self> {
        let data_dir = if let Some(proj_dirs) = ProjectDirs::from("", "", "mybike") {
            proj_dirs.data_dir().to_path_buf()
        } else {
            let home = std::env::var("HOME")
                .map_err(|_| BikeError::ConfigError("Could not determine home directory".into()))?;
            PathBuf::from(home).join(".local").join("share").join("mybike")
        };
        Ok(Self::new(data_dir.join("storage.toml")))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn load(&self) -> BikeResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        toml::from_str(&content).map_err(|e| {
            BikeError::SerializationError(format!("{}: {}", self.path.display(), e))
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> BikeResult<Option<String>> {
        let _guard = self.lock.lock();
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> BikeResult<()> {
        let _guard = self.lock.lock();
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(&values)
            .map_err(|e| BikeError::SerializationError(e.to_string()))?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

/// Key/value pairs held in memory only
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> BikeResult<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> BikeResult<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
