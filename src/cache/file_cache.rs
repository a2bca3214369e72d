use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

use super::storage::CacheStorage;
use super::types::{CacheMetadata, StoredEntry};
use crate::network::Response;
use crate::utils::{BikeError, BikeResult};

const INDEX_FILE: &str = "index.json";

/// Cache storage on disk
///
/// Layout: `index.json` lists set names in creation order; each set lives in
/// its own directory with entries sharded by the first two hex chars of the
/// key hash. Sets are written to a staging directory and renamed into place.
#[derive(Debug)]
pub struct FileCacheStorage {
    cache_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCacheStorage {
    /// Create a new file cache storage rooted at `cache_dir`
    pub fn new(cache_dir: PathBuf) -> BikeResult<Self> {
        fs::create_dir_all(&cache_dir)?;
        Ok(Self {
            cache_dir,
            write_lock: Mutex::new(()),
        })
    }

    /// SHA256 of a string, hex encoded
    fn hash(input: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(input.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn set_dir(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("set-{}", &Self::hash(name)[..16]))
    }

    fn staging_dir(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!(".staging-{}", &Self::hash(name)[..16]))
    }

    fn entry_path(set_dir: &Path, key: &str) -> PathBuf {
        let hash = Self::hash(key);
        set_dir.join(&hash[..2]).join(format!("{}.cache", &hash[..16]))
    }

    fn read_index(&self) -> BikeResult<Vec<String>> {
        let path = self.cache_dir.join(INDEX_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read(&path)?;
        Ok(serde_json::from_slice(&data)?)
    }

    fn write_index(&self, names: &[String]) -> BikeResult<()> {
        let path = self.cache_dir.join(INDEX_FILE);
        let tmp = self.cache_dir.join(format!("{}.tmp", INDEX_FILE));
        fs::write(&tmp, serde_json::to_vec_pretty(names)?)?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    /// Serialize, compress and write one response
    fn write_entry(set_dir: &Path, key: &str, response: &Response) -> BikeResult<()> {
        let serialized = bincode::serialize(response)?;
        let original_size = serialized.len();

        let compressed = lz4::block::compress(&serialized, None, true)?;
        let compressed_size = compressed.len();

        let entry = StoredEntry {
            key: key.to_string(),
            data: compressed,
            metadata: CacheMetadata {
                created_at: SystemTime::now(),
                original_size: original_size as u64,
                compressed_size,
            },
        };

        let path = Self::entry_path(set_dir, key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, bincode::serialize(&entry)?)?;
        Ok(())
    }

    fn read_entry(path: &Path) -> BikeResult<StoredEntry> {
        let data = fs::read(path)?;
        Ok(bincode::deserialize(&data)?)
    }

    fn decode(entry: &StoredEntry) -> BikeResult<Response> {
        // size is prepended by compress()
        let decompressed = lz4::block::decompress(&entry.data, None)?;
        Ok(bincode::deserialize(&decompressed)?)
    }
}

impl CacheStorage for FileCacheStorage {
    fn keys(&self) -> BikeResult<Vec<String>> {
        self.read_index()
    }

    fn put_all(&self, name: &str, entries: Vec<(String, Response)>) -> BikeResult<()> {
        let _guard = self.write_lock.lock();

        let staging = self.staging_dir(name);
        if staging.exists() {
            fs::remove_dir_all(&staging)?;
        }
        fs::create_dir_all(&staging)?;

        let written = entries
            .iter()
            .try_for_each(|(key, response)| Self::write_entry(&staging, key, response));
        if let Err(e) = written {
            let _ = fs::remove_dir_all(&staging);
            return Err(e);
        }

        let target = self.set_dir(name);
        if target.exists() {
            fs::remove_dir_all(&target)?;
        }
        fs::rename(&staging, &target)?;

        let mut names = self.read_index()?;
        if !names.iter().any(|existing| existing == name) {
            names.push(name.to_string());
            self.write_index(&names)?;
        }

        debug!(cache = name, entries = entries.len(), dir = %target.display(), "cache set committed");
        Ok(())
    }

    fn match_in(&self, name: &str, key: &str) -> BikeResult<Option<Response>> {
        let path = Self::entry_path(&self.set_dir(name), key);
        if !path.exists() {
            return Ok(None);
        }

        let entry = Self::read_entry(&path)?;
        if entry.key != key {
            // truncated hash collision
            return Ok(None);
        }
        Self::decode(&entry).map(Some)
    }

    fn entries(&self, name: &str) -> BikeResult<Vec<String>> {
        let set_dir = self.set_dir(name);
        let mut keys = Vec::new();
        if !set_dir.exists() {
            return Ok(keys);
        }

        for shard in fs::read_dir(&set_dir)? {
            let shard = shard?;
            if !shard.path().is_dir() {
                continue;
            }
            for cache_file in fs::read_dir(shard.path())? {
                let cache_file = cache_file?;
                let entry = Self::read_entry(&cache_file.path())?;
                keys.push(entry.key);
            }
        }

        keys.sort();
        Ok(keys)
    }

    fn delete(&self, name: &str) -> BikeResult<bool> {
        let _guard = self.write_lock.lock();

        let mut names = self.read_index()?;
        let existed = names.iter().any(|existing| existing == name);
        if existed {
            names.retain(|existing| existing != name);
            self.write_index(&names)?;
        }

        let set_dir = self.set_dir(name);
        if set_dir.exists() {
            fs::remove_dir_all(&set_dir).map_err(|e| {
                BikeError::CacheError(format!("Failed to remove cache set '{}': {}", name, e))
            })?;
        }

        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn css_response() -> Response {
        let mut response = Response::new("/main.css", 200, "body { margin: 0 }");
        response
            .headers
            .push(("content-type".to_string(), "text/css".to_string()));
        response
    }

    #[test]
    fn test_put_and_match() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileCacheStorage::new(temp_dir.path().to_path_buf()).unwrap();

        storage
            .put_all("my-bike-v1", vec![("/main.css".to_string(), css_response())])
            .unwrap();

        let hit = storage.match_in("my-bike-v1", "/main.css").unwrap().unwrap();
        assert_eq!(hit, css_response());
        assert!(storage.match_in("my-bike-v1", "/app.js").unwrap().is_none());
        assert!(storage.match_in("my-bike-v2", "/main.css").unwrap().is_none());
        assert_eq!(storage.entries("my-bike-v1").unwrap(), vec!["/main.css"]);
    }

    #[test]
    fn test_sets_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        {
            let storage = FileCacheStorage::new(temp_dir.path().to_path_buf()).unwrap();
            storage
                .put_all("my-bike-v1", vec![("/main.css".to_string(), css_response())])
                .unwrap();
            storage.put_all("other-app", Vec::new()).unwrap();
        }

        let storage = FileCacheStorage::new(temp_dir.path().to_path_buf()).unwrap();
        assert_eq!(storage.keys().unwrap(), vec!["my-bike-v1", "other-app"]);
        assert!(storage.match_any("/main.css").unwrap().is_some());
        assert!(storage.entries("other-app").unwrap().is_empty());
    }

    #[test]
    fn test_delete_removes_directory() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileCacheStorage::new(temp_dir.path().to_path_buf()).unwrap();
        storage
            .put_all("my-bike-v0", vec![("/main.css".to_string(), css_response())])
            .unwrap();
        let set_dir = storage.set_dir("my-bike-v0");
        assert!(set_dir.exists());

        assert!(storage.delete("my-bike-v0").unwrap());
        assert!(!set_dir.exists());
        assert!(storage.keys().unwrap().is_empty());
        assert!(!storage.delete("my-bike-v0").unwrap());
    }

    #[test]
    fn test_rewrite_same_set_keeps_single_index_entry() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileCacheStorage::new(temp_dir.path().to_path_buf()).unwrap();
        storage
            .put_all("my-bike-v1", vec![("/main.css".to_string(), css_response())])
            .unwrap();
        storage
            .put_all(
                "my-bike-v1",
                vec![("/".to_string(), Response::new("/", 200, "<html>"))],
            )
            .unwrap();

        assert_eq!(storage.keys().unwrap(), vec!["my-bike-v1"]);
        assert_eq!(storage.entries("my-bike-v1").unwrap(), vec!["/"]);
        assert!(!storage.staging_dir("my-bike-v1").exists());
    }
}
