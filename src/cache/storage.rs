use parking_lot::Mutex;
use std::collections::HashMap;

use crate::network::Response;
use crate::utils::BikeResult;

/// Named, versioned cache sets
///
/// Set names are kept in creation order. `put_all` replaces a set wholesale
/// and must leave no partial set behind if it fails.
pub trait CacheStorage: Send + Sync {
    /// Names of all stored cache sets, oldest first
    fn keys(&self) -> BikeResult<Vec<String>>;

    /// Store a complete set of entries under `name`
    fn put_all(&self, name: &str, entries: Vec<(String, Response)>) -> BikeResult<()>;

    /// Look up one key in one set
    fn match_in(&self, name: &str, key: &str) -> BikeResult<Option<Response>>;

    /// Keys stored in a set
    fn entries(&self, name: &str) -> BikeResult<Vec<String>>;

    /// Delete a whole set; returns whether it existed
    fn delete(&self, name: &str) -> BikeResult<bool>;

    fn has(&self, name: &str) -> BikeResult<bool> {
        Ok(self.keys()?.iter().any(|existing| existing == name))
    }

    /// Look up a key across every set, oldest set first
    fn match_any(&self, key: &str) -> BikeResult<Option<Response>> {
        for name in self.keys()? {
            if let Some(response) = self.match_in(&name, key)? {
                return Ok(Some(response));
            }
        }
        Ok(None)
    }
}

#[derive(Debug)]
struct CacheSet {
    name: String,
    entries: HashMap<String, Response>,
}

/// In-process cache storage, lost on exit
#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    sets: Mutex<Vec<CacheSet>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStorage for MemoryCacheStorage {
    fn keys(&self) -> BikeResult<Vec<String>> {
        Ok(self.sets.lock().iter().map(|set| set.name.clone()).collect())
    }

    fn put_all(&self, name: &str, entries: Vec<(String, Response)>) -> BikeResult<()> {
        let entries: HashMap<String, Response> = entries.into_iter().collect();
        let mut sets = self.sets.lock();
        match sets.iter_mut().find(|set| set.name == name) {
            Some(set) => set.entries = entries,
            None => sets.push(CacheSet {
                name: name.to_string(),
                entries,
            }),
        }
        Ok(())
    }

    fn match_in(&self, name: &str, key: &str) -> BikeResult<Option<Response>> {
        let sets = self.sets.lock();
        Ok(sets
            .iter()
            .find(|set| set.name == name)
            .and_then(|set| set.entries.get(key).cloned()))
    }

    fn entries(&self, name: &str) -> BikeResult<Vec<String>> {
        let sets = self.sets.lock();
        let mut keys: Vec<String> = sets
            .iter()
            .find(|set| set.name == name)
            .map(|set| set.entries.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        Ok(keys)
    }

    fn delete(&self, name: &str) -> BikeResult<bool> {
        let mut sets = self.sets.lock();
        let before = sets.len();
        sets.retain(|set| set.name != name);
        Ok(sets.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(key: &str, body: &str) -> (String, Response) {
        (key.to_string(), Response::new(key, 200, body.to_string()))
    }

    #[test]
    fn test_sets_keep_creation_order() {
        let storage = MemoryCacheStorage::new();
        storage.put_all("my-bike-v2", vec![entry("/", "v2")]).unwrap();
        storage.put_all("my-bike-v1", vec![entry("/", "v1")]).unwrap();

        assert_eq!(storage.keys().unwrap(), vec!["my-bike-v2", "my-bike-v1"]);
        assert!(storage.has("my-bike-v1").unwrap());
        assert!(!storage.has("my-bike-v3").unwrap());

        // oldest set wins on a global match
        let hit = storage.match_any("/").unwrap().unwrap();
        assert_eq!(hit.text(), "v2");
    }

    #[test]
    fn test_put_all_replaces_set_wholesale() {
        let storage = MemoryCacheStorage::new();
        storage
            .put_all("my-bike-v1", vec![entry("/", "old"), entry("/main.css", "css")])
            .unwrap();
        storage.put_all("my-bike-v1", vec![entry("/", "new")]).unwrap();

        assert_eq!(storage.entries("my-bike-v1").unwrap(), vec!["/"]);
        assert_eq!(
            storage.match_in("my-bike-v1", "/").unwrap().unwrap().text(),
            "new"
        );
        assert!(storage.match_in("my-bike-v1", "/main.css").unwrap().is_none());
    }

    #[test]
    fn test_delete() {
        let storage = MemoryCacheStorage::new();
        storage.put_all("my-bike-v1", vec![entry("/", "x")]).unwrap();

        assert!(storage.delete("my-bike-v1").unwrap());
        assert!(!storage.delete("my-bike-v1").unwrap());
        assert!(storage.keys().unwrap().is_empty());
        assert!(storage.match_any("/").unwrap().is_none());
    }
}
