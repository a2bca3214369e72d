/// Offline-first cache proxy - Gateway
mod file_cache;
mod key;
mod proxy;
mod storage;
mod types;

pub use file_cache::FileCacheStorage;
pub use key::lookup_key;
pub use proxy::CacheProxy;
pub use storage::{CacheStorage, MemoryCacheStorage};
pub use types::{CacheStats, ProxyState};
