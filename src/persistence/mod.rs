/// Client-local persistence - Gateway
mod last_updated;
mod store;

pub use last_updated::LastUpdated;
pub use store::{FileStore, KeyValueStore, MemoryStore};
