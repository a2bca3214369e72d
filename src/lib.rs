pub mod app;
pub mod cache;
pub mod capabilities;
pub mod cli;
pub mod constants;
pub mod network;
pub mod notifications;
pub mod persistence;
pub mod runtime;
pub mod stations;
pub mod utils;

pub use app::{load_config, AppState, Config, Controller};
pub use cache::{CacheProxy, CacheStorage, FileCacheStorage, MemoryCacheStorage};
pub use stations::{Position, Station};
pub use utils::BikeError;
