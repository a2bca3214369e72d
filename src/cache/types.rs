use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

/// Lifecycle of a cache proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyState {
    /// Created, nothing provisioned yet
    Parsed,
    Installing,
    /// Cache set written, not intercepting yet
    Installed,
    Activating,
    /// Intercepting fetches
    Activated,
    /// Provisioning failed; a later install may retry
    Redundant,
}

impl fmt::Display for ProxyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProxyState::Parsed => "parsed",
            ProxyState::Installing => "installing",
            ProxyState::Installed => "installed",
            ProxyState::Activating => "activating",
            ProxyState::Activated => "activated",
            ProxyState::Redundant => "redundant",
        };
        write!(f, "{}", name)
    }
}

/// Metadata for on-disk cache entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub created_at: SystemTime,
    pub original_size: u64,
    pub compressed_size: usize,
}

/// Entry as written to disk: the lookup key plus the compressed response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEntry {
    pub key: String,
    pub data: Vec<u8>,
    pub metadata: CacheMetadata,
}

/// Snapshot of what the proxy holds and how it has been used
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub state: ProxyState,
    pub version: String,
    pub cache_sets: Vec<(String, usize)>,
    pub cache_hits: usize,
    pub cache_misses: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f32 {
        let total = self.cache_hits + self.cache_misses;
        if total > 0 {
            (self.cache_hits as f32 / total as f32) * 100.0
        } else {
            0.0
        }
    }

    /// Format cache stats for display
    pub fn format(&self) -> String {
        let mut out = format!(
            "Cache Proxy:\n  Version: {}\n  State: {}\n  Hit Rate: {:.1}% ({} hits, {} misses)\n  Cache sets:",
            self.version,
            self.state,
            self.hit_rate(),
            self.cache_hits,
            self.cache_misses
        );
        if self.cache_sets.is_empty() {
            out.push_str(" none");
        }
        for (name, entries) in &self.cache_sets {
            let marker = if name == &self.version { " (live)" } else { "" };
            out.push_str(&format!("\n    • {}: {} entries{}", name, entries, marker));
        }
        out
    }
}
