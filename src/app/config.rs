use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    APPLICATION_SERVER_KEY, CACHED_URLS, CACHE_PREFIX, CACHE_VERSION, DEFAULT_SERVER_URL,
    HTTP_REQUEST_TIMEOUT_SECS, NEWS_URL, STATIONS_PATH,
};
use crate::stations::Position;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Origin server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Cache proxy settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Push notification settings
    #[serde(default)]
    pub push: PushConfig,

    /// Fixed position used for distance sorting
    #[serde(default)]
    pub location: LocationConfig,

    /// Local persistence settings
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Origin server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL every relative path is resolved against
    pub url: String,
    /// Path of the station list
    pub stations_path: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVER_URL.to_string(),
            stations_path: STATIONS_PATH.to_string(),
            timeout_secs: HTTP_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Where cache sets are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    File,
    Memory,
}

/// Cache proxy settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Naming prefix shared by every cache set of this application
    pub prefix: String,
    /// Current cache version tag
    pub version: String,
    /// Assets provisioned at install time
    pub assets: Vec<String>,
    pub backend: CacheBackend,
    /// Override for the cache directory (file backend)
    pub dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            prefix: CACHE_PREFIX.to_string(),
            version: CACHE_VERSION.to_string(),
            assets: CACHED_URLS.iter().map(|s| s.to_string()).collect(),
            backend: CacheBackend::File,
            dir: None,
        }
    }
}

/// Push notification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    pub enabled: bool,
    /// base64url application server key, passed through as-is
    pub server_key: String,
    /// Push service endpoint base
    pub endpoint: String,
    /// Page opened when a notification is clicked
    pub click_url: String,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            server_key: APPLICATION_SERVER_KEY.to_string(),
            endpoint: "https://push.localhost/send".to_string(),
            click_url: NEWS_URL.to_string(),
        }
    }
}

/// Fixed position; geolocation is unavailable unless both are set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl LocationConfig {
    pub fn position(&self) -> Option<Position> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Position::new(latitude, longitude)),
            _ => None,
        }
    }
}

/// Local persistence settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Override for the key/value file
    pub file: Option<PathBuf>,
}

/// Load configuration from multiple sources
///
/// An explicit file replaces the global and project files; environment
/// variables (`MYBIKE_`, nested with `__`) always apply last.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    if let Some(path) = explicit {
        if !path.exists() {
            anyhow::bail!("Configuration file not found: {}", path.display());
        }
        figment = figment.merge(Toml::file(path));
    } else {
        let global_config = get_config_dir()?.join("config.toml");
        let local_config = PathBuf::from(".mybike/config.toml");

        if global_config.exists() {
            figment = figment.merge(Toml::file(&global_config));
        }
        if local_config.exists() {
            figment = figment.merge(Toml::file(&local_config));
        }
    }

    figment = figment.merge(Env::prefixed("MYBIKE_").split("__"));

    figment.extract().context("Failed to load configuration")
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "mybike") {
        Ok(proj_dirs.config_dir().to_path_buf())
    } else {
        // Fallback to home directory
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("Could not determine home directory")?;
        Ok(PathBuf::from(home).join(".config").join("mybike"))
    }
}

/// Default cache directory (~/.cache/mybike on Linux)
pub fn get_cache_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "mybike") {
        Ok(proj_dirs.cache_dir().to_path_buf())
    } else {
        let home = std::env::var("HOME").context("Could not determine home directory")?;
        Ok(PathBuf::from(home).join(".cache").join("mybike"))
    }
}

/// Save configuration to file
pub fn save_config(config: &Config, path: Option<PathBuf>) -> Result<()> {
    let path = if let Some(p) = path {
        p
    } else {
        get_config_dir()?.join("config.toml")
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_string = toml::to_string_pretty(config)?;
    std::fs::write(&path, toml_string)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

/// Create a default configuration file if it doesn't exist
///
/// Returns the path and whether it was created.
pub fn init_config(path: Option<PathBuf>) -> Result<(PathBuf, bool)> {
    let config_file = match path {
        Some(p) => p,
        None => get_config_dir()?.join("config.toml"),
    };

    if config_file.exists() {
        return Ok((config_file, false));
    }
    save_config(&Config::default(), Some(config_file.clone()))?;
    Ok((config_file, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.cache.version, "my-bike-v1");
        assert!(config.cache.version.starts_with(&config.cache.prefix));
        assert_eq!(config.cache.assets.len(), 16);
        assert_eq!(config.cache.assets[0], "/");
        assert_eq!(config.server.stations_path, "/stations.json");
        assert!(config.location.position().is_none());
    }

    #[test]
    fn test_explicit_file_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[server]
url = "http://bikes.test"

[cache]
version = "my-bike-v2"
backend = "memory"

[location]
latitude = 51.2194
longitude = 4.4025
"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();

        assert_eq!(config.server.url, "http://bikes.test");
        // untouched fields keep their defaults
        assert_eq!(config.server.stations_path, "/stations.json");
        assert_eq!(config.cache.version, "my-bike-v2");
        assert_eq!(config.cache.prefix, "my-bike");
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(
            config.location.position(),
            Some(Position::new(51.2194, 4.4025))
        );
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load_config(Some(&temp_dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_init_writes_loadable_defaults_once() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("mybike").join("config.toml");

        let (written, created) = init_config(Some(path.clone())).unwrap();
        assert_eq!(written, path);
        assert!(created);
        let (_, created_again) = init_config(Some(path.clone())).unwrap();
        assert!(!created_again);

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.cache.assets, Config::default().cache.assets);
    }
}
