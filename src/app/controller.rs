use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::config::{get_cache_dir, CacheBackend, Config};
use super::state::AppState;
use crate::cache::{CacheProxy, CacheStorage, FileCacheStorage, MemoryCacheStorage};
use crate::capabilities::{
    FixedGeolocation, GeolocationProvider, LocalPushManager, NoGeolocation, NoPushManager,
    PushManager, PushSubscription, SubscribeOptions,
};
use crate::network::{HttpNetwork, Network};
use crate::notifications::{LogSink, NotificationHandler};
use crate::persistence::{FileStore, KeyValueStore, LastUpdated};
use crate::stations::{Position, StationSource};
use crate::utils::BikeResult;

/// Collaborators the controller drives, chosen once at startup
pub struct ControllerParts {
    pub proxy: Arc<CacheProxy>,
    pub geolocation: Arc<dyn GeolocationProvider>,
    pub push: Arc<dyn PushManager>,
    pub store: Arc<dyn KeyValueStore>,
    pub assets: Vec<String>,
    pub stations_path: String,
    pub server_key: String,
}

/// Outcome of the startup sequence
#[derive(Debug, Default)]
pub struct StartupReport {
    pub proxy_registered: bool,
    pub stale_caches_deleted: Vec<String>,
    pub stations_loaded: bool,
    pub errors: Vec<String>,
}

/// Owns the application state and sequences every capability call
pub struct Controller {
    state: AppState,
    proxy: Arc<CacheProxy>,
    stations: StationSource,
    geolocation: Arc<dyn GeolocationProvider>,
    push: Arc<dyn PushManager>,
    last_updated: LastUpdated,
    assets: Vec<String>,
    server_key: String,
}

impl Controller {
    pub fn new(parts: ControllerParts) -> Self {
        Self {
            state: AppState::default(),
            stations: StationSource::new(parts.proxy.clone(), parts.stations_path),
            proxy: parts.proxy,
            geolocation: parts.geolocation,
            push: parts.push,
            last_updated: LastUpdated::new(parts.store),
            assets: parts.assets,
            server_key: parts.server_key,
        }
    }

    /// Build the controller and its providers from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let network = HttpNetwork::new(
            &config.server.url,
            Duration::from_secs(config.server.timeout_secs),
        )?;
        let origin = network.base_url().clone();
        let network: Arc<dyn Network> = Arc::new(network);

        let storage: Arc<dyn CacheStorage> = match config.cache.backend {
            CacheBackend::Memory => Arc::new(MemoryCacheStorage::new()),
            CacheBackend::File => {
                let dir = match &config.cache.dir {
                    Some(dir) => dir.clone(),
                    None => get_cache_dir()?.join("caches"),
                };
                Arc::new(
                    FileCacheStorage::new(dir.clone())
                        .with_context(|| format!("Failed to open cache at {}", dir.display()))?,
                )
            }
        };

        let proxy = CacheProxy::new(
            storage,
            network,
            config.cache.prefix.as_str(),
            config.cache.version.as_str(),
        )?
        .with_origin(origin);

        let geolocation: Arc<dyn GeolocationProvider> = match config.location.position() {
            Some(position) => Arc::new(FixedGeolocation::new(position)),
            None => Arc::new(NoGeolocation),
        };

        let push: Arc<dyn PushManager> = if config.push.enabled {
            Arc::new(LocalPushManager::new(config.push.endpoint.as_str()))
        } else {
            Arc::new(NoPushManager)
        };

        let store: Arc<dyn KeyValueStore> = match &config.storage.file {
            Some(file) => Arc::new(FileStore::new(file.clone())),
            None => Arc::new(FileStore::in_data_dir()?),
        };

        Ok(Self::new(ControllerParts {
            proxy: Arc::new(proxy),
            geolocation,
            push,
            store,
            assets: config.cache.assets.clone(),
            stations_path: config.server.stations_path.clone(),
            server_key: config.push.server_key.clone(),
        }))
    }

    /// Notification handler wired to the log sink
    pub fn notification_handler(config: &Config) -> NotificationHandler {
        NotificationHandler::new(Arc::new(LogSink), config.push.click_url.as_str())
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn proxy(&self) -> &Arc<CacheProxy> {
        &self.proxy
    }

    pub fn geolocation_available(&self) -> bool {
        self.geolocation.is_available()
    }

    pub fn push_available(&self) -> bool {
        self.push.is_available()
    }

    /// Run the startup sequence
    ///
    /// Every step is attempted; failures are logged and collected, never
    /// retried.
    pub async fn start(&mut self) -> StartupReport {
        let mut report = StartupReport::default();

        match self.register_proxy().await {
            Ok(deleted) => {
                report.proxy_registered = true;
                report.stale_caches_deleted = deleted;
            }
            Err(e) => {
                warn!(error = %e, "cache proxy registration failed");
                report.errors.push(format!("cache proxy: {}", e));
            }
        }

        if let Err(e) = self.refresh_subscription().await {
            warn!(error = %e, "could not read push subscription");
            report.errors.push(format!("push subscription: {}", e));
        }

        match self.last_updated.read() {
            Ok(value) => self.state.set_last_updated(value),
            Err(e) => {
                warn!(error = %e, "could not read last updated time");
                report.errors.push(format!("last updated: {}", e));
            }
        }

        if let Err(e) = self.locate_from_provider().await {
            warn!(error = %e, "could not determine position");
            report.errors.push(format!("geolocation: {}", e));
        }

        match self.load_stations().await {
            Ok(()) => report.stations_loaded = true,
            Err(e) => {
                warn!(error = %e, "could not load stations");
                report.errors.push(format!("stations: {}", e));
            }
        }

        report
    }

    /// Install and activate the cache proxy
    pub async fn register_proxy(&mut self) -> BikeResult<Vec<String>> {
        let deleted = self.proxy.register(&self.assets).await?;
        self.state.set_proxy_registered(true);
        info!("cache proxy registration successful");
        Ok(deleted)
    }

    pub async fn refresh_subscription(&mut self) -> BikeResult<()> {
        let subscription = self.push.get_subscription().await?;
        self.state.set_subscription(subscription);
        Ok(())
    }

    /// Ask the geolocation provider for a position and sort by it
    pub async fn locate_from_provider(&mut self) -> BikeResult<()> {
        if let Some(position) = self.geolocation.current_position().await? {
            self.locate(position);
        }
        Ok(())
    }

    pub fn locate(&mut self, position: Position) {
        self.state.set_position(position);
    }

    /// Fetch the station list, stamp and persist the refresh time
    pub async fn load_stations(&mut self) -> BikeResult<()> {
        let stations = self.stations.load().await?;
        self.state.replace_stations(stations);

        let stamped = self.last_updated.touch()?;
        self.state.set_last_updated(Some(stamped));
        Ok(())
    }

    pub async fn subscribe(&mut self) -> BikeResult<PushSubscription> {
        let options = SubscribeOptions::for_server_key(&self.server_key)?;
        let subscription = self.push.subscribe(&options).await?;
        self.state.set_subscription(Some(subscription.clone()));
        info!("user is subscribed");
        Ok(subscription)
    }

    pub async fn unsubscribe(&mut self) -> BikeResult<bool> {
        let cancelled = self.push.unsubscribe().await?;
        if cancelled {
            self.state.set_subscription(None);
            info!("user is unsubscribed");
        }
        Ok(cancelled)
    }
}
