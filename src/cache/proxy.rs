use futures::future::try_join_all;
use parking_lot::Mutex;
use reqwest::{Method, Url};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::key::lookup_key;
use super::storage::CacheStorage;
use super::types::{CacheStats, ProxyState};
use crate::network::{Network, Request, Response};
use crate::utils::{BikeError, BikeResult};

/// Offline-first interception layer in front of the network
///
/// Lifecycle: `install` provisions one versioned cache set, `activate` drops
/// stale sets of this application, after which `fetch` serves from cache
/// before falling back to the network. Misses are never written back.
pub struct CacheProxy {
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    prefix: String,
    version: String,
    origin: Option<Url>,
    state: Mutex<ProxyState>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl CacheProxy {
    /// Create a proxy for one cache version
    ///
    /// `version` must start with `prefix`, otherwise activation could never
    /// recognise the set as belonging to this application.
    pub fn new(
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
        prefix: impl Into<String>,
        version: impl Into<String>,
    ) -> BikeResult<Self> {
        let prefix = prefix.into();
        let version = version.into();
        if prefix.is_empty() || !version.starts_with(&prefix) {
            return Err(BikeError::ConfigError(format!(
                "Cache version '{}' must start with prefix '{}'",
                version, prefix
            )));
        }

        Ok(Self {
            storage,
            network,
            prefix,
            version,
            origin: None,
            state: Mutex::new(ProxyState::Parsed),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        })
    }

    /// Origin used to match absolute request URLs against cached paths
    pub fn with_origin(mut self, origin: Url) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn state(&self) -> ProxyState {
        *self.state.lock()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    fn set_state(&self, state: ProxyState) {
        let previous = std::mem::replace(&mut *self.state.lock(), state);
        debug!(from = %previous, to = %state, "cache proxy state change");
    }

    /// Move to `next` if the current state is one of `allowed`
    fn transition(&self, allowed: &[ProxyState], next: ProxyState) -> BikeResult<()> {
        let mut current = self.state.lock();
        if !allowed.contains(&*current) {
            return Err(BikeError::LifecycleError(format!(
                "cannot move from {} to {}",
                *current, next
            )));
        }
        *current = next;
        Ok(())
    }

    /// Fetch every asset and store them as one cache set
    ///
    /// All or nothing: a transport error or non-2xx status on any asset
    /// fails the install, nothing is stored and the proxy becomes redundant.
    pub async fn install(&self, assets: &[String]) -> BikeResult<()> {
        self.transition(
            &[ProxyState::Parsed, ProxyState::Redundant],
            ProxyState::Installing,
        )?;
        info!(version = %self.version, assets = assets.len(), "installing cache proxy");

        match self.provision(assets).await {
            Ok(()) => {
                self.set_state(ProxyState::Installed);
                info!(version = %self.version, "cache proxy installed");
                Ok(())
            }
            Err(e) => {
                self.set_state(ProxyState::Redundant);
                warn!(version = %self.version, error = %e, "cache proxy install failed");
                Err(e)
            }
        }
    }

    async fn provision(&self, assets: &[String]) -> BikeResult<()> {
        let fetches = assets.iter().map(|asset| async move {
            let key = lookup_key(asset, self.origin.as_ref()).ok_or_else(|| {
                BikeError::CacheError(format!("Asset '{}' is not on this origin", asset))
            })?;
            let response = self.network.fetch(&Request::get(asset.as_str())).await?;
            if !response.ok() {
                return Err(BikeError::StatusError {
                    url: asset.clone(),
                    status: response.status,
                });
            }
            Ok((key, response))
        });

        let entries = try_join_all(fetches).await?;
        self.storage.put_all(&self.version, entries)
    }

    /// Delete stale cache sets of this application and start intercepting
    ///
    /// Returns the names of the deleted sets.
    pub async fn activate(&self) -> BikeResult<Vec<String>> {
        self.transition(&[ProxyState::Installed], ProxyState::Activating)?;

        match self.remove_stale() {
            Ok(deleted) => {
                self.set_state(ProxyState::Activated);
                info!(version = %self.version, deleted = deleted.len(), "cache proxy activated");
                Ok(deleted)
            }
            Err(e) => {
                self.set_state(ProxyState::Installed);
                Err(e)
            }
        }
    }

    fn remove_stale(&self) -> BikeResult<Vec<String>> {
        let mut deleted = Vec::new();
        for name in self.storage.keys()? {
            if name != self.version && name.starts_with(&self.prefix) {
                if self.storage.delete(&name)? {
                    debug!(cache = %name, "deleted stale cache set");
                    deleted.push(name);
                }
            }
        }
        Ok(deleted)
    }

    /// Install then activate
    ///
    /// A cache set already stored under the current version is reused as-is,
    /// the way an unchanged proxy stays installed across loads.
    pub async fn register(&self, assets: &[String]) -> BikeResult<Vec<String>> {
        if self.storage.has(&self.version)? {
            self.transition(
                &[ProxyState::Parsed, ProxyState::Redundant],
                ProxyState::Installed,
            )?;
            info!(version = %self.version, "cache set already provisioned");
        } else {
            self.install(assets).await?;
        }
        self.activate().await
    }

    /// Serve a request, cache first
    ///
    /// Requests are not intercepted before activation. Only `GET` is
    /// matched; everything else passes straight through.
    pub async fn fetch(&self, request: &Request) -> BikeResult<Response> {
        if self.state() != ProxyState::Activated {
            return self.network.fetch(request).await;
        }

        if request.method == Method::GET {
            if let Some(key) = lookup_key(&request.url, self.origin.as_ref()) {
                match self.storage.match_any(&key) {
                    Ok(Some(response)) => {
                        self.hits.fetch_add(1, Ordering::Relaxed);
                        debug!(%key, "cache hit");
                        return Ok(response);
                    }
                    Ok(None) => {}
                    Err(e) => warn!(%key, error = %e, "cache lookup failed, using network"),
                }
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(url = %request.url, "cache miss");
        self.network.fetch(request).await
    }

    /// Get cache statistics
    pub fn stats(&self) -> BikeResult<CacheStats> {
        let mut cache_sets = Vec::new();
        for name in self.storage.keys()? {
            let entries = self.storage.entries(&name)?.len();
            cache_sets.push((name, entries));
        }

        Ok(CacheStats {
            state: self.state(),
            version: self.version.clone(),
            cache_sets,
            cache_hits: self.hits.load(Ordering::Relaxed),
            cache_misses: self.misses.load(Ordering::Relaxed),
        })
    }
}
