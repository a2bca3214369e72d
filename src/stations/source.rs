use std::sync::Arc;
use tracing::info;

use super::types::Station;
use crate::cache::CacheProxy;
use crate::network::Request;
use crate::utils::BikeResult;

/// Loads the station list through the cache proxy
pub struct StationSource {
    proxy: Arc<CacheProxy>,
    path: String,
}

impl StationSource {
    pub fn new(proxy: Arc<CacheProxy>, path: impl Into<String>) -> Self {
        Self {
            proxy,
            path: path.into(),
        }
    }

    /// Fetch and decode the full list; non-2xx responses are errors
    pub async fn load(&self) -> BikeResult<Vec<Station>> {
        let response = self.proxy.fetch(&Request::get(self.path.as_str())).await?;
        let stations: Vec<Station> = response.json()?;
        info!(count = stations.len(), "loaded stations");
        Ok(stations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCacheStorage;
    use crate::network::HttpNetwork;
    use crate::utils::BikeError;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn proxy_for(mock_server: &MockServer) -> Arc<CacheProxy> {
        let network = HttpNetwork::new(&mock_server.uri(), Duration::from_secs(5)).unwrap();
        let proxy = CacheProxy::new(
            Arc::new(MemoryCacheStorage::new()),
            Arc::new(network),
            "my-bike",
            "my-bike-v1",
        )
        .unwrap();
        Arc::new(proxy)
    }

    #[tokio::test]
    async fn test_load_stations() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stations.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{"id":1,"name":"Meir","lat":51.218,"lon":4.41,"bikes":3,"slots":9}]"#,
            ))
            .mount(&mock_server)
            .await;

        let source = StationSource::new(proxy_for(&mock_server).await, "/stations.json");
        let stations = source.load().await.unwrap();

        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].name, "Meir");
        assert_eq!(stations[0].bikes, Some(3));
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stations.json"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let source = StationSource::new(proxy_for(&mock_server).await, "/stations.json");
        let result = source.load().await;

        assert!(matches!(result, Err(BikeError::StatusError { status: 500, .. })));
    }
}
