use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::debug;

use super::types::{Network, Request, Response};
use crate::utils::{BikeError, BikeResult};

/// Network transport backed by reqwest, bound to one origin
#[derive(Debug, Clone)]
pub struct HttpNetwork {
    client: Client,
    base_url: Url,
}

impl HttpNetwork {
    /// Create a transport for the given server URL
    pub fn new(base_url: &str, timeout: Duration) -> BikeResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            BikeError::ConfigError(format!("Invalid server URL '{}': {}", base_url, e))
        })?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a request URL (relative path or absolute) against the origin
    pub fn resolve(&self, url: &str) -> BikeResult<Url> {
        self.base_url
            .join(url)
            .map_err(|e| BikeError::NetworkError(format!("Invalid request URL '{}': {}", url, e)))
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &Request) -> BikeResult<Response> {
        let url = self.resolve(&request.url)?;
        debug!(method = %request.method, %url, "network fetch");

        let response = self
            .client
            .request(request.method.clone(), url)
            .send()
            .await?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.bytes().await?;

        Ok(Response {
            url: request.url.clone(),
            status,
            headers,
            body,
        })
    }
}
