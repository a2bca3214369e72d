use async_trait::async_trait;
use base64::{
    alphabet,
    engine::{GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::utils::{BikeError, BikeResult};

/// Standard alphabet that tolerates non-zero bits in the last symbol
const SERVER_KEY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Decode a base64url server key to raw bytes
///
/// Missing padding is restored and the URL-safe alphabet mapped back to the
/// standard one before decoding.
pub fn decode_server_key(key: &str) -> BikeResult<Vec<u8>> {
    let padding = "=".repeat((4 - key.len() % 4) % 4);
    let standard = format!("{}{}", key, padding)
        .replace('-', "+")
        .replace('_', "/");

    SERVER_KEY_ENGINE
        .decode(standard)
        .map_err(|e| BikeError::PushError(format!("Invalid application server key: {}", e)))
}

/// Options passed to the push service on subscribe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeOptions {
    pub user_visible_only: bool,
    pub application_server_key: Vec<u8>,
}

impl SubscribeOptions {
    /// Visible-only subscription for a base64url server key
    pub fn for_server_key(key: &str) -> BikeResult<Self> {
        Ok(Self {
            user_visible_only: true,
            application_server_key: decode_server_key(key)?,
        })
    }
}

/// Opaque token issued by a push service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscription {
    pub endpoint: String,
    pub token: String,
}

/// Push subscription management
#[async_trait]
pub trait PushManager: Send + Sync {
    async fn get_subscription(&self) -> BikeResult<Option<PushSubscription>>;

    async fn subscribe(&self, options: &SubscribeOptions) -> BikeResult<PushSubscription>;

    /// Returns whether there was a subscription to cancel
    async fn unsubscribe(&self) -> BikeResult<bool>;

    fn is_available(&self) -> bool {
        true
    }
}

/// Push manager that issues subscriptions in-process
///
/// Subscriptions live in memory only; the token is derived from the server
/// key so the same key always yields the same endpoint.
#[derive(Debug)]
pub struct LocalPushManager {
    endpoint_base: String,
    current: Mutex<Option<PushSubscription>>,
}

impl LocalPushManager {
    pub fn new(endpoint_base: impl Into<String>) -> Self {
        Self {
            endpoint_base: endpoint_base.into(),
            current: Mutex::new(None),
        }
    }
}

#[async_trait]
impl PushManager for LocalPushManager {
    async fn get_subscription(&self) -> BikeResult<Option<PushSubscription>> {
        Ok(self.current.lock().clone())
    }

    async fn subscribe(&self, options: &SubscribeOptions) -> BikeResult<PushSubscription> {
        if !options.user_visible_only {
            return Err(BikeError::PushError(
                "Only user-visible subscriptions are supported".to_string(),
            ));
        }
        if options.application_server_key.is_empty() {
            return Err(BikeError::PushError(
                "Application server key is empty".to_string(),
            ));
        }

        let mut hasher = Sha256::new();
        hasher.update(&options.application_server_key);
        let token = format!("{:x}", hasher.finalize());
        let subscription = PushSubscription {
            endpoint: format!("{}/{}", self.endpoint_base.trim_end_matches('/'), &token[..16]),
            token,
        };

        *self.current.lock() = Some(subscription.clone());
        info!(endpoint = %subscription.endpoint, "push subscription created");
        Ok(subscription)
    }

    async fn unsubscribe(&self) -> BikeResult<bool> {
        Ok(self.current.lock().take().is_some())
    }
}

/// Platform without push support
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPushManager;

#[async_trait]
impl PushManager for NoPushManager {
    async fn get_subscription(&self) -> BikeResult<Option<PushSubscription>> {
        Ok(None)
    }

    async fn subscribe(&self, _options: &SubscribeOptions) -> BikeResult<PushSubscription> {
        Err(BikeError::Unsupported("push notifications"))
    }

    async fn unsubscribe(&self) -> BikeResult<bool> {
        Ok(false)
    }

    fn is_available(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::APPLICATION_SERVER_KEY;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_url_safe_unpadded() {
        // "??>" encodes to "Pz8-" in base64url
        assert_eq!(decode_server_key("Pz8-").unwrap(), b"??>".to_vec());
        // "?" needs two padding chars
        assert_eq!(decode_server_key("Pw").unwrap(), b"?".to_vec());
        assert_eq!(decode_server_key("_w").unwrap(), vec![0xff]);
    }

    #[test]
    fn test_decode_ignores_trailing_bits() {
        // "Px" carries non-zero bits past the single encoded byte
        assert_eq!(decode_server_key("Px").unwrap(), b"?".to_vec());
        assert_eq!(decode_server_key("Pz9").unwrap(), b"??".to_vec());
    }

    #[test]
    fn test_decode_application_server_key() {
        let key = decode_server_key(APPLICATION_SERVER_KEY).unwrap();
        // uncompressed P-256 public key
        assert_eq!(key.len(), 65);
        assert_eq!(key[0], 0x04);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_server_key("not base64!"),
            Err(BikeError::PushError(_))
        ));
    }

    #[tokio::test]
    async fn test_subscribe_and_unsubscribe() {
        let manager = LocalPushManager::new("https://push.example.com/send");
        assert_eq!(manager.get_subscription().await.unwrap(), None);

        let options = SubscribeOptions::for_server_key(APPLICATION_SERVER_KEY).unwrap();
        assert!(options.user_visible_only);
        let subscription = manager.subscribe(&options).await.unwrap();
        assert!(subscription
            .endpoint
            .starts_with("https://push.example.com/send/"));
        assert_eq!(
            manager.get_subscription().await.unwrap(),
            Some(subscription)
        );

        assert!(manager.unsubscribe().await.unwrap());
        assert_eq!(manager.get_subscription().await.unwrap(), None);
        // nothing left to cancel
        assert!(!manager.unsubscribe().await.unwrap());
    }

    #[tokio::test]
    async fn test_no_push_manager() {
        let manager = NoPushManager;
        let options = SubscribeOptions::for_server_key("Pw").unwrap();
        assert!(matches!(
            manager.subscribe(&options).await,
            Err(BikeError::Unsupported(_))
        ));
        assert!(!manager.unsubscribe().await.unwrap());
        assert!(!manager.is_available());
    }
}
