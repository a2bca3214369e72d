use thiserror::Error;

/// Main error type for MyBike
#[derive(Error, Debug)]
pub enum BikeError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Bad response status {status} for {url}")]
    StatusError { url: String, status: u16 },

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Lifecycle error: {0}")]
    LifecycleError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Push error: {0}")]
    PushError(String),

    #[error("Capability not supported: {0}")]
    Unsupported(&'static str),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<reqwest::Error> for BikeError {
    fn from(err: reqwest::Error) -> Self {
        BikeError::NetworkError(err.to_string())
    }
}

impl From<bincode::Error> for BikeError {
    fn from(err: bincode::Error) -> Self {
        BikeError::SerializationError(err.to_string())
    }
}

impl From<serde_json::Error> for BikeError {
    fn from(err: serde_json::Error) -> Self {
        BikeError::SerializationError(err.to_string())
    }
}

/// Result alias used by the library layers
pub type BikeResult<T> = Result<T, BikeError>;
