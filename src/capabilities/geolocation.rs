use async_trait::async_trait;

use crate::stations::Position;
use crate::utils::BikeResult;

/// Source of the user's current position
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    /// `Ok(None)` when no position can be determined
    async fn current_position(&self) -> BikeResult<Option<Position>>;

    fn is_available(&self) -> bool {
        true
    }
}

/// A position given up front (config or command line)
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocation {
    position: Position,
}

impl FixedGeolocation {
    pub fn new(position: Position) -> Self {
        Self { position }
    }
}

#[async_trait]
impl GeolocationProvider for FixedGeolocation {
    async fn current_position(&self) -> BikeResult<Option<Position>> {
        Ok(Some(self.position))
    }
}

/// Platform without geolocation
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeolocation;

#[async_trait]
impl GeolocationProvider for NoGeolocation {
    async fn current_position(&self) -> BikeResult<Option<Position>> {
        Ok(None)
    }

    fn is_available(&self) -> bool {
        false
    }
}
