use crate::capabilities::PushSubscription;
use crate::stations::{sort_by_distance, Position, Station};

/// Application state, owned by the controller
///
/// Readers get shared access; only the controller mutates it.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    position: Option<Position>,
    last_updated: Option<String>,
    stations: Vec<Station>,
    subscription: Option<PushSubscription>,
    proxy_registered: bool,
}

impl AppState {
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn last_updated(&self) -> Option<&str> {
        self.last_updated.as_deref()
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn subscription(&self) -> Option<&PushSubscription> {
        self.subscription.as_ref()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn proxy_registered(&self) -> bool {
        self.proxy_registered
    }

    /// Replace the list wholesale, keeping it sorted when a position is known
    pub(super) fn replace_stations(&mut self, stations: Vec<Station>) {
        self.stations = stations;
        self.sort();
    }

    pub(super) fn set_position(&mut self, position: Position) {
        self.position = Some(position);
        self.sort();
    }

    pub(super) fn set_last_updated(&mut self, value: Option<String>) {
        self.last_updated = value;
    }

    pub(super) fn set_subscription(&mut self, subscription: Option<PushSubscription>) {
        self.subscription = subscription;
    }

    pub(super) fn set_proxy_registered(&mut self, registered: bool) {
        self.proxy_registered = registered;
    }

    fn sort(&mut self) {
        if let Some(position) = self.position {
            sort_by_distance(&mut self.stations, &position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stations_are_sorted_once_position_is_known() {
        let mut state = AppState::default();
        state.replace_stations(vec![
            Station::new("1", "Far", 51.30, 4.40),
            Station::new("2", "Near", 51.22, 4.41),
        ]);
        // no position yet: feed order, no distances
        assert_eq!(state.stations()[0].name, "Far");
        assert_eq!(state.stations()[0].distance, None);

        state.set_position(Position::new(51.2194, 4.4025));
        assert_eq!(state.stations()[0].name, "Near");

        state.replace_stations(vec![
            Station::new("3", "Farther", 51.40, 4.40),
            Station::new("4", "Here", 51.2194, 4.4025),
        ]);
        assert_eq!(state.stations()[0].name, "Here");
        assert_eq!(state.stations()[0].distance, Some(0.0));
    }
}
