use chrono::{DateTime, Local};
use std::sync::Arc;

use super::store::KeyValueStore;
use crate::constants::LAST_UPDATED_KEY;
use crate::utils::BikeResult;

/// The one persisted value: when the station list was last refreshed
#[derive(Clone)]
pub struct LastUpdated {
    store: Arc<dyn KeyValueStore>,
}

impl LastUpdated {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn read(&self) -> BikeResult<Option<String>> {
        self.store.get(LAST_UPDATED_KEY)
    }

    pub fn write(&self, value: &str) -> BikeResult<()> {
        self.store.set(LAST_UPDATED_KEY, value)
    }

    /// Local date-time text as shown to the user
    pub fn format(time: DateTime<Local>) -> String {
        time.format("%-d/%-m/%Y, %H:%M:%S").to_string()
    }

    /// Stamp the current time and return the stored text
    pub fn touch(&self) -> BikeResult<String> {
        let now = Self::format(Local::now());
        self.write(&now)?;
        Ok(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use chrono::TimeZone;

    #[test]
    fn test_write_then_read_returns_same_string() {
        let last_updated = LastUpdated::new(Arc::new(MemoryStore::new()));
        assert_eq!(last_updated.read().unwrap(), None);

        last_updated.write("16/10/2026, 09:30:00").unwrap();
        assert_eq!(
            last_updated.read().unwrap().as_deref(),
            Some("16/10/2026, 09:30:00")
        );
    }

    #[test]
    fn test_touch_persists_what_it_returns() {
        let last_updated = LastUpdated::new(Arc::new(MemoryStore::new()));
        let stamped = last_updated.touch().unwrap();
        assert_eq!(last_updated.read().unwrap(), Some(stamped));
    }

    #[test]
    fn test_format() {
        let time = Local.with_ymd_and_hms(2026, 3, 7, 14, 5, 9).unwrap();
        assert_eq!(LastUpdated::format(time), "7/3/2026, 14:05:09");
    }
}
