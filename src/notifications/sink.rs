use parking_lot::Mutex;
use tracing::info;

use super::handler::Notification;
use crate::utils::BikeResult;

/// Where notifications are shown and links opened
pub trait NotificationSink: Send + Sync {
    fn show(&self, notification: &Notification) -> BikeResult<()>;
    fn close(&self, notification: &Notification) -> BikeResult<()>;
    fn open_url(&self, url: &str) -> BikeResult<()>;
}

/// Sink that reports through tracing
#[derive(Debug, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn show(&self, notification: &Notification) -> BikeResult<()> {
        info!(
            title = %notification.title,
            icon = %notification.icon,
            "🔔 {}",
            notification.body
        );
        Ok(())
    }

    fn close(&self, notification: &Notification) -> BikeResult<()> {
        info!(title = %notification.title, "notification closed");
        Ok(())
    }

    fn open_url(&self, url: &str) -> BikeResult<()> {
        info!(%url, "opening window");
        Ok(())
    }
}

/// What a sink was asked to do
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Shown(Notification),
    Closed(Notification),
    Opened(String),
}

/// Sink that records events in order
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn show(&self, notification: &Notification) -> BikeResult<()> {
        self.events.lock().push(SinkEvent::Shown(notification.clone()));
        Ok(())
    }

    fn close(&self, notification: &Notification) -> BikeResult<()> {
        self.events.lock().push(SinkEvent::Closed(notification.clone()));
        Ok(())
    }

    fn open_url(&self, url: &str) -> BikeResult<()> {
        self.events.lock().push(SinkEvent::Opened(url.to_string()));
        Ok(())
    }
}
