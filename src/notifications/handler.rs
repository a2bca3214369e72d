use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::sink::NotificationSink;
use crate::constants::{NOTIFICATION_ICON, NOTIFICATION_TITLE};
use crate::utils::BikeResult;

/// A user-visible notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
}

impl Notification {
    /// Notification for an incoming push payload
    pub fn from_push(body: impl Into<String>) -> Self {
        Self {
            title: NOTIFICATION_TITLE.to_string(),
            body: body.into(),
            icon: NOTIFICATION_ICON.to_string(),
        }
    }
}

/// Reacts to push messages and notification clicks
pub struct NotificationHandler {
    sink: Arc<dyn NotificationSink>,
    click_url: String,
}

impl NotificationHandler {
    pub fn new(sink: Arc<dyn NotificationSink>, click_url: impl Into<String>) -> Self {
        Self {
            sink,
            click_url: click_url.into(),
        }
    }

    /// Show the push payload text as a notification
    pub fn on_push(&self, payload: &str) -> BikeResult<Notification> {
        let notification = Notification::from_push(payload);
        self.sink.show(&notification)?;
        Ok(notification)
    }

    /// Close the clicked notification and open the news page
    pub fn on_notification_click(&self, notification: &Notification) -> BikeResult<()> {
        self.sink.close(notification)?;
        self.sink.open_url(&self.click_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::NEWS_URL;
    use crate::notifications::{RecordingSink, SinkEvent};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_push_shows_branded_notification() {
        let sink = Arc::new(RecordingSink::new());
        let handler = NotificationHandler::new(sink.clone(), NEWS_URL);

        let shown = handler.on_push("Station Meir is full").unwrap();

        assert_eq!(
            shown,
            Notification {
                title: "MyBike".to_string(),
                body: "Station Meir is full".to_string(),
                icon: "img/icon-192.png".to_string(),
            }
        );
        assert_eq!(sink.events(), vec![SinkEvent::Shown(shown)]);
    }

    #[test]
    fn test_click_closes_then_opens_news() {
        let sink = Arc::new(RecordingSink::new());
        let handler = NotificationHandler::new(sink.clone(), NEWS_URL);
        let notification = Notification::from_push("hello");

        handler.on_notification_click(&notification).unwrap();

        assert_eq!(
            sink.events(),
            vec![
                SinkEvent::Closed(notification),
                SinkEvent::Opened("https://www.velo-antwerpen.be/en/news".to_string()),
            ]
        );
    }
}
