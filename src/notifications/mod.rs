/// Push message display and click handling - Gateway
mod handler;
mod sink;

pub use handler::{Notification, NotificationHandler};
pub use sink::{LogSink, NotificationSink, RecordingSink, SinkEvent};
