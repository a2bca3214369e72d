// Gateway module for capabilities - follows the Train Station Pattern
// Each platform capability is a trait with a no-op implementation,
// chosen once at startup.

mod geolocation;
mod push;

pub use geolocation::{FixedGeolocation, GeolocationProvider, NoGeolocation};
pub use push::{
    decode_server_key, LocalPushManager, NoPushManager, PushManager, PushSubscription,
    SubscribeOptions,
};
