/// Request transport - Gateway
mod http;
mod types;

pub use http::HttpNetwork;
pub use types::{Network, Request, Response};
