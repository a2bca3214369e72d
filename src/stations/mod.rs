// Gateway module for stations - follows the Train Station Pattern
// All external access must go through this gateway

mod distance;
mod source;
mod types;

pub use distance::{haversine_km, round_to_tenth, sort_by_distance, Position};
pub use source::StationSource;
pub use types::Station;
