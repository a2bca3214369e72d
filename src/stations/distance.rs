use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::types::Station;
use crate::constants::EARTH_RADIUS_KM;

/// A geographic position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

fn deg2rad(deg: f64) -> f64 {
    deg * (std::f64::consts::PI / 180.0)
}

/// Great-circle distance in kilometres (haversine formula)
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = deg2rad(lat2 - lat1);
    let d_lon = deg2rad(lon2 - lon1);
    let a = (d_lat / 2.0).sin().powi(2)
        + deg2rad(lat1).cos() * deg2rad(lat2).cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Round to one decimal, half away from zero
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Annotate every station with its distance to `position` and sort nearest first
///
/// The sort is stable, so stations at the same rounded distance keep feed order.
pub fn sort_by_distance(stations: &mut [Station], position: &Position) {
    for station in stations.iter_mut() {
        let distance = haversine_km(station.lat, station.lon, position.latitude, position.longitude);
        station.distance = Some(round_to_tenth(distance));
    }

    stations.sort_by(|a, b| match (a.distance, b.distance) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        _ => Ordering::Equal,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_degree_of_latitude() {
        let d = haversine_km(50.0, 4.0, 51.0, 4.0);
        assert!((d - 111.19).abs() < 0.01, "got {}", d);
    }

    #[test]
    fn test_zero_distance_and_symmetry() {
        assert_eq!(haversine_km(51.2194, 4.4025, 51.2194, 4.4025), 0.0);

        let there = haversine_km(51.2194, 4.4025, 50.8503, 4.3517);
        let back = haversine_km(50.8503, 4.3517, 51.2194, 4.4025);
        assert!((there - back).abs() < 1e-9);
        // Antwerp to Brussels
        assert!((there - 41.2).abs() < 0.5, "got {}", there);
    }

    #[test]
    fn test_round_to_tenth() {
        assert_eq!(round_to_tenth(1.24), 1.2);
        assert_eq!(round_to_tenth(1.25), 1.3);
        assert_eq!(round_to_tenth(0.04), 0.0);
    }

    #[test]
    fn test_sort_is_non_decreasing() {
        let mut stations = vec![
            Station::new("1", "Far", 51.30, 4.40),
            Station::new("2", "Here", 51.2194, 4.4025),
            Station::new("3", "Near", 51.22, 4.41),
            Station::new("4", "Middle", 51.25, 4.40),
        ];

        sort_by_distance(&mut stations, &Position::new(51.2194, 4.4025));

        let names: Vec<&str> = stations.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Here", "Near", "Middle", "Far"]);
        assert!(stations.iter().all(|s| s.distance.is_some()));
        assert!(stations
            .windows(2)
            .all(|pair| pair[0].distance <= pair[1].distance));
        assert_eq!(stations[0].distance, Some(0.0));
    }

    #[test]
    fn test_sort_is_stable_for_equal_distances() {
        let mut stations = vec![
            Station::new("a", "First", 51.0, 4.0),
            Station::new("b", "Second", 51.0, 4.0),
        ];
        sort_by_distance(&mut stations, &Position::new(50.0, 4.0));
        assert_eq!(stations[0].id, "a");
        assert_eq!(stations[1].id, "b");
    }
}
