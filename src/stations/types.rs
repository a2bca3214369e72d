use serde::de::{Deserializer, Error as _};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A bike-share station as served by `/stations.json`
///
/// Feeds are loose about types, so ids, coordinates and counts accept both
/// numbers and numeric strings. Fields we don't model are carried in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub name: String,
    #[serde(deserialize_with = "de_coordinate")]
    pub lat: f64,
    #[serde(deserialize_with = "de_coordinate")]
    pub lon: f64,
    /// Bikes available
    #[serde(default, deserialize_with = "de_count", skip_serializing_if = "Option::is_none")]
    pub bikes: Option<u32>,
    /// Free docking slots
    #[serde(default, deserialize_with = "de_count", skip_serializing_if = "Option::is_none")]
    pub slots: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Kilometres from the last known position, one decimal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Station {
    pub fn new(id: impl Into<String>, name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lat,
            lon,
            bikes: None,
            slots: None,
            status: None,
            distance: None,
            extra: Map::new(),
        }
    }

    /// One-line summary for list output
    pub fn summary(&self) -> String {
        let count = |value: Option<u32>| value.map_or_else(|| "-".to_string(), |v| v.to_string());
        let distance = self
            .distance
            .map(|d| format!("{:>6.1} km", d))
            .unwrap_or_else(|| "      --".to_string());
        format!(
            "{} {:<32} bikes {:>3}  slots {:>3}  {}",
            distance,
            self.name,
            count(self.bikes),
            count(self.slots),
            self.status.as_deref().unwrap_or("")
        )
    }
}

fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(id) => Ok(id.to_string()),
        other => Err(D::Error::custom(format!("invalid station id: {}", other))),
    }
}

fn de_coordinate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| D::Error::custom("coordinate out of range")),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("invalid coordinate: {}", s))),
        other => Err(D::Error::custom(format!("invalid coordinate: {}", other))),
    }
}

fn de_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid count: {}", n))),
        Value::String(s) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid count: {}", s))),
        other => Err(D::Error::custom(format!("invalid count: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_loose_feed() {
        let json = r#"[
            {"id": 12, "name": "Groenplaats", "lat": "51.2192", "lon": 4.4016,
             "bikes": "7", "slots": 13, "status": "OPN", "address": "Groenplaats 1"},
            {"id": "A-3", "name": "Centraal Station", "lat": 51.2172, "lon": 4.4211}
        ]"#;

        let stations: Vec<Station> = serde_json::from_str(json).unwrap();

        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].id, "12");
        assert_eq!(stations[0].lat, 51.2192);
        assert_eq!(stations[0].bikes, Some(7));
        assert_eq!(stations[0].slots, Some(13));
        assert_eq!(stations[0].extra["address"], "Groenplaats 1");
        assert_eq!(stations[1].id, "A-3");
        assert_eq!(stations[1].bikes, None);
        assert_eq!(stations[1].distance, None);
    }

    #[test]
    fn test_bad_coordinate_is_rejected() {
        let json = r#"{"id": 1, "name": "Nowhere", "lat": "north", "lon": 4.4}"#;
        assert!(serde_json::from_str::<Station>(json).is_err());
    }

    #[test]
    fn test_extra_fields_survive_serialization() {
        let json = r#"{"id":"1","name":"Meir","lat":51.218,"lon":4.41,"address":"Meir 50"}"#;
        let station: Station = serde_json::from_str(json).unwrap();
        let value = serde_json::to_value(&station).unwrap();
        assert_eq!(value["address"], "Meir 50");
        assert!(value.get("distance").is_none());
    }
}
