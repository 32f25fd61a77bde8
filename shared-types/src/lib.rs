use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite and inside the WGS84 range.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Accepts anything in the `coordinates` slot and keeps it only when it is a
/// usable `{ lat, lng }` pair. A broken geometry on one record must not fail
/// the whole collection.
fn lenient_coordinates<'de, D>(deserializer: D) -> Result<Option<Coordinates>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| serde_json::from_value::<Coordinates>(v).ok())
        .filter(Coordinates::is_valid))
}

/// Non-string categories (arrays, numbers) are dropped rather than failing
/// the record.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

/// An id string or an embedded location. An embedded object that is not a
/// usable location leaves the event unplaced.
fn lenient_event_location<'de, D>(deserializer: D) -> Result<Option<EventLocation>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(id)) => Some(EventLocation::Id(id)),
        Some(object @ Value::Object(_)) => serde_json::from_value::<Location>(object)
            .ok()
            .map(EventLocation::Embedded),
        _ => None,
    })
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_coordinates")]
    pub coordinates: Option<Coordinates>,
    #[serde(default, alias = "accessibility")]
    pub accessible: Option<bool>,
}

/// An event points at exactly one location, either by id or embedded.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum EventLocation {
    Id(String),
    Embedded(Location),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_event_location")]
    pub location: Option<EventLocation>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LocationsResponse {
    pub locations: Vec<Location>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EventsResponse {
    pub events: Vec<Event>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ActiveFilters {
    /// Ordered by activation. Empty means no category restriction.
    pub category: Vec<String>,
    pub accessibility: bool,
}

impl ActiveFilters {
    /// Adds the category when absent, removes it when present.
    pub fn toggle_category(&mut self, category: &str) {
        if let Some(index) = self.category.iter().position(|c| c == category) {
            self.category.remove(index);
        } else {
            self.category.push(category.to_string());
        }
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.category.iter().any(|c| c == category)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CameraPreset {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub zoom: f64,
    #[serde(default)]
    pub heading: Option<f64>,
    #[serde(default)]
    pub tilt: Option<f64>,
}

impl CameraPreset {
    pub fn new(id: &str, name: &str, lat: f64, lng: f64, zoom: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            lat,
            lng,
            zoom,
            heading: None,
            tilt: None,
        }
    }

    pub fn with_orientation(mut self, heading: f64, tilt: f64) -> Self {
        self.heading = Some(heading);
        self.tilt = Some(tilt);
        self
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct Rotation {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct GeoAnchor {
    pub lat: f64,
    pub lng: f64,
    pub altitude: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverlayConfig {
    pub glb_model_url: Option<String>,
    pub scale: f64,
    pub rotation: Rotation,
    pub position: GeoAnchor,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            glb_model_url: None,
            scale: 1.0,
            rotation: Rotation::default(),
            position: GeoAnchor::default(),
        }
    }
}

/// Partial update for [`OverlayConfig`]; `None` keeps the current value.
/// `glb_model_url: Some(None)` clears the model.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverlayPatch {
    #[serde(default)]
    pub glb_model_url: Option<Option<String>>,
    #[serde(default)]
    pub scale: Option<f64>,
    #[serde(default)]
    pub rotation: Option<Rotation>,
    #[serde(default)]
    pub position: Option<GeoAnchor>,
}

impl OverlayConfig {
    pub fn merge(&mut self, patch: OverlayPatch) {
        if let Some(url) = patch.glb_model_url {
            self.glb_model_url = url;
        }
        if let Some(scale) = patch.scale {
            self.scale = scale;
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
    }
}
