use std::time::Duration;

use shared_types::{CameraPreset, Coordinates};

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3000/api";
/// Where the SSR server finds the campus backend when `CAMPUS_API_URL` is unset.
pub const DEFAULT_UPSTREAM_URL: &str = "http://127.0.0.1:5000/api";
pub const DEFAULT_PRESET_ID: &str = "campus-overview";

const OSM_TILES: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
const OSM_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";
const SATELLITE_TILES: &str =
    "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}";
const SATELLITE_ATTRIBUTION: &str = "Tiles &copy; Esri";

/// Everything the map engine and the map page need to know up front.
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    /// Base of the campus REST API, without a trailing slash.
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub search_debounce: Duration,
    /// Queries shorter than this (in characters) mean "no search".
    pub min_search_len: usize,
    /// Zoom used when the camera recenters on a selected location.
    pub selection_zoom: f64,
    pub center: Coordinates,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub tiles: TileLayerConfig,
    pub satellite_tiles: TileLayerConfig,
    pub camera_presets: Vec<CameraPreset>,
    pub default_preset: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileLayerConfig {
    pub url: String,
    pub attribution: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            search_debounce: Duration::from_millis(300),
            min_search_len: 2,
            selection_zoom: 18.0,
            center: Coordinates::new(30.3557, 76.3675),
            zoom: 16.0,
            min_zoom: 14.0,
            max_zoom: 19.0,
            tiles: TileLayerConfig {
                url: OSM_TILES.to_string(),
                attribution: OSM_ATTRIBUTION.to_string(),
            },
            satellite_tiles: TileLayerConfig {
                url: SATELLITE_TILES.to_string(),
                attribution: SATELLITE_ATTRIBUTION.to_string(),
            },
            camera_presets: campus_presets(),
            default_preset: DEFAULT_PRESET_ID.to_string(),
        }
    }
}

pub fn campus_presets() -> Vec<CameraPreset> {
    vec![
        CameraPreset::new(DEFAULT_PRESET_ID, "Campus Overview", 30.3557, 76.3675, 16.0)
            .with_orientation(0.0, 0.0),
        CameraPreset::new("main-gate", "Main Gate", 30.3565, 76.3660, 18.0)
            .with_orientation(90.0, 45.0),
        CameraPreset::new("academic-block", "Academic Block", 30.3555, 76.3680, 17.0)
            .with_orientation(180.0, 30.0),
        CameraPreset::new("hostels", "Hostel Area", 30.3540, 76.3690, 17.0)
            .with_orientation(270.0, 0.0),
    ]
}

impl MapConfig {
    /// Server-side configuration. `.env` is loaded by the binary before this runs.
    #[cfg(feature = "ssr")]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let millis = |key: &str, fallback: Duration| {
            std::env::var(key)
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(fallback)
        };

        Self {
            api_base_url: std::env::var("CAMPUS_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_UPSTREAM_URL.to_string()),
            request_timeout: millis("CAMPUS_REQUEST_TIMEOUT_MS", defaults.request_timeout),
            search_debounce: millis("CAMPUS_SEARCH_DEBOUNCE_MS", defaults.search_debounce),
            ..defaults
        }
    }

    /// Browser configuration: the API is reached through the same origin that
    /// served the page, so the session cookie goes along.
    pub fn for_browser() -> Self {
        #[allow(unused_mut)]
        let mut config = Self::default();

        #[cfg(feature = "hydrate")]
        if let Some(origin) = web_sys::window().and_then(|w| w.location().origin().ok()) {
            config.api_base_url = format!("{}/api", origin.trim_end_matches('/'));
        }

        config
    }

    pub fn preset(&self, id: &str) -> Option<&CameraPreset> {
        self.camera_presets.iter().find(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_preset_is_in_the_catalog() {
        let config = MapConfig::default();
        let preset = config.preset(&config.default_preset).map(|p| p.name.as_str());
        assert_eq!(preset, Some("Campus Overview"));
        assert!(config.preset("library-roof").is_none());
    }

    #[test]
    fn zoom_bounds_contain_every_camera_zoom() {
        let config = MapConfig::default();
        let zooms = config
            .camera_presets
            .iter()
            .map(|p| p.zoom)
            .chain([config.zoom, config.selection_zoom]);
        for zoom in zooms {
            assert!((config.min_zoom..=config.max_zoom).contains(&zoom), "zoom {zoom}");
        }
    }

    #[test]
    fn browser_config_keeps_engine_defaults() {
        let config = MapConfig::for_browser();
        assert_eq!(config.search_debounce, Duration::from_millis(300));
        assert_eq!(config.min_search_len, 2);
        assert!(config.api_base_url.ends_with("/api"));
    }
}
