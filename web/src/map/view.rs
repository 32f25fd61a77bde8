use shared_types::{
    ActiveFilters, CameraPreset, Coordinates, Event, Location, OverlayConfig,
};

/// Read model handed to the renderer and the search/filter UI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapView {
    /// Filtered (or raw) locations, restricted to those with usable coordinates.
    pub visible_locations: Vec<Location>,
    pub visible_events: Vec<VisibleEvent>,
    pub selection: Option<Location>,
    pub camera_target: Option<CameraTarget>,
    pub layers: LayerToggles,
    pub overlay: OverlayConfig,
    pub search_query: String,
    pub recent_searches: Vec<String>,
    /// `None` is "unfiltered", `Some(vec![])` is "no matches".
    pub filtered_locations: Option<Vec<Location>>,
    pub active_filters: ActiveFilters,
    pub camera_presets: Vec<CameraPreset>,
    pub current_preset: Option<String>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub is_map_loaded: bool,
}

/// An event together with the location it resolved to.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleEvent {
    pub event: Event,
    pub location: Location,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTarget {
    pub center: Coordinates,
    pub zoom: f64,
    pub heading: Option<f64>,
    pub tilt: Option<f64>,
}

impl CameraTarget {
    pub fn from_preset(preset: &CameraPreset) -> Self {
        Self {
            center: Coordinates::new(preset.lat, preset.lng),
            zoom: preset.zoom,
            heading: preset.heading,
            tilt: preset.tilt,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayerToggles {
    pub three_d: bool,
    pub satellite: bool,
    pub traffic: bool,
}
