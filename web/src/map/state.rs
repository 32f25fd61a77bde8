use shared_types::{ActiveFilters, CameraPreset, Event, Location, OverlayConfig, OverlayPatch};

use crate::config::MapConfig;
use crate::map::client::ClientError;
use crate::map::filter;
use crate::map::search::{DebounceTicket, SearchController, SearchPhase, SearchRequest, SearchStep};
use crate::map::view::{CameraTarget, LayerToggles, MapView};

pub const FETCH_ERROR_MESSAGE: &str = "Failed to load map data.";
pub const RECENT_SEARCH_LIMIT: usize = 5;

/// Identifies one `fetch_data` call. Only the most recently issued ticket
/// may commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// Which action last decided where the camera should look.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CameraFocus {
    Preset,
    Selection,
}

/// Sole owner of the map data, filters, selection and camera. Every mutation
/// goes through one of the named actions below.
#[derive(Debug, Clone)]
pub struct MapViewState {
    is_map_loaded: bool,
    selected_location: Option<Location>,
    search_query: String,
    recent_searches: Vec<String>,
    filtered_locations: Option<Vec<Location>>,
    active_filters: ActiveFilters,
    camera_presets: Vec<CameraPreset>,
    current_preset: Option<String>,
    camera_focus: CameraFocus,
    layers: LayerToggles,
    overlay: OverlayConfig,
    locations: Vec<Location>,
    events: Vec<Event>,
    is_loading: bool,
    error: Option<String>,
    fetch_seq: u64,
    search: SearchController,
    selection_zoom: f64,
}

impl MapViewState {
    pub fn new(config: &MapConfig) -> Self {
        let current_preset = config
            .preset(&config.default_preset)
            .map(|preset| preset.id.clone());

        Self {
            is_map_loaded: false,
            selected_location: None,
            search_query: String::new(),
            recent_searches: Vec::new(),
            filtered_locations: None,
            active_filters: ActiveFilters::default(),
            camera_presets: config.camera_presets.clone(),
            current_preset,
            camera_focus: CameraFocus::Preset,
            layers: LayerToggles::default(),
            overlay: OverlayConfig::default(),
            locations: Vec::new(),
            events: Vec::new(),
            is_loading: false,
            error: None,
            fetch_seq: 0,
            search: SearchController::new(config.min_search_len),
            selection_zoom: config.selection_zoom,
        }
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn filtered_locations(&self) -> Option<&[Location]> {
        self.filtered_locations.as_deref()
    }

    pub fn selected_location(&self) -> Option<&Location> {
        self.selected_location.as_ref()
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Most recent first, no duplicates.
    pub fn recent_searches(&self) -> &[String] {
        &self.recent_searches
    }

    pub fn search_phase(&self) -> &SearchPhase {
        self.search.phase()
    }

    pub fn active_filters(&self) -> &ActiveFilters {
        &self.active_filters
    }

    pub fn layers(&self) -> LayerToggles {
        self.layers
    }

    pub fn overlay(&self) -> &OverlayConfig {
        &self.overlay
    }

    pub fn current_preset(&self) -> Option<&str> {
        self.current_preset.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_map_loaded(&self) -> bool {
        self.is_map_loaded
    }

    /// Locations the renderer should consider: the filtered slot when set,
    /// the raw collection otherwise.
    pub fn locations_to_display(&self) -> &[Location] {
        self.filtered_locations.as_deref().unwrap_or(&self.locations)
    }

    pub fn camera_target(&self) -> Option<CameraTarget> {
        let selection_target = self
            .selected_location
            .as_ref()
            .and_then(|location| location.coordinates)
            .filter(|coordinates| coordinates.is_valid())
            .map(|center| CameraTarget {
                center,
                zoom: self.selection_zoom,
                heading: None,
                tilt: None,
            });

        match (self.camera_focus, selection_target) {
            (CameraFocus::Selection, Some(target)) => Some(target),
            _ => self
                .current_preset
                .as_deref()
                .and_then(|id| self.camera_presets.iter().find(|p| p.id == id))
                .map(CameraTarget::from_preset),
        }
    }

    pub fn view(&self) -> MapView {
        MapView {
            visible_locations: filter::renderable_locations(self.locations_to_display()),
            visible_events: filter::renderable_events(&self.events, &self.locations),
            selection: self.selected_location.clone(),
            camera_target: self.camera_target(),
            layers: self.layers,
            overlay: self.overlay.clone(),
            search_query: self.search_query.clone(),
            recent_searches: self.recent_searches.clone(),
            filtered_locations: self.filtered_locations.clone(),
            active_filters: self.active_filters.clone(),
            camera_presets: self.camera_presets.clone(),
            current_preset: self.current_preset.clone(),
            is_loading: self.is_loading,
            error: self.error.clone(),
            is_map_loaded: self.is_map_loaded,
        }
    }

    /// Starts a fetch. Any ticket handed out earlier is now stale.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.fetch_seq += 1;
        self.is_loading = true;
        self.error = None;
        FetchTicket(self.fetch_seq)
    }

    /// Applies a fetch outcome if `ticket` is still the latest one. Returns
    /// whether anything was committed.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<(Vec<Location>, Vec<Event>), ClientError>,
    ) -> bool {
        if ticket.0 != self.fetch_seq {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.fetch_seq,
                "discarding superseded map data response"
            );
            return false;
        }

        self.is_loading = false;
        match result {
            Ok((locations, events)) => {
                tracing::debug!(
                    locations = locations.len(),
                    events = events.len(),
                    "map data loaded"
                );
                self.locations = locations;
                self.events = events;
                self.error = None;
            }
            Err(err) => {
                leptos::logging::error!("Failed to fetch map data: {}", err);
                self.error = Some(FETCH_ERROR_MESSAGE.to_string());
            }
        }
        true
    }

    /// Selects (or clears) a location in one step: the filtered slot is
    /// cleared, the search text follows the selection and pending searches
    /// are cancelled.
    pub fn select_location(&mut self, location: Option<Location>) {
        self.search.supersede();
        self.search_query = location
            .as_ref()
            .map(|l| l.name.clone())
            .unwrap_or_default();
        self.filtered_locations = None;
        if location.is_some() {
            self.camera_focus = CameraFocus::Selection;
        }
        self.selected_location = location;
    }

    /// A row in the result list was clicked: select it, remember it, and close
    /// the list by clearing the search text.
    pub fn pick_search_result(&mut self, location: Location) {
        self.remember_search(&location.name);
        self.select_location(Some(location));
        let _ = self.begin_search(String::new());
    }

    fn remember_search(&mut self, name: &str) {
        self.recent_searches
            .retain(|recent| !recent.eq_ignore_ascii_case(name));
        self.recent_searches.insert(0, name.to_string());
        self.recent_searches.truncate(RECENT_SEARCH_LIMIT);
    }

    /// Echoes typed text without searching.
    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    /// A keystroke in the search box: text updates now, the lookup waits for
    /// the quiet period.
    pub fn search_input(&mut self, query: impl Into<String>) -> DebounceTicket {
        self.search_query = query.into();
        self.search.keystroke(&self.search_query)
    }

    /// The quiet period for `ticket` is over. Returns the request to send, if any.
    pub fn debounce_elapsed(&mut self, ticket: &DebounceTicket) -> Option<SearchRequest> {
        let step = self.search.debounce_elapsed(ticket);
        self.apply_search_step(step)
    }

    /// Authoritative lookup without waiting.
    pub fn begin_search(&mut self, query: impl Into<String>) -> Option<SearchRequest> {
        self.search_query = query.into();
        let step = self.search.search_now(&self.search_query);
        self.apply_search_step(step)
    }

    fn apply_search_step(&mut self, step: SearchStep) -> Option<SearchRequest> {
        match step {
            SearchStep::Superseded => None,
            SearchStep::Reset => {
                self.filtered_locations = None;
                None
            }
            SearchStep::Dispatch(request) => Some(request),
        }
    }

    /// Applies a search outcome unless a newer request or action has taken
    /// over. Failures degrade to an empty result.
    pub fn complete_search(
        &mut self,
        request: &SearchRequest,
        result: Result<Vec<Location>, ClientError>,
    ) -> bool {
        if !self.search.settle(request, result.is_ok()) {
            tracing::debug!(
                seq = request.seq(),
                query = request.query(),
                "discarding superseded search response"
            );
            return false;
        }

        match result {
            Ok(locations) => self.filtered_locations = Some(locations),
            Err(err) => {
                leptos::logging::warn!("Location search for {:?} failed: {}", request.query(), err);
                self.filtered_locations = Some(Vec::new());
            }
        }
        true
    }

    /// Toggles `category` and recomputes the filtered slot from the raw
    /// locations. Overwrites any search result.
    pub fn filter_locations_by_category(&mut self, category: &str) {
        self.search.supersede();
        self.active_filters.toggle_category(category);
        self.filtered_locations = filter::filter_locations(&self.locations, &self.active_filters);
    }

    pub fn set_active_filters(&mut self, filters: ActiveFilters) {
        self.active_filters = filters;
    }

    pub fn toggle_layer_3d(&mut self) {
        self.layers.three_d = !self.layers.three_d;
    }

    pub fn toggle_layer_satellite(&mut self) {
        self.layers.satellite = !self.layers.satellite;
    }

    pub fn toggle_layer_traffic(&mut self) {
        self.layers.traffic = !self.layers.traffic;
    }

    pub fn set_overlay_config(&mut self, patch: OverlayPatch) {
        self.overlay.merge(patch);
    }

    /// Unknown ids are ignored; the catalog is fixed.
    pub fn set_camera_preset(&mut self, preset_id: &str) {
        if !self.camera_presets.iter().any(|p| p.id == preset_id) {
            leptos::logging::warn!("Ignoring unknown camera preset {:?}", preset_id);
            return;
        }
        self.current_preset = Some(preset_id.to_string());
        self.camera_focus = CameraFocus::Preset;
    }

    pub fn set_map_loaded(&mut self, loaded: bool) {
        self.is_map_loaded = loaded;
    }
}
