use leptos::prelude::*;
use leptos_leaflet::{leaflet::Map, prelude::*};

use crate::{
    config::MapConfig,
    views::map::{
        map_marker::{EventMarker, LocationMarker},
        use_map,
    },
};

/// Draws the view's visible locations and events and moves the camera when
/// the view's target changes. Reads nothing but the view.
#[component]
pub fn MapRenderer(config: MapConfig) -> impl IntoView {
    let handle = use_map();
    let map: JsRwSignal<Option<Map>> = JsRwSignal::new_local(None::<Map>);

    let locations = Memo::new(move |_| handle.view.with(|v| v.visible_locations.clone()));
    let events = Memo::new(move |_| handle.view.with(|v| v.visible_events.clone()));
    let selected_id = Memo::new(move |_| {
        handle
            .view
            .with(|v| v.selection.as_ref().map(|l| l.id.clone()))
    });
    let camera = Memo::new(move |_| handle.view.with(|v| v.camera_target));
    let layers = Memo::new(move |_| handle.view.with(|v| v.layers));
    let satellite = Memo::new(move |_| layers.get().satellite);

    let max_zoom = config.max_zoom;
    Effect::new(move |_| {
        let Some(map) = map.get() else {
            return;
        };
        map.set_max_zoom(max_zoom);
        if !handle.view.with_untracked(|v| v.is_map_loaded) {
            handle.act(|c| c.set_map_loaded(true));
        }
    });

    // A retry unmounts the map; the next one reports loaded again.
    on_cleanup(move || handle.try_act(|c| c.set_map_loaded(false)));

    Effect::new(move |_| {
        let target = camera.get();
        let Some(map) = map.get() else {
            return;
        };
        if let Some(target) = target {
            let center = Position::new(target.center.lat, target.center.lng);
            map.set_view(&center.as_lat_lng(), target.zoom);
        }
    });

    let street_tiles = config.tiles.clone();
    let satellite_tiles = config.satellite_tiles.clone();

    view! {
        <div
            class="map-renderer"
            class:layer-three-d=move || layers.get().three_d
            class:layer-traffic=move || layers.get().traffic
        >
            <MapContainer
                style="height: 100%; width: 100%; flex: 1"
                center=Position::new(config.center.lat, config.center.lng)
                zoom=config.zoom
                min_zoom=config.min_zoom
                set_view=true
                map=map.write_only()
            >
                {move || {
                    let tiles = if satellite.get() {
                        satellite_tiles.clone()
                    } else {
                        street_tiles.clone()
                    };
                    view! { <TileLayer url=tiles.url attribution=tiles.attribution /> }
                }}
                {move || {
                    let selected = selected_id.get();
                    locations
                        .get()
                        .into_iter()
                        .map(|location| {
                            let is_selected = selected.as_deref() == Some(location.id.as_str());
                            view! { <LocationMarker location=location selected=is_selected /> }
                        })
                        .collect_view()
                }}
                {move || {
                    let selected = selected_id.get();
                    events
                        .get()
                        .into_iter()
                        .map(|visible| {
                            let is_selected = selected.as_deref() == Some(visible.location.id.as_str());
                            view! { <EventMarker visible=visible selected=is_selected /> }
                        })
                        .collect_view()
                }}
            </MapContainer>
        </div>
    }
}
