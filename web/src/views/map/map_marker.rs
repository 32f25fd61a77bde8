use leptos::prelude::*;
use leptos_leaflet::prelude::*;
use shared_types::Location;
use thaw::{Label, LabelSize};

use crate::{map::VisibleEvent, views::map::use_map};

const LOCATION_COLOR: &str = "%230d9488";
const EVENT_COLOR: &str = "%23ef4444";
const SELECTED_COLOR: &str = "%23f97316";

fn pin_icon(fill_color: &str) -> String {
    format!(
        "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' width='28' height='42' viewBox='0 0 28 42'%3E%3Cdefs%3E%3Cfilter id='shadow' x='-50%25' y='-50%25' width='200%25' height='200%25'%3E%3CfeDropShadow dx='0' dy='1' stdDeviation='1.5' flood-color='%23000' flood-opacity='0.25'/%3E%3C/filter%3E%3C/defs%3E%3Cpath fill='{}' stroke='%23ffffff' stroke-width='1.5' filter='url(%23shadow)' d='M14 2C8.5 2 4 6.5 4 12c0 8.5 10 26 10 26s10-17.5 10-26c0-5.5-4.5-10-10-10zm0 13.5c-1.9 0-3.5-1.6-3.5-3.5s1.6-3.5 3.5-3.5 3.5 1.6 3.5 3.5-1.6 3.5-3.5 3.5z'/%3E%3C/svg%3E",
        fill_color
    )
}

#[component]
pub fn LocationMarker(location: Location, selected: bool) -> impl IntoView {
    let handle = use_map();
    // Only renderable locations reach the renderer.
    let Some(coordinates) = location.coordinates else {
        return ().into_any();
    };
    let icon_svg = pin_icon(if selected { SELECTED_COLOR } else { LOCATION_COLOR });
    let category = location
        .category
        .clone()
        .unwrap_or_else(|| "N/A".to_string());
    let to_select = location.clone();

    view! {
        <Marker
            position=Position::new(coordinates.lat, coordinates.lng)
            draggable=false
            icon_url=Some(icon_svg)
            icon_size=Some((28.0, 42.0))
            icon_anchor=Some((14.0, 42.0))
        >
            <Popup>
                <div class="marker-popup">
                    <Label size=LabelSize::Large>{location.name.clone()}</Label>
                    <p class="marker-popup-description">{location.description.clone()}</p>
                    <span class="marker-popup-chip">{category}</span>
                    <button
                        class="marker-popup-action"
                        on:click=move |_| {
                            let location = to_select.clone();
                            handle.act(|c| c.on_marker_selected(location));
                        }
                    >
                        "Focus here"
                    </button>
                </div>
            </Popup>
        </Marker>
    }
    .into_any()
}

#[component]
pub fn EventMarker(visible: VisibleEvent, selected: bool) -> impl IntoView {
    let handle = use_map();
    let icon_svg = pin_icon(if selected { SELECTED_COLOR } else { EVENT_COLOR });
    let VisibleEvent {
        event,
        location,
        coordinates,
    } = visible;
    let when = event
        .start_date
        .map(|start| start.format("%b %e, %H:%M").to_string());

    view! {
        <Marker
            position=Position::new(coordinates.lat, coordinates.lng)
            draggable=false
            icon_url=Some(icon_svg)
            icon_size=Some((28.0, 42.0))
            icon_anchor=Some((14.0, 42.0))
        >
            <Popup>
                <div class="marker-popup">
                    <Label size=LabelSize::Large>{event.title.clone()}</Label>
                    <p class="marker-popup-description">{event.description.clone()}</p>
                    {when.map(|when| view! { <p class="marker-popup-when">{when}</p> })}
                    <p class="marker-popup-where">{format!("At: {}", location.name)}</p>
                    <span class="marker-popup-chip event">"EVENT"</span>
                    <button
                        class="marker-popup-action"
                        on:click=move |_| {
                            let location = location.clone();
                            handle.act(|c| c.on_marker_selected(location));
                        }
                    >
                        "Focus here"
                    </button>
                </div>
            </Popup>
        </Marker>
    }
}
