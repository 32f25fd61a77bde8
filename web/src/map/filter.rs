//! Pure predicates and projections over the raw collections. Nothing here
//! touches state; callers decide where the results go.

use shared_types::{ActiveFilters, Event, EventLocation, Location};

use crate::map::view::VisibleEvent;

/// Case-insensitive substring match, so "Fast Food" matches the filter "food".
pub fn category_matches(location: &Location, filter: &str) -> bool {
    location
        .category
        .as_deref()
        .is_some_and(|category| category.to_lowercase().contains(&filter.to_lowercase()))
}

/// Categories are OR-ed (an empty set matches everything), accessibility is AND-ed.
pub fn matches_filters(location: &Location, filters: &ActiveFilters) -> bool {
    let category_ok = filters.category.is_empty()
        || filters
            .category
            .iter()
            .any(|filter| category_matches(location, filter));
    let accessibility_ok = !filters.accessibility || location.accessible == Some(true);

    category_ok && accessibility_ok
}

/// `None` means "no restriction, show the raw collection".
pub fn filter_locations(
    locations: &[Location],
    filters: &ActiveFilters,
) -> Option<Vec<Location>> {
    if filters.category.is_empty() {
        return None;
    }

    Some(
        locations
            .iter()
            .filter(|location| matches_filters(location, filters))
            .cloned()
            .collect(),
    )
}

pub fn is_renderable(location: &Location) -> bool {
    location.coordinates.is_some_and(|c| c.is_valid())
}

pub fn renderable_locations(locations: &[Location]) -> Vec<Location> {
    locations.iter().filter(|l| is_renderable(l)).cloned().collect()
}

/// An embedded location is used as-is; an id reference is looked up in the
/// raw collection.
pub fn resolve_event_location<'a>(
    event: &'a Event,
    locations: &'a [Location],
) -> Option<&'a Location> {
    match event.location.as_ref()? {
        EventLocation::Embedded(location) => Some(location),
        EventLocation::Id(id) => locations.iter().find(|l| &l.id == id),
    }
}

pub fn renderable_events(events: &[Event], locations: &[Location]) -> Vec<VisibleEvent> {
    events
        .iter()
        .filter_map(|event| {
            let location = resolve_event_location(event, locations)?;
            let coordinates = location.coordinates.filter(|c| c.is_valid())?;
            Some(VisibleEvent {
                event: event.clone(),
                location: location.clone(),
                coordinates,
            })
        })
        .collect()
}
