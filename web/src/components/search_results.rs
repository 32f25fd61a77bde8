use leptos::prelude::*;
use shared_types::Location;

use crate::views::map::use_map;

const MIN_QUERY_CHARS: usize = 2;

#[component]
pub fn SearchResults() -> impl IntoView {
    let handle = use_map();
    let results = Memo::new(move |_| handle.view.with(|v| v.filtered_locations.clone()));
    let query_len = Memo::new(move |_| handle.view.with(|v| v.search_query.chars().count()));
    let selected_id = Memo::new(move |_| {
        handle
            .view
            .with(|v| v.selection.as_ref().map(|l| l.id.clone()))
    });

    move || match results.get() {
        // No search has narrowed the list, or a selection closed it.
        None => ().into_any(),
        Some(found) if found.is_empty() => {
            if query_len.get() >= MIN_QUERY_CHARS {
                view! { <div class="search-results empty">"No results"</div> }.into_any()
            } else {
                ().into_any()
            }
        }
        Some(found) => view! {
            <ul class="search-results">
                {found
                    .into_iter()
                    .map(|location| view! { <SearchResultItem location=location selected_id=selected_id /> })
                    .collect_view()}
            </ul>
        }
        .into_any(),
    }
}

#[component]
fn SearchResultItem(location: Location, selected_id: Memo<Option<String>>) -> impl IntoView {
    let handle = use_map();
    let id = location.id.clone();
    let is_selected = move || selected_id.get().as_deref() == Some(id.as_str());
    let name = location.name.clone();
    let category = location.category.clone();

    view! {
        <li
            class="search-result"
            class:selected=is_selected
            on:click=move |_| {
                let location = location.clone();
                handle.act(|c| c.pick_search_result(location));
            }
        >
            <span class="search-result-name">{name}</span>
            {category.map(|category| view! { <span class="search-result-category">{category}</span> })}
        </li>
    }
}
