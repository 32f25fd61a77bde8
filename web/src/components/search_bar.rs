use leptos::{ev::KeyboardEvent, prelude::*};

use crate::views::map::use_map;

/// Free-text location search. Keystrokes are debounced by the controller;
/// Enter searches immediately.
#[component]
pub fn SearchBar() -> impl IntoView {
    let handle = use_map();
    let query = Memo::new(move |_| handle.view.with(|v| v.search_query.clone()));

    let handle_input = move |ev: web_sys::Event| {
        let value = event_target_value(&ev);
        handle.spawn(|controller| async move { controller.search_input(value).await });
    };

    let handle_keydown = move |ev: KeyboardEvent| match ev.key().as_str() {
        "Enter" => {
            ev.prevent_default();
            let value = query.get_untracked();
            handle.spawn(|controller| async move { controller.search_locations(value).await });
        }
        "Escape" => handle.act(|c| c.select_location(None)),
        _ => {}
    };

    let handle_clear = move |_| {
        handle.act(|c| c.select_location(None));
        handle.spawn(|controller| async move { controller.search_locations("").await });
    };

    view! {
        <div class="search-bar">
            <input
                type="search"
                class="search-bar-input"
                placeholder="Search buildings, food, events..."
                prop:value=move || query.get()
                on:input=handle_input
                on:keydown=handle_keydown
            />
            <Show when=move || !query.get().is_empty()>
                <button class="search-bar-clear" aria-label="Clear search" on:click=handle_clear>
                    "×"
                </button>
            </Show>
        </div>
    }
}
