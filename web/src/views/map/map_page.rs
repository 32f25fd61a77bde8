use leptos::prelude::*;

use crate::{
    components::{
        error::ErrorView, loading::LoadingView, search_bar::SearchBar,
        search_filters::SearchFilters, search_results::SearchResults,
    },
    config::MapConfig,
    map::{HttpDataClient, LeptosTimer, MapController},
    views::map::{map_renderer::MapRenderer, MapHandle},
};

#[component]
pub fn MapPage() -> impl IntoView {
    let config = MapConfig::for_browser();

    let client = match HttpDataClient::new(&config) {
        Ok(client) => client,
        Err(err) => {
            leptos::logging::error!("Could not create campus API client: {}", err);
            return view! { <ErrorView message=Some(err.to_string()) /> }.into_any();
        }
    };

    let handle = MapHandle::new(MapController::new(client, LeptosTimer, &config));
    provide_context(handle);

    // Effects only run in the browser, so the server renders the empty shell.
    Effect::new(move |_| {
        handle.spawn(|controller| async move { controller.fetch_data().await });
    });

    let status = Memo::new(move |_| handle.view.with(|v| (v.is_loading, v.error.clone())));
    let retry = move |_| handle.spawn(|controller| async move { controller.fetch_data().await });

    view! {
        <div class="map-page">
            <div class="map-page-header">
                <h1>"Campus Map"</h1>
                <SearchBar />
                <SearchResults />
            </div>

            <div class="map-page-content">
                <SearchFilters />

                <div class="map-page-map">
                    {move || match status.get() {
                        (true, _) => view! {
                            <LoadingView message=Some("Loading campus map...".to_string()) />
                        }.into_any(),
                        (false, Some(error)) => view! {
                            <div class="map-page-error">
                                <ErrorView message=Some(error) />
                                <button class="retry-button" on:click=retry>"Try again"</button>
                            </div>
                        }.into_any(),
                        (false, None) => view! {
                            <MapRenderer config=config.clone() />
                        }.into_any(),
                    }}
                </div>
            </div>
        </div>
    }
    .into_any()
}
