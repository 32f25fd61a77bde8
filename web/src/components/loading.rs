use leptos::prelude::*;
use thaw::{Spinner, SpinnerSize};

/// Full-area placeholder shown while map data is in flight.
#[component]
pub fn LoadingView(message: Option<String>) -> impl IntoView {
    view! {
        <div class="loading-container" aria-busy="true">
            <Spinner size=SpinnerSize::Large />
            <p class="loading-message">
                {message.unwrap_or_else(|| "Loading campus data...".to_string())}
            </p>
        </div>
    }
}
