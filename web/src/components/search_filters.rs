use leptos::prelude::*;
use thaw::{Button, ButtonAppearance, ButtonSize, Label, LabelSize};

use crate::views::map::use_map;

const CATEGORIES: [&str; 3] = ["Events", "Food", "Buildings"];

/// Sidebar with category chips, recent picks, layer toggles and camera
/// presets.
#[component]
pub fn SearchFilters() -> impl IntoView {
    let handle = use_map();
    let filters = Memo::new(move |_| handle.view.with(|v| v.active_filters.clone()));
    let layers = Memo::new(move |_| handle.view.with(|v| v.layers));
    let presets = Memo::new(move |_| handle.view.with(|v| v.camera_presets.clone()));
    let current_preset = Memo::new(move |_| handle.view.with(|v| v.current_preset.clone()));
    let recent = Memo::new(move |_| handle.view.with(|v| v.recent_searches.clone()));

    let appearance = move |active: bool| {
        if active {
            ButtonAppearance::Primary
        } else {
            ButtonAppearance::Secondary
        }
    };

    view! {
        <aside class="search-filters">
            <section class="filter-section">
                <Label size=LabelSize::Medium>"Categories"</Label>
                <div class="filter-chips">
                    {CATEGORIES
                        .iter()
                        .map(|&category| {
                            view! {
                                <Button
                                    size=ButtonSize::Small
                                    appearance=Signal::derive(move || {
                                        appearance(filters.with(|f| f.has_category(category)))
                                    })
                                    on_click=move |_| handle.act(|c| c.filter_locations_by_category(category))
                                >
                                    {category}
                                </Button>
                            }
                        })
                        .collect_view()}
                </div>
            </section>

            <section class="filter-section">
                <Label size=LabelSize::Medium>"Recent"</Label>
                {move || {
                    let recent = recent.get();
                    if recent.is_empty() {
                        return view! { <p class="filter-recent-empty">"Nothing picked yet"</p> }
                            .into_any();
                    }
                    view! {
                        <ul class="filter-recent">
                            {recent
                                .into_iter()
                                .map(|name| {
                                    let query = name.clone();
                                    view! {
                                        <li
                                            class="filter-recent-item"
                                            on:click=move |_| {
                                                let query = query.clone();
                                                handle.spawn(|controller| async move {
                                                    controller.search_locations(query).await
                                                });
                                            }
                                        >
                                            {name}
                                        </li>
                                    }
                                })
                                .collect_view()}
                        </ul>
                    }
                    .into_any()
                }}
            </section>

            <section class="filter-section">
                <Label size=LabelSize::Medium>"Layers"</Label>
                <div class="filter-chips">
                    <Button
                        size=ButtonSize::Small
                        appearance=Signal::derive(move || appearance(layers.get().three_d))
                        on_click=move |_| handle.act(|c| c.toggle_layer_3d())
                    >
                        "3D"
                    </Button>
                    <Button
                        size=ButtonSize::Small
                        appearance=Signal::derive(move || appearance(layers.get().satellite))
                        on_click=move |_| handle.act(|c| c.toggle_layer_satellite())
                    >
                        "Satellite"
                    </Button>
                    <Button
                        size=ButtonSize::Small
                        appearance=Signal::derive(move || appearance(layers.get().traffic))
                        on_click=move |_| handle.act(|c| c.toggle_layer_traffic())
                    >
                        "Traffic"
                    </Button>
                </div>
            </section>

            <section class="filter-section">
                <Label size=LabelSize::Medium>"Views"</Label>
                <div class="filter-presets">
                    {move || {
                        presets
                            .get()
                            .into_iter()
                            .map(|preset| {
                                let id = preset.id.clone();
                                let active_id = id.clone();
                                view! {
                                    <Button
                                        size=ButtonSize::Small
                                        appearance=Signal::derive(move || {
                                            appearance(current_preset.get().as_deref() == Some(active_id.as_str()))
                                        })
                                        on_click=move |_| handle.act(|c| c.set_camera_preset(&id))
                                    >
                                        {preset.name}
                                    </Button>
                                }
                            })
                            .collect_view()
                    }}
                </div>
            </section>
        </aside>
    }
}
