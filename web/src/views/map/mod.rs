use std::future::Future;

use leptos::{prelude::*, task::spawn_local};

use crate::map::{HttpDataClient, LeptosTimer, MapController, MapView};

pub mod map_marker;
pub mod map_page;
pub mod map_renderer;

pub type CampusMapController = MapController<HttpDataClient, LeptosTimer>;

/// What the map page hands its children through context: the controller
/// (browser-thread only) and the latest view as a signal.
#[derive(Clone, Copy)]
pub struct MapHandle {
    pub controller: StoredValue<CampusMapController, LocalStorage>,
    pub view: RwSignal<MapView>,
}

impl MapHandle {
    pub fn new(controller: CampusMapController) -> Self {
        let view = RwSignal::new(controller.view());
        controller.subscribe(move |latest| view.set(latest.clone()));
        Self {
            controller: StoredValue::new_local(controller),
            view,
        }
    }

    /// Runs a synchronous action.
    pub fn act(&self, f: impl FnOnce(&CampusMapController)) {
        self.controller.with_value(f);
    }

    /// Like [`act`](Self::act), but a no-op once the page has been torn down.
    pub fn try_act(&self, f: impl FnOnce(&CampusMapController)) {
        let _ = self.controller.try_with_value(f);
    }

    /// Runs an async action on the browser task queue.
    pub fn spawn<F, Fut>(&self, f: F)
    where
        F: FnOnce(CampusMapController) -> Fut,
        Fut: Future<Output = ()> + 'static,
    {
        let controller = self.controller.with_value(Clone::clone);
        spawn_local(f(controller));
    }
}

pub fn use_map() -> MapHandle {
    expect_context::<MapHandle>()
}
