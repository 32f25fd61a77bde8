use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use futures::future::{self, Either};
use shared_types::{ActiveFilters, Location, OverlayPatch};

use crate::config::MapConfig;
use crate::map::client::{ClientError, DataClient};
use crate::map::search::SearchRequest;
use crate::map::state::MapViewState;
use crate::map::timer::Timer;
use crate::map::view::MapView;

type Subscriber = Box<dyn Fn(&MapView)>;

/// Drives the async side of the map: data fetches, debounced search and the
/// request timeout. Single-threaded; clones share the same state.
pub struct MapController<C, T> {
    state: Rc<RefCell<MapViewState>>,
    client: Rc<C>,
    timer: Rc<T>,
    subscribers: Rc<RefCell<Vec<Subscriber>>>,
    request_timeout: Duration,
    search_debounce: Duration,
}

impl<C, T> Clone for MapController<C, T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
            client: Rc::clone(&self.client),
            timer: Rc::clone(&self.timer),
            subscribers: Rc::clone(&self.subscribers),
            request_timeout: self.request_timeout,
            search_debounce: self.search_debounce,
        }
    }
}

impl<C: DataClient, T: Timer> MapController<C, T> {
    pub fn new(client: C, timer: T, config: &MapConfig) -> Self {
        Self {
            state: Rc::new(RefCell::new(MapViewState::new(config))),
            client: Rc::new(client),
            timer: Rc::new(timer),
            subscribers: Rc::new(RefCell::new(Vec::new())),
            request_timeout: config.request_timeout,
            search_debounce: config.search_debounce,
        }
    }

    pub fn view(&self) -> MapView {
        self.state.borrow().view()
    }

    /// Read access for callers that need more than the view.
    pub fn with_state<R>(&self, f: impl FnOnce(&MapViewState) -> R) -> R {
        f(&self.state.borrow())
    }

    /// `f` runs after every action with the fresh view.
    pub fn subscribe(&self, f: impl Fn(&MapView) + 'static) {
        self.subscribers.borrow_mut().push(Box::new(f));
    }

    fn update<R>(&self, f: impl FnOnce(&mut MapViewState) -> R) -> R {
        let result = f(&mut self.state.borrow_mut());
        self.notify();
        result
    }

    fn notify(&self) {
        let subscribers = self.subscribers.borrow();
        if subscribers.is_empty() {
            return;
        }
        let view = self.view();
        for subscriber in subscribers.iter() {
            subscriber(&view);
        }
    }

    /// Races `request` against the configured timeout.
    async fn bounded<R>(
        &self,
        request: impl Future<Output = Result<R, ClientError>>,
    ) -> Result<R, ClientError> {
        let request = std::pin::pin!(request);
        let deadline = std::pin::pin!(self.timer.sleep(self.request_timeout));
        match future::select(request, deadline).await {
            Either::Left((result, _)) => result,
            Either::Right(_) => Err(ClientError::Timeout(self.request_timeout)),
        }
    }

    /// Loads locations and events in parallel. A call made while an older
    /// one is still pending makes the older result irrelevant.
    pub async fn fetch_data(&self) {
        let ticket = self.update(MapViewState::begin_fetch);
        let result = self
            .bounded(future::try_join(
                self.client.fetch_locations(),
                self.client.fetch_events(),
            ))
            .await;
        self.update(|state| state.complete_fetch(ticket, result));
    }

    /// Keystroke handler: echoes the text at once, searches after the quiet
    /// period if nothing else was typed meanwhile.
    pub async fn search_input(&self, text: impl Into<String>) {
        let ticket = self.update(|state| state.search_input(text));
        self.timer.sleep(self.search_debounce).await;
        let Some(request) = self.update(|state| state.debounce_elapsed(&ticket)) else {
            return;
        };
        self.run_search(request).await;
    }

    /// Immediate, authoritative lookup.
    pub async fn search_locations(&self, query: impl Into<String>) {
        let Some(request) = self.update(|state| state.begin_search(query)) else {
            return;
        };
        self.run_search(request).await;
    }

    async fn run_search(&self, request: SearchRequest) {
        let result = self
            .bounded(self.client.search_locations(request.query()))
            .await;
        self.update(|state| state.complete_search(&request, result));
    }

    /// Renderer event sink: a marker (location or event's location) was picked.
    pub fn on_marker_selected(&self, location: Location) {
        self.select_location(Some(location));
    }

    pub fn select_location(&self, location: Option<Location>) {
        self.update(|state| state.select_location(location));
    }

    pub fn pick_search_result(&self, location: Location) {
        self.update(|state| state.pick_search_result(location));
    }

    pub fn set_search_query(&self, query: impl Into<String>) {
        self.update(|state| state.set_search_query(query));
    }

    pub fn filter_locations_by_category(&self, category: &str) {
        self.update(|state| state.filter_locations_by_category(category));
    }

    pub fn set_active_filters(&self, filters: ActiveFilters) {
        self.update(|state| state.set_active_filters(filters));
    }

    pub fn toggle_layer_3d(&self) {
        self.update(MapViewState::toggle_layer_3d);
    }

    pub fn toggle_layer_satellite(&self) {
        self.update(MapViewState::toggle_layer_satellite);
    }

    pub fn toggle_layer_traffic(&self) {
        self.update(MapViewState::toggle_layer_traffic);
    }

    pub fn set_overlay_config(&self, patch: OverlayPatch) {
        self.update(|state| state.set_overlay_config(patch));
    }

    pub fn set_camera_preset(&self, preset_id: &str) {
        self.update(|state| state.set_camera_preset(preset_id));
    }

    pub fn set_map_loaded(&self, loaded: bool) {
        self.update(|state| state.set_map_loaded(loaded));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shared_types::{Coordinates, Event};
    use std::cell::Cell;
    use tokio::task::{spawn_local, LocalSet};

    use crate::map::state::FETCH_ERROR_MESSAGE;

    fn location(id: &str, name: &str) -> Location {
        Location {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            category: None,
            coordinates: Some(Coordinates::new(1.0, 1.0)),
            accessible: None,
        }
    }

    struct TokioTimer;

    impl Timer for TokioTimer {
        fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
            tokio::time::sleep(duration)
        }
    }

    /// Never fires, so only the test decides when requests finish.
    struct FrozenTimer;

    impl Timer for FrozenTimer {
        fn sleep(&self, _duration: Duration) -> impl Future<Output = ()> {
            future::pending()
        }
    }

    type Reply<T> = futures::channel::oneshot::Sender<Result<T, ClientError>>;

    /// Every call parks until the test answers it through the recorded sender.
    #[derive(Default)]
    struct ScriptedClient {
        location_replies: RefCell<Vec<Reply<Vec<Location>>>>,
        event_replies: RefCell<Vec<Reply<Vec<Event>>>>,
        search_replies: RefCell<Vec<(String, Reply<Vec<Location>>)>>,
    }

    async fn await_reply<T>(
        rx: futures::channel::oneshot::Receiver<Result<T, ClientError>>,
    ) -> Result<T, ClientError> {
        rx.await
            .unwrap_or_else(|_| Err(ClientError::Network("reply dropped".to_string())))
    }

    impl DataClient for ScriptedClient {
        fn fetch_locations(&self) -> impl Future<Output = Result<Vec<Location>, ClientError>> {
            let (tx, rx) = futures::channel::oneshot::channel();
            self.location_replies.borrow_mut().push(tx);
            await_reply(rx)
        }

        fn fetch_events(&self) -> impl Future<Output = Result<Vec<Event>, ClientError>> {
            let (tx, rx) = futures::channel::oneshot::channel();
            self.event_replies.borrow_mut().push(tx);
            await_reply(rx)
        }

        fn search_locations(
            &self,
            query: &str,
        ) -> impl Future<Output = Result<Vec<Location>, ClientError>> {
            let (tx, rx) = futures::channel::oneshot::channel();
            self.search_replies
                .borrow_mut()
                .push((query.to_string(), tx));
            await_reply(rx)
        }
    }

    /// Answers searches immediately and remembers what was asked.
    #[derive(Default)]
    struct RecordingClient {
        searches: RefCell<Vec<String>>,
        fail_search: Cell<bool>,
    }

    impl DataClient for RecordingClient {
        async fn fetch_locations(&self) -> Result<Vec<Location>, ClientError> {
            Ok(vec![location("1", "Library")])
        }

        async fn fetch_events(&self) -> Result<Vec<Event>, ClientError> {
            Ok(Vec::new())
        }

        async fn search_locations(&self, query: &str) -> Result<Vec<Location>, ClientError> {
            self.searches.borrow_mut().push(query.to_string());
            if self.fail_search.get() {
                return Err(ClientError::Http {
                    status: 500,
                    message: "search index offline".to_string(),
                });
            }
            Ok(Vec::new())
        }
    }

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn second_fetch_wins_even_when_first_resolves_last() {
        let controller = MapController::new(
            ScriptedClient::default(),
            FrozenTimer,
            &MapConfig::default(),
        );

        LocalSet::new()
            .run_until(async {
                let first = spawn_local({
                    let c = controller.clone();
                    async move { c.fetch_data().await }
                });
                settle().await;
                let second = spawn_local({
                    let c = controller.clone();
                    async move { c.fetch_data().await }
                });
                settle().await;
                assert!(controller.view().is_loading);

                let client = Rc::clone(&controller.client);
                let mut locations = client.location_replies.borrow_mut().drain(..).collect::<Vec<_>>();
                let mut events = client.event_replies.borrow_mut().drain(..).collect::<Vec<_>>();
                assert_eq!(locations.len(), 2);

                // Second call answers first.
                let _ = locations.remove(1).send(Ok(vec![location("new", "New Hall")]));
                let _ = events.remove(1).send(Ok(Vec::new()));
                second.await.unwrap();
                assert_eq!(controller.view().is_loading, false);

                let _ = locations.remove(0).send(Ok(vec![location("old", "Old Hall")]));
                let _ = events.remove(0).send(Ok(Vec::new()));
                first.await.unwrap();

                let ids: Vec<_> = controller
                    .with_state(|s| s.locations().iter().map(|l| l.id.clone()).collect());
                assert_eq!(ids, vec!["new"]);
            })
            .await;
    }

    #[tokio::test]
    async fn stale_search_response_does_not_flicker_back() {
        let controller = MapController::new(
            ScriptedClient::default(),
            FrozenTimer,
            &MapConfig::default(),
        );

        LocalSet::new()
            .run_until(async {
                let older = spawn_local({
                    let c = controller.clone();
                    async move { c.search_locations("caf").await }
                });
                settle().await;
                let newer = spawn_local({
                    let c = controller.clone();
                    async move { c.search_locations("cafe").await }
                });
                settle().await;

                let mut replies = controller
                    .client
                    .search_replies
                    .borrow_mut()
                    .drain(..)
                    .collect::<Vec<_>>();
                let queries: Vec<_> = replies.iter().map(|(q, _)| q.clone()).collect();
                assert_eq!(queries, vec!["caf", "cafe"]);

                let (_, newer_reply) = replies.remove(1);
                let _ = newer_reply.send(Ok(vec![location("2", "Cafe Coffee Day")]));
                newer.await.unwrap();
                let (_, older_reply) = replies.remove(0);
                let _ = older_reply.send(Ok(vec![location("1", "Caf Block")]));
                older.await.unwrap();

                let filtered = controller.view().filtered_locations.unwrap();
                assert_eq!(filtered.len(), 1);
                assert_eq!(filtered[0].id, "2");
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn typing_fast_issues_one_request_for_final_text() {
        let controller = MapController::new(
            RecordingClient::default(),
            TokioTimer,
            &MapConfig::default(),
        );

        LocalSet::new()
            .run_until(async {
                spawn_local({
                    let c = controller.clone();
                    async move { c.search_input("li").await }
                });
                settle().await;
                assert_eq!(controller.view().search_query, "li");

                tokio::time::sleep(Duration::from_millis(100)).await;
                spawn_local({
                    let c = controller.clone();
                    async move { c.search_input("lib").await }
                });
                settle().await;
                assert_eq!(controller.view().search_query, "lib");
                assert!(controller.client.searches.borrow().is_empty());

                tokio::time::sleep(Duration::from_millis(500)).await;
                settle().await;

                assert_eq!(*controller.client.searches.borrow(), vec!["lib".to_string()]);
                assert_eq!(controller.view().filtered_locations, Some(Vec::new()));
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn short_debounced_query_skips_network() {
        let controller = MapController::new(
            RecordingClient::default(),
            TokioTimer,
            &MapConfig::default(),
        );

        LocalSet::new()
            .run_until(async {
                let c = controller.clone();
                c.search_input("l").await;

                assert!(controller.client.searches.borrow().is_empty());
                assert_eq!(controller.view().filtered_locations, None);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn search_failure_degrades_to_no_results() {
        let client = RecordingClient::default();
        client.fail_search.set(true);
        let controller = MapController::new(client, TokioTimer, &MapConfig::default());

        controller.fetch_data().await;
        controller.search_locations("library").await;

        let view = controller.view();
        assert_eq!(view.filtered_locations, Some(Vec::new()));
        assert_eq!(view.error, None);
        assert_eq!(view.visible_locations.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_fetch_times_out_into_error_state() {
        let controller = MapController::new(
            ScriptedClient::default(),
            TokioTimer,
            &MapConfig::default(),
        );

        controller.fetch_data().await;

        let view = controller.view();
        assert!(!view.is_loading);
        assert_eq!(view.error.as_deref(), Some(FETCH_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn subscribers_see_every_change() {
        let controller = MapController::new(
            RecordingClient::default(),
            FrozenTimer,
            &MapConfig::default(),
        );
        let seen = Rc::new(RefCell::new(Vec::new()));
        controller.subscribe({
            let seen = Rc::clone(&seen);
            move |view: &MapView| seen.borrow_mut().push(view.is_loading)
        });

        controller.fetch_data().await;
        assert_eq!(*seen.borrow(), vec![true, false]);

        let library = controller.with_state(|s| s.locations()[0].clone());
        controller.on_marker_selected(library);
        let view = controller.view();
        assert_eq!(view.search_query, "Library");
        assert_eq!(view.camera_target.map(|t| t.zoom), Some(18.0));
        assert_eq!(seen.borrow().len(), 3);
    }
}
