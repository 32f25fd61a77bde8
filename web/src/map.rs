//! Map interaction state engine: raw data, search, filters, selection and
//! camera reconciled into one [`MapView`].

pub mod client;
pub mod controller;
pub mod filter;
pub mod search;
pub mod state;
pub mod timer;
pub mod view;

pub use client::{ClientError, DataClient, HttpDataClient};
pub use controller::MapController;
pub use state::MapViewState;
pub use timer::{LeptosTimer, Timer};
pub use view::{CameraTarget, LayerToggles, MapView, VisibleEvent};
