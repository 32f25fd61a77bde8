use std::future::Future;
use std::time::Duration;

use futures::channel::oneshot;

/// Something that can wait. The engine never picks a runtime itself.
pub trait Timer {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}

/// Wakes through the browser's `setTimeout` (via Leptos).
#[derive(Debug, Clone, Copy, Default)]
pub struct LeptosTimer;

impl Timer for LeptosTimer {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
        let (tx, rx) = oneshot::channel::<()>();
        leptos::prelude::set_timeout(
            move || {
                let _ = tx.send(());
            },
            duration,
        );
        async move {
            let _ = rx.await;
        }
    }
}
