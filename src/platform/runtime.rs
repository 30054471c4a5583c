use std::future::Future;
use std::time::Duration;

use futures::future::{select, Either};
use futures::pin_mut;

use crate::platform::cancel::CancellationToken;

/// Spawns a background task on the browser event loop.
#[cfg(target_arch = "wasm32")]
pub fn spawn_detached<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

/// Spawns a background task on the ambient tokio runtime, falling back to a shared
/// current-thread runtime when called outside of one.
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_detached<F>(future: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    use std::sync::LazyLock;
    use tokio::runtime::{Builder, Handle, Runtime};

    static BACKGROUND_RUNTIME: LazyLock<Runtime> = LazyLock::new(|| {
        Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("failed to build background tokio runtime")
    });

    if let Ok(handle) = Handle::try_current() {
        handle.spawn(future);
    } else {
        let _ = BACKGROUND_RUNTIME.spawn(future);
    }
}

/// Asynchronously waits for the provided duration in a platform-compatible way.
pub async fn sleep(duration: Duration) {
    if duration.is_zero() {
        return;
    }

    sleep_impl(duration).await;
}

#[cfg(target_arch = "wasm32")]
async fn sleep_impl(duration: Duration) {
    gloo_timers::future::sleep(duration).await;
}

#[cfg(not(target_arch = "wasm32"))]
async fn sleep_impl(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// Sleeps for `duration` unless `cancel` fires first.
///
/// Returns `true` when the full duration elapsed and `false` when the wait was cut short.
pub async fn sleep_unless_cancelled(duration: Duration, cancel: &CancellationToken) -> bool {
    if cancel.is_cancelled() {
        return false;
    }
    until_cancelled(sleep(duration), cancel).await.is_some()
}

/// Drives `future` to completion unless `cancel` fires first, in which case the future is
/// dropped and `None` is returned.
pub async fn until_cancelled<F>(future: F, cancel: &CancellationToken) -> Option<F::Output>
where
    F: Future,
{
    if cancel.is_cancelled() {
        return None;
    }

    let cancelled = cancel.cancelled();
    pin_mut!(future);
    pin_mut!(cancelled);

    match select(future, cancelled).await {
        Either::Left((output, _)) => Some(output),
        Either::Right(((), _)) => None,
    }
}

/// Awaits `future` for at most `limit`. `None` means the limit elapsed first.
pub async fn with_timeout<F>(future: F, limit: Duration) -> Option<F::Output>
where
    F: Future,
{
    let timer = sleep(limit);
    pin_mut!(future);
    pin_mut!(timer);

    match select(future, timer).await {
        Either::Left((output, _)) => Some(output),
        Either::Right(((), _)) => None,
    }
}
