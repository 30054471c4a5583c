use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::platform::cancel::CancellationToken;
use crate::platform::runtime::{sleep_unless_cancelled, spawn_detached};
use crate::platform::time::now;
use crate::tokens::model::IssuedToken;
use crate::tokens::view::TokenView;

pub const DEFAULT_COUNTDOWN_TICK: Duration = Duration::from_millis(1_000);

pub type TickCallback = Arc<dyn Fn(&TokenView) + Send + Sync>;

/// Live countdown for one token.
///
/// The ticker recomputes the view every `tick` and hands it to the callback. It stops after
/// reporting the first inactive view, on [`stop`](Countdown::stop), or when dropped.
pub struct Countdown {
    latest: Arc<Mutex<TokenView>>,
    cancel: CancellationToken,
}

impl Countdown {
    pub fn start(token: IssuedToken, tick: Duration, on_tick: TickCallback) -> Self {
        let latest = Arc::new(Mutex::new(TokenView::compute(&token, now())));
        let cancel = CancellationToken::new();

        let task_latest = Arc::clone(&latest);
        let task_cancel = cancel.clone();
        spawn_detached(async move {
            loop {
                if task_cancel.is_cancelled() {
                    break;
                }
                let view = TokenView::compute(&token, now());
                *task_latest
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner()) = view.clone();
                on_tick(&view);
                if !view.is_active {
                    log::debug!("countdown for token {} reached expiry", token.id);
                    break;
                }
                if !sleep_unless_cancelled(tick, &task_cancel).await {
                    break;
                }
            }
        });

        Self { latest, cancel }
    }

    /// Most recent view; computed at start so it is available before the first tick.
    pub fn current(&self) -> TokenView {
        self.latest
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
