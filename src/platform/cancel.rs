//! Cooperative cancellation shared by the frame sampler, the poll ticker and the countdown.
//!
//! A token is backed by a zero-traffic channel: cancelling closes the channel, which wakes
//! every pending [`CancellationToken::cancelled`] future at once.

use async_channel::{Receiver, Sender};

#[derive(Clone, Debug)]
pub struct CancellationToken {
    sender: Sender<()>,
    receiver: Receiver<()>,
}

impl CancellationToken {
    pub fn new() -> Self {
        let (sender, receiver) = async_channel::bounded(1);
        Self { sender, receiver }
    }

    /// Revokes the token. Idempotent.
    pub fn cancel(&self) {
        self.sender.close();
    }

    pub fn is_cancelled(&self) -> bool {
        self.sender.is_closed()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called on any clone.
    pub async fn cancelled(&self) {
        // Nothing is ever sent, so `recv` only returns once the channel closes.
        let _ = self.receiver.recv().await;
    }

    /// Creates a token that is cancelled when either `self` or the child itself is cancelled.
    pub fn child(&self) -> CancellationToken {
        let child = CancellationToken::new();
        if self.is_cancelled() {
            child.cancel();
            return child;
        }

        let parent = self.clone();
        let linked = child.clone();
        crate::platform::runtime::spawn_detached(async move {
            let parent_cancelled = parent.cancelled();
            let child_cancelled = linked.cancelled();
            futures::pin_mut!(parent_cancelled);
            futures::pin_mut!(child_cancelled);
            futures::future::select(parent_cancelled, child_cancelled).await;
            linked.cancel();
        });
        child
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
