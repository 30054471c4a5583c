use std::sync::Arc;

use crate::gateway::{fetch_tokens_or_empty, Gateway};
use crate::platform::time::now;
use crate::tokens::view::{TokenBoard, TokenView};

pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// The "Tokens" tab: the patient's most recent issued tokens, newest first.
#[derive(Clone)]
pub struct TokenHistory {
    gateway: Arc<dyn Gateway>,
    limit: usize,
}

impl TokenHistory {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self::with_limit(gateway, DEFAULT_RECENT_LIMIT)
    }

    pub fn with_limit(gateway: Arc<dyn Gateway>, limit: usize) -> Self {
        Self { gateway, limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Lists tokens and evaluates them against the current time. Listing failures yield an
    /// empty history.
    pub async fn load(&self) -> Vec<TokenView> {
        let tokens = fetch_tokens_or_empty(self.gateway.as_ref()).await;
        TokenBoard::at(&tokens, now()).recent(self.limit)
    }
}
