use async_trait::async_trait;

use crate::gateway::error::GatewayResult;
use crate::gateway::logger::LOGGER;
use crate::gateway::types::{Provider, ShareAck, ShareRequest};
use crate::tokens::IssuedToken;

/// Backend capability consumed by the check-in flow.
///
/// Implementations must be cheap to share; the session holds one behind an `Arc` and calls it
/// from background tasks.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait Gateway: Send + Sync {
    /// Shares the signed-in patient's profile with a facility counter.
    async fn share_profile(&self, request: ShareRequest) -> GatewayResult<ShareAck>;

    /// Lists every token the backend has issued to the signed-in patient.
    async fn list_issued_tokens(&self) -> GatewayResult<Vec<IssuedToken>>;

    /// Looks up a facility in the provider directory.
    async fn get_provider(&self, provider_id: &str) -> GatewayResult<Provider>;
}

/// Lists issued tokens, degrading any failure to an empty list.
///
/// The pre-share check and the poller both treat "could not list" like "nothing issued yet".
pub async fn fetch_tokens_or_empty(gateway: &dyn Gateway) -> Vec<IssuedToken> {
    match gateway.list_issued_tokens().await {
        Ok(tokens) => tokens,
        Err(err) => {
            LOGGER.warn(format!("listing issued tokens failed: {err}"));
            Vec::new()
        }
    }
}
