//! Backend gateway used by the check-in flow: profile share, issued-token listing and the
//! facility directory.

mod api;
mod constants;
mod error;
mod http;
mod logger;
mod types;

pub use api::{fetch_tokens_or_empty, Gateway};
pub use constants::{DEFAULT_LIST_TOKENS_PATH, DEFAULT_PROVIDER_PATH, DEFAULT_SHARE_PROFILE_PATH};
pub use error::{GatewayError, GatewayErrorCode, GatewayResult};
pub use http::{GatewayEndpoints, HttpGateway};
pub use types::{Provider, ProviderIdentifier, ShareAck, ShareRequest};
