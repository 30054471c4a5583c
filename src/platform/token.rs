use std::error::Error;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

/// Error returned by access token providers when the session layer cannot supply a credential.
#[derive(Debug, Clone)]
pub struct TokenError {
    message: String,
}

impl TokenError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn from_error(err: impl Error) -> Self {
        Self::new(err.to_string())
    }
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for TokenError {}

/// Seam through which the (external) session layer hands bearer tokens to the gateway.
///
/// `Ok(None)` means "no signed-in user"; requests are then sent without credentials.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<Option<String>, TokenError>;
}

/// Provider returning a fixed token, for service accounts and tests.
#[derive(Clone, Debug)]
pub struct StaticAccessToken(Arc<str>);

impl StaticAccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Arc::from(token.into().into_boxed_str()))
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl AccessTokenProvider for StaticAccessToken {
    async fn access_token(&self) -> Result<Option<String>, TokenError> {
        if self.0.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.0.to_string()))
        }
    }
}
