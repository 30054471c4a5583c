//! Best-effort device position attached to a profile share.

use std::fmt::{Display, Formatter};
use std::time::Duration;

use async_trait::async_trait;

use crate::logger::Logger;
use crate::platform::runtime::with_timeout;

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
mod web;
#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
pub use web::BrowserGeolocator;

static LOGGER: std::sync::LazyLock<Logger> =
    std::sync::LazyLock::new(|| Logger::new("@phr/geolocation"));

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeolocationOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_millis(8_000),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeolocationErrorCode {
    Unavailable,
    PermissionDenied,
    Timeout,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeolocationError {
    pub code: GeolocationErrorCode,
    message: String,
}

impl GeolocationError {
    pub fn new(code: GeolocationErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code_str(&self) -> &'static str {
        match self.code {
            GeolocationErrorCode::Unavailable => "geolocation/unavailable",
            GeolocationErrorCode::PermissionDenied => "geolocation/permission-denied",
            GeolocationErrorCode::Timeout => "geolocation/timeout",
        }
    }
}

impl Display for GeolocationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code_str())
    }
}

impl std::error::Error for GeolocationError {}

pub type GeolocationResult<T> = Result<T, GeolocationError>;

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait Geolocator: Send + Sync {
    async fn current_position(&self, options: GeolocationOptions)
        -> GeolocationResult<Coordinates>;
}

/// Geolocator for hosts without a position source.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoGeolocation;

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl Geolocator for NoGeolocation {
    async fn current_position(
        &self,
        _options: GeolocationOptions,
    ) -> GeolocationResult<Coordinates> {
        Err(GeolocationError::new(
            GeolocationErrorCode::Unavailable,
            "no position source on this platform",
        ))
    }
}

/// Resolves a position within `options.timeout`, or `None`.
pub async fn locate_best_effort(
    geolocator: &dyn Geolocator,
    options: GeolocationOptions,
) -> Option<Coordinates> {
    match with_timeout(geolocator.current_position(options), options.timeout).await {
        Some(Ok(coordinates)) => Some(coordinates),
        Some(Err(err)) => {
            LOGGER.debug(format!("sharing without location: {err}"));
            None
        }
        None => {
            LOGGER.debug(format!(
                "sharing without location: no fix within {} ms",
                options.timeout.as_millis()
            ));
            None
        }
    }
}
