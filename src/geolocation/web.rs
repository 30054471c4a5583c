use async_trait::async_trait;
use js_sys::{Object, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::geolocation::{
    Coordinates, GeolocationError, GeolocationErrorCode, GeolocationOptions, GeolocationResult,
    Geolocator,
};
use crate::platform::browser::{js_value_to_string, property};

// `GeolocationPositionError.code` values.
const PERMISSION_DENIED: u32 = 1;
const TIMEOUT: u32 = 3;

/// `navigator.geolocation` backed position source.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserGeolocator;

impl BrowserGeolocator {
    pub fn new() -> Self {
        Self
    }
}

fn unavailable(message: impl Into<String>) -> GeolocationError {
    GeolocationError::new(GeolocationErrorCode::Unavailable, message)
}

fn position_options(options: GeolocationOptions) -> GeolocationResult<web_sys::PositionOptions> {
    let object = Object::new();
    let timeout_ms = u32::try_from(options.timeout.as_millis()).unwrap_or(u32::MAX);
    Reflect::set(
        &object,
        &JsValue::from_str("enableHighAccuracy"),
        &JsValue::from_bool(options.high_accuracy),
    )
    .and_then(|_| {
        Reflect::set(
            &object,
            &JsValue::from_str("timeout"),
            &JsValue::from_f64(f64::from(timeout_ms)),
        )
    })
    .map_err(|err| unavailable(js_value_to_string(&err)))?;
    Ok(object.unchecked_into())
}

fn classify(err: &JsValue) -> GeolocationError {
    let message = property(err, "message")
        .and_then(|value| value.as_string())
        .unwrap_or_else(|| js_value_to_string(err));
    let code = match property(err, "code").and_then(|value| value.as_f64()) {
        Some(code) if code as u32 == PERMISSION_DENIED => GeolocationErrorCode::PermissionDenied,
        Some(code) if code as u32 == TIMEOUT => GeolocationErrorCode::Timeout,
        _ => GeolocationErrorCode::Unavailable,
    };
    GeolocationError::new(code, message)
}

#[async_trait(?Send)]
impl Geolocator for BrowserGeolocator {
    async fn current_position(
        &self,
        options: GeolocationOptions,
    ) -> GeolocationResult<Coordinates> {
        let window = web_sys::window().ok_or_else(|| unavailable("window is not available"))?;
        let geolocation = window
            .navigator()
            .geolocation()
            .map_err(|err| unavailable(js_value_to_string(&err)))?;
        let position_options = position_options(options)?;

        let mut request_error = None;
        let promise = Promise::new(&mut |resolve, reject| {
            if let Err(err) = geolocation.get_current_position_with_error_callback_and_options(
                &resolve,
                Some(&reject),
                &position_options,
            ) {
                request_error = Some(err);
            }
        });
        if let Some(err) = request_error {
            return Err(unavailable(js_value_to_string(&err)));
        }

        let position = JsFuture::from(promise).await.map_err(|err| classify(&err))?;
        let coords = property(&position, "coords")
            .ok_or_else(|| unavailable("position has no coordinates"))?;
        let latitude = property(&coords, "latitude").and_then(|value| value.as_f64());
        let longitude = property(&coords, "longitude").and_then(|value| value.as_f64());
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Ok(Coordinates {
                latitude,
                longitude,
            }),
            _ => Err(unavailable("position coordinates are not numeric")),
        }
    }
}
