use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::TimeDelta;
use serde_json::json;

use crate::gateway::{
    Gateway, GatewayError, GatewayErrorCode, GatewayResult, Provider, ProviderIdentifier,
    ShareAck, ShareRequest,
};
use crate::geolocation::{Coordinates, GeolocationOptions, GeolocationResult, Geolocator};
use crate::platform::runtime::sleep;
use crate::platform::time::now;
use crate::tokens::IssuedToken;

/// Token created `age_secs` ago with the given lifetime.
pub fn issued_token(
    id: i64,
    facility_id: &str,
    counter_code: &str,
    age_secs: i64,
    expires_in: &str,
) -> IssuedToken {
    IssuedToken {
        id,
        patient_id: "patient@abdm".into(),
        token_number: format!("T-{id}"),
        facility_id: facility_id.into(),
        facility_name: format!("Facility {facility_id}"),
        facility_address: String::new(),
        expires_in: expires_in.into(),
        client_id: String::new(),
        date_created: now() - TimeDelta::seconds(age_secs),
        counter_code: counter_code.into(),
    }
}

/// In-memory backend. Tokens pushed here show up in the next listing.
#[derive(Default)]
pub struct FakeGateway {
    tokens: Mutex<Vec<IssuedToken>>,
    shared: Mutex<Vec<ShareRequest>>,
    list_calls: AtomicUsize,
    share_calls: AtomicUsize,
    fail_share: AtomicBool,
    fail_listing: AtomicBool,
    list_delay: Mutex<Duration>,
    share_delay: Mutex<Duration>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_token(&self, token: IssuedToken) {
        self.tokens.lock().unwrap().push(token);
    }

    pub fn fail_share(&self, fail: bool) {
        self.fail_share.store(fail, Ordering::SeqCst);
    }

    pub fn fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    pub fn set_list_delay(&self, delay: Duration) {
        *self.list_delay.lock().unwrap() = delay;
    }

    pub fn set_share_delay(&self, delay: Duration) {
        *self.share_delay.lock().unwrap() = delay;
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn share_calls(&self) -> usize {
        self.share_calls.load(Ordering::SeqCst)
    }

    pub fn shared_requests(&self) -> Vec<ShareRequest> {
        self.shared.lock().unwrap().clone()
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn share_profile(&self, request: ShareRequest) -> GatewayResult<ShareAck> {
        self.share_calls.fetch_add(1, Ordering::SeqCst);
        self.shared.lock().unwrap().push(request);
        let delay = *self.share_delay.lock().unwrap();
        sleep(delay).await;
        if self.fail_share.load(Ordering::SeqCst) {
            return Err(
                GatewayError::new(GatewayErrorCode::Status, "counter offline").with_status(503),
            );
        }
        Ok(ShareAck(json!({ "status": "queued" })))
    }

    async fn list_issued_tokens(&self) -> GatewayResult<Vec<IssuedToken>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.list_delay.lock().unwrap();
        sleep(delay).await;
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(GatewayError::new(
                GatewayErrorCode::Network,
                "connection reset",
            ));
        }
        Ok(self.tokens.lock().unwrap().clone())
    }

    async fn get_provider(&self, provider_id: &str) -> GatewayResult<Provider> {
        Ok(Provider {
            identifier: ProviderIdentifier {
                name: format!("Facility {provider_id}"),
                id: provider_id.to_owned(),
            },
            facility_type: vec!["Hospital".into()],
            is_govt_entity: false,
        })
    }
}

pub struct FixedGeolocator(Coordinates);

impl FixedGeolocator {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self(Coordinates {
            latitude,
            longitude,
        })
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn current_position(
        &self,
        _options: GeolocationOptions,
    ) -> GeolocationResult<Coordinates> {
        Ok(self.0)
    }
}
