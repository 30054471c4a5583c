use std::sync::Arc;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use url::Url;

use crate::gateway::api::Gateway;
use crate::gateway::constants::{
    DEFAULT_LIST_TOKENS_PATH, DEFAULT_PROVIDER_PATH, DEFAULT_REQUEST_TIMEOUT_MS,
    DEFAULT_SHARE_PROFILE_PATH,
};
use crate::gateway::error::{
    decode_error, error_for_status, invalid_argument, network_error, GatewayError,
    GatewayErrorCode, GatewayResult,
};
use crate::gateway::logger::LOGGER;
use crate::gateway::types::{Provider, ShareAck, ShareRequest};
use crate::platform::token::AccessTokenProvider;
use crate::tokens::IssuedToken;

const PROVIDER_ID_PLACEHOLDER: &str = "{provider_id}";

/// Relative endpoint paths, resolved against the gateway base URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayEndpoints {
    pub share_profile: String,
    pub list_tokens: String,
    /// Must contain `{provider_id}`.
    pub provider: String,
}

impl Default for GatewayEndpoints {
    fn default() -> Self {
        Self {
            share_profile: DEFAULT_SHARE_PROFILE_PATH.to_string(),
            list_tokens: DEFAULT_LIST_TOKENS_PATH.to_string(),
            provider: DEFAULT_PROVIDER_PATH.to_string(),
        }
    }
}

/// REST implementation of [`Gateway`] on top of `reqwest`.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
    endpoints: GatewayEndpoints,
    access_token: Option<Arc<dyn AccessTokenProvider>>,
    timeout_ms: u64,
}

impl HttpGateway {
    pub fn new(base_url: &str) -> GatewayResult<Self> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> GatewayResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|err| invalid_argument(format!("invalid gateway base URL: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid_argument(format!(
                "gateway base URL `{base_url}` cannot carry paths"
            )));
        }
        Ok(Self {
            client,
            base_url,
            endpoints: GatewayEndpoints::default(),
            access_token: None,
            timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        })
    }

    pub fn with_endpoints(mut self, endpoints: GatewayEndpoints) -> GatewayResult<Self> {
        if !endpoints.provider.contains(PROVIDER_ID_PLACEHOLDER) {
            return Err(invalid_argument(format!(
                "provider endpoint must contain {PROVIDER_ID_PLACEHOLDER}"
            )));
        }
        self.endpoints = endpoints;
        Ok(self)
    }

    pub fn with_access_token_provider(mut self, provider: Arc<dyn AccessTokenProvider>) -> Self {
        self.access_token = Some(provider);
        self
    }

    /// Per-request timeout. Ignored in browsers, where `fetch` has no timeout knob.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoints(&self) -> &GatewayEndpoints {
        &self.endpoints
    }

    fn endpoint_url(&self, path: &str, provider_id: Option<&str>) -> GatewayResult<Url> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| invalid_argument("gateway base URL cannot carry paths"))?;
            segments.pop_if_empty();
            for segment in path.split('/').filter(|segment| !segment.is_empty()) {
                match provider_id {
                    Some(id) if segment == PROVIDER_ID_PLACEHOLDER => segments.push(id),
                    _ => segments.push(segment),
                };
            }
        }
        Ok(url)
    }

    async fn authorize(&self, builder: RequestBuilder) -> GatewayResult<RequestBuilder> {
        let builder = self.apply_timeout(builder);
        let Some(provider) = &self.access_token else {
            return Ok(builder);
        };
        match provider.access_token().await {
            Ok(Some(token)) => Ok(builder.header(AUTHORIZATION, format!("Bearer {token}"))),
            Ok(None) => Ok(builder),
            Err(err) => Err(GatewayError::new(
                GatewayErrorCode::Unauthorized,
                format!("failed to obtain access token: {err}"),
            )),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn apply_timeout(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.timeout(Duration::from_millis(self.timeout_ms))
    }

    #[cfg(target_arch = "wasm32")]
    fn apply_timeout(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &str,
        builder: RequestBuilder,
    ) -> GatewayResult<T> {
        let builder = self.authorize(builder).await?;
        let response = builder
            .send()
            .await
            .map_err(|err| network_error(format!("{operation} request failed: {err}")))?;
        let response = check_status(operation, response).await?;
        let body = response
            .text()
            .await
            .map_err(|err| network_error(format!("{operation} response was cut short: {err}")))?;
        if body.trim().is_empty() {
            return serde_json::from_value(JsonValue::Null)
                .map_err(|err| decode_error(format!("{operation} returned an empty body: {err}")));
        }
        serde_json::from_str(&body)
            .map_err(|err| decode_error(format!("failed to decode {operation} response: {err}")))
    }
}

async fn check_status(operation: &str, response: Response) -> GatewayResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = backend_message(&body);
    LOGGER.warn(format!(
        "{operation} returned HTTP {}: {}",
        status.as_u16(),
        message.as_deref().unwrap_or("<no message>")
    ));
    Err(error_for_status(status.as_u16(), message.as_deref()))
}

/// Pulls `message` or `error.message` out of an error body, if it is JSON.
fn backend_message(body: &str) -> Option<String> {
    let value: JsonValue = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .or_else(|| value.get("error").and_then(|error| error.get("message")))
        .and_then(JsonValue::as_str)
        .map(str::to_owned)
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl Gateway for HttpGateway {
    async fn share_profile(&self, request: ShareRequest) -> GatewayResult<ShareAck> {
        let url = self.endpoint_url(&self.endpoints.share_profile, None)?;
        LOGGER.debug(format!(
            "sharing profile with {} counter {}",
            request.facility_id, request.counter_id
        ));
        self.execute("share-profile", self.client.post(url).json(&request))
            .await
    }

    async fn list_issued_tokens(&self) -> GatewayResult<Vec<IssuedToken>> {
        let url = self.endpoint_url(&self.endpoints.list_tokens, None)?;
        let tokens: Option<Vec<IssuedToken>> =
            self.execute("list-tokens", self.client.get(url)).await?;
        Ok(tokens.unwrap_or_default())
    }

    async fn get_provider(&self, provider_id: &str) -> GatewayResult<Provider> {
        if provider_id.trim().is_empty() {
            return Err(invalid_argument("provider id must not be empty"));
        }
        let url = self.endpoint_url(&self.endpoints.provider, Some(provider_id))?;
        self.execute("get-provider", self.client.get(url)).await
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::payload::parse_scanned_text;
    use crate::platform::token::StaticAccessToken;
    use httpmock::prelude::*;
    use serde_json::json;

    fn share_request() -> ShareRequest {
        let identity =
            parse_scanned_text("https://phr.example.org/share-profile?hip-id=HF1&counter-id=C2")
                .unwrap();
        ShareRequest::new(&identity, None)
    }

    #[test]
    fn resolves_endpoints_against_base_path() {
        let gateway = HttpGateway::new("https://phr.example.org/portal/").unwrap();
        let url = gateway
            .endpoint_url(DEFAULT_PROVIDER_PATH, Some("HF 1/2"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://phr.example.org/portal/api/v1/gateway/providers/HF%201%2F2"
        );
    }

    #[test]
    fn rejects_provider_template_without_placeholder() {
        let endpoints = GatewayEndpoints {
            provider: "providers".into(),
            ..GatewayEndpoints::default()
        };
        let err = HttpGateway::new("https://phr.example.org")
            .unwrap()
            .with_endpoints(endpoints)
            .err()
            .unwrap();
        assert_eq!(err.code, GatewayErrorCode::InvalidArgument);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn share_profile_posts_body_with_bearer_token() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/v1/gateway/share-profile")
                    .header("authorization", "Bearer user-token")
                    .json_body(json!({ "hip_id": "HF1", "context": "C2" }));
                then.status(200).json_body(json!({ "status": "queued" }));
            })
            .await;

        let gateway = HttpGateway::new(&server.base_url())
            .unwrap()
            .with_access_token_provider(Arc::new(StaticAccessToken::new("user-token")));
        let ack = gateway.share_profile(share_request()).await.unwrap();

        assert_eq!(ack.0, json!({ "status": "queued" }));
        mock.assert_async().await;
    }

    #[tokio::test(flavor = "current_thread")]
    async fn lists_issued_tokens() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/gateway/share-profile/tokens");
                then.status(200).json_body(json!([{
                    "id": 7,
                    "patientId": "p@abdm",
                    "tokenNumber": "A-12",
                    "hipId": "HF1",
                    "hipName": "District Hospital",
                    "expiresIn": "1800",
                    "dateCreated": "2024-05-01T10:00:00Z",
                    "counterCode": "C2"
                }]));
            })
            .await;

        let gateway = HttpGateway::new(&server.base_url()).unwrap();
        let tokens = gateway.list_issued_tokens().await.unwrap();

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token_number, "A-12");
        assert_eq!(tokens[0].facility_id, "HF1");
        mock.assert_async().await;
    }

    #[tokio::test(flavor = "current_thread")]
    async fn null_token_list_is_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/gateway/share-profile/tokens");
                then.status(200).body("null");
            })
            .await;

        let gateway = HttpGateway::new(&server.base_url()).unwrap();
        assert!(gateway.list_issued_tokens().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn maps_unauthorized_and_backend_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/v1/gateway/share-profile");
                then.status(401).json_body(json!({ "message": "Session expired" }));
            })
            .await;

        let gateway = HttpGateway::new(&server.base_url()).unwrap();
        let err = gateway.share_profile(share_request()).await.unwrap_err();

        assert_eq!(err.code, GatewayErrorCode::Unauthorized);
        assert_eq!(err.http_status(), Some(401));
        assert_eq!(err.message(), "Session expired");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn malformed_body_is_a_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/gateway/providers/HF1");
                then.status(200).body("{not json");
            })
            .await;

        let gateway = HttpGateway::new(&server.base_url()).unwrap();
        let err = gateway.get_provider("HF1").await.unwrap_err();
        assert_eq!(err.code, GatewayErrorCode::Decode);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn fetches_provider() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/gateway/providers/HF1");
                then.status(200).json_body(json!({
                    "identifier": { "name": "District Hospital", "id": "HF1" },
                    "facilityType": ["Hospital"],
                    "isGovtEntity": false
                }));
            })
            .await;

        let gateway = HttpGateway::new(&server.base_url()).unwrap();
        let provider = gateway.get_provider("HF1").await.unwrap();
        assert_eq!(provider.identifier.name, "District Hospital");
        assert_eq!(provider.facility_type, vec!["Hospital".to_string()]);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn unreachable_backend_is_a_network_error() {
        let gateway = HttpGateway::new("http://127.0.0.1:9").unwrap().with_timeout_ms(500);
        let err = gateway.list_issued_tokens().await.unwrap_err();
        assert_eq!(err.code, GatewayErrorCode::Network);
    }
}
