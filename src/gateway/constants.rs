pub const DEFAULT_SHARE_PROFILE_PATH: &str = "api/v1/gateway/share-profile";
pub const DEFAULT_LIST_TOKENS_PATH: &str = "api/v1/gateway/share-profile/tokens";
/// `{provider_id}` is substituted with the percent-encoded facility id.
pub const DEFAULT_PROVIDER_PATH: &str = "api/v1/gateway/providers/{provider_id}";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
