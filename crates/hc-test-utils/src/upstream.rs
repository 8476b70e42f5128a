//! [`MockHomeConnect`] fake for Home Connect test scenarios.
//!
//! The fake mirrors the production URL layout: REST resources live under
//! `/api`, OAuth endpoints under `/security/oauth`.

use hc_api::Config;
use httpmock::Method::POST;
use httpmock::{Mock, MockServer};
use serde_json::json;

/// Access token installed by [`MockHomeConnect::config`]
pub const TEST_ACCESS_TOKEN: &str = "test-access-token";

/// Refresh token installed by [`MockHomeConnect::config`]
pub const TEST_REFRESH_TOKEN: &str = "test-refresh-token";

/// Client identifier installed by [`MockHomeConnect::config`]
pub const TEST_CLIENT_ID: &str = "test-client";

/// Path of the token endpoint on the fake
pub const TOKEN_PATH: &str = "/security/oauth/token";

/// A running fake of the Home Connect API.
///
/// # Example
///
/// ```rust,no_run
/// use hc_test_utils::MockHomeConnect;
///
/// # async fn demo() {
/// let upstream = MockHomeConnect::start().await;
/// let token = upstream.mock_token_success("fresh", None).await;
/// let config = upstream.config();
/// // ... drive code under test with `config` ...
/// token.assert_hits_async(1).await;
/// # }
/// ```
pub struct MockHomeConnect {
    server: MockServer,
}

impl MockHomeConnect {
    /// Start a fresh fake on a random local port.
    pub async fn start() -> Self {
        Self {
            server: MockServer::start_async().await,
        }
    }

    /// The underlying mock server, for registering custom expectations.
    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// Path of an API resource on the fake, e.g. `api_path("/homeappliances")`.
    pub fn api_path(path: &str) -> String {
        format!("/api{path}")
    }

    /// Config pointing at the fake, with client credentials and both tokens set.
    pub fn config(&self) -> Config {
        self.config_with_tokens(Some(TEST_ACCESS_TOKEN), Some(TEST_REFRESH_TOKEN))
    }

    /// Config pointing at the fake with the given token pair.
    pub fn config_with_tokens(&self, access: Option<&str>, refresh: Option<&str>) -> Config {
        Config {
            client_id: Some(TEST_CLIENT_ID.to_string()),
            client_secret: Some("test-secret".to_string()),
            api_base_url: self.server.url("/api"),
            oauth_base_url: self.server.url("/security/oauth"),
            access_token: access.map(String::from),
            refresh_token: refresh.map(String::from),
            ..Config::default()
        }
    }

    /// Token endpoint that grants `access` (and optionally rotates the refresh token).
    pub async fn mock_token_success(&self, access: &str, refresh: Option<&str>) -> Mock<'_> {
        let body = match refresh {
            Some(refresh) => json!({
                "access_token": access,
                "refresh_token": refresh,
                "expires_in": 86400,
                "token_type": "Bearer"
            }),
            None => json!({
                "access_token": access,
                "expires_in": 86400,
                "token_type": "Bearer"
            }),
        };
        self.server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(TOKEN_PATH)
                    .body_includes("grant_type=refresh_token");
                then.status(200).json_body(body);
            })
            .await
    }

    /// Token endpoint that rejects every exchange with `status`.
    pub async fn mock_token_failure(&self, status: u16) -> Mock<'_> {
        self.server
            .mock_async(|when, then| {
                when.method(POST).path(TOKEN_PATH);
                then.status(status).json_body(json!({
                    "error": "invalid_grant",
                    "error_description": "refresh token revoked"
                }));
            })
            .await
    }

    /// Matches any request; use its hit count to prove no traffic happened.
    pub async fn mock_any(&self) -> Mock<'_> {
        self.server
            .mock_async(|_when, then| {
                then.status(500);
            })
            .await
    }
}
