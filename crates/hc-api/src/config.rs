//! Runtime configuration
//!
//! Values are loaded once at process start by the binary and never reloaded.

/// Production REST API base
pub const DEFAULT_API_BASE_URL: &str = "https://api.home-connect.com/api";

/// Production OAuth base (`/authorize`, `/token`)
pub const DEFAULT_OAUTH_BASE_URL: &str = "https://api.home-connect.com/security/oauth";

/// Simulator REST API base
pub const SIMULATOR_API_BASE_URL: &str = "https://simulator.home-connect.com/api";

/// Simulator OAuth base
pub const SIMULATOR_OAUTH_BASE_URL: &str = "https://simulator.home-connect.com/security/oauth";

/// Redirect URI used when none is configured
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:3000/callback";

/// What the dispatcher does with the original call after a successful refresh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// Report the failure and ask the caller to retry the tool call
    #[default]
    ReportAndRetry,
    /// Replay the original call exactly once with the new token
    ReplayOnce,
}

/// Connection and credential settings
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub api_base_url: String,
    pub oauth_base_url: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub refresh_policy: RefreshPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            oauth_base_url: DEFAULT_OAUTH_BASE_URL.to_string(),
            access_token: None,
            refresh_token: None,
            refresh_policy: RefreshPolicy::default(),
        }
    }
}

impl Config {
    /// Point both base URLs at the Home Connect simulator
    pub fn with_simulator(mut self) -> Self {
        self.api_base_url = SIMULATOR_API_BASE_URL.to_string();
        self.oauth_base_url = SIMULATOR_OAUTH_BASE_URL.to_string();
        self
    }

    /// Token endpoint derived from the OAuth base
    pub fn token_url(&self) -> String {
        format!("{}/token", self.oauth_base_url.trim_end_matches('/'))
    }

    /// Consent endpoint derived from the OAuth base
    pub fn authorize_url(&self) -> String {
        format!("{}/authorize", self.oauth_base_url.trim_end_matches('/'))
    }
}
