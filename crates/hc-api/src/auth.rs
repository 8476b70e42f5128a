//! OAuth helpers: consent URL construction and refresh-token exchange

use std::sync::Arc;

use serde::Deserialize;

use crate::config::Config;
use crate::credentials::{CredentialStore, TokenGrant};
use crate::{Error, Result};

/// Body returned by the token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Issues consent URLs and refreshes the shared access token
pub struct AuthGateway {
    http: reqwest::Client,
    token_url: String,
    authorize_url: String,
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri: String,
    credentials: Arc<CredentialStore>,
}

impl AuthGateway {
    pub fn new(config: &Config, credentials: Arc<CredentialStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            token_url: config.token_url(),
            authorize_url: config.authorize_url(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            credentials,
        }
    }

    /// Build the authorization-code consent URL.
    ///
    /// Returns `None` when no client identifier is configured. No network
    /// traffic is involved.
    pub fn authorization_url(&self) -> Option<String> {
        let client_id = self.client_id.as_deref()?;
        Some(format!(
            "{}?client_id={}&response_type=code&redirect_uri={}",
            self.authorize_url,
            urlencoding::encode(client_id),
            urlencoding::encode(&self.redirect_uri),
        ))
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    /// Exchange the held refresh token for a new access token.
    ///
    /// On success the credential store is updated and the new access token
    /// is returned.
    pub async fn refresh(&self) -> Result<String> {
        let refresh_token = self
            .credentials
            .refresh_token()
            .await
            .ok_or(Error::NoRefreshToken)?;

        let mut form: Vec<(&str, &str)> = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
        ];
        if let Some(client_id) = self.client_id.as_deref() {
            form.push(("client_id", client_id));
        }
        if let Some(client_secret) = self.client_secret.as_deref() {
            form.push(("client_secret", client_secret));
        }

        tracing::info!(endpoint = %self.token_url, "Refreshing access token");

        let response = self
            .http
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::RefreshFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Token endpoint rejected refresh");
            return Err(Error::RefreshFailed(format!(
                "token endpoint returned status {}: {}",
                status.as_u16(),
                body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::RefreshFailed(format!("invalid token response: {e}")))?;

        tracing::debug!(
            rotated_refresh_token = token.refresh_token.is_some(),
            expires_in = ?token.expires_in,
            "Access token refreshed"
        );

        let access_token = token.access_token.clone();
        self.credentials
            .replace(TokenGrant {
                access_token: token.access_token,
                refresh_token: token.refresh_token,
            })
            .await;

        Ok(access_token)
    }
}
