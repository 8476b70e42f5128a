//! Home Connect REST client
//!
//! Every request carries the vendor media type in `Accept` and
//! `Content-Type`, plus `Authorization: Bearer <token>` whenever the
//! credential store holds an access token.

use std::sync::Arc;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::{Value, json};

use crate::config::Config;
use crate::credentials::CredentialStore;
use crate::{Error, Result};

/// Media type required by the Home Connect API
pub const MEDIA_TYPE: &str = "application/vnd.bsh.sdk.v1+json";

/// Thin async wrapper over the appliance endpoints
pub struct HomeConnectClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Arc<CredentialStore>,
}

impl HomeConnectClient {
    pub fn new(config: &Config, credentials: Arc<CredentialStore>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(MEDIA_TYPE));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(MEDIA_TYPE));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    /// `GET /homeappliances`
    pub async fn get_appliances(&self) -> Result<Value> {
        self.get_json("/homeappliances").await
    }

    /// `GET /homeappliances/{haId}/status`
    pub async fn get_appliance_status(&self, ha_id: &str) -> Result<Value> {
        self.get_json(&appliance_path(ha_id, "status")).await
    }

    /// `GET /homeappliances/{haId}/programs`
    pub async fn get_appliance_programs(&self, ha_id: &str) -> Result<Value> {
        self.get_json(&appliance_path(ha_id, "programs")).await
    }

    /// `GET /homeappliances/{haId}/settings`
    pub async fn get_settings(&self, ha_id: &str) -> Result<Value> {
        self.get_json(&appliance_path(ha_id, "settings")).await
    }

    /// `PUT /homeappliances/{haId}/programs/active`
    ///
    /// The response body is discarded.
    pub async fn start_program(
        &self,
        ha_id: &str,
        program_key: &str,
        options: Option<&Value>,
    ) -> Result<()> {
        let body = program_body(program_key, options);
        self.send(Method::PUT, &appliance_path(ha_id, "programs/active"), Some(&body))
            .await?;
        Ok(())
    }

    /// `DELETE /homeappliances/{haId}/programs/active`
    pub async fn stop_program(&self, ha_id: &str) -> Result<()> {
        self.send(Method::DELETE, &appliance_path(ha_id, "programs/active"), None)
            .await?;
        Ok(())
    }

    /// `PUT /homeappliances/{haId}/settings/{settingKey}`
    pub async fn update_setting(&self, ha_id: &str, setting_key: &str, value: &Value) -> Result<()> {
        let path = format!(
            "{}/{}",
            appliance_path(ha_id, "settings"),
            urlencoding::encode(setting_key)
        );
        let body = setting_body(setting_key, value);
        self.send(Method::PUT, &path, Some(&body)).await?;
        Ok(())
    }

    async fn get_json(&self, path: &str) -> Result<Value> {
        let text = self.send(Method::GET, path, None).await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Issue one request and return the raw body of a 2xx answer
    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method.clone(), &url);

        if let Some(token) = self.credentials.access_token().await {
            request = request.bearer_auth(token);
        } else {
            tracing::debug!("No access token held, sending unauthenticated request");
        }
        if let Some(body) = body {
            request = request.body(serde_json::to_vec(body)?);
        }

        tracing::debug!(%method, path, "Sending Home Connect request");

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            if status == reqwest::StatusCode::UNAUTHORIZED {
                tracing::warn!(%method, path, "Home Connect rejected the access token");
            } else {
                tracing::debug!(%method, path, status = status.as_u16(), "Home Connect request failed");
            }
            return Err(Error::from_status(status, text));
        }

        Ok(text)
    }
}

fn appliance_path(ha_id: &str, resource: &str) -> String {
    format!("/homeappliances/{}/{}", urlencoding::encode(ha_id), resource)
}

/// `{"data": {"key": programKey, "options"?: options}}`
pub(crate) fn program_body(program_key: &str, options: Option<&Value>) -> Value {
    let mut data = json!({ "key": program_key });
    if let Some(options) = options {
        data["options"] = options.clone();
    }
    json!({ "data": data })
}

/// `{"data": {"key": settingKey, "value": value}}`
pub(crate) fn setting_body(setting_key: &str, value: &Value) -> Value {
    json!({
        "data": {
            "key": setting_key,
            "value": value,
        }
    })
}
