//! MCP Tool Handlers
//!
//! The [`Dispatcher`] validates a tool call against the registry, issues the
//! single matching Home Connect request, and turns the outcome into a
//! [`ToolResult`]. A 401 from the API triggers at most one token refresh.

use std::future::Future;
use std::sync::Arc;

use hc_api::{AuthGateway, Config, CredentialStore, HomeConnectClient, RefreshPolicy};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::tools::{ToolResult, find_tool, validate_arguments};
use crate::{Error, Result};

/// Routes tool calls to the Home Connect API
pub struct Dispatcher {
    client: HomeConnectClient,
    gateway: AuthGateway,
    refresh_policy: RefreshPolicy,
}

impl Dispatcher {
    /// Build a dispatcher whose client and gateway share one credential store
    /// seeded from `config`.
    pub fn new(config: &Config) -> Result<Self> {
        let credentials = Arc::new(CredentialStore::new(
            config.access_token.clone(),
            config.refresh_token.clone(),
        ));
        Self::with_credentials(config, credentials)
    }

    /// Build a dispatcher around an existing credential store
    pub fn with_credentials(config: &Config, credentials: Arc<CredentialStore>) -> Result<Self> {
        let client =
            HomeConnectClient::new(config, Arc::clone(&credentials)).map_err(Error::Execution)?;
        let gateway = AuthGateway::new(config, credentials);
        Ok(Self {
            client,
            gateway,
            refresh_policy: config.refresh_policy,
        })
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        self.client.credentials()
    }

    /// Invoke a tool by name.
    ///
    /// Unknown names and schema violations are rejected before any request
    /// is sent.
    pub async fn invoke(&self, tool_name: &str, arguments: Value) -> Result<ToolResult> {
        let tool = find_tool(tool_name).ok_or_else(|| Error::UnknownTool(tool_name.to_string()))?;
        validate_arguments(&tool, &arguments)?;

        tracing::debug!(tool = tool_name, "Dispatching tool call");

        match tool_name {
            "get_auth_url" => self.handle_get_auth_url(),
            "get_appliances" => self.handle_get_appliances().await,
            "get_appliance_status" => self.handle_get_appliance_status(arguments).await,
            "get_appliance_programs" => self.handle_get_appliance_programs(arguments).await,
            "start_program" => self.handle_start_program(arguments).await,
            "stop_program" => self.handle_stop_program(arguments).await,
            "get_settings" => self.handle_get_settings(arguments).await,
            "update_setting" => self.handle_update_setting(arguments).await,
            _ => Err(Error::UnknownTool(tool_name.to_string())),
        }
    }

    // ========================================================================
    // OAuth
    // ========================================================================

    fn handle_get_auth_url(&self) -> Result<ToolResult> {
        let url = self
            .gateway
            .authorization_url()
            .ok_or_else(|| Error::Configuration("CLIENT_ID".to_string()))?;

        Ok(ToolResult::text(format!(
            "Authorization URL: {url}\n\nPlease visit this URL to authorize the application and get the authorization code."
        )))
    }

    // ========================================================================
    // Appliance state
    // ========================================================================

    async fn handle_get_appliances(&self) -> Result<ToolResult> {
        let body = self.call(|| self.client.get_appliances()).await?;
        pretty(&body)
    }

    async fn handle_get_appliance_status(&self, arguments: Value) -> Result<ToolResult> {
        let args: ApplianceArgs = parse_args(arguments)?;
        let body = self
            .call(|| self.client.get_appliance_status(&args.ha_id))
            .await?;
        pretty(&body)
    }

    async fn handle_get_appliance_programs(&self, arguments: Value) -> Result<ToolResult> {
        let args: ApplianceArgs = parse_args(arguments)?;
        let body = self
            .call(|| self.client.get_appliance_programs(&args.ha_id))
            .await?;
        pretty(&body)
    }

    async fn handle_get_settings(&self, arguments: Value) -> Result<ToolResult> {
        let args: ApplianceArgs = parse_args(arguments)?;
        let body = self.call(|| self.client.get_settings(&args.ha_id)).await?;
        pretty(&body)
    }

    // ========================================================================
    // Appliance control
    // ========================================================================

    async fn handle_start_program(&self, arguments: Value) -> Result<ToolResult> {
        let args: StartProgramArgs = parse_args(arguments)?;
        self.call(|| {
            self.client
                .start_program(&args.ha_id, &args.program_key, args.options.as_ref())
        })
        .await?;

        Ok(ToolResult::text(format!(
            "Program {} started successfully",
            args.program_key
        )))
    }

    async fn handle_stop_program(&self, arguments: Value) -> Result<ToolResult> {
        let args: ApplianceArgs = parse_args(arguments)?;
        self.call(|| self.client.stop_program(&args.ha_id)).await?;
        Ok(ToolResult::text("Program stopped successfully"))
    }

    async fn handle_update_setting(&self, arguments: Value) -> Result<ToolResult> {
        let args: UpdateSettingArgs = parse_args(arguments)?;
        self.call(|| {
            self.client
                .update_setting(&args.ha_id, &args.setting_key, &args.value)
        })
        .await?;

        Ok(ToolResult::text(format!(
            "Setting {} updated successfully",
            args.setting_key
        )))
    }

    // ========================================================================
    // Auth recovery
    // ========================================================================

    /// Run one API request, handling a 401 with at most one token refresh.
    async fn call<T, F, Fut>(&self, request: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = hc_api::Result<T>>,
    {
        let err = match request().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_unauthorized() => err,
            Err(err) => return Err(Error::Execution(err)),
        };

        if !self.gateway.credentials().has_refresh_token().await {
            tracing::warn!("Access token rejected and no refresh token is held");
            return Err(Error::Execution(err));
        }

        if let Err(refresh_err) = self.gateway.refresh().await {
            tracing::warn!(error = %refresh_err, "Token refresh failed");
            return Err(Error::AuthenticationFailed(refresh_err));
        }

        match self.refresh_policy {
            RefreshPolicy::ReportAndRetry => Err(Error::TokenRefreshed),
            RefreshPolicy::ReplayOnce => {
                tracing::info!("Replaying request with refreshed token");
                request().await.map_err(Error::Execution)
            }
        }
    }
}

/// Arguments for tools keyed only by appliance
#[derive(Debug, Deserialize)]
struct ApplianceArgs {
    #[serde(rename = "haId")]
    ha_id: String,
}

/// Arguments for start_program
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartProgramArgs {
    ha_id: String,
    program_key: String,
    #[serde(default)]
    options: Option<Value>,
}

/// Arguments for update_setting
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateSettingArgs {
    ha_id: String,
    setting_key: String,
    value: Value,
}

fn parse_args<T: DeserializeOwned>(arguments: Value) -> Result<T> {
    serde_json::from_value(arguments).map_err(|e| Error::invalid_arguments(e.to_string()))
}

fn pretty(body: &Value) -> Result<ToolResult> {
    Ok(ToolResult::text(serde_json::to_string_pretty(body)?))
}
