//! MCP Server implementation
//!
//! The main server struct that coordinates MCP protocol handling
//! with the Home Connect tool dispatcher.

use std::sync::Arc;

use hc_api::{Config, CredentialStore};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::handlers::Dispatcher;
use crate::protocol::{
    INTERNAL_ERROR, INVALID_PARAMS, InitializeParams, InitializeResult, JsonRpcRequest,
    JsonRpcResponse, METHOD_NOT_FOUND, PARSE_ERROR, PROTOCOL_VERSION, ServerCapabilities, ServerInfo,
    ToolCallParams, ToolsCapability,
};
use crate::tools::{ToolDefinition, ToolResult, get_tool_definitions};
use crate::{Error, Result};

/// Name reported in `serverInfo`
pub const SERVER_NAME: &str = "home-connect";

/// MCP Server for Home Connect
///
/// Handles one JSON-RPC message at a time: each line read from stdin is
/// processed to completion before the next is read.
///
/// # Example
///
/// ```ignore
/// use hc_api::Config;
/// use hc_mcp::HomeConnectMcpServer;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut server = HomeConnectMcpServer::new(&Config::default())?;
///     server.run().await?;
///     Ok(())
/// }
/// ```
pub struct HomeConnectMcpServer {
    dispatcher: Dispatcher,

    /// Whether the server has been initialized
    initialized: bool,

    /// Available MCP tools
    tools: Vec<ToolDefinition>,
}

impl HomeConnectMcpServer {
    /// Create a new MCP server instance from startup configuration
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            dispatcher: Dispatcher::new(config)?,
            initialized: false,
            tools: Vec::new(),
        })
    }

    /// Initialize the server
    ///
    /// Loads the tool catalog. Credentials are not validated here; the
    /// first upstream call reports whether they work.
    pub async fn initialize(&mut self) -> Result<()> {
        let tokens = self.dispatcher.credentials().snapshot().await;
        tracing::info!(
            has_access_token = tokens.access_token.is_some(),
            has_refresh_token = tokens.refresh_token.is_some(),
            "Initializing MCP server"
        );

        self.tools = get_tool_definitions();
        self.initialized = true;
        Ok(())
    }

    /// Run the MCP server
    ///
    /// This starts the server and processes MCP protocol messages over
    /// stdin/stdout until stdin closes.
    pub async fn run(&mut self) -> Result<()> {
        self.initialize().await?;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        tracing::info!("Home Connect MCP server running on stdio");

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            tracing::debug!(request = %line, "Received message");

            let response = match self.handle_message(&line).await {
                Ok(response) => response,
                Err(e) => {
                    let code = match e {
                        Error::Json(_) => PARSE_ERROR,
                        _ => INTERNAL_ERROR,
                    };
                    let error_response =
                        JsonRpcResponse::error(None, code, format!("Internal error: {}", e));
                    serde_json::to_string(&error_response)?
                }
            };

            // Notifications produce no response
            if response.is_empty() {
                continue;
            }
            stdout.write_all(response.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }

        tracing::info!("stdin closed, shutting down");
        Ok(())
    }

    /// Handle a single MCP message
    ///
    /// Parses the JSON-RPC request and dispatches to the appropriate handler.
    /// Returns the serialized response, or an empty string for notifications.
    pub async fn handle_message(&self, message: &str) -> Result<String> {
        let request: JsonRpcRequest = serde_json::from_str(message)?;

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id, request.params)?,
            "initialized" => return Ok(String::new()),
            method if method.starts_with("notifications/") => return Ok(String::new()),
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            "tools/list" => self.handle_tools_list(request.id)?,
            "tools/call" => self.handle_tools_call(request.id, request.params).await?,
            // Notifications are never answered, even unknown ones
            _ if request.id.is_none() => return Ok(String::new()),
            _ => JsonRpcResponse::error(
                request.id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };

        serde_json::to_string(&response).map_err(Error::from)
    }

    fn handle_initialize(&self, id: Option<Value>, params: Value) -> Result<JsonRpcResponse> {
        match serde_json::from_value::<InitializeParams>(params) {
            Ok(params) => tracing::debug!(
                client = %params.client_info.name,
                client_version = %params.client_info.version,
                protocol_version = %params.protocol_version,
                "Client initializing"
            ),
            Err(e) => tracing::debug!(error = %e, "Initialize without client info"),
        }

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        Ok(JsonRpcResponse::success(id, serde_json::to_value(result)?))
    }

    fn handle_tools_list(&self, id: Option<Value>) -> Result<JsonRpcResponse> {
        let tools = get_tool_definitions();
        Ok(JsonRpcResponse::success(id, json!({ "tools": tools })))
    }

    /// Unknown tools are a protocol error; every other failure is reported
    /// as a tool result with `isError: true`.
    async fn handle_tools_call(&self, id: Option<Value>, params: Value) -> Result<JsonRpcResponse> {
        let tool_params: ToolCallParams = match serde_json::from_value(params) {
            Ok(params) => params,
            Err(e) => {
                return Ok(JsonRpcResponse::error(
                    id,
                    INVALID_PARAMS,
                    format!("Invalid tools/call params: {}", e),
                ));
            }
        };

        match self
            .dispatcher
            .invoke(&tool_params.name, tool_params.arguments)
            .await
        {
            Ok(result) => Ok(JsonRpcResponse::success(id, serde_json::to_value(result)?)),
            Err(e @ Error::UnknownTool(_)) => {
                Ok(JsonRpcResponse::error(id, INVALID_PARAMS, e.to_string()))
            }
            Err(e) => {
                tracing::warn!(tool = %tool_params.name, error = %e, "Tool call failed");
                let tool_result = ToolResult::error(e.to_string());
                Ok(JsonRpcResponse::success(id, serde_json::to_value(tool_result)?))
            }
        }
    }

    /// Shared credential store used by every outbound call
    pub fn credentials(&self) -> &Arc<CredentialStore> {
        self.dispatcher.credentials()
    }

    /// Check if the server is initialized
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Get available tools
    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }
}
