//! MCP Server for Home Connect
//!
//! This crate exposes Home Connect appliance control via the Model Context
//! Protocol (MCP), allowing agentic clients to list appliances, inspect
//! their state, and start/stop programs or change settings.
//!
//! # Architecture
//!
//! ```text
//! [ MCP Client ]
//!        | (JSON-RPC over stdio)
//!        v
//! [ hc-mcp (MCP Server) ]
//!        |  tools/list  -> tool registry
//!        |  tools/call  -> Dispatcher -> schema validation
//!        v
//! [ hc-api (HomeConnectClient + AuthGateway) ]
//!        |
//!        +--> [ api.home-connect.com/api ]
//!        +--> [ api.home-connect.com/security/oauth/token ]
//! ```
//!
//! # Tools
//!
//! - `get_appliances`, `get_appliance_status`, `get_appliance_programs`,
//!   `get_settings` - read appliance state
//! - `start_program`, `stop_program`, `update_setting` - control appliances
//! - `get_auth_url` - OAuth consent URL, no network traffic

pub mod error;
pub mod handlers;
pub mod protocol;
pub mod server;
pub mod tools;

pub use error::{Error, Result};
pub use handlers::Dispatcher;
pub use server::HomeConnectMcpServer;
pub use tools::{ToolContent, ToolDefinition, ToolResult, get_tool_definitions};
