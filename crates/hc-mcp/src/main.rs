//! Home Connect MCP Server
//!
//! A Model Context Protocol server that exposes Home Connect appliance
//! control to agentic clients.
//!
//! # Usage
//!
//! ```bash
//! hc-mcp [--client-id <id>] [--refresh-token <token>] [--simulator]
//! ```
//!
//! # Environment Variables
//!
//! Every flag can also be set through the environment (or a `.env` file in
//! the working directory):
//!
//! - `HOME_CONNECT_CLIENT_ID`, `HOME_CONNECT_CLIENT_SECRET`
//! - `HOME_CONNECT_REDIRECT_URI` (default `http://localhost:3000/callback`)
//! - `HOME_CONNECT_ACCESS_TOKEN`, `HOME_CONNECT_REFRESH_TOKEN`
//! - `HOME_CONNECT_API_BASE_URL`, `HOME_CONNECT_OAUTH_BASE_URL`
//! - `HOME_CONNECT_RETRY_AFTER_REFRESH`
//! - `RUST_LOG`: log verbosity (default: `hc_mcp=info,hc_api=info`)
//!
//! # Protocol
//!
//! The server communicates via JSON-RPC 2.0 over stdio:
//! - Requests/responses go through stdout
//! - Logs go to stderr (to avoid interfering with the protocol)

use clap::Parser;
use hc_api::config::DEFAULT_REDIRECT_URI;
use hc_api::{Config, RefreshPolicy};
use hc_mcp::HomeConnectMcpServer;

/// MCP server for Home Connect appliances
#[derive(Parser)]
#[command(name = "hc-mcp")]
#[command(about = "MCP server for Home Connect appliances")]
#[command(version)]
struct Args {
    /// OAuth client identifier
    #[arg(long, env = "HOME_CONNECT_CLIENT_ID")]
    client_id: Option<String>,

    /// OAuth client secret
    #[arg(long, env = "HOME_CONNECT_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,

    /// Redirect URI registered for the client
    #[arg(long, env = "HOME_CONNECT_REDIRECT_URI", default_value = DEFAULT_REDIRECT_URI)]
    redirect_uri: String,

    /// Initial access token
    #[arg(long, env = "HOME_CONNECT_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Initial refresh token
    #[arg(long, env = "HOME_CONNECT_REFRESH_TOKEN", hide_env_values = true)]
    refresh_token: Option<String>,

    /// Override the REST API base URL
    #[arg(long, env = "HOME_CONNECT_API_BASE_URL")]
    api_base_url: Option<String>,

    /// Override the OAuth base URL
    #[arg(long, env = "HOME_CONNECT_OAUTH_BASE_URL")]
    oauth_base_url: Option<String>,

    /// Target the Home Connect simulator instead of production
    #[arg(long)]
    simulator: bool,

    /// Replay the original call once after a successful token refresh
    #[arg(long, env = "HOME_CONNECT_RETRY_AFTER_REFRESH")]
    retry_after_refresh: bool,
}

impl Args {
    fn into_config(self) -> Config {
        let mut config = Config {
            client_id: self.client_id,
            client_secret: self.client_secret,
            redirect_uri: self.redirect_uri,
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            refresh_policy: if self.retry_after_refresh {
                RefreshPolicy::ReplayOnce
            } else {
                RefreshPolicy::ReportAndRetry
            },
            ..Config::default()
        };
        if self.simulator {
            config = config.with_simulator();
        }
        if let Some(url) = self.api_base_url {
            config.api_base_url = url;
        }
        if let Some(url) = self.oauth_base_url {
            config.oauth_base_url = url;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine; the environment may already be set
    let _ = dotenvy::dotenv();

    // Initialize logging to stderr (stdout is reserved for MCP protocol)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hc_mcp=info".parse()?)
                .add_directive("hc_api=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Args::parse().into_config();

    tracing::info!(
        api = %config.api_base_url,
        refresh_policy = ?config.refresh_policy,
        "Starting Home Connect MCP server"
    );

    let mut server = HomeConnectMcpServer::new(&config)?;
    server.run().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hc_api::config::SIMULATOR_OAUTH_BASE_URL;

    #[test]
    fn defaults_map_to_production_config() {
        let config = Args::parse_from(["hc-mcp"]).into_config();
        assert_eq!(config.api_base_url, hc_api::config::DEFAULT_API_BASE_URL);
        assert_eq!(config.redirect_uri, "http://localhost:3000/callback");
        assert_eq!(config.refresh_policy, RefreshPolicy::ReportAndRetry);
    }

    #[test]
    fn simulator_flag_yields_to_explicit_override() {
        let config = Args::parse_from([
            "hc-mcp",
            "--simulator",
            "--api-base-url",
            "http://localhost:8080/api",
        ])
        .into_config();
        assert_eq!(config.api_base_url, "http://localhost:8080/api");
        assert_eq!(config.oauth_base_url, SIMULATOR_OAUTH_BASE_URL);
    }

    #[test]
    fn retry_flag_selects_replay_policy() {
        let config = Args::parse_from(["hc-mcp", "--retry-after-refresh", "--client-id", "abc"])
            .into_config();
        assert_eq!(config.refresh_policy, RefreshPolicy::ReplayOnce);
        assert_eq!(config.client_id.as_deref(), Some("abc"));
    }
}
