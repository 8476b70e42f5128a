//! Home Connect API access
//!
//! This crate wraps the Home Connect REST API and owns the bearer-token
//! lifecycle used by the MCP server.
//!
//! # Architecture
//!
//! ```text
//! [ hc-mcp dispatcher ]
//!        |
//!        +--> [ HomeConnectClient ] --(Bearer token)--> api.home-connect.com/api
//!        |            |
//!        |            v
//!        |    [ CredentialStore ] <--(replace)-- [ AuthGateway ]
//!        |                                            |
//!        +--------------------------------------------+--> /security/oauth/token
//! ```
//!
//! Both [`HomeConnectClient`] and [`AuthGateway`] hold the same
//! [`CredentialStore`] through an `Arc`; a refresh is visible to the next
//! outbound request without any further wiring.

pub mod auth;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;

pub use auth::{AuthGateway, TokenResponse};
pub use client::{HomeConnectClient, MEDIA_TYPE};
pub use config::{Config, RefreshPolicy};
pub use credentials::{CredentialStore, TokenGrant, Tokens};
pub use error::{Error, Result};
