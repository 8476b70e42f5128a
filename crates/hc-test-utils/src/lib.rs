//! Shared test utilities for the home-connect-mcp workspace.
//!
//! This crate provides a fake Home Connect backend so crate test suites do
//! not each wire up their own mock server. It is a dev-dependency only and is
//! never published.
//!
//! # Modules
//!
//! - [`upstream`]: [`MockHomeConnect`], an `httpmock`-backed fake of the
//!   REST API and the OAuth token endpoint

pub mod upstream;

pub use upstream::MockHomeConnect;
