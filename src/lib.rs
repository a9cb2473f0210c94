//! facebook-ads-mcp: an MCP server for Facebook ads management
//!
//! The server exposes campaign, ad set, ad, creative, audience, insights and
//! business asset operations of the Facebook Marketing API as MCP tools.
//!
//! # Modules
//!
//! - [`config`]: configuration file and credential loading
//! - [`error`]: configuration error types
//! - [`graph`]: the Graph API boundary ([`graph::AdsApi`]) and its HTTP client
//! - [`tools`]: tool catalogue, validation, parameter mapping, normalization
//! - [`mcp`]: MCP protocol and stdio server

pub mod config;
pub mod error;
pub mod graph;
pub mod mcp;
pub mod tools;
