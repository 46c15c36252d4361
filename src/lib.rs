//! statgate-mcp: an MCP server that republishes a chunked statistical data
//! API as a caller-sized, token-budgeted paginated feed.

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod gateway;
pub mod governor;
pub mod pagination;
pub mod projection;
pub mod response;
pub mod server;
pub mod tools;

pub use error::{Result, StatGateError};
