//! MCP (Model Context Protocol) surface for the OCR tools.

mod auth;
mod router;
mod server;

pub use router::mcp_router;
pub use server::{serve_stdio, streamable_http_service, OcrMcpServer};
