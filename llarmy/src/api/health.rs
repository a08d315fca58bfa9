use axum::{extract::State, Json};
use serde::Serialize;

use crate::mcp::OcrMcpServer;

use super::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub mcp_path: String,
    pub tools: Vec<String>,
}

/// `GET /health`
pub async fn health_check(State(state): State<AppState>) -> Json<HealthData> {
    let mut tools = OcrMcpServer::new(state.tools.clone()).tool_names();
    tools.sort();

    Json(HealthData {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        mcp_path: state.config.mcp.path.clone(),
        tools,
    })
}
