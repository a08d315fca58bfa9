use axum::{
    body::Body,
    extract::State,
    http::{
        header::{AUTHORIZATION, WWW_AUTHENTICATE},
        HeaderValue, Request, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::api::AppState;

/// Bearer-key gate for the MCP endpoint.
///
/// The tools read arbitrary local paths, so once `LLARMY_API_KEYS` is set
/// every request must present one of the keys. With no keys configured the
/// endpoint is open.
pub async fn mcp_auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let api_keys = &state.config.server.api_keys;
    if api_keys.is_empty() {
        return next.run(request).await;
    }

    let Some(auth_header) = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    else {
        return unauthorized("Unauthorized");
    };

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        return unauthorized(
            "Unauthorized: Invalid authorization header format. Expected: Bearer <token>",
        );
    };

    if !api_keys.iter().any(|key| key == token.trim()) {
        tracing::warn!("Rejected MCP request with unknown API key");
        return unauthorized("Unauthorized: Invalid API key");
    }

    next.run(request).await
}

fn unauthorized(message: &str) -> Response {
    let payload = json!({
        "jsonrpc": "2.0",
        "error": {
            "code": -32000,
            "message": message,
        },
        "id": serde_json::Value::Null,
    });

    let mut response = (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response();
    response.headers_mut().insert(
        WWW_AUTHENTICATE,
        HeaderValue::from_static("Bearer error=\"invalid_token\""),
    );
    response.headers_mut().insert(
        "Access-Control-Expose-Headers",
        HeaderValue::from_static("WWW-Authenticate"),
    );

    response
}
