// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ENDPOINT HANDLERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use axum::{
    extract::State,
    http::{header::HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

use super::AppState;
use crate::handler::{handle_request, HandlerResponse};

// ── GET /health ─────────────────────────────────

/// Health check endpoint
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "version": crate::VERSION }))
}

// ── POST /research ──────────────────────────────

/// Executa a pesquisa; o corpo é repassado cru para o handler
pub async fn research(State(state): State<Arc<AppState>>, body: String) -> Response {
    let response = handle_request(&state.agent, &body).await;
    into_axum(response)
}

/// Converte a resposta independente de transporte em resposta axum
fn into_axum(response: HandlerResponse) -> Response {
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut out = (status, response.body).into_response();
    for (name, value) in &response.headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            out.headers_mut().insert(name, value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_axum_copies_status_and_headers() {
        let response = HandlerResponse {
            status_code: 400,
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: r#"{"error":"Topic is required"}"#.into(),
        };
        let out = into_axum(response);
        assert_eq!(out.status(), StatusCode::BAD_REQUEST);
        assert_eq!(out.headers()["content-type"], "application/json");
    }
}
