// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// AUTENTICAÇÃO - Bearer Token Middleware
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

use super::AppState;
use crate::types::ResearchEnvelope;

/// Middleware de autenticação Bearer token.
///
/// Ativado apenas quando `--secret=TOKEN` é passado na inicialização.
/// `/health` e preflight `OPTIONS` ficam de fora.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let secret = match &state.secret {
        Some(s) => s,
        None => return next.run(request).await,
    };

    if request.uri().path() == "/health" || request.method() == "OPTIONS" {
        return next.run(request).await;
    }

    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    match token {
        Some(token) if token == secret => next.run(request).await,
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(ResearchEnvelope::error("Unauthorized")),
        )
            .into_response(),
    }
}
