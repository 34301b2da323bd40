// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// HTTP SERVER
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//!
//! Servidor HTTP fino em volta de [`handle_request`](crate::handler::handle_request).
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `POST /research` - Executa uma pesquisa e devolve o envelope JSON
//!
//! ## Uso
//!
//! ```bash
//! cargo run --features server -- --server --port=3000
//! cargo run --features server -- --server --port=3000 --secret=minha-chave
//! ```

pub mod handlers;
mod auth;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::agent::ResearchAgent;

/// Estado compartilhado entre todos os handlers
pub struct AppState {
    /// Agente usado por todas as requisições
    pub agent: ResearchAgent,
    /// Token de autenticação opcional (Bearer)
    pub secret: Option<String>,
}

/// Monta o router com todas as rotas e middlewares.
pub fn router(state: Arc<AppState>) -> axum::Router {
    use axum::{
        middleware,
        routing::{get, post},
        Router,
    };
    use tower_http::cors::CorsLayer;

    let routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/research", post(handlers::research));

    // Auth middleware condicional
    let routes = if state.secret.is_some() {
        routes.layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ))
    } else {
        routes
    };

    routes.layer(CorsLayer::permissive()).with_state(state)
}

/// Inicia o servidor HTTP no endereço especificado.
///
/// Entry point chamado de main.rs quando `--server` é passado.
pub async fn start_server(addr: SocketAddr, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Research server listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
