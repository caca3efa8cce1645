// Web server: Axum-based request gateway.
//
// Stateless: every request is answered from the shared, read-only
// DecisionEngine. No sessions, no per-client state.
//
// Routes:
//   GET  /          : liveness banner
//   POST /api/check : moderation verdict for one message
//   GET  /api/health: capability probe

use std::sync::Arc;

use anyhow::Result;
use axum::http::header;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::moderation::DecisionEngine;

pub mod error;
pub mod handlers;

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DecisionEngine>,
}

/// Start the gateway and block until it exits.
pub async fn run_server(engine: DecisionEngine, bind: &str, port: u16) -> Result<()> {
    let probe = engine.probe();
    let app = build_router(AppState {
        engine: Arc::new(engine),
    });

    let addr = format!("{bind}:{port}");
    info!(
        primary_available = probe.primary_available,
        "Safe chat gateway listening on http://{addr}"
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Build the gateway router. Public so tests can drive it without a socket.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::status::root))
        .route("/api/check", post(handlers::check::check_text))
        .route("/api/health", get(handlers::status::health))
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
