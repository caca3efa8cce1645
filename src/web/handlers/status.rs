// Liveness and capability handlers.
//
// GET /          : banner with the service version
// GET /api/health: which classifiers can serve a decision right now

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::moderation::CapabilityProbe;
use crate::web::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub probe: CapabilityProbe,
}

/// GET /: plain liveness banner.
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Safe Chat Filter API is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/health: capability probe. Computed per call; never cached.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        probe: state.engine.probe(),
    })
}
