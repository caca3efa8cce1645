// POST /api/check: decide whether one message is safe to send.
//
// The body must be `{ "text": <string> }`. Anything else (missing field,
// non-string value, non-JSON body) is rejected before the engine runs.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::moderation::Verdict;
use crate::web::error::GatewayError;
use crate::web::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub text: String,
}

/// POST /api/check: returns `{ safe, reasons, mode }`.
pub async fn check_text(
    State(state): State<AppState>,
    payload: Result<Json<CheckRequest>, JsonRejection>,
) -> Result<Json<Verdict>, GatewayError> {
    let Json(request) = payload?;
    Ok(Json(state.engine.decide(&request.text).await))
}
