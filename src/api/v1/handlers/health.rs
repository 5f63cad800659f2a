/*
 * Responsibility
 * - GET /health (liveness, no auth, no database)
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::envelope::ApiResponse;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(ApiResponse::ok(json!({ "status": "ok" }))))
}
