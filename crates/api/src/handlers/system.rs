//! Service-level endpoints that do not touch a resource collection.

use actix_web::{web::Data, HttpResponse};
use serde_json::{json, Value};

use crate::state::AppState;

use super::ApiError;

/// Endpoint manifest served by `GET /api`.
pub const ENDPOINTS_MANIFEST: &str = include_str!("../../endpoints.json");

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

pub async fn health_handler() -> Result<HttpResponse, ApiError> {
    let endpoints: Value = serde_json::from_str(ENDPOINTS_MANIFEST)?;
    Ok(HttpResponse::Ok().json(json!({ "endpoints": endpoints })))
}

/// Prometheus text rendered from the process-wide recorder.
pub async fn metrics_handler(state: Data<AppState>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(PROMETHEUS_CONTENT_TYPE)
        .body(state.telemetry().render_metrics())
}
