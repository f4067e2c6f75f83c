use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use tracing::{instrument, warn};

use crate::models::gallery::{HealthResponse, UploadsCheckResponse};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    operation_id = "health",
    summary = "Liveness probe",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
    ),
)]
#[instrument(skip(state))]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
        service: "gallery-api",
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs_f64(),
    })
}

#[utoipa::path(
    get,
    path = "/uploads-check",
    tag = "Health",
    operation_id = "uploadsCheck",
    summary = "Check the content directory",
    description = "Verifies that the content directory exists and is writable.",
    responses(
        (status = 200, description = "Directory usable", body = UploadsCheckResponse),
        (status = 500, description = "Directory missing or not writable", body = UploadsCheckResponse),
    ),
)]
#[instrument(skip(state))]
pub async fn uploads_check(State(state): State<AppState>) -> impl IntoResponse {
    let uploads_path = state.files.location();
    match state.files.check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(UploadsCheckResponse {
                status: "ok",
                uploads_path,
                message: "Uploads directory is writable".into(),
            }),
        ),
        Err(e) => {
            warn!(error = %e, path = %uploads_path, "Uploads directory check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(UploadsCheckResponse {
                    status: "error",
                    uploads_path,
                    message: format!("Uploads directory is not usable: {e}"),
                }),
            )
        }
    }
}
