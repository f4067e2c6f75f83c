use axum::body::Body;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::Response;
use common::storage::StoredName;
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::path::AppPath;
use crate::state::AppState;

/// A stored name is never reused for different bytes.
const UPLOAD_CACHE_CONTROL: &str = "public, max-age=31536000";

#[utoipa::path(
    get,
    path = "/uploads/{name}",
    tag = "Uploads",
    operation_id = "getUpload",
    summary = "Download a stored image",
    description = "Serves an image from the content directory by its stored name. \
        Names that were not generated by the server are rejected as not found.",
    params(("name" = String, Path, description = "Stored file name, e.g. `0190f7c1...e2.png`")),
    responses(
        (status = 200, description = "Image bytes, `Content-Type` from the extension"),
        (status = 404, description = "No such file (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn serve_upload(
    State(state): State<AppState>,
    AppPath(name): AppPath<String>,
) -> Result<Response, AppError> {
    let name =
        StoredName::parse(&name).map_err(|_| AppError::NotFound("File not found".into()))?;

    let size = state.files.size(&name).await?;
    let reader = state.files.get_stream(&name).await?;
    let body = Body::from_stream(ReaderStream::new(reader));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, name.content_type().as_ref())
        .header(header::CONTENT_LENGTH, size.to_string())
        .header(header::CACHE_CONTROL, UPLOAD_CACHE_CONTROL)
        .header(header::X_CONTENT_TYPE_OPTIONS, "nosniff")
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}
