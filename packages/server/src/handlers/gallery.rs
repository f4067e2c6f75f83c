use axum::Json;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::config::StorageConfig;
use crate::error::{AppError, ErrorBody};
use crate::extractors::multipart::AppMultipart;
use crate::extractors::path::AppPath;
use crate::extractors::query::AppQuery;
use crate::gallery::{IncomingImage, gallery_service};
use crate::models::gallery::*;
use crate::state::AppState;
use crate::utils::spool::SpooledImage;

/// Body limit for gallery routes: one image, the text fields and multipart framing.
pub fn gallery_body_limit(storage: &StorageConfig) -> DefaultBodyLimit {
    let limit = storage.max_file_size as usize + storage.max_field_size + 64 * 1024;
    DefaultBodyLimit::max(limit)
}

async fn incoming(spooled: &SpooledImage) -> Result<IncomingImage, AppError> {
    Ok(IncomingImage {
        original_name: spooled.original_name().to_string(),
        reader: spooled.open().await?,
    })
}

async fn incoming_opt(spooled: Option<&SpooledImage>) -> Result<Option<IncomingImage>, AppError> {
    match spooled {
        Some(spooled) => Ok(Some(incoming(spooled).await?)),
        None => Ok(None),
    }
}

#[utoipa::path(
    get,
    path = "/gallery",
    tag = "Gallery",
    operation_id = "listGalleries",
    summary = "List gallery entries",
    description = "Returns one page of entries ordered newest first. Pages past the end return \
        an empty list with valid pagination metadata.",
    params(GalleryListQuery),
    responses(
        (status = 200, description = "Page of entries", body = GalleryListResponse),
        (status = 400, description = "Invalid query (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_galleries(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<GalleryListQuery>,
) -> Result<Json<GalleryListResponse>, AppError> {
    let settings = &state.config.gallery;
    let page = query.page.unwrap_or(1).max(1);
    let limit = query
        .limit
        .unwrap_or(settings.default_page_size)
        .clamp(1, settings.max_page_size.max(1));

    let (entries, pagination) = gallery_service(&state)
        .list(page, limit, query.status.unwrap_or_default())
        .await?;

    let galleries = entries
        .into_iter()
        .map(|m| GalleryResponse::from_model(m, &state.config.storage))
        .collect();

    Ok(Json(GalleryListResponse {
        galleries,
        pagination,
    }))
}

#[utoipa::path(
    get,
    path = "/gallery/stats",
    tag = "Gallery",
    operation_id = "getGalleryStats",
    summary = "Count entries by status",
    responses(
        (status = 200, description = "Entry counts", body = GalleryStats),
    ),
)]
#[instrument(skip(state))]
pub async fn gallery_stats(State(state): State<AppState>) -> Result<Json<GalleryStats>, AppError> {
    Ok(Json(gallery_service(&state).stats().await?))
}

#[utoipa::path(
    get,
    path = "/gallery/{id}",
    tag = "Gallery",
    operation_id = "getGallery",
    summary = "Get a gallery entry by ID",
    params(("id" = i32, Path, description = "Gallery entry ID")),
    responses(
        (status = 200, description = "Gallery entry", body = GalleryResponse),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_gallery(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<GalleryResponse>, AppError> {
    let model = gallery_service(&state).get(id).await?;
    Ok(Json(GalleryResponse::from_model(model, &state.config.storage)))
}

#[utoipa::path(
    post,
    path = "/gallery",
    tag = "Gallery",
    operation_id = "createGallery",
    summary = "Create a gallery entry",
    description = "Multipart fields: `title` (required) and `image` (required unless the server \
        allows image-less creation). Titles must be unique.",
    request_body(content_type = "multipart/form-data", description = "Title and image"),
    responses(
        (status = 201, description = "Entry created", body = GalleryResponse),
        (status = 400, description = "Validation error or duplicate title (VALIDATION_ERROR, CONFLICT)", body = ErrorBody),
        (status = 413, description = "Image too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
        (status = 500, description = "Image could not be stored (STORAGE_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn create_gallery(
    State(state): State<AppState>,
    AppMultipart(multipart): AppMultipart,
) -> Result<impl IntoResponse, AppError> {
    let form = GalleryForm::from_multipart(multipart, &state.config.storage).await?;
    let title = form.require_title()?;
    let image = incoming_opt(form.image.as_ref()).await?;

    let model = gallery_service(&state)
        .create(title, image, state.config.gallery.require_image_on_create)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(GalleryResponse::from_model(model, &state.config.storage)),
    ))
}

#[utoipa::path(
    put,
    path = "/gallery/{id}",
    tag = "Gallery",
    operation_id = "updateGallery",
    summary = "Update title and/or image",
    description = "Multipart fields: `title` and `image`, both optional but at least one \
        required. A new image replaces the old one, whose file is removed.",
    params(("id" = i32, Path, description = "Gallery entry ID")),
    request_body(content_type = "multipart/form-data", description = "Title and/or image"),
    responses(
        (status = 200, description = "Entry updated", body = GalleryResponse),
        (status = 400, description = "Nothing to update, invalid input or duplicate title (VALIDATION_ERROR, CONFLICT)", body = ErrorBody),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
        (status = 413, description = "Image too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn update_gallery(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppMultipart(multipart): AppMultipart,
) -> Result<Json<GalleryResponse>, AppError> {
    let form = GalleryForm::from_multipart(multipart, &state.config.storage).await?;
    if form.is_empty() {
        return Err(AppError::Validation("No data provided for update".into()));
    }
    let image = incoming_opt(form.image.as_ref()).await?;

    let outcome = gallery_service(&state)
        .update(id, form.title.as_deref(), image)
        .await?;

    Ok(Json(GalleryResponse::from_model(
        outcome.entry,
        &state.config.storage,
    )))
}

#[utoipa::path(
    put,
    path = "/gallery/{id}/image",
    tag = "Gallery",
    operation_id = "attachGalleryImage",
    summary = "Attach or replace an entry's image",
    description = "Multipart field `image` is required. Used to complete entries created \
        without an image, or to swap the image without touching the title.",
    params(("id" = i32, Path, description = "Gallery entry ID")),
    request_body(content_type = "multipart/form-data", description = "Image"),
    responses(
        (status = 200, description = "Image attached", body = GalleryResponse),
        (status = 400, description = "No file part (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
        (status = 413, description = "Image too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn attach_image(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppMultipart(multipart): AppMultipart,
) -> Result<Json<GalleryResponse>, AppError> {
    let form = GalleryForm::from_multipart(multipart, &state.config.storage).await?;
    let image = incoming(form.require_image()?).await?;

    let outcome = gallery_service(&state).attach(id, image).await?;

    Ok(Json(GalleryResponse::from_model(
        outcome.entry,
        &state.config.storage,
    )))
}

#[utoipa::path(
    delete,
    path = "/gallery/{id}",
    tag = "Gallery",
    operation_id = "deleteGallery",
    summary = "Delete a gallery entry",
    description = "Removes the entry and its image file. A file that cannot be removed is \
        logged and left behind.",
    params(("id" = i32, Path, description = "Gallery entry ID")),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_gallery(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<impl IntoResponse, AppError> {
    gallery_service(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    patch,
    path = "/gallery/{id}/active",
    tag = "Gallery",
    operation_id = "toggleGalleryActive",
    summary = "Toggle the active flag",
    params(("id" = i32, Path, description = "Gallery entry ID")),
    responses(
        (status = 200, description = "Entry with flipped flag", body = GalleryResponse),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn toggle_active(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<GalleryResponse>, AppError> {
    let model = gallery_service(&state).toggle_active(id).await?;
    Ok(Json(GalleryResponse::from_model(model, &state.config.storage)))
}
