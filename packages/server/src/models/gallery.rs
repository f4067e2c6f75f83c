use axum::extract::Multipart;
use axum::extract::multipart::Field;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::StorageConfig;
use crate::entity::gallery;
use crate::error::AppError;
use crate::utils::spool::SpooledImage;

pub use super::shared::Pagination;

/// Response DTO for a single gallery entry.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GalleryResponse {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "Sunset")]
    pub title: String,
    /// Server-generated file name; empty while no image is attached.
    #[schema(example = "01936f0e12347abc8000000000000001.jpg")]
    pub stored_file_name: String,
    /// Public URL of the image, if one is attached.
    #[schema(example = "/uploads/01936f0e12347abc8000000000000001.jpg")]
    pub image_url: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GalleryResponse {
    pub fn from_model(model: gallery::Model, storage: &StorageConfig) -> Self {
        let image_url = model
            .has_file()
            .then(|| storage.public_url(&model.stored_file_name));
        Self {
            id: model.id,
            title: model.title,
            stored_file_name: model.stored_file_name,
            image_url,
            active: model.active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct GalleryListResponse {
    pub galleries: Vec<GalleryResponse>,
    pub pagination: Pagination,
}

/// Which entries a list request returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GalleryListQuery {
    /// Page number, 1-based. Defaults to 1.
    pub page: Option<u64>,
    /// Page size. Defaults to 12, capped at 100.
    pub limit: Option<u64>,
    /// `all` (default), `active` or `inactive`.
    pub status: Option<StatusFilter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct GalleryStats {
    #[schema(example = 47)]
    pub total: u64,
    #[schema(example = 40)]
    pub active: u64,
    #[schema(example = 7)]
    pub inactive: u64,
}

/// Multipart body accepted by create and update.
///
/// Every accepted encoding is normalized here: the first non-blank `title`
/// text part wins, and the single file part may be named `image` or `file`.
#[derive(Debug, Default)]
pub struct GalleryForm {
    pub title: Option<String>,
    pub image: Option<SpooledImage>,
}

impl GalleryForm {
    pub async fn from_multipart(
        mut multipart: Multipart,
        limits: &StorageConfig,
    ) -> Result<Self, AppError> {
        let mut form = GalleryForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::from_multipart(e, limits.max_file_size))?
        {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some("title") => {
                    let text = read_text_field(field, limits).await?;
                    let text = text.trim();
                    if form.title.is_none() && !text.is_empty() {
                        form.title = Some(text.to_string());
                    }
                }
                Some("image") | Some("file") => {
                    let spooled = SpooledImage::from_field(field, limits.max_file_size).await?;
                    if spooled.is_some() {
                        if form.image.is_some() {
                            return Err(AppError::Validation(
                                "Only one file may be uploaded per request".into(),
                            ));
                        }
                        form.image = spooled;
                    }
                }
                _ => {} // Ignore unknown fields.
            }
        }

        Ok(form)
    }

    pub fn require_title(&self) -> Result<&str, AppError> {
        self.title
            .as_deref()
            .ok_or_else(|| AppError::Validation("Title is required".into()))
    }

    pub fn require_image(&self) -> Result<&SpooledImage, AppError> {
        self.image
            .as_ref()
            .ok_or_else(|| AppError::Validation("Image is required".into()))
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.image.is_none()
    }
}

/// Read a text part, capped at `max_field_size`. A 413 from the body limit
/// reports `max_file_size`, the limit clients are told about.
async fn read_text_field(mut field: Field<'_>, limits: &StorageConfig) -> Result<String, AppError> {
    let max_size = limits.max_field_size;
    let mut buf = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::from_multipart(e, limits.max_file_size))?
    {
        if buf.len() + chunk.len() > max_size {
            return Err(AppError::Validation(format!(
                "Text fields must be at most {max_size} bytes"
            )));
        }
        buf.extend_from_slice(&chunk);
    }
    String::from_utf8(buf).map_err(|_| AppError::Validation("Text fields must be UTF-8".into()))
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    #[schema(example = "gallery-api")]
    pub service: &'static str,
    #[schema(example = "0.1.0")]
    pub version: &'static str,
    /// Seconds since the server started.
    pub uptime: f64,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadsCheckResponse {
    #[schema(example = "ok")]
    pub status: &'static str,
    pub uploads_path: String,
    pub message: String,
}
