use axum::extract::{FromRequest, Multipart, Request};

use crate::error::AppError;

/// A `Multipart` wrapper that reports a missing or malformed
/// `multipart/form-data` content type as `AppError::Validation`.
pub struct AppMultipart(pub Multipart);

impl<S> FromRequest<S> for AppMultipart
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(req, state).await.map_err(|e| {
            AppError::Validation(format!(
                "Expected a multipart/form-data body: {}",
                e.body_text()
            ))
        })?;
        Ok(AppMultipart(multipart))
    }
}
