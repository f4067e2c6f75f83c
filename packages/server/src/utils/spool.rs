use std::path::{Path, PathBuf};

use axum::extract::multipart::Field;
use common::storage::BoxReader;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::AppError;

/// An uploaded file part buffered to a temporary file.
///
/// Spooling lets the size limit be enforced before the gallery workflow
/// touches anything, so an oversized upload never costs an entry its
/// current image. The temp file is removed on drop, on the blocking pool
/// when a Tokio runtime is available.
#[derive(Debug)]
pub struct SpooledImage {
    path: PathBuf,
    original_name: String,
    size: u64,
}

impl SpooledImage {
    /// Stream a multipart file field to a temp file.
    ///
    /// Returns `None` for a part without a filename (what browsers send for
    /// an empty file input).
    pub async fn from_field(
        mut field: Field<'_>,
        max_size: u64,
    ) -> Result<Option<Self>, AppError> {
        let original_name = match field.file_name() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => return Ok(None),
        };

        let mut spooled = Self {
            path: std::env::temp_dir().join(format!("gallery-upload-{}", Uuid::new_v4())),
            original_name,
            size: 0,
        };

        let mut temp_file = tokio::fs::File::create(&spooled.path)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to create temp file: {e}")))?;

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::from_multipart(e, max_size))?
        {
            spooled.size += chunk.len() as u64;
            if spooled.size > max_size {
                return Err(AppError::PayloadTooLarge { limit: max_size });
            }
            temp_file
                .write_all(&chunk)
                .await
                .map_err(|e| AppError::Storage(format!("Temp file write failed: {e}")))?;
        }

        temp_file
            .flush()
            .await
            .map_err(|e| AppError::Storage(format!("Temp file flush failed: {e}")))?;

        debug!(file = %spooled.original_name, size = spooled.size, "Spooled upload");
        Ok(Some(spooled))
    }

    /// Client-supplied filename, untrusted.
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// Reopen the spooled bytes for reading.
    pub async fn open(&self) -> Result<BoxReader, AppError> {
        let file = tokio::fs::File::open(&self.path)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to reopen temp file: {e}")))?;
        Ok(Box::new(file))
    }
}

fn remove_temp(path: &Path) {
    if let Err(e) = std::fs::remove_file(path)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        warn!(path = %path.display(), error = %e, "Failed to remove spooled upload");
    }
}

impl Drop for SpooledImage {
    fn drop(&mut self) {
        let path = std::mem::take(&mut self.path);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || remove_temp(&path));
            }
            Err(_) => remove_temp(&path),
        }
    }
}
