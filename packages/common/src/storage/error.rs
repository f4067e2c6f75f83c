/// Failures of the content directory.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("file not found: {0}")]
    NotFound(String),
    /// Stored names are never reused, so hitting this means a name collision.
    #[error("file already exists: {0}")]
    AlreadyExists(String),
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Raised mid-stream; nothing is left behind under the stored name.
    #[error("file exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },
}
