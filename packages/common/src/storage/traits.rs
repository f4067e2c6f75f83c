use std::io::Cursor;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::StorageError;
use super::name::StoredName;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Outcome of a best-effort file removal.
///
/// Replacing or deleting a gallery entry must not fail because its old file
/// could not be removed, so removal reports what happened instead of erroring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileRemoval {
    /// The file existed and was removed.
    Removed,
    /// There was nothing to remove.
    AlreadyGone,
    /// Removal failed; the file may be orphaned.
    Failed(String),
}

impl FileRemoval {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Named file storage backing the gallery's content directory.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Human-readable location of the store (a directory path for filesystem stores).
    fn location(&self) -> String;

    /// Verify that the store is reachable and writable.
    async fn check(&self) -> Result<(), StorageError>;

    /// Store bytes under `name` and return the number of bytes written.
    async fn put(&self, name: &StoredName, data: &[u8]) -> Result<u64, StorageError> {
        let reader: BoxReader = Box::new(Cursor::new(data.to_vec()));
        self.put_stream(name, reader).await
    }

    /// Store data from an async reader under `name`.
    ///
    /// Never overwrites: an existing file with the same name is an error.
    async fn put_stream(&self, name: &StoredName, reader: BoxReader) -> Result<u64, StorageError>;

    /// Retrieve all bytes of a file.
    async fn get(&self, name: &StoredName) -> Result<Vec<u8>, StorageError> {
        let mut reader = self.get_stream(name).await?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// Retrieve a file as a streaming async reader.
    async fn get_stream(&self, name: &StoredName) -> Result<BoxReader, StorageError>;

    /// Check whether a file exists.
    async fn exists(&self, name: &StoredName) -> Result<bool, StorageError>;

    /// Delete a file.
    ///
    /// Returns `true` if the file was deleted, `false` if it did not exist.
    async fn delete(&self, name: &StoredName) -> Result<bool, StorageError>;

    /// Delete a file, folding every outcome into a [`FileRemoval`].
    async fn discard(&self, name: &StoredName) -> FileRemoval {
        match self.delete(name).await {
            Ok(true) => FileRemoval::Removed,
            Ok(false) => FileRemoval::AlreadyGone,
            Err(e) => FileRemoval::Failed(e.to_string()),
        }
    }

    /// Get the size of a file in bytes.
    async fn size(&self, name: &StoredName) -> Result<u64, StorageError>;
}
