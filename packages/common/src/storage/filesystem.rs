use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};

use super::error::StorageError;
use super::name::StoredName;
use super::traits::{BoxReader, FileStore};

/// Filesystem-backed store for uploaded images.
///
/// Files live flat in `{base_path}/{stored name}`. Writes go to
/// `{base_path}/.tmp/{uuid}` first and are renamed into place once complete,
/// so a half-written upload is never visible under its stored name.
pub struct FilesystemFileStore {
    base_path: PathBuf,
    max_size: u64,
}

impl FilesystemFileStore {
    /// Create a new filesystem store, creating the content directory if needed.
    pub async fn new(base_path: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            max_size,
        })
    }

    /// Compute the filesystem path for a stored name.
    pub fn file_path(&self, name: &StoredName) -> PathBuf {
        self.base_path.join(name.as_str())
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl FileStore for FilesystemFileStore {
    fn location(&self) -> String {
        self.base_path.display().to_string()
    }

    async fn check(&self) -> Result<(), StorageError> {
        let meta = fs::metadata(&self.base_path).await?;
        if !meta.is_dir() {
            return Err(StorageError::NotFound(self.location()));
        }

        let probe = self.temp_path();
        fs::write(&probe, b"").await?;
        fs::remove_file(&probe).await?;
        Ok(())
    }

    async fn put_stream(
        &self,
        name: &StoredName,
        mut reader: BoxReader,
    ) -> Result<u64, StorageError> {
        let file_path = self.file_path(name);
        if fs::try_exists(&file_path).await? {
            return Err(StorageError::AlreadyExists(name.to_string()));
        }

        let temp_path = self.temp_path();
        let mut total_bytes: u64 = 0;

        let mut buf = vec![0u8; 64 * 1024]; // 64KB read buffer
        let mut temp_file = fs::File::create(&temp_path).await?;

        let written: Result<(), StorageError> = async {
            loop {
                let n = reader.read(&mut buf).await?;
                if n == 0 {
                    break;
                }

                total_bytes += n as u64;
                if total_bytes > self.max_size {
                    return Err(StorageError::SizeLimitExceeded {
                        actual: total_bytes,
                        limit: self.max_size,
                    });
                }

                temp_file.write_all(&buf[..n]).await?;
            }
            temp_file.flush().await?;
            Ok(())
        }
        .await;
        drop(temp_file);

        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }

        if let Err(e) = fs::rename(&temp_path, &file_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(total_bytes)
    }

    async fn get_stream(&self, name: &StoredName) -> Result<BoxReader, StorageError> {
        match fs::File::open(self.file_path(name)).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, name: &StoredName) -> Result<bool, StorageError> {
        Ok(fs::try_exists(self.file_path(name)).await?)
    }

    async fn delete(&self, name: &StoredName) -> Result<bool, StorageError> {
        match fs::remove_file(self.file_path(name)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn size(&self, name: &StoredName) -> Result<u64, StorageError> {
        match fs::metadata(self.file_path(name)).await {
            Ok(meta) if meta.is_file() => Ok(meta.len()),
            Ok(_) => Err(StorageError::NotFound(name.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
