mod error;
mod name;
mod traits;

pub mod filesystem;

pub use error::StorageError;
pub use filesystem::FilesystemFileStore;
pub use name::{ALLOWED_EXTENSIONS, NameError, StoredName, image_extension};
pub use traits::{BoxReader, FileRemoval, FileStore};
