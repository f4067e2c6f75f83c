use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding uploaded images.
    pub content_dir: PathBuf,
    /// URL prefix under which `content_dir` is served.
    pub public_prefix: String,
    /// Maximum image size in bytes.
    pub max_file_size: u64,
    /// Maximum size of a text multipart field in bytes.
    pub max_field_size: usize,
}

impl StorageConfig {
    /// Public URL of a stored file.
    pub fn public_url(&self, stored_name: &str) -> String {
        format!("{}/{}", self.public_prefix.trim_end_matches('/'), stored_name)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GalleryConfig {
    /// Reject `POST /gallery` without an image part.
    pub require_image_on_create: bool,
    pub default_page_size: u64,
    pub max_page_size: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub gallery: GalleryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3001)?
            .set_default("server.cors.allow_origins", vec!["http://localhost:3000"])?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.url", "sqlite://gallery.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("storage.content_dir", "./uploads")?
            .set_default("storage.public_prefix", "/uploads")?
            .set_default("storage.max_file_size", 10 * 1024 * 1024)?
            .set_default("storage.max_field_size", 1024 * 1024)?
            .set_default("gallery.require_image_on_create", true)?
            .set_default("gallery.default_page_size", 12)?
            .set_default("gallery.max_page_size", 100)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., GALLERY__STORAGE__MAX_FILE_SIZE)
            .add_source(
                Environment::with_prefix("GALLERY")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allow_origins"),
            )
            .build()?;

        s.try_deserialize()
    }
}
