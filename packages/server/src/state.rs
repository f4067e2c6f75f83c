use std::sync::Arc;
use std::time::Instant;

use common::storage::FileStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub files: Arc<dyn FileStore>,
    pub config: AppConfig,
    pub started_at: Instant,
}
