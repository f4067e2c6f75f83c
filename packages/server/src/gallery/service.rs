use chrono::Utc;
use common::storage::{BoxReader, FileRemoval, FileStore, StoredName};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use tracing::{debug, info, warn};

use crate::entity::gallery;
use crate::error::AppError;
use crate::models::gallery::{GalleryStats, StatusFilter};
use crate::models::shared::{Pagination, validate_title};
use crate::state::AppState;

/// Image bytes on their way into the content directory.
pub struct IncomingImage {
    /// Client-supplied filename; only its extension is used.
    pub original_name: String,
    pub reader: BoxReader,
}

/// Result of attaching or replacing an entry's image.
#[derive(Debug)]
pub struct UploadOutcome {
    pub entry: gallery::Model,
    /// What happened to the file the entry referenced before, if any.
    pub previous_file: Option<FileRemoval>,
}

/// Result of deleting an entry.
#[derive(Debug)]
pub struct DeleteOutcome {
    /// What happened to the entry's file, if it had one.
    pub file: Option<FileRemoval>,
}

/// Keeps gallery rows and the files they reference in step.
///
/// None of the operations are transactional across the row and the file.
/// Replacing an image removes the old file before the new one is written,
/// and the row is updated last; a failure in between leaves the row pointing
/// at its previous name.
pub struct GalleryService<'a, C: ConnectionTrait> {
    conn: &'a C,
    files: &'a dyn FileStore,
}

impl<'a, C: ConnectionTrait> GalleryService<'a, C> {
    pub fn new(conn: &'a C, files: &'a dyn FileStore) -> Self {
        Self { conn, files }
    }

    pub async fn get(&self, id: i32) -> Result<gallery::Model, AppError> {
        gallery::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::NotFound("Gallery entry not found".into()))
    }

    /// One page of entries, newest first. Pages past the end come back empty.
    pub async fn list(
        &self,
        page: u64,
        limit: u64,
        status: StatusFilter,
    ) -> Result<(Vec<gallery::Model>, Pagination), AppError> {
        let total = filtered(status).count(self.conn).await?;
        let pagination = Pagination::new(page, limit, total);

        if pagination.offset() >= total {
            return Ok((Vec::new(), pagination));
        }

        let entries = filtered(status)
            .order_by_desc(gallery::Column::CreatedAt)
            .order_by_desc(gallery::Column::Id)
            .offset(Some(pagination.offset()))
            .limit(Some(limit))
            .all(self.conn)
            .await?;

        Ok((entries, pagination))
    }

    pub async fn stats(&self) -> Result<GalleryStats, AppError> {
        let total = filtered(StatusFilter::All).count(self.conn).await?;
        let active = filtered(StatusFilter::Active).count(self.conn).await?;
        let inactive = filtered(StatusFilter::Inactive).count(self.conn).await?;
        Ok(GalleryStats {
            total,
            active,
            inactive,
        })
    }

    /// Create an entry, staging its image first when one is supplied.
    pub async fn create(
        &self,
        title: &str,
        image: Option<IncomingImage>,
        require_image: bool,
    ) -> Result<gallery::Model, AppError> {
        let title = validate_title(title)?;
        if require_image && image.is_none() {
            return Err(AppError::Validation("Image is required".into()));
        }
        self.ensure_title_available(title, None).await?;

        let stored = match image {
            Some(image) => Some(self.stage(image).await?),
            None => None,
        };

        let now = Utc::now();
        let new_entry = gallery::ActiveModel {
            title: Set(title.to_string()),
            stored_file_name: Set(stored
                .as_ref()
                .map(|n| n.to_string())
                .unwrap_or_default()),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        match new_entry.insert(self.conn).await {
            Ok(model) => {
                info!(id = model.id, file = %model.stored_file_name, "Gallery entry created");
                Ok(model)
            }
            Err(e) => {
                if let Some(name) = &stored {
                    log_removal(None, name.as_str(), &self.files.discard(name).await);
                }
                Err(e.into())
            }
        }
    }

    /// Attach an image to an entry, replacing the one it already has.
    pub async fn attach(&self, id: i32, image: IncomingImage) -> Result<UploadOutcome, AppError> {
        self.update(id, None, Some(image)).await
    }

    pub async fn update_title(&self, id: i32, title: &str) -> Result<gallery::Model, AppError> {
        Ok(self.update(id, Some(title), None).await?.entry)
    }

    /// Change the title and/or replace the image of an entry.
    ///
    /// Order for an image: generate the new name, remove the old file (best
    /// effort), write the new file, then update the row.
    pub async fn update(
        &self,
        id: i32,
        title: Option<&str>,
        image: Option<IncomingImage>,
    ) -> Result<UploadOutcome, AppError> {
        if title.is_none() && image.is_none() {
            return Err(AppError::Validation("No data provided for update".into()));
        }

        let existing = self.get(id).await?;

        let title = match title {
            Some(title) => {
                let title = validate_title(title)?;
                self.ensure_title_available(title, Some(id)).await?;
                Some(title.to_string())
            }
            None => None,
        };

        let mut previous_file = None;
        let mut stored = None;
        if let Some(image) = image {
            let name = StoredName::generate(&image.original_name)?;
            if existing.has_file() {
                previous_file = Some(self.release(id, &existing.stored_file_name).await);
            }
            self.files.put_stream(&name, image.reader).await?;
            stored = Some(name);
        }

        let mut active: gallery::ActiveModel = existing.into();
        if let Some(title) = title {
            active.title = Set(title);
        }
        if let Some(name) = &stored {
            active.stored_file_name = Set(name.to_string());
        }
        active.updated_at = Set(Utc::now());

        match active.update(self.conn).await {
            Ok(entry) => Ok(UploadOutcome {
                entry,
                previous_file,
            }),
            Err(e) => {
                if let Some(name) = &stored {
                    log_removal(Some(id), name.as_str(), &self.files.discard(name).await);
                }
                Err(e.into())
            }
        }
    }

    /// Delete an entry and, best effort, its file.
    pub async fn delete(&self, id: i32) -> Result<DeleteOutcome, AppError> {
        let existing = self.get(id).await?;

        let file = if existing.has_file() {
            Some(self.release(id, &existing.stored_file_name).await)
        } else {
            None
        };

        gallery::Entity::delete_by_id(id).exec(self.conn).await?;
        info!(id, "Gallery entry deleted");

        Ok(DeleteOutcome { file })
    }

    /// Flip the `active` flag. The file is not touched.
    pub async fn toggle_active(&self, id: i32) -> Result<gallery::Model, AppError> {
        let existing = self.get(id).await?;
        let flipped = !existing.active;

        let mut active: gallery::ActiveModel = existing.into();
        active.active = Set(flipped);
        active.updated_at = Set(Utc::now());

        Ok(active.update(self.conn).await?)
    }

    async fn stage(&self, image: IncomingImage) -> Result<StoredName, AppError> {
        let name = StoredName::generate(&image.original_name)?;
        self.files.put_stream(&name, image.reader).await?;
        Ok(name)
    }

    async fn ensure_title_available(
        &self,
        title: &str,
        except: Option<i32>,
    ) -> Result<(), AppError> {
        let mut query = gallery::Entity::find().filter(gallery::Column::Title.eq(title));
        if let Some(id) = except {
            query = query.filter(gallery::Column::Id.ne(id));
        }

        if query.one(self.conn).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "A gallery entry titled '{title}' already exists"
            )));
        }
        Ok(())
    }

    /// Remove the file an entry currently references. Never fails.
    async fn release(&self, id: i32, stored_file_name: &str) -> FileRemoval {
        let removal = match StoredName::parse(stored_file_name) {
            Ok(name) => self.files.discard(&name).await,
            Err(e) => FileRemoval::Failed(e.to_string()),
        };
        log_removal(Some(id), stored_file_name, &removal);
        removal
    }
}

fn log_removal(id: Option<i32>, file: &str, removal: &FileRemoval) {
    match removal {
        FileRemoval::Removed => debug!(?id, file, "Removed image file"),
        FileRemoval::AlreadyGone => warn!(?id, file, "Image file was already missing"),
        FileRemoval::Failed(reason) => {
            warn!(?id, file, %reason, "Failed to remove image file, continuing")
        }
    }
}

fn filtered(status: StatusFilter) -> Select<gallery::Entity> {
    let select = gallery::Entity::find();
    match status {
        StatusFilter::All => select,
        StatusFilter::Active => select.filter(gallery::Column::Active.eq(true)),
        StatusFilter::Inactive => select.filter(gallery::Column::Active.eq(false)),
    }
}

/// Create a GalleryService over the shared connection and content directory.
pub fn gallery_service(state: &AppState) -> GalleryService<'_, DatabaseConnection> {
    GalleryService::new(&state.db, &*state.files)
}
