use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "gallery")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub title: String,

    /// Name of the image inside the content directory. Empty until a file
    /// has been attached.
    pub stored_file_name: String,

    pub active: bool,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    pub fn has_file(&self) -> bool {
        !self.stored_file_name.is_empty()
    }
}

impl ActiveModelBehavior for ActiveModel {}
