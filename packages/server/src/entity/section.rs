use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Live value of a content key, read by the public site.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sections")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub key: String,

    #[sea_orm(column_type = "Text")]
    pub content: Option<String>,
    pub image: Option<String>, // media file name or external URL

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
