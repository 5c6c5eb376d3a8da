use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payload a key held before its first edit. Written once per key.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "section_snapshots")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub key: String,

    #[sea_orm(column_type = "Text")]
    pub content: Option<String>,
    pub image: Option<String>,

    pub captured_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
