use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::content::ChangeType;

/// Append-only history entry. Rows are never updated or deleted.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "section_revisions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub key: String,

    #[sea_orm(column_type = "Text")]
    pub content: Option<String>,
    pub image: Option<String>,

    pub changed_by: String,
    pub change_type: ChangeType,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
