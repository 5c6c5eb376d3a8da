use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use super::error::ContentError;
use super::types::{ChangeType, SectionPayload};
use crate::entity::section_revision;

/// Append-only history of every payload a key has held.
pub struct RevisionLog<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> RevisionLog<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Insert one immutable entry. Callers run this on the same transaction
    /// as the live write it describes.
    pub async fn append(
        &self,
        key: &str,
        payload: &SectionPayload,
        changed_by: &str,
        change_type: ChangeType,
    ) -> Result<section_revision::Model, DbErr> {
        section_revision::ActiveModel {
            key: Set(key.to_owned()),
            content: Set(payload.content.clone()),
            image: Set(payload.image.clone()),
            changed_by: Set(changed_by.to_owned()),
            change_type: Set(change_type),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.conn)
        .await
    }

    /// Up to `limit` most recent entries for `key`, newest first.
    pub async fn list(&self, key: &str, limit: u64) -> Result<Vec<section_revision::Model>, DbErr> {
        section_revision::Entity::find()
            .filter(section_revision::Column::Key.eq(key))
            .order_by_desc(section_revision::Column::CreatedAt)
            .order_by_desc(section_revision::Column::Id)
            .limit(limit)
            .all(self.conn)
            .await
    }

    /// Whether any entry, for any key, points at `image`.
    pub async fn references_image(&self, image: &str) -> Result<bool, DbErr> {
        let n = section_revision::Entity::find()
            .filter(section_revision::Column::Image.eq(image))
            .count(self.conn)
            .await?;
        Ok(n > 0)
    }

    pub async fn count(&self, key: &str) -> Result<u64, DbErr> {
        section_revision::Entity::find()
            .filter(section_revision::Column::Key.eq(key))
            .count(self.conn)
            .await
    }

    pub async fn get(&self, revision_id: i32) -> Result<Option<section_revision::Model>, DbErr> {
        section_revision::Entity::find_by_id(revision_id)
            .one(self.conn)
            .await
    }

    /// Fetch a revision and check it belongs to `key`.
    pub async fn get_for_key(
        &self,
        key: &str,
        revision_id: i32,
    ) -> Result<section_revision::Model, ContentError> {
        let revision = self
            .get(revision_id)
            .await?
            .ok_or_else(|| ContentError::NotFound(format!("Revision {revision_id} not found")))?;

        if revision.key != key {
            return Err(ContentError::IntegrityViolation(format!(
                "Revision {revision_id} does not belong to section '{key}'"
            )));
        }

        Ok(revision)
    }
}
