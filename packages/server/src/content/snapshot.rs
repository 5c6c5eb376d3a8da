use std::collections::BTreeMap;

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set};

use super::types::SectionPayload;
use crate::entity::section_snapshot;

/// Write-once baseline of every key that has ever been edited.
pub struct SnapshotStore<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> SnapshotStore<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Record `payload` as the baseline for `key` unless one already exists.
    ///
    /// Returns `true` when a new snapshot row was written.
    pub async fn capture_if_absent(&self, key: &str, payload: &SectionPayload) -> Result<bool, DbErr> {
        if self.find(key).await?.is_some() {
            return Ok(false);
        }

        let model = section_snapshot::ActiveModel {
            key: Set(key.to_owned()),
            content: Set(payload.content.clone()),
            image: Set(payload.image.clone()),
            captured_at: Set(Utc::now()),
            ..Default::default()
        };

        // A concurrent first write may have inserted the row since the check.
        let result = section_snapshot::Entity::insert(model)
            .on_conflict(
                OnConflict::column(section_snapshot::Column::Key)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.conn)
            .await;

        match result {
            Ok(_) => {
                tracing::debug!(key, "Captured section snapshot");
                Ok(true)
            }
            Err(DbErr::RecordNotInserted) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn get(&self, key: &str) -> Result<Option<SectionPayload>, DbErr> {
        Ok(self.find(key).await?.as_ref().map(SectionPayload::from))
    }

    /// Every snapshotted key with its baseline payload.
    pub async fn latest_payloads(&self) -> Result<BTreeMap<String, SectionPayload>, DbErr> {
        let rows = section_snapshot::Entity::find()
            .order_by_asc(section_snapshot::Column::Key)
            .all(self.conn)
            .await?;

        Ok(rows
            .iter()
            .map(|m| (m.key.clone(), SectionPayload::from(m)))
            .collect())
    }

    async fn find(&self, key: &str) -> Result<Option<section_snapshot::Model>, DbErr> {
        section_snapshot::Entity::find()
            .filter(section_snapshot::Column::Key.eq(key))
            .one(self.conn)
            .await
    }
}
