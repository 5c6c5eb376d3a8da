use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionSession, TransactionTrait,
};

use super::error::ContentError;
use super::revision::RevisionLog;
use super::snapshot::SnapshotStore;
use super::types::{ChangeType, SectionPayload, WriteContext};
use crate::entity::section;

/// Live key → payload mapping. Every mutation goes through
/// [`SectionStore::update_with_backup`] or one of the restore paths, which
/// keep the snapshot, the revision log and the live row consistent.
pub struct SectionStore<'a, C: ConnectionTrait + TransactionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait + TransactionTrait> SectionStore<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn get(&self, key: &str) -> Result<Option<section::Model>, DbErr> {
        section::Entity::find()
            .filter(section::Column::Key.eq(key))
            .one(self.conn)
            .await
    }

    /// All live sections ordered by key.
    pub async fn all(&self) -> Result<Vec<section::Model>, DbErr> {
        section::Entity::find()
            .order_by_asc(section::Column::Key)
            .all(self.conn)
            .await
    }

    /// Live sections whose key starts with `prefix`, ordered by key.
    pub async fn by_prefix(&self, prefix: &str) -> Result<Vec<section::Model>, DbErr> {
        let rows = section::Entity::find()
            .filter(section::Column::Key.starts_with(prefix))
            .order_by_asc(section::Column::Key)
            .all(self.conn)
            .await?;

        // LIKE treats `_` and `%` as wildcards; keep exact prefix matches only.
        Ok(rows
            .into_iter()
            .filter(|s| s.key.starts_with(prefix))
            .collect())
    }

    /// Live sections, most recently edited first.
    pub async fn recently_updated(&self) -> Result<Vec<section::Model>, DbErr> {
        section::Entity::find()
            .order_by_desc(section::Column::UpdatedAt)
            .order_by_asc(section::Column::Key)
            .all(self.conn)
            .await
    }

    /// Primary write path.
    ///
    /// In one transaction: capture the pre-write payload as the key's
    /// snapshot if it has none (unless `ctx` suppresses snapshots), append
    /// the new payload to the revision log, then upsert the live row.
    pub async fn update_with_backup(
        &self,
        key: &str,
        payload: &SectionPayload,
        ctx: WriteContext<'_>,
    ) -> Result<section::Model, DbErr> {
        self.write(key, |_| payload.clone(), payload.change_type(), ctx).await
    }

    /// Set the image of `key`, keeping whatever content the live row holds
    /// at write time.
    pub async fn update_image(
        &self,
        key: &str,
        image: &str,
        ctx: WriteContext<'_>,
    ) -> Result<section::Model, DbErr> {
        self.write(
            key,
            |existing| {
                SectionPayload::new(
                    existing.and_then(|s| s.content.clone()),
                    Some(image.to_owned()),
                )
            },
            ChangeType::ImageUpload,
            ctx,
        )
        .await
    }

    /// Set the live value back to the key's snapshot.
    ///
    /// Returns `false` without touching anything when there is no snapshot or
    /// the snapshot is empty (the key had no value before it was edited).
    pub async fn restore_from_snapshot(
        &self,
        key: &str,
        ctx: WriteContext<'_>,
    ) -> Result<bool, DbErr> {
        let snapshot = SnapshotStore::new(self.conn).get(key).await?;
        match snapshot {
            Some(payload) if !payload.is_empty() => {
                self.write(key, |_| payload.clone(), ChangeType::Restore, ctx).await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Point-in-time restore of a single revision.
    pub async fn restore_revision(
        &self,
        key: &str,
        revision_id: i32,
        ctx: WriteContext<'_>,
    ) -> Result<section::Model, ContentError> {
        let txn = self.conn.begin().await?;
        let sections = SectionStore::new(&txn);

        sections
            .get(key)
            .await?
            .ok_or_else(|| ContentError::NotFound(format!("Section '{key}' not found")))?;

        let revision = RevisionLog::new(&txn).get_for_key(key, revision_id).await?;
        let payload = SectionPayload::from(&revision);
        let model = sections.write(key, |_| payload, ChangeType::Restore, ctx).await?;

        txn.commit().await?;
        tracing::info!(key, revision_id, "Restored section revision");
        Ok(model)
    }

    /// Remove the live row only. Snapshot and history are kept.
    pub async fn delete(&self, key: &str) -> Result<bool, DbErr> {
        let result = section::Entity::delete_many()
            .filter(section::Column::Key.eq(key))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// `build` derives the new payload from the live row read inside the
    /// transaction.
    async fn write<F>(
        &self,
        key: &str,
        build: F,
        change_type: ChangeType,
        ctx: WriteContext<'_>,
    ) -> Result<section::Model, DbErr>
    where
        F: FnOnce(Option<&section::Model>) -> SectionPayload,
    {
        let txn = self.conn.begin().await?;

        let existing = section::Entity::find()
            .filter(section::Column::Key.eq(key))
            .one(&txn)
            .await?;
        let payload = build(existing.as_ref());

        if ctx.captures_snapshots() {
            let before = existing
                .as_ref()
                .map(SectionPayload::from)
                .unwrap_or_default();
            SnapshotStore::new(&txn)
                .capture_if_absent(key, &before)
                .await?;
        }

        RevisionLog::new(&txn)
            .append(key, &payload, ctx.changed_by, change_type)
            .await?;

        let now = Utc::now();
        let row = section::ActiveModel {
            key: Set(key.to_owned()),
            content: Set(payload.content),
            image: Set(payload.image),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        section::Entity::insert(row)
            .on_conflict(
                OnConflict::column(section::Column::Key)
                    .update_columns([
                        section::Column::Content,
                        section::Column::Image,
                        section::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;

        let saved = section::Entity::find()
            .filter(section::Column::Key.eq(key))
            .one(&txn)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("section '{key}' missing after upsert")))?;

        txn.commit().await?;

        tracing::debug!(
            key,
            change_type = %change_type,
            changed_by = ctx.changed_by,
            "Section written"
        );
        Ok(saved)
    }
}
