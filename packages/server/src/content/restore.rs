use std::collections::BTreeSet;

use sea_orm::{ConnectionTrait, DbErr, TransactionSession, TransactionTrait};
use serde::Serialize;

use super::section::SectionStore;
use super::snapshot::SnapshotStore;
use super::types::{ContentKind, SectionPayload, WriteContext};

/// What happened to one key during a reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Live value set back to the key's snapshot.
    Restored,
    /// Live row deleted; the site falls back to its built-in default.
    Removed,
    /// Empty or unknown key, or a key already at its default. Counted in
    /// neither bucket.
    Skipped,
}

/// Totals returned by every reset operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct RestoreSummary {
    #[schema(example = 2)]
    pub restored: u64,
    #[schema(example = 0)]
    pub removed: u64,
}

impl RestoreSummary {
    pub fn record(&mut self, outcome: RestoreOutcome) {
        match outcome {
            RestoreOutcome::Restored => self.restored += 1,
            RestoreOutcome::Removed => self.removed += 1,
            RestoreOutcome::Skipped => {}
        }
    }
}

/// Which keys a bulk reset targets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResetScope {
    Key(String),
    Kind(ContentKind),
    /// Keys under `{page}.`.
    Page(String),
    All,
    /// Keys with the given prefix and suffix, e.g. hero images.
    Matching { prefix: String, suffix: String },
}

impl ResetScope {
    /// Whether `key`, holding `payload` in the snapshot or live store, is in scope.
    pub fn admits(&self, key: &str, payload: &SectionPayload) -> bool {
        match self {
            Self::Key(k) => key == k,
            Self::Kind(kind) => payload.has_kind(*kind),
            Self::Page(page) => key
                .strip_prefix(page.as_str())
                .is_some_and(|rest| rest.starts_with('.')),
            Self::All => true,
            Self::Matching { prefix, suffix } => {
                key.len() >= prefix.len() + suffix.len()
                    && key.starts_with(prefix.as_str())
                    && key.ends_with(suffix.as_str())
            }
        }
    }
}

/// Resolves reset targets and applies restore-or-remove to each key.
///
/// Every write made here runs with snapshots suppressed, so resets never
/// create baseline rows.
pub struct RestoreEngine<'a, C: ConnectionTrait + TransactionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait + TransactionTrait> RestoreEngine<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Reset one key inside its own transaction.
    pub async fn restore_one(
        &self,
        key: &str,
        ctx: WriteContext<'_>,
    ) -> Result<RestoreOutcome, DbErr> {
        if key.is_empty() {
            return Ok(RestoreOutcome::Skipped);
        }
        let ctx = ctx.suppressed();

        let txn = self.conn.begin().await?;
        let sections = SectionStore::new(&txn);

        let live = sections.get(key).await?;
        let snapshot = SnapshotStore::new(&txn).get(key).await?;
        if live.is_none() && snapshot.is_none() {
            txn.commit().await?;
            return Ok(RestoreOutcome::Skipped);
        }

        let outcome = if sections.restore_from_snapshot(key, ctx).await? {
            RestoreOutcome::Restored
        } else if sections.delete(key).await? {
            RestoreOutcome::Removed
        } else {
            // Already at the default: nothing live to remove.
            RestoreOutcome::Skipped
        };

        txn.commit().await?;
        tracing::debug!(key, ?outcome, "Reset section");
        Ok(outcome)
    }

    /// Keys in scope, drawn from both the snapshot and the live store.
    pub async fn resolve(&self, scope: &ResetScope) -> Result<BTreeSet<String>, DbErr> {
        if let ResetScope::Key(key) = scope {
            return Ok(BTreeSet::from([key.clone()]));
        }

        let snapshots = SnapshotStore::new(self.conn).latest_payloads().await?;
        let live = SectionStore::new(self.conn).all().await?;

        let mut keys: BTreeSet<String> = snapshots
            .into_iter()
            .filter(|(key, payload)| scope.admits(key, payload))
            .map(|(key, _)| key)
            .collect();

        keys.extend(
            live.iter()
                .filter(|s| scope.admits(&s.key, &SectionPayload::from(*s)))
                .map(|s| s.key.clone()),
        );

        Ok(keys)
    }

    /// Best-effort reset of every key in `scope`.
    ///
    /// A failure on one key is logged and does not stop the others; only a
    /// failure to resolve the target set is returned.
    pub async fn reset(
        &self,
        scope: &ResetScope,
        ctx: WriteContext<'_>,
    ) -> Result<RestoreSummary, DbErr> {
        let ctx = ctx.suppressed();
        let keys = self.resolve(scope).await?;

        let mut summary = RestoreSummary::default();
        for key in &keys {
            match self.restore_one(key, ctx).await {
                Ok(outcome) => summary.record(outcome),
                Err(e) => tracing::warn!(key = %key, error = %e, "Failed to reset section"),
            }
        }

        tracing::info!(
            scope = ?scope,
            targets = keys.len(),
            restored = summary.restored,
            removed = summary.removed,
            "Content reset finished"
        );
        Ok(summary)
    }

    /// Single-key reset. Unlike bulk resets, errors propagate.
    pub async fn reset_key(
        &self,
        key: &str,
        ctx: WriteContext<'_>,
    ) -> Result<RestoreSummary, DbErr> {
        let mut summary = RestoreSummary::default();
        summary.record(self.restore_one(key, ctx).await?);
        Ok(summary)
    }

    pub async fn reset_kind(
        &self,
        kind: ContentKind,
        ctx: WriteContext<'_>,
    ) -> Result<RestoreSummary, DbErr> {
        self.reset(&ResetScope::Kind(kind), ctx).await
    }

    pub async fn reset_page(
        &self,
        page: &str,
        ctx: WriteContext<'_>,
    ) -> Result<RestoreSummary, DbErr> {
        self.reset(&ResetScope::Page(page.to_owned()), ctx).await
    }

    pub async fn reset_all(&self, ctx: WriteContext<'_>) -> Result<RestoreSummary, DbErr> {
        self.reset(&ResetScope::All, ctx).await
    }

    /// Reset every hero image, i.e. keys matching `prefix` … `suffix`.
    pub async fn reset_hero(
        &self,
        prefix: &str,
        suffix: &str,
        ctx: WriteContext<'_>,
    ) -> Result<RestoreSummary, DbErr> {
        let scope = ResetScope::Matching {
            prefix: prefix.to_owned(),
            suffix: suffix.to_owned(),
        };
        self.reset(&scope, ctx).await
    }
}
