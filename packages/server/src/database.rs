use std::time::Duration;

use sea_orm::sea_query::Index;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};

use crate::config::DatabaseConfig;
use crate::entity::section_revision;

pub async fn init_db(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.url.to_owned());

    // Set connection pool options
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(true);
    if let Some(secs) = config.idle_timeout_secs {
        opt.idle_timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = config.max_lifetime_secs {
        opt.max_lifetime(Duration::from_secs(secs));
    }

    let db = Database::connect(opt).await?;
    db.get_schema_registry("cms_server::entity::*")
        .sync(&db)
        .await?;
    ensure_indexes(&db).await?;

    Ok(db)
}

/// Create indexes the entity registry cannot express. Safe to run repeatedly.
pub async fn ensure_indexes<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    // Revision history queries:
    // SELECT ... FROM section_revisions WHERE key = ? ORDER BY created_at DESC
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_section_revisions_key_created")
        .table(section_revision::Entity)
        .col(section_revision::Column::Key)
        .col(section_revision::Column::CreatedAt)
        .to_owned();

    let stmt = db.get_database_backend().build(&stmt);
    match db.execute_raw(stmt).await {
        Ok(_) => tracing::info!("Ensured index idx_section_revisions_key_created exists"),
        Err(e) => tracing::warn!(
            "Failed to create index idx_section_revisions_key_created: {}",
            e
        ),
    }

    Ok(())
}
