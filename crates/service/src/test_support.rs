//! Shared database setup for repository tests.
use migration::{BlogMigrator, MigratorTrait, StakeholdersMigrator};
use models::db::{connect_with_config, DatabaseConfig};
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;

static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// A fresh connection to the test database, or `None` when DB tests are disabled
/// (`SKIP_DB_TESTS` set or `DATABASE_URL` missing).
pub async fn get_db() -> anyhow::Result<Option<DatabaseConnection>> {
    let _ = dotenvy::dotenv();
    if std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err() {
        return Ok(None);
    }

    let mut cfg = DatabaseConfig::from_env();
    cfg.min_connections = 1;

    // Migrations run once per test process, on a throwaway connection
    MIGRATED
        .get_or_try_init(|| async {
            let db = connect_with_config(&cfg).await?;
            StakeholdersMigrator::up(&db, None).await?;
            BlogMigrator::up(&db, None).await?;
            Ok::<(), anyhow::Error>(())
        })
        .await?;

    Ok(Some(connect_with_config(&cfg).await?))
}
