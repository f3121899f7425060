


use anyhow::Result;
use sea_orm::DatabaseConnection;
use migration::MigratorTrait;

/// `None` when DB tests are disabled or no database is configured.
pub(crate) async fn setup_test_db() -> Result<Option<DatabaseConnection>> {
    let _ = dotenvy::dotenv();
    if std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err() {
        return Ok(None);
    }
    let db = crate::db::connect().await?;
    migration::StakeholdersMigrator::up(&db, None).await?;
    migration::BlogMigrator::up(&db, None).await?;
    Ok(Some(db))
}
