//! Migrators for the two services. Each service owns its own tables, so each
//! gets its own migrator; they may share a schema without clashing because the
//! table sets are disjoint.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users;
mod m20240101_000002_create_profiles;
mod m20240101_000011_create_blogs;
mod m20240101_000012_create_blog_images;
mod m20240101_000013_create_comments;
mod m20240101_000014_create_likes;
mod m20240101_000015_add_blog_indexes;

/// `users` and `profiles`.
pub struct StakeholdersMigrator;

#[async_trait::async_trait]
impl MigratorTrait for StakeholdersMigrator {
    fn migration_table_name() -> DynIden {
        Alias::new("seaql_migrations_stakeholders").into_iden()
    }

    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users::Migration),
            Box::new(m20240101_000002_create_profiles::Migration),
        ]
    }
}

/// `blogs` and its children.
pub struct BlogMigrator;

#[async_trait::async_trait]
impl MigratorTrait for BlogMigrator {
    fn migration_table_name() -> DynIden {
        Alias::new("seaql_migrations_blog").into_iden()
    }

    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000011_create_blogs::Migration),
            Box::new(m20240101_000012_create_blog_images::Migration),
            Box::new(m20240101_000013_create_comments::Migration),
            Box::new(m20240101_000014_create_likes::Migration),
            // Indexes should always be applied last
            Box::new(m20240101_000015_add_blog_indexes::Migration),
        ]
    }
}
