//! Create `users` table.
//!
//! Accounts are never hard-deleted; blocking flips `is_active`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(big_integer(Users::Id).auto_increment().primary_key())
                    .col(string_len(Users::Username, 255).unique_key())
                    .col(string_len(Users::Password, 255))
                    .col(string_len(Users::Email, 255).unique_key())
                    .col(string_len(Users::Role, 50))
                    .col(boolean(Users::IsActive).default(true))
                    .col(double_null(Users::Latitude))
                    .col(double_null(Users::Longitude))
                    .col(date_time(Users::CreatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Users::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Users { Table, Id, Username, Password, Email, Role, IsActive, Latitude, Longitude, CreatedAt }
