//! Create `blogs` table.
//!
//! `author_id` refers to a user owned by the stakeholders service, so there is
//! no foreign key on it.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Blogs::Table)
                    .if_not_exists()
                    .col(big_integer(Blogs::Id).auto_increment().primary_key())
                    .col(big_integer(Blogs::AuthorId))
                    .col(string_len(Blogs::Title, 255))
                    .col(text_null(Blogs::DescriptionMarkdown))
                    .col(date_time(Blogs::CreationDate))
                    .col(date_time(Blogs::LastModifiedDate))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Blogs::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Blogs { Table, Id, AuthorId, Title, DescriptionMarkdown, CreationDate, LastModifiedDate }
