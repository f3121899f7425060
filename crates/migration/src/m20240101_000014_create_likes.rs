//! Create `likes` table. The composite primary key makes a like a set member:
//! a user likes a blog at most once.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Likes::Table)
                    .if_not_exists()
                    .col(big_integer(Likes::BlogId))
                    .col(big_integer(Likes::UserId))
                    .primary_key(Index::create().col(Likes::BlogId).col(Likes::UserId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_likes_blog")
                            .from(Likes::Table, Likes::BlogId)
                            .to(Blogs::Table, Blogs::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Likes::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Likes { Table, BlogId, UserId }

#[derive(DeriveIden)]
enum Blogs { Table, Id }
