use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Comments::Table)
                    .if_not_exists()
                    .col(big_integer(Comments::Id).auto_increment().primary_key())
                    .col(big_integer(Comments::BlogId))
                    .col(big_integer(Comments::AuthorId))
                    .col(text(Comments::Text))
                    .col(date_time(Comments::CreationTime))
                    .col(date_time(Comments::LastModifiedTime))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_blog")
                            .from(Comments::Table, Comments::BlogId)
                            .to(Blogs::Table, Blogs::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Comments::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Comments { Table, Id, BlogId, AuthorId, Text, CreationTime, LastModifiedTime }

#[derive(DeriveIden)]
enum Blogs { Table, Id }
