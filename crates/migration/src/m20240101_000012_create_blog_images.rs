use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BlogImages::Table)
                    .if_not_exists()
                    .col(big_integer(BlogImages::Id).auto_increment().primary_key())
                    .col(big_integer(BlogImages::BlogId))
                    .col(string_len(BlogImages::ImageUrl, 512))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_blog_images_blog")
                            .from(BlogImages::Table, BlogImages::BlogId)
                            .to(Blogs::Table, Blogs::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(BlogImages::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum BlogImages { Table, Id, BlogId, ImageUrl }

#[derive(DeriveIden)]
enum Blogs { Table, Id }
