use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Feed ordering
        manager
            .create_index(
                Index::create()
                    .name("idx_blogs_creation_date")
                    .table(Blogs::Table)
                    .col(Blogs::CreationDate)
                    .to_owned(),
            )
            .await?;

        // Ownership predicate on updates
        manager
            .create_index(
                Index::create()
                    .name("idx_blogs_author")
                    .table(Blogs::Table)
                    .col(Blogs::AuthorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_blog_images_blog_url")
                    .table(BlogImages::Table)
                    .col(BlogImages::BlogId)
                    .col((BlogImages::ImageUrl, 191))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_blogs_creation_date").table(Blogs::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_blogs_author").table(Blogs::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_blog_images_blog_url").table(BlogImages::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Blogs { Table, AuthorId, CreationDate }

#[derive(DeriveIden)]
enum BlogImages { Table, BlogId, ImageUrl }
