//! Create `profiles` table, 1:1 with `users` through a unique `user_id`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(big_integer(Profiles::Id).auto_increment().primary_key())
                    .col(big_integer(Profiles::UserId).unique_key())
                    .col(string_len_null(Profiles::FirstName, 255))
                    .col(string_len_null(Profiles::LastName, 255))
                    .col(string_len_null(Profiles::ProfileImageUrl, 512))
                    .col(text_null(Profiles::Biography))
                    .col(string_len_null(Profiles::Motto, 255))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profiles_user")
                            .from(Profiles::Table, Profiles::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Profiles::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Profiles { Table, Id, UserId, FirstName, LastName, ProfileImageUrl, Biography, Motto }

#[derive(DeriveIden)]
enum Users { Table, Id }
