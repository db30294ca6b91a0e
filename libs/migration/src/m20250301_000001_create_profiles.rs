use sea_orm_migration::prelude::*;

use crate::m20250301_000000_create_users::Users;

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
                    .col(ColumnDef::new(Profiles::Id).uuid().not_null().primary_key())
                    // One-to-one: at most one profile per user
                    .col(ColumnDef::new(Profiles::UserId).uuid().not_null().unique_key())
                    .col(
                        ColumnDef::new(Profiles::FirstName)
                            .string_len(250)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Profiles::LastName)
                            .string_len(250)
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Profiles::Image).string().null())
                    .col(
                        ColumnDef::new(Profiles::PhoneNumber)
                            .string_len(13)
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Profiles::Description).text().not_null())
                    .col(
                        ColumnDef::new(Profiles::CreatedDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Profiles::UpdatedDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profiles_user")
                            .from(Profiles::Table, Profiles::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Profiles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Profiles {
    Table,
    Id,
    UserId,
    FirstName,
    LastName,
    Image,
    PhoneNumber,
    Description,
    CreatedDate,
    UpdatedDate,
}
