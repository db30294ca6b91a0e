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
                    .table(Addresses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Addresses::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Addresses::Street).string_len(100).not_null())
                    .col(ColumnDef::new(Addresses::City).string_len(100).not_null())
                    .col(ColumnDef::new(Addresses::State).string_len(50).not_null())
                    .col(
                        ColumnDef::new(Addresses::Zipcode)
                            .string_len(10)
                            .not_null()
                            .default(""),
                    )
                    .to_owned(),
            )
            .await?;

        // Join rows outlive both sides; deletes clear the reference
        manager
            .create_table(
                Table::create()
                    .table(CustomerAddresses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CustomerAddresses::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CustomerAddresses::MainAddress)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(CustomerAddresses::CustomerId).uuid().null())
                    .col(ColumnDef::new(CustomerAddresses::AddressId).uuid().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customer_addresses_customer")
                            .from(CustomerAddresses::Table, CustomerAddresses::CustomerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customer_addresses_address")
                            .from(CustomerAddresses::Table, CustomerAddresses::AddressId)
                            .to(Addresses::Table, Addresses::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_customer_addresses_customer")
                    .table(CustomerAddresses::Table)
                    .col(CustomerAddresses::CustomerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CustomerAddresses::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Addresses::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Addresses {
    Table,
    Id,
    Street,
    City,
    State,
    Zipcode,
}

#[derive(DeriveIden)]
enum CustomerAddresses {
    Table,
    Id,
    MainAddress,
    CustomerId,
    AddressId,
}
