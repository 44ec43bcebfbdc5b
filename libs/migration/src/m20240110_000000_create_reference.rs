use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

/// id + created_at/updated_at + audit user columns shared by every table.
///
/// Audit columns are plain nullable integers; the legacy schema carried no
/// foreign-key constraints toward system_users and bootstrap rows are written
/// before any user exists.
fn base_columns(table: &mut TableCreateStatement) -> &mut TableCreateStatement {
    table
        .col(pk_auto(Alias::new("id")))
        .col(timestamp_with_time_zone(Alias::new("created_at")).default(Expr::current_timestamp()))
        .col(timestamp_with_time_zone(Alias::new("updated_at")).default(Expr::current_timestamp()))
        .col(integer_null(Alias::new("created_user_id")))
        .col(integer_null(Alias::new("modified_user_id")))
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                base_columns(
                    Table::create()
                        .table(Countries::Table)
                        .if_not_exists()
                        .col(string(Countries::Name)),
                )
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_columns(
                    Table::create()
                        .table(Cities::Table)
                        .if_not_exists()
                        .col(string(Cities::Name))
                        .col(integer_null(Cities::CountryId)),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_cities_country")
                        .from(Cities::Table, Cities::CountryId)
                        .to(Countries::Table, Countries::Id),
                )
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_columns(
                    Table::create()
                        .table(Districts::Table)
                        .if_not_exists()
                        .col(string(Districts::Name))
                        .col(integer_null(Districts::CityId)),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_districts_city")
                        .from(Districts::Table, Districts::CityId)
                        .to(Cities::Table, Cities::Id),
                )
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_columns(
                    Table::create()
                        .table(Streets::Table)
                        .if_not_exists()
                        .col(string(Streets::Name))
                        .col(integer_null(Streets::DistrictId)),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_streets_district")
                        .from(Streets::Table, Streets::DistrictId)
                        .to(Districts::Table, Districts::Id),
                )
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_columns(
                    Table::create()
                        .table(AddressTypes::Table)
                        .if_not_exists()
                        .col(string(AddressTypes::Name))
                        .col(boolean(AddressTypes::IsActive).default(false)),
                )
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_columns(
                    Table::create()
                        .table(PaymentTypes::Table)
                        .if_not_exists()
                        .col(string(PaymentTypes::Name))
                        .col(string_null(PaymentTypes::Description))
                        .col(boolean(PaymentTypes::IsActive).default(false))
                        .col(integer_null(PaymentTypes::PaymentDay))
                        .col(integer_null(PaymentTypes::PrepaidPercent))
                        .col(string_null(PaymentTypes::PaymentCondition)),
                )
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_columns(
                    Table::create()
                        .table(PaymentMethods::Table)
                        .if_not_exists()
                        .col(string(PaymentMethods::Name))
                        .col(string_null(PaymentMethods::Description))
                        .col(boolean(PaymentMethods::IsActive).default(false)),
                )
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_columns(
                    Table::create()
                        .table(StatusTypes::Table)
                        .if_not_exists()
                        .col(string(StatusTypes::Name))
                        .col(string_null(StatusTypes::Description))
                        .col(boolean(StatusTypes::IsActive).default(false)),
                )
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_columns(
                    Table::create()
                        .table(Statuses::Table)
                        .if_not_exists()
                        .col(string(Statuses::Name))
                        .col(string_null(Statuses::Description))
                        .col(string_null(Statuses::ColorCode))
                        .col(boolean(Statuses::IsActive).default(false))
                        .col(integer_null(Statuses::StatusTypeId)),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_statuses_status_type")
                        .from(Statuses::Table, Statuses::StatusTypeId)
                        .to(StatusTypes::Table, StatusTypes::Id),
                )
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_columns(
                    Table::create()
                        .table(Valutes::Table)
                        .if_not_exists()
                        .col(string(Valutes::Name))
                        .col(string_null(Valutes::Code))
                        .col(string_null(Valutes::Symbol))
                        .col(double_null(Valutes::Rate))
                        .col(string_null(Valutes::Description))
                        .col(boolean(Valutes::IsActive).default(false)),
                )
                .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Valutes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Statuses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StatusTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PaymentMethods::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PaymentTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AddressTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Streets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Districts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Cities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Countries::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Countries {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Cities {
    Table,
    Id,
    Name,
    CountryId,
}

#[derive(DeriveIden)]
enum Districts {
    Table,
    Id,
    Name,
    CityId,
}

#[derive(DeriveIden)]
enum Streets {
    Table,
    Id,
    Name,
    DistrictId,
}

#[derive(DeriveIden)]
enum AddressTypes {
    Table,
    Name,
    IsActive,
}

#[derive(DeriveIden)]
enum PaymentTypes {
    Table,
    Name,
    Description,
    IsActive,
    PaymentDay,
    PrepaidPercent,
    PaymentCondition,
}

#[derive(DeriveIden)]
enum PaymentMethods {
    Table,
    Name,
    Description,
    IsActive,
}

#[derive(DeriveIden)]
enum StatusTypes {
    Table,
    Id,
    Name,
    Description,
    IsActive,
}

#[derive(DeriveIden)]
enum Statuses {
    Table,
    Name,
    Description,
    ColorCode,
    IsActive,
    StatusTypeId,
}

#[derive(DeriveIden)]
enum Valutes {
    Table,
    Name,
    Code,
    Symbol,
    Rate,
    Description,
    IsActive,
}
