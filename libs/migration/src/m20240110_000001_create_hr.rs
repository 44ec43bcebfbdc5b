use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

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
                        .table(Persons::Table)
                        .if_not_exists()
                        .col(string(Persons::LastName))
                        .col(string(Persons::FirstName))
                        .col(string_null(Persons::MobileNumber))
                        .col(string_null(Persons::StateRegNumber))
                        .col(boolean(Persons::IsActive).default(false)),
                )
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_columns(
                    Table::create()
                        .table(Departments::Table)
                        .if_not_exists()
                        .col(string(Departments::Code))
                        .col(string(Departments::Name))
                        .col(string_null(Departments::Description))
                        .col(boolean(Departments::IsActive).default(false)),
                )
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_columns(
                    Table::create()
                        .table(PositionTypes::Table)
                        .if_not_exists()
                        .col(string(PositionTypes::Code))
                        .col(string(PositionTypes::Name))
                        .col(string_null(PositionTypes::Description))
                        .col(boolean(PositionTypes::IsActive).default(false)),
                )
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_columns(
                    Table::create()
                        .table(Positions::Table)
                        .if_not_exists()
                        .col(string(Positions::Code))
                        .col(string(Positions::Name))
                        .col(string_null(Positions::Description))
                        .col(boolean(Positions::IsActive).default(false))
                        .col(integer_null(Positions::PositionTypeId)),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_positions_position_type")
                        .from(Positions::Table, Positions::PositionTypeId)
                        .to(PositionTypes::Table, PositionTypes::Id),
                )
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_columns(
                    Table::create()
                        .table(PositionKeys::Table)
                        .if_not_exists()
                        .col(string(PositionKeys::Code))
                        .col(string(PositionKeys::Name))
                        .col(string_null(PositionKeys::Description))
                        .col(boolean(PositionKeys::IsActive).default(false))
                        .col(integer_null(PositionKeys::PositionId))
                        .col(integer_null(PositionKeys::DepartmentId)),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_position_keys_position")
                        .from(PositionKeys::Table, PositionKeys::PositionId)
                        .to(Positions::Table, Positions::Id),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_position_keys_department")
                        .from(PositionKeys::Table, PositionKeys::DepartmentId)
                        .to(Departments::Table, Departments::Id),
                )
                .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PositionKeys::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Positions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PositionTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Departments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Persons::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Persons {
    Table,
    LastName,
    FirstName,
    MobileNumber,
    StateRegNumber,
    IsActive,
}

#[derive(DeriveIden)]
enum Departments {
    Table,
    Id,
    Code,
    Name,
    Description,
    IsActive,
}

#[derive(DeriveIden)]
enum PositionTypes {
    Table,
    Id,
    Code,
    Name,
    Description,
    IsActive,
}

#[derive(DeriveIden)]
enum Positions {
    Table,
    Id,
    Code,
    Name,
    Description,
    IsActive,
    PositionTypeId,
}

#[derive(DeriveIden)]
enum PositionKeys {
    Table,
    Code,
    Name,
    Description,
    IsActive,
    PositionId,
    DepartmentId,
}
