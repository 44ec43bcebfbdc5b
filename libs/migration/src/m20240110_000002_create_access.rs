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
                        .table(SystemUsers::Table)
                        .if_not_exists()
                        .col(string(SystemUsers::Username))
                        .col(string(SystemUsers::PasswordHash))
                        .col(string_null(SystemUsers::PasswordSalt))
                        .col(boolean(SystemUsers::IsActive).default(false))
                        .col(timestamp_with_time_zone_null(SystemUsers::StartDate))
                        .col(timestamp_with_time_zone_null(SystemUsers::EndDate))
                        // person_type 1 points at persons, 2 at customers
                        .col(integer_null(SystemUsers::PersonId))
                        .col(integer_null(SystemUsers::PersonType)),
                )
                .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_system_users_username")
                    .table(SystemUsers::Table)
                    .col(SystemUsers::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_columns(
                    Table::create()
                        .table(Permissions::Table)
                        .if_not_exists()
                        .col(string(Permissions::Code))
                        .col(string_null(Permissions::Path))
                        .col(string_null(Permissions::Description))
                        .col(boolean(Permissions::IsActive).default(false)),
                )
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_columns(
                    Table::create()
                        .table(Roles::Table)
                        .if_not_exists()
                        .col(string(Roles::Code))
                        .col(string(Roles::Name))
                        .col(string_null(Roles::Description))
                        .col(boolean(Roles::IsActive).default(false)),
                )
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_columns(
                    Table::create()
                        .table(RolePermissions::Table)
                        .if_not_exists()
                        .col(integer(RolePermissions::RoleId))
                        .col(integer(RolePermissions::PermissionId)),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_role_permissions_role")
                        .from(RolePermissions::Table, RolePermissions::RoleId)
                        .to(Roles::Table, Roles::Id),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_role_permissions_permission")
                        .from(RolePermissions::Table, RolePermissions::PermissionId)
                        .to(Permissions::Table, Permissions::Id),
                )
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_columns(
                    Table::create()
                        .table(UserRoles::Table)
                        .if_not_exists()
                        .col(integer(UserRoles::UserId))
                        .col(integer(UserRoles::RoleId)),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_user_roles_user")
                        .from(UserRoles::Table, UserRoles::UserId)
                        .to(SystemUsers::Table, SystemUsers::Id),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_user_roles_role")
                        .from(UserRoles::Table, UserRoles::RoleId)
                        .to(Roles::Table, Roles::Id),
                )
                .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserRoles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RolePermissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Roles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Permissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SystemUsers::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum SystemUsers {
    Table,
    Id,
    Username,
    PasswordHash,
    PasswordSalt,
    IsActive,
    StartDate,
    EndDate,
    PersonId,
    PersonType,
}

#[derive(DeriveIden)]
enum Permissions {
    Table,
    Id,
    Code,
    Path,
    Description,
    IsActive,
}

#[derive(DeriveIden)]
enum Roles {
    Table,
    Id,
    Code,
    Name,
    Description,
    IsActive,
}

#[derive(DeriveIden)]
enum RolePermissions {
    Table,
    RoleId,
    PermissionId,
}

#[derive(DeriveIden)]
enum UserRoles {
    Table,
    UserId,
    RoleId,
}
