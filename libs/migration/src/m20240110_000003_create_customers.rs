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
                        .table(CustomerClassifications::Table)
                        .if_not_exists()
                        .col(string(CustomerClassifications::Name))
                        .col(string_null(CustomerClassifications::Description))
                        .col(boolean(CustomerClassifications::IsActive).default(false)),
                )
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_columns(
                    Table::create()
                        .table(CustomerTypes::Table)
                        .if_not_exists()
                        .col(string(CustomerTypes::Name))
                        .col(string_null(CustomerTypes::Description))
                        .col(string_null(CustomerTypes::ColorCode))
                        .col(boolean(CustomerTypes::IsActive).default(false)),
                )
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_columns(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(string(Customers::Code))
                        .col(string(Customers::Name))
                        .col(string_null(Customers::CompanyName))
                        .col(boolean(Customers::IsActive).default(false))
                        .col(string_null(Customers::Description))
                        .col(integer_null(Customers::ClassificationId))
                        .col(string_null(Customers::CompanyRegistryNumber))
                        .col(integer_null(Customers::CountryId))
                        .col(integer_null(Customers::CityId))
                        .col(integer_null(Customers::DistrictId))
                        .col(integer_null(Customers::PaymentTypeId))
                        .col(integer_null(Customers::StatusId))
                        .col(integer_null(Customers::ParentId))
                        .col(string_null(Customers::AddressDescription))
                        .col(double_null(Customers::MaximumPurchase))
                        .col(double_null(Customers::MaximumReceivables))
                        .col(double_null(Customers::OneTimePurchaseLimit)),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_customers_classification")
                        .from(Customers::Table, Customers::ClassificationId)
                        .to(CustomerClassifications::Table, CustomerClassifications::Id),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_customers_parent")
                        .from(Customers::Table, Customers::ParentId)
                        .to(Customers::Table, Customers::Id),
                )
                .to_owned(),
            )
            .await?;

        // Monthly account codes must never collide even under concurrent
        // registrations. Insert races surface as unique violations and the
        // registration is retried with a fresh code.
        manager
            .create_index(
                Index::create()
                    .name("idx_customers_code")
                    .table(Customers::Table)
                    .col(Customers::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_columns(
                    Table::create()
                        .table(CustomerTypeMap::Table)
                        .if_not_exists()
                        .col(integer(CustomerTypeMap::CustomerId))
                        .col(integer(CustomerTypeMap::CustomerTypeId)),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_customer_type_map_customer")
                        .from(CustomerTypeMap::Table, CustomerTypeMap::CustomerId)
                        .to(Customers::Table, Customers::Id),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_customer_type_map_type")
                        .from(CustomerTypeMap::Table, CustomerTypeMap::CustomerTypeId)
                        .to(CustomerTypes::Table, CustomerTypes::Id),
                )
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_columns(
                    Table::create()
                        .table(CustomerContacts::Table)
                        .if_not_exists()
                        .col(integer(CustomerContacts::CustomerId))
                        .col(string(CustomerContacts::LastName))
                        .col(string(CustomerContacts::FirstName))
                        .col(string_null(CustomerContacts::RegisterNumber))
                        .col(integer_null(CustomerContacts::PositionId))
                        .col(string_null(CustomerContacts::PhoneNumber1))
                        .col(string_null(CustomerContacts::PhoneNumber2))
                        .col(string_null(CustomerContacts::Email1))
                        .col(string_null(CustomerContacts::Email2))
                        .col(boolean(CustomerContacts::IsActive).default(false)),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_customer_contacts_customer")
                        .from(CustomerContacts::Table, CustomerContacts::CustomerId)
                        .to(Customers::Table, Customers::Id),
                )
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_columns(
                    Table::create()
                        .table(CustomerAddresses::Table)
                        .if_not_exists()
                        .col(integer(CustomerAddresses::CustomerId))
                        .col(integer_null(CustomerAddresses::CountryId))
                        .col(integer_null(CustomerAddresses::CityId))
                        .col(integer_null(CustomerAddresses::DistrictId))
                        .col(integer_null(CustomerAddresses::StreetId))
                        .col(integer_null(CustomerAddresses::AddressTypeId))
                        .col(string_null(CustomerAddresses::Description))
                        .col(boolean(CustomerAddresses::IsActive).default(false)),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_customer_addresses_customer")
                        .from(CustomerAddresses::Table, CustomerAddresses::CustomerId)
                        .to(Customers::Table, Customers::Id),
                )
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_columns(
                    Table::create()
                        .table(ContentTypes::Table)
                        .if_not_exists()
                        .col(string(ContentTypes::Name))
                        .col(boolean(ContentTypes::IsActive).default(false))
                        .col(integer_null(ContentTypes::ParentId)),
                )
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_columns(
                    Table::create()
                        .table(Contents::Table)
                        .if_not_exists()
                        .col(string(Contents::FileName))
                        .col(string_null(Contents::Extension))
                        .col(string(Contents::PhysicalPath))
                        .col(double_null(Contents::FileSize))
                        .col(integer_null(Contents::ContentTypeId)),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_contents_content_type")
                        .from(Contents::Table, Contents::ContentTypeId)
                        .to(ContentTypes::Table, ContentTypes::Id),
                )
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_columns(
                    Table::create()
                        .table(ContentMap::Table)
                        .if_not_exists()
                        .col(integer(ContentMap::ContentId))
                        .col(string(ContentMap::HdrTableName))
                        .col(integer(ContentMap::RecordId)),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_content_map_content")
                        .from(ContentMap::Table, ContentMap::ContentId)
                        .to(Contents::Table, Contents::Id),
                )
                .to_owned(),
            )
            .await?;

        manager
            .create_table(
                base_columns(
                    Table::create()
                        .table(StatusLogs::Table)
                        .if_not_exists()
                        .col(string(StatusLogs::HdrTableName))
                        .col(integer(StatusLogs::RecordId))
                        .col(integer(StatusLogs::StatusId))
                        .col(string_null(StatusLogs::Description)),
                )
                .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StatusLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ContentMap::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Contents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ContentTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CustomerAddresses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CustomerContacts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CustomerTypeMap::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Customers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CustomerTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(CustomerClassifications::Table)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum CustomerClassifications {
    Table,
    Id,
    Name,
    Description,
    IsActive,
}

#[derive(DeriveIden)]
enum CustomerTypes {
    Table,
    Id,
    Name,
    Description,
    ColorCode,
    IsActive,
}

#[derive(DeriveIden)]
enum Customers {
    Table,
    Id,
    Code,
    Name,
    CompanyName,
    IsActive,
    Description,
    ClassificationId,
    CompanyRegistryNumber,
    CountryId,
    CityId,
    DistrictId,
    PaymentTypeId,
    StatusId,
    ParentId,
    AddressDescription,
    MaximumPurchase,
    MaximumReceivables,
    OneTimePurchaseLimit,
}

#[derive(DeriveIden)]
enum CustomerTypeMap {
    Table,
    CustomerId,
    CustomerTypeId,
}

#[derive(DeriveIden)]
enum CustomerContacts {
    Table,
    CustomerId,
    LastName,
    FirstName,
    RegisterNumber,
    PositionId,
    PhoneNumber1,
    PhoneNumber2,
    Email1,
    Email2,
    IsActive,
}

#[derive(DeriveIden)]
enum CustomerAddresses {
    Table,
    CustomerId,
    CountryId,
    CityId,
    DistrictId,
    StreetId,
    AddressTypeId,
    Description,
    IsActive,
}

#[derive(DeriveIden)]
enum ContentTypes {
    Table,
    Id,
    Name,
    IsActive,
    ParentId,
}

#[derive(DeriveIden)]
enum Contents {
    Table,
    Id,
    FileName,
    Extension,
    PhysicalPath,
    FileSize,
    ContentTypeId,
}

#[derive(DeriveIden)]
enum ContentMap {
    Table,
    ContentId,
    HdrTableName,
    RecordId,
}

#[derive(DeriveIden)]
enum StatusLogs {
    Table,
    HdrTableName,
    RecordId,
    StatusId,
    Description,
}
