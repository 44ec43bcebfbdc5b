//! Customer tables.
//!
//! `customers` is self-referencing: a parent company row carries the company
//! registry number, branch rows point at it through `parent_id` and keep the
//! registry number empty. Documents attach through `contents` plus the
//! generic `content_map` (header table name + record id), status transitions
//! land in the append-only `status_logs` with the same addressing scheme.

/// Value stored in `status_logs.hdr_table_name` / `content_map.hdr_table_name`
/// for customer records.
pub const CUSTOMER_TABLE: &str = "customers";

pub mod customer {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "customers")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub code: String,
        pub name: String,
        pub company_name: Option<String>,
        pub is_active: bool,
        pub description: Option<String>,
        pub classification_id: Option<i32>,
        pub company_registry_number: Option<String>,
        pub country_id: Option<i32>,
        pub city_id: Option<i32>,
        pub district_id: Option<i32>,
        pub payment_type_id: Option<i32>,
        pub status_id: Option<i32>,
        pub parent_id: Option<i32>,
        pub address_description: Option<String>,
        pub maximum_purchase: Option<f64>,
        pub maximum_receivables: Option<f64>,
        pub one_time_purchase_limit: Option<f64>,
        pub created_at: DateTimeWithTimeZone,
        pub updated_at: DateTimeWithTimeZone,
        pub created_user_id: Option<i32>,
        pub modified_user_id: Option<i32>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::classification::Entity",
            from = "Column::ClassificationId",
            to = "super::classification::Column::Id"
        )]
        Classification,
        #[sea_orm(belongs_to = "Entity", from = "Column::ParentId", to = "Column::Id")]
        Parent,
        #[sea_orm(has_many = "super::contact::Entity")]
        Contacts,
        #[sea_orm(has_many = "super::address::Entity")]
        Addresses,
    }

    impl Related<super::classification::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Classification.def()
        }
    }

    impl Related<super::contact::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Contacts.def()
        }
    }

    impl Related<super::address::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Addresses.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod classification {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "customer_classifications")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub name: String,
        pub description: Option<String>,
        pub is_active: bool,
        pub created_at: DateTimeWithTimeZone,
        pub updated_at: DateTimeWithTimeZone,
        pub created_user_id: Option<i32>,
        pub modified_user_id: Option<i32>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod customer_type {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "customer_types")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub name: String,
        pub description: Option<String>,
        pub color_code: Option<String>,
        pub is_active: bool,
        pub created_at: DateTimeWithTimeZone,
        pub updated_at: DateTimeWithTimeZone,
        pub created_user_id: Option<i32>,
        pub modified_user_id: Option<i32>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod type_map {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "customer_type_map")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub customer_id: i32,
        pub customer_type_id: i32,
        pub created_at: DateTimeWithTimeZone,
        pub updated_at: DateTimeWithTimeZone,
        pub created_user_id: Option<i32>,
        pub modified_user_id: Option<i32>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::customer::Entity",
            from = "Column::CustomerId",
            to = "super::customer::Column::Id"
        )]
        Customer,
        #[sea_orm(
            belongs_to = "super::customer_type::Entity",
            from = "Column::CustomerTypeId",
            to = "super::customer_type::Column::Id"
        )]
        CustomerType,
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod contact {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "customer_contacts")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub customer_id: i32,
        pub last_name: String,
        pub first_name: String,
        pub register_number: Option<String>,
        pub position_id: Option<i32>,
        pub phone_number1: Option<String>,
        pub phone_number2: Option<String>,
        pub email1: Option<String>,
        pub email2: Option<String>,
        pub is_active: bool,
        pub created_at: DateTimeWithTimeZone,
        pub updated_at: DateTimeWithTimeZone,
        pub created_user_id: Option<i32>,
        pub modified_user_id: Option<i32>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::customer::Entity",
            from = "Column::CustomerId",
            to = "super::customer::Column::Id"
        )]
        Customer,
    }

    impl Related<super::customer::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Customer.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod address {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "customer_addresses")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub customer_id: i32,
        pub country_id: Option<i32>,
        pub city_id: Option<i32>,
        pub district_id: Option<i32>,
        pub street_id: Option<i32>,
        pub address_type_id: Option<i32>,
        pub description: Option<String>,
        pub is_active: bool,
        pub created_at: DateTimeWithTimeZone,
        pub updated_at: DateTimeWithTimeZone,
        pub created_user_id: Option<i32>,
        pub modified_user_id: Option<i32>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::customer::Entity",
            from = "Column::CustomerId",
            to = "super::customer::Column::Id"
        )]
        Customer,
    }

    impl Related<super::customer::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Customer.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod content_type {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "content_types")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub name: String,
        pub is_active: bool,
        pub parent_id: Option<i32>,
        pub created_at: DateTimeWithTimeZone,
        pub updated_at: DateTimeWithTimeZone,
        pub created_user_id: Option<i32>,
        pub modified_user_id: Option<i32>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod content {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "contents")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub file_name: String,
        pub extension: Option<String>,
        /// `<bucket>/<object key>` in the attachment store.
        pub physical_path: String,
        pub file_size: Option<f64>,
        pub content_type_id: Option<i32>,
        pub created_at: DateTimeWithTimeZone,
        pub updated_at: DateTimeWithTimeZone,
        pub created_user_id: Option<i32>,
        pub modified_user_id: Option<i32>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::content_type::Entity",
            from = "Column::ContentTypeId",
            to = "super::content_type::Column::Id"
        )]
        ContentType,
    }

    impl Related<super::content_type::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::ContentType.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod content_map {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "content_map")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub content_id: i32,
        pub hdr_table_name: String,
        pub record_id: i32,
        pub created_at: DateTimeWithTimeZone,
        pub updated_at: DateTimeWithTimeZone,
        pub created_user_id: Option<i32>,
        pub modified_user_id: Option<i32>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::content::Entity",
            from = "Column::ContentId",
            to = "super::content::Column::Id"
        )]
        Content,
    }

    impl Related<super::content::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Content.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod status_log {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    /// Append-only; rows are never updated or deleted.
    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "status_logs")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub hdr_table_name: String,
        pub record_id: i32,
        pub status_id: i32,
        pub description: Option<String>,
        pub created_at: DateTimeWithTimeZone,
        pub updated_at: DateTimeWithTimeZone,
        pub created_user_id: Option<i32>,
        pub modified_user_id: Option<i32>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}
