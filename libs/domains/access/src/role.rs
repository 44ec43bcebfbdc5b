//! Roles and their permission attachments.

use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use axum_helpers::{
    paginate, table_search, ApiError, ApiResult, AuthUser, Comparison, DeleteParams, Envelope,
    FieldFilter, ListBody, ListParams, Success, TableSearch,
};
use sea_orm::entity::prelude::*;
use sea_orm::{
    ActiveValue::Set, DatabaseConnection, IntoActiveModel, PaginatorTrait, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub created_user_id: Option<i32>,
    pub modified_user_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "role_permission::Entity")]
    RolePermission,
}

impl Related<role_permission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RolePermission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub mod role_permission {
    //! Join rows between a role and the permissions it grants.

    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "role_permissions")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub role_id: i32,
        pub permission_id: i32,
        pub created_at: DateTimeWithTimeZone,
        pub updated_at: DateTimeWithTimeZone,
        pub created_user_id: Option<i32>,
        pub modified_user_id: Option<i32>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::Entity",
            from = "Column::RoleId",
            to = "super::Column::Id"
        )]
        Role,
        #[sea_orm(
            belongs_to = "crate::permission::Entity",
            from = "Column::PermissionId",
            to = "crate::permission::Column::Id"
        )]
        Permission,
    }

    impl Related<super::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Role.def()
        }
    }

    impl Related<crate::permission::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Permission.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Debug, Default, Deserialize)]
pub struct RoleFilter {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_active: String,
}

impl TableSearch for RoleFilter {
    fn filters(&self) -> Vec<FieldFilter> {
        vec![
            FieldFilter {
                column: "name",
                cmp: Comparison::Text(self.name.clone()),
            },
            FieldFilter {
                column: "description",
                cmp: Comparison::Text(self.description.clone()),
            },
            FieldFilter {
                column: "is_active",
                cmp: Comparison::Flag(self.is_active.clone()),
            },
        ]
    }

    fn sortable_columns() -> &'static [&'static str] {
        &["id", "code", "name", "created_at"]
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RoleParams {
    #[serde(default)]
    pub code: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_active: bool,
}

/// Update replaces the attached permission set wholesale; clients send the
/// full list of permission ids every time.
#[derive(Debug, Deserialize, Validate)]
pub struct RoleUpdateParams {
    #[serde(default)]
    pub code: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub permissions: Vec<i32>,
}

/// Role detail as returned by `GET /get/{id}`, with the attached permissions
/// inlined.
#[derive(Debug, Serialize)]
pub struct RoleDetail {
    #[serde(flatten)]
    pub role: Model,
    pub permissions: Vec<crate::permission::Model>,
}

pub fn router() -> Router<DatabaseConnection> {
    Router::new()
        .route("/list", post(list))
        .route("/list/active", get(list_active))
        .route("/get/{id}", get(get_one))
        .route("/", post(create).delete(remove))
        .route("/{id}", put(update))
}

async fn list(
    State(db): State<DatabaseConnection>,
    Json(params): Json<ListParams<RoleFilter>>,
) -> ApiResult<ListBody<Model>> {
    let query = table_search(Entity::find(), &params.filter, &params.sort);
    let total = query.clone().count(&db).await?;
    let list = paginate(query, params.page, params.size).all(&db).await?;
    Ok(Envelope::ok(ListBody { total, list }))
}

async fn list_active(State(db): State<DatabaseConnection>) -> ApiResult<Vec<Model>> {
    Ok(Envelope::ok(Entity::find().all(&db).await?))
}

async fn get_one(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> ApiResult<RoleDetail> {
    let role = Entity::find_by_id(id)
        .one(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Бичлэг олдсонгүй".to_string()))?;

    let attached = role_permission::Entity::find()
        .filter(role_permission::Column::RoleId.eq(role.id))
        .all(&db)
        .await?;
    let ids: Vec<i32> = attached.iter().map(|row| row.permission_id).collect();
    let permissions = crate::permission::Entity::find()
        .filter(crate::permission::Column::Id.is_in(ids))
        .all(&db)
        .await?;

    Ok(Envelope::ok(RoleDetail { role, permissions }))
}

async fn create(
    State(db): State<DatabaseConnection>,
    Extension(user): Extension<AuthUser>,
    Json(params): Json<RoleParams>,
) -> ApiResult<Success> {
    params.validate()?;

    ActiveModel {
        code: Set(params.code),
        name: Set(params.name),
        description: Set(Some(params.description)),
        is_active: Set(params.is_active),
        created_user_id: Set(Some(user.id)),
        modified_user_id: Set(Some(user.id)),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    Ok(Envelope::ok(Success::ok()))
}

async fn update(
    State(db): State<DatabaseConnection>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(params): Json<RoleUpdateParams>,
) -> ApiResult<Success> {
    params.validate()?;

    let row = Entity::find_by_id(id)
        .one(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Бичлэг олдсонгүй".to_string()))?;

    let txn = db.begin().await?;

    let mut role = row.into_active_model();
    role.code = Set(params.code);
    role.name = Set(params.name);
    role.description = Set(Some(params.description));
    role.is_active = Set(params.is_active);
    role.updated_at = Set(chrono::Utc::now().into());
    role.modified_user_id = Set(Some(user.id));
    role.update(&txn).await?;

    role_permission::Entity::delete_many()
        .filter(role_permission::Column::RoleId.eq(id))
        .exec(&txn)
        .await?;

    for permission_id in params.permissions {
        role_permission::ActiveModel {
            role_id: Set(id),
            permission_id: Set(permission_id),
            created_user_id: Set(Some(user.id)),
            modified_user_id: Set(Some(user.id)),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;
    Ok(Envelope::ok(Success::ok()))
}

async fn remove(
    State(db): State<DatabaseConnection>,
    Json(params): Json<DeleteParams>,
) -> ApiResult<Success> {
    for id in params.ids {
        Entity::delete_by_id(id).exec(&db).await?;
    }
    Ok(Envelope::ok(Success::ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_params_default_to_empty_permission_set() {
        let params: RoleUpdateParams = serde_json::from_value(serde_json::json!({
            "name": "Нягтлан"
        }))
        .unwrap();
        assert!(params.permissions.is_empty());
        assert!(params.validate().is_ok());
    }

    #[test]
    fn role_detail_flattens_role_fields() {
        let detail = RoleDetail {
            role: Model {
                id: 3,
                code: "ACC".to_string(),
                name: "Нягтлан".to_string(),
                description: None,
                is_active: true,
                created_at: chrono::Utc::now().into(),
                updated_at: chrono::Utc::now().into(),
                created_user_id: None,
                modified_user_id: None,
            },
            permissions: vec![],
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["name"], "Нягтлан");
        assert!(json["permissions"].as_array().unwrap().is_empty());
    }
}
