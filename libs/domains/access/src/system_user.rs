//! Staff accounts. `person_type` 1 links the account to a staff person,
//! 2 to a customer portal account.

use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use axum_helpers::{
    paginate, table_search, ApiError, ApiResult, AuthUser, Comparison, Envelope, FieldFilter,
    ListBody, ListParams, Success, TableSearch,
};
use sea_orm::entity::prelude::*;
use sea_orm::{
    ActiveValue::Set, DatabaseConnection, IntoActiveModel, PaginatorTrait, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::password;

pub const PERSON_TYPE_STAFF: i32 = 1;
pub const PERSON_TYPE_CUSTOMER: i32 = 2;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "system_users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub password_salt: Option<String>,
    pub is_active: bool,
    pub start_date: Option<DateTimeWithTimeZone>,
    pub end_date: Option<DateTimeWithTimeZone>,
    pub person_id: Option<i32>,
    pub person_type: Option<i32>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub created_user_id: Option<i32>,
    pub modified_user_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "domain_hr::person::Entity",
        from = "Column::PersonId",
        to = "domain_hr::person::Column::Id"
    )]
    Person,
}

impl Related<domain_hr::person::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Person.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub mod user_role {
    //! Join rows between an account and the roles it holds.

    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "user_roles")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub user_id: i32,
        pub role_id: i32,
        pub created_at: DateTimeWithTimeZone,
        pub updated_at: DateTimeWithTimeZone,
        pub created_user_id: Option<i32>,
        pub modified_user_id: Option<i32>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::Entity",
            from = "Column::UserId",
            to = "super::Column::Id"
        )]
        User,
        #[sea_orm(
            belongs_to = "crate::role::Entity",
            from = "Column::RoleId",
            to = "crate::role::Column::Id"
        )]
        Role,
    }

    impl Related<super::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::User.def()
        }
    }

    impl Related<crate::role::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Role.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Debug, Default, Deserialize)]
pub struct SystemUserFilter {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub is_active: String,
}

impl TableSearch for SystemUserFilter {
    fn filters(&self) -> Vec<FieldFilter> {
        vec![
            FieldFilter {
                column: "username",
                cmp: Comparison::Text(self.username.clone()),
            },
            FieldFilter {
                column: "is_active",
                cmp: Comparison::Flag(self.is_active.clone()),
            },
        ]
    }

    fn sortable_columns() -> &'static [&'static str] {
        &["id", "username", "start_date", "end_date", "created_at"]
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct SystemUserParams {
    #[validate(length(min = 1))]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub is_active: bool,
    pub start_date: Option<DateTimeWithTimeZone>,
    pub end_date: Option<DateTimeWithTimeZone>,
    #[serde(default, alias = "persond_id")]
    pub person_id: i32,
    /// Role ids held by the account; replaced wholesale on update.
    #[serde(default)]
    pub roles: Vec<i32>,
}

/// Account detail as returned by `GET /get/{id}`, with the attached roles
/// inlined.
#[derive(Debug, Serialize)]
pub struct SystemUserDetail {
    #[serde(flatten)]
    pub user: Model,
    pub roles: Vec<crate::role::Model>,
}

pub fn router() -> Router<DatabaseConnection> {
    Router::new()
        .route("/list", post(list))
        .route("/list/active", get(list_active))
        .route("/get/{id}", get(get_one))
        .route("/me", get(me))
        .route("/", post(create))
        .route("/{id}", put(update).delete(remove))
}

async fn list(
    State(db): State<DatabaseConnection>,
    Json(params): Json<ListParams<SystemUserFilter>>,
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
) -> ApiResult<SystemUserDetail> {
    let row = Entity::find_by_id(id)
        .one(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Бичлэг олдсонгүй".to_string()))?;

    let role_ids: Vec<i32> = user_role::Entity::find()
        .filter(user_role::Column::UserId.eq(row.id))
        .all(&db)
        .await?
        .into_iter()
        .map(|attachment| attachment.role_id)
        .collect();
    let roles = crate::role::Entity::find()
        .filter(crate::role::Column::Id.is_in(role_ids))
        .all(&db)
        .await?;

    Ok(Envelope::ok(SystemUserDetail { user: row, roles }))
}

async fn me(Extension(user): Extension<AuthUser>) -> ApiResult<AuthUser> {
    Ok(Envelope::ok(user))
}

async fn create(
    State(db): State<DatabaseConnection>,
    Extension(user): Extension<AuthUser>,
    Json(params): Json<SystemUserParams>,
) -> ApiResult<Success> {
    params.validate()?;
    if params.password.is_empty() {
        return Err(ApiError::BadRequest("Нууц үг оруулна уу".to_string()));
    }

    let hash =
        password::hash_password(&params.password).map_err(|e| ApiError::Internal(e.to_string()))?;

    let txn = db.begin().await?;

    let created = ActiveModel {
        username: Set(params.username),
        password_hash: Set(hash),
        is_active: Set(params.is_active),
        start_date: Set(params.start_date),
        end_date: Set(params.end_date),
        person_id: Set((params.person_id > 0).then_some(params.person_id)),
        person_type: Set(Some(PERSON_TYPE_STAFF)),
        created_user_id: Set(Some(user.id)),
        modified_user_id: Set(Some(user.id)),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    attach_roles(&txn, created.id, &params.roles, user.id).await?;
    txn.commit().await?;

    Ok(Envelope::ok(Success::ok()))
}

async fn attach_roles(
    txn: &sea_orm::DatabaseTransaction,
    user_id: i32,
    role_ids: &[i32],
    audit_user_id: i32,
) -> Result<(), ApiError> {
    for role_id in role_ids {
        user_role::ActiveModel {
            user_id: Set(user_id),
            role_id: Set(*role_id),
            created_user_id: Set(Some(audit_user_id)),
            modified_user_id: Set(Some(audit_user_id)),
            ..Default::default()
        }
        .insert(txn)
        .await?;
    }
    Ok(())
}

/// The password is not touched on update; only account metadata changes.
async fn update(
    State(db): State<DatabaseConnection>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(params): Json<SystemUserParams>,
) -> ApiResult<Success> {
    params.validate()?;

    let row = Entity::find_by_id(id)
        .one(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Бичлэг олдсонгүй".to_string()))?;

    let txn = db.begin().await?;

    let mut row = row.into_active_model();
    row.username = Set(params.username);
    row.is_active = Set(params.is_active);
    row.start_date = Set(params.start_date);
    row.end_date = Set(params.end_date);
    row.updated_at = Set(chrono::Utc::now().into());
    row.modified_user_id = Set(Some(user.id));
    let updated = row.update(&txn).await?;

    user_role::Entity::delete_many()
        .filter(user_role::Column::UserId.eq(updated.id))
        .exec(&txn)
        .await?;
    attach_roles(&txn, updated.id, &params.roles, user.id).await?;

    txn.commit().await?;
    Ok(Envelope::ok(Success::ok()))
}

async fn remove(State(db): State<DatabaseConnection>, Path(id): Path<i32>) -> ApiResult<Success> {
    Entity::delete_by_id(id).exec(&db).await?;
    Ok(Envelope::ok(Success::ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_never_serialized() {
        let user = Model {
            id: 1,
            username: "admin".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            password_salt: None,
            is_active: true,
            start_date: None,
            end_date: None,
            person_id: Some(1),
            person_type: Some(PERSON_TYPE_STAFF),
            created_at: chrono::Utc::now().into(),
            updated_at: chrono::Utc::now().into(),
            created_user_id: None,
            modified_user_id: None,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("password_salt").is_none());
        assert_eq!(json["username"], "admin");
    }

    #[test]
    fn params_accept_legacy_persond_id_key() {
        let params: SystemUserParams = serde_json::from_value(serde_json::json!({
            "username": "bat",
            "password": "x",
            "persond_id": 4
        }))
        .unwrap();
        assert_eq!(params.person_id, 4);
    }
}
