//! Natural persons behind staff accounts.

use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use axum_helpers::{
    paginate, table_search, ApiError, ApiResult, AuthUser, Comparison, Envelope, FieldFilter,
    ListBody, ListParams, Success, TableSearch,
};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, DatabaseConnection, IntoActiveModel, PaginatorTrait};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "persons")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub last_name: String,
    pub first_name: String,
    pub mobile_number: Option<String>,
    pub state_reg_number: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub created_user_id: Option<i32>,
    pub modified_user_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Default, Deserialize)]
pub struct PersonFilter {
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub state_reg_number: String,
    #[serde(default)]
    pub mobile_number: String,
    #[serde(default)]
    pub is_active: String,
}

impl TableSearch for PersonFilter {
    fn filters(&self) -> Vec<FieldFilter> {
        vec![
            FieldFilter {
                column: "last_name",
                cmp: Comparison::Text(self.last_name.clone()),
            },
            FieldFilter {
                column: "first_name",
                cmp: Comparison::Text(self.first_name.clone()),
            },
            FieldFilter {
                column: "state_reg_number",
                cmp: Comparison::Text(self.state_reg_number.clone()),
            },
            FieldFilter {
                column: "mobile_number",
                cmp: Comparison::Text(self.mobile_number.clone()),
            },
            FieldFilter {
                column: "is_active",
                cmp: Comparison::Flag(self.is_active.clone()),
            },
        ]
    }

    fn sortable_columns() -> &'static [&'static str] {
        &["id", "last_name", "first_name", "created_at"]
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct PersonParams {
    #[validate(length(min = 1))]
    pub last_name: String,
    #[validate(length(min = 1))]
    pub first_name: String,
    #[serde(default)]
    pub state_reg_number: String,
    #[serde(default)]
    pub mobile_number: String,
    #[serde(default)]
    pub is_active: bool,
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
    Json(params): Json<ListParams<PersonFilter>>,
) -> ApiResult<ListBody<Model>> {
    let query = table_search(Entity::find(), &params.filter, &params.sort);
    let total = query.clone().count(&db).await?;
    let list = paginate(query, params.page, params.size).all(&db).await?;
    Ok(Envelope::ok(ListBody { total, list }))
}

async fn list_active(State(db): State<DatabaseConnection>) -> ApiResult<Vec<Model>> {
    Ok(Envelope::ok(Entity::find().all(&db).await?))
}

async fn get_one(State(db): State<DatabaseConnection>, Path(id): Path<i32>) -> ApiResult<Model> {
    let row = Entity::find_by_id(id)
        .one(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Бичлэг олдсонгүй".to_string()))?;
    Ok(Envelope::ok(row))
}

/// The identity of the calling session, as refreshed by the auth middleware.
async fn me(Extension(user): Extension<AuthUser>) -> ApiResult<AuthUser> {
    Ok(Envelope::ok(user))
}

async fn create(
    State(db): State<DatabaseConnection>,
    Extension(user): Extension<AuthUser>,
    Json(params): Json<PersonParams>,
) -> ApiResult<Success> {
    params.validate()?;

    ActiveModel {
        last_name: Set(params.last_name),
        first_name: Set(params.first_name),
        state_reg_number: Set(Some(params.state_reg_number)),
        mobile_number: Set(Some(params.mobile_number)),
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
    Json(params): Json<PersonParams>,
) -> ApiResult<Success> {
    params.validate()?;

    let row = Entity::find_by_id(id)
        .one(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Бичлэг олдсонгүй".to_string()))?;

    let mut row = row.into_active_model();
    row.last_name = Set(params.last_name);
    row.first_name = Set(params.first_name);
    row.state_reg_number = Set(Some(params.state_reg_number));
    row.mobile_number = Set(Some(params.mobile_number));
    row.is_active = Set(params.is_active);
    row.updated_at = Set(chrono::Utc::now().into());
    row.modified_user_id = Set(Some(user.id));
    row.update(&db).await?;

    Ok(Envelope::ok(Success::ok()))
}

// Persons are removed one at a time by path id, unlike the bulk deletes on
// the other reference endpoints.
async fn remove(State(db): State<DatabaseConnection>, Path(id): Path<i32>) -> ApiResult<Success> {
    Entity::delete_by_id(id).exec(&db).await?;
    Ok(Envelope::ok(Success::ok()))
}
