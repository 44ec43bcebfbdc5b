//! Positions, grouped by position type.

use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use axum_helpers::{
    paginate, table_search, ApiError, ApiResult, AuthUser, Comparison, DeleteParams, Envelope,
    FieldFilter, ListBody, ListParams, Success, TableSearch,
};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, DatabaseConnection, IntoActiveModel, PaginatorTrait};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "positions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub position_type_id: Option<i32>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub created_user_id: Option<i32>,
    pub modified_user_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::position_type::Entity",
        from = "Column::PositionTypeId",
        to = "super::position_type::Column::Id"
    )]
    PositionType,
}

impl Related<super::position_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PositionType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Default, Deserialize)]
pub struct PositionFilter {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_active: String,
    #[serde(default)]
    pub position_type_id: i32,
}

impl TableSearch for PositionFilter {
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
            FieldFilter {
                column: "position_type_id",
                cmp: Comparison::Id(self.position_type_id),
            },
        ]
    }

    fn sortable_columns() -> &'static [&'static str] {
        &["id", "code", "name", "position_type_id", "created_at"]
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct PositionParams {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(rename = "type_id")]
    #[validate(range(min = 1))]
    pub position_type_id: i32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub is_active: bool,
}

pub fn router() -> Router<DatabaseConnection> {
    Router::new()
        .route("/list", post(list))
        .route("/list/active/{type_id}", get(list_active))
        .route("/get/{id}", get(get_one))
        .route("/", post(create).delete(remove))
        .route("/{id}", put(update))
}

async fn list(
    State(db): State<DatabaseConnection>,
    Json(params): Json<ListParams<PositionFilter>>,
) -> ApiResult<ListBody<Model>> {
    let query = table_search(Entity::find(), &params.filter, &params.sort);
    let total = query.clone().count(&db).await?;
    let list = paginate(query, params.page, params.size).all(&db).await?;
    Ok(Envelope::ok(ListBody { total, list }))
}

async fn list_active(
    State(db): State<DatabaseConnection>,
    Path(type_id): Path<i32>,
) -> ApiResult<Vec<Model>> {
    let rows = Entity::find()
        .filter(Column::PositionTypeId.eq(type_id))
        .all(&db)
        .await?;
    Ok(Envelope::ok(rows))
}

async fn get_one(State(db): State<DatabaseConnection>, Path(id): Path<i32>) -> ApiResult<Model> {
    let row = Entity::find_by_id(id)
        .one(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Бичлэг олдсонгүй".to_string()))?;
    Ok(Envelope::ok(row))
}

async fn create(
    State(db): State<DatabaseConnection>,
    Extension(user): Extension<AuthUser>,
    Json(params): Json<PositionParams>,
) -> ApiResult<Success> {
    params.validate()?;

    ActiveModel {
        code: Set(params.code),
        name: Set(params.name),
        position_type_id: Set(Some(params.position_type_id)),
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
    Json(params): Json<PositionParams>,
) -> ApiResult<Success> {
    params.validate()?;

    let row = Entity::find_by_id(id)
        .one(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Бичлэг олдсонгүй".to_string()))?;

    let mut row = row.into_active_model();
    row.code = Set(params.code);
    row.name = Set(params.name);
    row.position_type_id = Set(Some(params.position_type_id));
    row.description = Set(Some(params.description));
    row.is_active = Set(params.is_active);
    row.updated_at = Set(chrono::Utc::now().into());
    row.modified_user_id = Set(Some(user.id));
    row.update(&db).await?;

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
    fn params_use_legacy_type_id_key() {
        let params: PositionParams = serde_json::from_value(serde_json::json!({
            "name": "Эм зүйч",
            "type_id": 2
        }))
        .unwrap();
        assert_eq!(params.position_type_id, 2);
    }
}
