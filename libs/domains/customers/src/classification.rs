//! Customer classifications (pharmacy, hospital chain, company headquarters
//! and the like). The parent-company classification is assigned automatically
//! during onboarding and managed here like any other row.

use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use axum_helpers::{
    paginate, table_search, ApiError, ApiResult, AuthUser, Comparison, DeleteParams, Envelope,
    FieldFilter, ListBody, ListParams, Success, TableSearch,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait,
};
use serde::Deserialize;
use validator::Validate;

use crate::entity::classification::{ActiveModel, Entity, Model};

#[derive(Debug, Default, Deserialize)]
pub struct ClassificationFilter {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_active: String,
}

impl TableSearch for ClassificationFilter {
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
        &["id", "name", "created_at"]
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ClassificationParams {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_active: bool,
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
    Json(params): Json<ListParams<ClassificationFilter>>,
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

async fn create(
    State(db): State<DatabaseConnection>,
    Extension(user): Extension<AuthUser>,
    Json(params): Json<ClassificationParams>,
) -> ApiResult<Success> {
    params.validate()?;

    ActiveModel {
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
    Json(params): Json<ClassificationParams>,
) -> ApiResult<Success> {
    params.validate()?;

    let row = Entity::find_by_id(id)
        .one(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Бичлэг олдсонгүй".to_string()))?;

    let mut row = row.into_active_model();
    row.name = Set(params.name);
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
    fn name_is_required() {
        let params: ClassificationParams =
            serde_json::from_str(r#"{"name": "", "is_active": true}"#).unwrap();
        assert!(params.validate().is_err());
    }
}
