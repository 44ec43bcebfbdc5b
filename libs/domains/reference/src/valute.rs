//! Currencies, plus a passthrough to the Mongol Bank daily exchange rates.

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

const BANK_RATE_URL: &str = "http://monxansh.appspot.com/xansh.json";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "valutes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub code: Option<String>,
    pub symbol: Option<String>,
    pub rate: Option<f64>,
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

#[derive(Debug, Default, Deserialize)]
pub struct ValuteFilter {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_active: String,
}

impl TableSearch for ValuteFilter {
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
        &["id", "name", "code", "created_at"]
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ValuteParams {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[validate(length(min = 1))]
    pub symbol: String,
    #[serde(default)]
    pub rate: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_active: bool,
}

/// One row of the Mongol Bank exchange rate feed.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BankRate {
    #[serde(default)]
    pub last_date: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub rate: String,
    #[serde(default)]
    pub rate_float: f64,
    #[serde(default)]
    pub name: String,
}

pub fn router() -> Router<DatabaseConnection> {
    Router::new()
        .route("/list", post(list))
        .route("/list/active", get(list_active))
        .route("/get/{id}", get(get_one))
        .route("/", post(create).delete(remove))
        .route("/{id}", put(update))
        .route("/mongolBank/{code}", get(bank_rates))
}

async fn list(
    State(db): State<DatabaseConnection>,
    Json(params): Json<ListParams<ValuteFilter>>,
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
    Json(params): Json<ValuteParams>,
) -> ApiResult<Success> {
    params.validate()?;

    ActiveModel {
        name: Set(params.name),
        code: Set(Some(params.code)),
        symbol: Set(Some(params.symbol)),
        rate: Set(Some(params.rate)),
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
    Json(params): Json<ValuteParams>,
) -> ApiResult<Success> {
    params.validate()?;

    let row = Entity::find_by_id(id)
        .one(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Бичлэг олдсонгүй".to_string()))?;

    let mut row = row.into_active_model();
    row.name = Set(params.name);
    row.code = Set(Some(params.code));
    row.symbol = Set(Some(params.symbol));
    row.rate = Set(Some(params.rate));
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

/// Best-effort lookup; the feed being down yields an empty list rather than
/// an error so the exchange-rate widget degrades quietly.
async fn bank_rates(Path(code): Path<String>) -> Envelope<Vec<BankRate>> {
    match fetch_bank_rates(&code).await {
        Ok(rates) => Envelope::ok(rates),
        Err(error) => {
            tracing::warn!(%code, "bank rate lookup failed: {error}");
            Envelope::ok(Vec::new())
        }
    }
}

async fn fetch_bank_rates(code: &str) -> Result<Vec<BankRate>, reqwest::Error> {
    reqwest::get(format!("{BANK_RATE_URL}?currency={code}"))
        .await?
        .json()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_feed_rows_deserialize() {
        let payload = r#"[
            {"last_date": "2024-01-10 16:00:00", "code": "USD",
             "rate": "3450.12", "rate_float": 3450.12, "name": "АНУ доллар"}
        ]"#;
        let rates: Vec<BankRate> = serde_json::from_str(payload).unwrap();
        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].code, "USD");
        assert!((rates[0].rate_float - 3450.12).abs() < f64::EPSILON);
    }

    #[test]
    fn symbol_is_required() {
        let params = ValuteParams {
            name: "Доллар".to_string(),
            code: "USD".to_string(),
            symbol: String::new(),
            rate: 0.0,
            description: String::new(),
            is_active: true,
        };
        assert!(params.validate().is_err());
    }
}
