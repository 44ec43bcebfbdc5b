//! Login and the one-shot admin bootstrap.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_helpers::{ApiError, ApiResult, Envelope, TokenPair, TokenUser};
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter};
use serde::Deserialize;
use validator::Validate;

use crate::password;
use crate::system_user::{self, PERSON_TYPE_STAFF};
use crate::AuthState;

/// Bootstrap admin credentials, replaced on first login in production.
const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "Mongol123@";
const ADMIN_ACCOUNT_VALID_HOURS: i64 = 8640;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginParams {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

pub fn router() -> Router<AuthState> {
    Router::new()
        .route("/login", post(login))
        .route("/admin", get(admin))
}

/// Staff login. Only staff accounts (`person_type = 1`) inside their validity
/// window may sign in; portal accounts use a different channel.
async fn login(
    State(state): State<AuthState>,
    Json(params): Json<LoginParams>,
) -> ApiResult<TokenPair> {
    params.validate()?;

    let user = active_staff_query(&params.username, Utc::now())
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Хэрэглэгч олдсонгүй".to_string()))?;

    if !password::verify_password(&user.password_hash, &params.password) {
        return Err(ApiError::NotFound(
            "Нэвтрэх нэр эсвэл нууц үг буруу байна".to_string(),
        ));
    }

    let person = match user.person_id {
        Some(person_id) => domain_hr::person::Entity::find_by_id(person_id)
            .one(&state.db)
            .await?,
        None => None,
    };

    let (first_name, last_name, mobile_number) = match person {
        Some(person) => (
            person.first_name,
            person.last_name,
            person.mobile_number.unwrap_or_default(),
        ),
        None => Default::default(),
    };

    let token_user = TokenUser {
        username: user.username,
        first_name,
        last_name,
        mobile_number,
        is_active: user.is_active,
    };

    let pair = state
        .keys
        .issue_pair(&token_user)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Envelope::ok(pair))
}

/// Accounts past their `end_date` (or deactivated) do not match, so an
/// expired account fails login even with the correct password.
fn active_staff_query(
    username: &str,
    now: chrono::DateTime<Utc>,
) -> sea_orm::Select<system_user::Entity> {
    system_user::Entity::find()
        .filter(system_user::Column::PersonType.eq(PERSON_TYPE_STAFF))
        .filter(system_user::Column::Username.eq(username))
        .filter(system_user::Column::IsActive.eq(true))
        .filter(system_user::Column::EndDate.gte(now))
}

/// Create the initial admin person and account. Exposed unauthenticated so a
/// fresh install can be seeded; the unique username index makes a second call
/// fail instead of stacking admins.
async fn admin(State(state): State<AuthState>) -> ApiResult<system_user::Model> {
    let hash =
        password::hash_password(ADMIN_PASSWORD).map_err(|e| ApiError::Internal(e.to_string()))?;

    let person = domain_hr::person::ActiveModel {
        last_name: Set("Erdenebat".to_string()),
        first_name: Set("Darkhanbayar".to_string()),
        state_reg_number: Set(Some("TA97072630".to_string())),
        mobile_number: Set(Some("88878150".to_string())),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    let now = Utc::now();
    let user = system_user::ActiveModel {
        username: Set(ADMIN_USERNAME.to_string()),
        password_hash: Set(hash),
        is_active: Set(true),
        start_date: Set(Some(now.into())),
        end_date: Set(Some((now + Duration::hours(ADMIN_ACCOUNT_VALID_HOURS)).into())),
        person_id: Set(Some(person.id)),
        person_type: Set(Some(PERSON_TYPE_STAFF)),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok(Envelope::ok(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn login_lookup_requires_an_unexpired_active_staff_account() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let sql = active_staff_query("admin", now)
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.contains("\"person_type\" = 1"));
        assert!(sql.contains("\"username\" = 'admin'"));
        assert!(sql.contains("\"is_active\" = TRUE"));
        assert!(sql.contains("\"end_date\" >="));
    }

    #[test]
    fn login_params_require_both_fields() {
        let params = LoginParams {
            username: "admin".to_string(),
            password: String::new(),
        };
        assert!(params.validate().is_err());

        let params = LoginParams {
            username: "admin".to_string(),
            password: "Mongol123@".to_string(),
        };
        assert!(params.validate().is_ok());
    }
}
