//! Bearer-token middleware.
//!
//! The only place in the API that answers with a real HTTP 401; everything
//! behind it reports errors inside a 200 envelope. The account is re-read on
//! every request so a deactivated user is locked out immediately, not when
//! their token expires.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_helpers::{bearer_token, AuthUser, Envelope};
use sea_orm::{ColumnTrait, DbErr, EntityTrait, QueryFilter};

use crate::system_user;
use crate::AuthState;

pub async fn authenticate(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    match resolve_user(&state, request.headers()).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(message) => {
            tracing::info!("unauthorized request: {message}");
            (
                StatusCode::UNAUTHORIZED,
                Json(Envelope::<serde_json::Value>::error(401, message)),
            )
                .into_response()
        }
    }
}

async fn resolve_user(state: &AuthState, headers: &HeaderMap) -> Result<AuthUser, String> {
    let token = bearer_token(headers).map_err(|e| e.to_string())?;
    let claims = state.keys.verify_access(token).map_err(|e| e.to_string())?;

    let user = system_user::Entity::find()
        .filter(system_user::Column::Username.eq(claims.username.as_str()))
        .one(&state.db)
        .await
        .map_err(|e: DbErr| e.to_string())?
        .ok_or_else(|| "Хэрэглэгч олдсонгүй".to_string())?;

    if !user.is_active {
        return Err("Хэрэглэгч идэвхгүй байна".to_string());
    }

    Ok(AuthUser {
        id: user.id,
        username: user.username,
        first_name: claims.first_name,
        last_name: claims.last_name,
        mobile_number: claims.mobile_number,
        is_active: user.is_active,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;
    use axum_helpers::{TokenKeys, TokenUser};
    use core_config::jwt::JwtConfig;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn keys() -> TokenKeys {
        TokenKeys::new(&JwtConfig::new(
            "access-secret-access-secret-access-secret",
            "refresh-secret-refresh-secret-refresh-secret",
        ))
    }

    fn stored_user(is_active: bool) -> system_user::Model {
        system_user::Model {
            id: 7,
            username: "admin".to_string(),
            password_hash: "hash".to_string(),
            password_salt: None,
            is_active,
            start_date: None,
            end_date: None,
            person_id: Some(1),
            person_type: Some(1),
            created_at: chrono::Utc::now().into(),
            updated_at: chrono::Utc::now().into(),
            created_user_id: None,
            modified_user_id: None,
        }
    }

    fn token_for(keys: &TokenKeys) -> String {
        keys.issue_pair(&TokenUser {
            username: "admin".to_string(),
            first_name: "Бат".to_string(),
            last_name: "Дорж".to_string(),
            mobile_number: "99112233".to_string(),
            is_active: true,
        })
        .unwrap()
        .token
    }

    fn bearer_headers(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn valid_token_resolves_fresh_user() {
        let keys = keys();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored_user(true)]])
            .into_connection();
        let state = AuthState { db, keys };

        let token = token_for(&state.keys);
        let user = resolve_user(&state, &bearer_headers(&token)).await.unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.username, "admin");
        assert_eq!(user.first_name, "Бат");
    }

    #[tokio::test]
    async fn unknown_user_is_rejected_even_with_valid_token() {
        let keys = keys();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<system_user::Model>::new()])
            .into_connection();
        let state = AuthState { db, keys };

        let token = token_for(&state.keys);
        let result = resolve_user(&state, &bearer_headers(&token)).await;
        assert_eq!(result.unwrap_err(), "Хэрэглэгч олдсонгүй");
    }

    #[tokio::test]
    async fn deactivated_user_is_rejected() {
        let keys = keys();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored_user(false)]])
            .into_connection();
        let state = AuthState { db, keys };

        let token = token_for(&state.keys);
        let result = resolve_user(&state, &bearer_headers(&token)).await;
        assert_eq!(result.unwrap_err(), "Хэрэглэгч идэвхгүй байна");
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        let state = AuthState {
            db: MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            keys: keys(),
        };
        assert!(resolve_user(&state, &HeaderMap::new()).await.is_err());
    }
}
