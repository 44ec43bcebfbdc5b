//! Route table of the back-office API.
//!
//! `/api/v1/auth` is the only surface reachable without a bearer token.
//! Everything else sits behind the authentication middleware, which attaches
//! the [`axum_helpers::AuthUser`] extension the handlers read for audit
//! columns.

use std::time::Duration;

use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::{Json, Router};
use domain_access::AuthState;
use domain_customers::CustomersState;
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub fn app(auth_state: AuthState, customers_state: CustomersState) -> Router {
    let db: DatabaseConnection = auth_state.db.clone();

    let protected = Router::new()
        .nest("/customer", domain_customers::router().with_state(customers_state))
        .nest(
            "/customerType",
            domain_customers::customer_type::router().with_state(db.clone()),
        )
        .nest(
            "/customerClassification",
            domain_customers::classification::router().with_state(db.clone()),
        )
        .nest("/person", domain_hr::person::router().with_state(db.clone()))
        .nest(
            "/department",
            domain_hr::department::router().with_state(db.clone()),
        )
        .nest("/position", domain_hr::position::router().with_state(db.clone()))
        .nest(
            "/positionType",
            domain_hr::position_type::router().with_state(db.clone()),
        )
        .nest(
            "/positionKey",
            domain_hr::position_key::router().with_state(db.clone()),
        )
        .nest(
            "/permission",
            domain_access::permission::router().with_state(db.clone()),
        )
        .nest("/role", domain_access::role::router().with_state(db.clone()))
        .nest(
            "/systemUser",
            domain_access::system_user::router().with_state(db.clone()),
        )
        .nest(
            "/country",
            domain_reference::country::router().with_state(db.clone()),
        )
        .nest("/city", domain_reference::city::router().with_state(db.clone()))
        .nest(
            "/district",
            domain_reference::district::router().with_state(db.clone()),
        )
        .nest(
            "/street",
            domain_reference::street::router().with_state(db.clone()),
        )
        .nest(
            "/addressType",
            domain_reference::address_type::router().with_state(db.clone()),
        )
        .nest(
            "/paymentType",
            domain_reference::payment_type::router().with_state(db.clone()),
        )
        .nest(
            "/paymentMethod",
            domain_reference::payment_method::router().with_state(db.clone()),
        )
        .nest(
            "/status",
            domain_reference::status::router().with_state(db.clone()),
        )
        .nest(
            "/statusType",
            domain_reference::status_type::router().with_state(db.clone()),
        )
        .nest("/valute", domain_reference::valute::router().with_state(db))
        .layer(from_fn_with_state(
            auth_state.clone(),
            domain_access::middleware::authenticate,
        ));

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1/auth", domain_access::auth::router().with_state(auth_state))
        .nest("/api/v1", protected)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(CorsLayer::permissive())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum_helpers::TokenKeys;
    use core_config::jwt::JwtConfig;
    use domain_customers::registry::RegistryClient;
    use object_storage::MemoryStorage;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let keys = TokenKeys::new(&JwtConfig::new(
            "access-secret-access-secret-access-secret",
            "refresh-secret-refresh-secret-refresh-secret",
        ));
        let auth_state = AuthState {
            db: db.clone(),
            keys,
        };
        let customers_state = CustomersState {
            db,
            storage: Arc::new(MemoryStorage::new()),
            registry: RegistryClient::new(),
        };
        app(auth_state, customers_state)
    }

    #[tokio::test]
    async fn protected_routes_reject_missing_tokens() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/customer/list/active")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn auth_routes_are_reachable_without_a_token() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/auth/login")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"username": "", "password": ""}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        // Business errors ride inside a 200 envelope; only the middleware 401s.
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_routes_fall_through_to_404() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/no-such-route")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
