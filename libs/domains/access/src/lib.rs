//! Staff access control: system users, roles, permissions, login and the
//! bearer-token middleware.

pub mod auth;
pub mod middleware;
pub mod password;
pub mod permission;
pub mod role;
pub mod system_user;

use axum_helpers::TokenKeys;
use sea_orm::DatabaseConnection;

/// Shared state of the auth endpoints and the middleware.
#[derive(Clone)]
pub struct AuthState {
    pub db: DatabaseConnection,
    pub keys: TokenKeys,
}
