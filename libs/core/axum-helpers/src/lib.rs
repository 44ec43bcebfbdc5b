//! Shared axum building blocks: the legacy response envelope, table search
//! scopes and JWT token handling.

pub mod auth;
pub mod envelope;
pub mod search;

pub use auth::{bearer_token, AuthError, AuthUser, Claims, TokenKeys, TokenPair, TokenUser};
pub use envelope::{ApiError, ApiResult, Envelope, ListBody, Success};
pub use search::{
    page_window, paginate, table_search, Comparison, DeleteParams, FieldFilter, ListParams,
    SortColumn, TableSearch,
};
