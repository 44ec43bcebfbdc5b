use axum_helpers::ApiError;
use object_storage::StorageError;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CustomerError {
    /// Operator-facing validation message, reported before any write happens.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("account code '{0}' does not match the YYYYMM### scheme")]
    Code(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Database(#[from] DbErr),
}

pub type CustomerResult<T> = Result<T, CustomerError>;

impl From<CustomerError> for ApiError {
    fn from(err: CustomerError) -> Self {
        match err {
            CustomerError::Validation(msg) => ApiError::BadRequest(msg),
            CustomerError::NotFound(msg) => ApiError::NotFound(msg),
            CustomerError::Code(code) => {
                ApiError::Internal(format!("account code '{code}' is malformed"))
            }
            CustomerError::Storage(err) => ApiError::Internal(err.to_string()),
            CustomerError::Database(err) => ApiError::Database(err),
        }
    }
}

impl CustomerError {
    /// True when the database rejected a write over the unique account code
    /// index; registration retries once with a freshly allocated code.
    pub fn is_code_conflict(&self) -> bool {
        match self {
            CustomerError::Database(err) => matches!(
                err.sql_err(),
                Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
            ),
            _ => false,
        }
    }
}
