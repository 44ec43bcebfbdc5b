//! PostgreSQL connection handling for the back office.
//!
//! Provides pooled connections via SeaORM, startup retry with exponential
//! backoff, and migration running.
//!
//! ```ignore
//! use database::postgres;
//! use migration::Migrator;
//!
//! let db = postgres::connect_with_retry(&config.url, None).await?;
//! postgres::run_migrations::<Migrator>(&db, "backoffice_api").await?;
//! ```

pub mod common;
pub mod postgres;

pub use common::{DatabaseError, DatabaseResult, RetryConfig};
