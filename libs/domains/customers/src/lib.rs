//! Customer management: accounts, classifications and types, contacts and
//! addresses, uploaded documents and the status audit trail.
//!
//! The onboarding workflow is the one multi-step operation in the system.
//! It runs through [`service::CustomerService`] on top of a
//! [`repository::CustomerRepository`], so the branching rules are testable
//! without a database. Everything else is plain CRUD on a shared
//! `DatabaseConnection`, same as the reference and HR domains.

pub mod classification;
pub mod codes;
pub mod customer_type;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod registry;
pub mod repository;
pub mod service;

pub use error::{CustomerError, CustomerResult};
pub use handlers::{router, CustomersState};
