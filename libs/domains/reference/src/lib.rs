//! Reference data: geography, address and payment terms, statuses and
//! currencies.
//!
//! Every module follows the same surface: `POST /list` with filter and sort,
//! `GET /list/active`, `GET /get/{id}`, `POST /` to create, `PUT /{id}` to
//! update and `DELETE /` with a list of ids. The routers share a
//! `DatabaseConnection` state and expect the authentication middleware to
//! attach an [`axum_helpers::AuthUser`] extension for audit columns.

pub mod address_type;
pub mod city;
pub mod country;
pub mod district;
pub mod payment_method;
pub mod payment_type;
pub mod status;
pub mod status_type;
pub mod street;
pub mod valute;
