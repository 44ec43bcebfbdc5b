//! Staff directory: persons, departments and the position hierarchy.

pub mod department;
pub mod person;
pub mod position;
pub mod position_key;
pub mod position_type;
