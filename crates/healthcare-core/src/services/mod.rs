//! Business logic layer.
//!
//! Services borrow the open [`Database`](crate::db::Database), apply the
//! ownership rules for their record kind and translate store outcomes into
//! [`Error`](crate::error::Error) kinds.

mod doctors;
mod patients;
mod relationships;

pub use doctors::{DoctorCatalog, DEFAULT_SEARCH_LIMIT};
pub use patients::PatientService;
pub use relationships::RelationshipManager;
