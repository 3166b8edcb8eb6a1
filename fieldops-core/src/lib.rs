//! fieldops-core: Shared domain layer for the fieldops client.

pub mod dates;
pub mod error;
pub mod models;
pub mod observability;

pub use error::{FieldOpsError, Result};
