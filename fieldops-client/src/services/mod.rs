pub mod attachments;
pub mod collections;
pub mod deposits;
pub mod gateway;
pub mod identity;

use validator::ValidationError;

/// A field-level validation failure with a human-readable message.
pub(crate) fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}
