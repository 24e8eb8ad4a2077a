//! # fieldlen-shared
//!
//! Shared result and error envelope types for the fieldlen workspace.
//!
//! Every crate maps its domain errors into [`ErrorEnvelope`] so callers get
//! one structured shape (kind, stable code, message, metadata) regardless of
//! which layer failed.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod errors;
pub mod result;

pub use errors::{ErrorCode, ErrorEnvelope, ErrorKind, ErrorMetadata};
pub use result::{Result, ResultExt};

/// Returns the shared crate version.
#[must_use]
pub const fn shared_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::errors::{ErrorCode, ErrorEnvelope, ErrorKind};
    use super::result::{Result, ResultExt};

    #[test]
    fn shared_error_types_are_available() {
        let error = ErrorEnvelope::expected(ErrorCode::invalid_fields(), "invalid");
        assert_eq!(error.kind, ErrorKind::Expected);
    }

    #[test]
    fn shared_result_type_is_available() {
        let value: std::result::Result<i32, ErrorEnvelope> = Err(ErrorEnvelope::expected(
            ErrorCode::not_a_struct(),
            "not a struct",
        ));
        let lifted: Result<i32> = value.with_context("type_name", "u64");
        assert!(lifted.is_err_and(|error| error.metadata.contains_key("type_name")));
    }

    #[test]
    fn shared_crate_version_is_set() {
        assert!(!super::shared_crate_version().is_empty());
    }
}
