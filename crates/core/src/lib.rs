//! # fieldlen-core
//!
//! Length validation for annotated struct fields.
//!
//! A struct opts in with `#[derive(Inspect)]`; each field may carry an
//! annotation such as `#[validate = "len:2,10"]`, meaning the string's
//! length must lie in `[2, 10)`. [`validate`] walks the fields in
//! declaration order and reports every offending field at once.
//!
//! ```
//! use fieldlen_core::{Inspect, ValidateError, validate};
//!
//! #[derive(Inspect)]
//! struct Signup {
//!     #[validate = "len:3,16"]
//!     pub username: String,
//!     #[validate = "len:0,64"]
//!     pub bio: String,
//! }
//!
//! let ok = Signup { username: "ada".into(), bio: String::new() };
//! assert!(validate(&ok).is_ok());
//!
//! let bad = Signup { username: "ab".into(), bio: String::new() };
//! let error = validate(&bad).err();
//! assert!(matches!(error, Some(ValidateError::Invalid(ref errors)) if errors.len() == 1));
//! ```
//!
//! ## Layout
//!
//! - [`record`] - the field table a record exposes ([`Inspect`], [`Shape`])
//! - [`constraint`] - annotation parsing and the kind registry
//! - [`errors`] - per-field errors and their non-empty collection
//! - [`options`] - behavior switches ([`ValidatorOptions`])
//! - [`validator`] - the validation pass

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

// Lets the derive's `::fieldlen_core::...` paths resolve inside this crate.
extern crate self as fieldlen_core;

pub mod constraint;
pub mod errors;
pub mod options;
pub mod record;
pub mod validator;

pub use constraint::{
    ConstraintArgs, ConstraintBuilder, ConstraintRegistry, INVALID_SYNTAX_MESSAGE, LENGTH_KIND,
    LengthConstraint, StrConstraint, SyntaxError, SyntaxErrorReason, parse, parse_length,
};
pub use errors::{
    ErrorAccumulator, FieldErrorKind, NOT_A_STRUCT_MESSAGE, UNEXPORTED_FIELD_MESSAGE,
    ValidateError, ValidationError, ValidationErrors,
};
pub use options::{LengthUnit, NonStringPolicy, ValidatorOptions};
pub use record::{FieldDescriptor, FieldValue, Inspect, RecordView, Shape, ShapeKind, Visibility};
pub use validator::{Validate, Validator, validate};

pub use fieldlen_validate_derive::Inspect;

/// Returns the core crate version.
#[must_use]
pub const fn core_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
