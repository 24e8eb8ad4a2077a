//! Validation outcomes: per-field errors, the collection, and the top-level error.

use crate::constraint::SyntaxError;
use crate::record::ShapeKind;
use fieldlen_shared::{ErrorCode, ErrorEnvelope};
use std::fmt;

/// Message for a non-struct input.
pub const NOT_A_STRUCT_MESSAGE: &str = "wrong argument given, should be a struct";

/// Message for an annotated field whose value cannot be read.
pub const UNEXPORTED_FIELD_MESSAGE: &str = "validation for unexported field is not allowed";

/// Cause of a single field failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldErrorKind {
    /// The field carries an annotation but is not public.
    Unexported,
    /// The annotation could not be parsed.
    Syntax(SyntaxError),
    /// The value does not satisfy the annotation.
    OutOfBounds {
        /// Raw annotation text.
        annotation: &'static str,
        /// Measured length, or `None` for a non-string field.
        length: Option<usize>,
    },
}

/// Failure of one field. Displays as its cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    field: &'static str,
    kind: FieldErrorKind,
}

impl ValidationError {
    /// Build a field error.
    #[must_use]
    pub const fn new(field: &'static str, kind: FieldErrorKind) -> Self {
        Self { field, kind }
    }

    /// Name of the failing field.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        self.field
    }

    /// Cause of the failure.
    #[must_use]
    pub const fn kind(&self) -> &FieldErrorKind {
        &self.kind
    }

    /// Returns true for an unreadable-field failure.
    #[must_use]
    pub const fn is_unexported(&self) -> bool {
        matches!(self.kind, FieldErrorKind::Unexported)
    }

    /// Returns true for an annotation syntax failure.
    #[must_use]
    pub const fn is_syntax(&self) -> bool {
        matches!(self.kind, FieldErrorKind::Syntax(_))
    }

    /// Returns true for a bound violation.
    #[must_use]
    pub const fn is_out_of_bounds(&self) -> bool {
        matches!(self.kind, FieldErrorKind::OutOfBounds { .. })
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FieldErrorKind::Unexported => formatter.write_str(UNEXPORTED_FIELD_MESSAGE),
            FieldErrorKind::Syntax(error) => fmt::Display::fmt(error, formatter),
            FieldErrorKind::OutOfBounds { annotation, .. } => {
                write!(formatter, "field {}: '{annotation}' invalidation", self.field)
            },
        }
    }
}

impl std::error::Error for ValidationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            FieldErrorKind::Syntax(error) => Some(error),
            FieldErrorKind::Unexported | FieldErrorKind::OutOfBounds { .. } => None,
        }
    }
}

/// Non-empty, ordered field failures.
///
/// Only [`ErrorAccumulator::finish`] builds one, and only when something
/// was pushed, so holding a `ValidationErrors` always means failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Failures in field-declaration order.
    #[must_use]
    pub fn as_slice(&self) -> &[ValidationError] {
        &self.0
    }

    /// Iterate failures in field-declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    /// Names of failing fields in order.
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(ValidationError::field)
    }

    /// Consume into the underlying list.
    #[must_use]
    pub fn into_vec(self) -> Vec<ValidationError> {
        self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, error) in self.0.iter().enumerate() {
            if index > 0 {
                formatter.write_str("\n")?;
            }
            write!(formatter, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Collects field failures during one validation pass.
#[derive(Debug, Default)]
pub struct ErrorAccumulator(Vec<ValidationError>);

impl ErrorAccumulator {
    /// Start with no failures.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Record one failure.
    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    /// `None` when nothing failed.
    #[must_use]
    pub fn finish(self) -> Option<ValidationErrors> {
        if self.0.is_empty() {
            None
        } else {
            Some(ValidationErrors(self.0))
        }
    }
}

/// Outcome of a failed validation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidateError {
    /// The input is not a struct; no field was examined.
    NotAStruct {
        /// Inspected type name.
        type_name: &'static str,
        /// Structural category found instead.
        kind: ShapeKind,
    },
    /// One or more fields failed.
    Invalid(ValidationErrors),
}

impl ValidateError {
    /// Returns true for the structural failure.
    #[must_use]
    pub const fn is_not_a_struct(&self) -> bool {
        matches!(self, Self::NotAStruct { .. })
    }

    /// Field failures, when this is not the structural failure.
    #[must_use]
    pub const fn errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Invalid(errors) => Some(errors),
            Self::NotAStruct { .. } => None,
        }
    }

    /// Consume into the field failures.
    #[must_use]
    pub fn into_errors(self) -> Option<ValidationErrors> {
        match self {
            Self::Invalid(errors) => Some(errors),
            Self::NotAStruct { .. } => None,
        }
    }

    fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotAStruct { .. } => ErrorCode::not_a_struct(),
            Self::Invalid(_) => ErrorCode::invalid_fields(),
        }
    }
}

impl fmt::Display for ValidateError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAStruct { .. } => formatter.write_str(NOT_A_STRUCT_MESSAGE),
            Self::Invalid(errors) => fmt::Display::fmt(errors, formatter),
        }
    }
}

impl std::error::Error for ValidateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Invalid(errors) => Some(errors),
            Self::NotAStruct { .. } => None,
        }
    }
}

impl From<ValidationErrors> for ValidateError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Invalid(errors)
    }
}

impl From<ValidateError> for ErrorEnvelope {
    fn from(error: ValidateError) -> Self {
        let code = error.error_code();
        let message = error.to_string();

        match error {
            ValidateError::NotAStruct { type_name, kind } => Self::invariant(code, message)
                .with_metadata("type_name", type_name)
                .with_metadata("kind", kind.to_string()),
            ValidateError::Invalid(errors) => {
                let fields = errors.fields().collect::<Vec<_>>().join(",");
                Self::expected(code, message)
                    .with_metadata("count", errors.len().to_string())
                    .with_metadata("fields", fields)
            },
        }
    }
}
