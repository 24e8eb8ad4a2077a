//! Record validation.

use crate::constraint::ConstraintRegistry;
use crate::errors::{ErrorAccumulator, FieldErrorKind, ValidateError, ValidationError};
use crate::options::{NonStringPolicy, ValidatorOptions};
use crate::record::{FieldDescriptor, FieldValue, Inspect, Shape};

/// Validates annotated fields of a record.
///
/// Holds no per-call state; one instance can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    options: ValidatorOptions,
    registry: ConstraintRegistry,
}

impl Validator {
    /// A validator with default options and the `len` kind.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A validator with the given options and the `len` kind.
    #[must_use]
    pub fn with_options(options: ValidatorOptions) -> Self {
        Self {
            options,
            registry: ConstraintRegistry::default(),
        }
    }

    /// Replace the constraint registry.
    #[must_use]
    pub fn with_registry(mut self, registry: ConstraintRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Active options.
    #[must_use]
    pub const fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    /// Active constraint registry.
    #[must_use]
    pub const fn registry(&self) -> &ConstraintRegistry {
        &self.registry
    }

    /// Validate every annotated field of `value`.
    ///
    /// Fails with [`ValidateError::NotAStruct`] before looking at any field
    /// when `value` is not a struct. Otherwise every failing field is
    /// reported, in declaration order.
    pub fn validate<T: Inspect + ?Sized>(&self, value: &T) -> Result<(), ValidateError> {
        let record = match value.shape() {
            Shape::Struct(record) => record,
            other => {
                tracing::debug!(
                    type_name = other.type_name(),
                    kind = %other.kind(),
                    "refusing to validate a non-struct value"
                );
                return Err(ValidateError::NotAStruct {
                    type_name: other.type_name(),
                    kind: other.kind(),
                });
            },
        };

        let mut errors = ErrorAccumulator::new();
        for field in &record.fields {
            tracing::trace!(record = record.type_name, field = field.name, "visiting field");
            if let Some(error) = self.check_field(field) {
                tracing::debug!(
                    record = record.type_name,
                    field = field.name,
                    error = %error,
                    "field failed validation"
                );
                errors.push(error);
            }
        }

        let outcome = errors.finish();
        tracing::debug!(
            record = record.type_name,
            fields = record.fields.len(),
            failures = outcome.as_ref().map_or(0, |errors| errors.len()),
            "validated record"
        );
        outcome.map_or(Ok(()), |errors| Err(ValidateError::Invalid(errors)))
    }

    fn check_field(&self, field: &FieldDescriptor<'_>) -> Option<ValidationError> {
        let annotation = field.active_annotation()?;

        if !field.is_readable() {
            return Some(ValidationError::new(field.name, FieldErrorKind::Unexported));
        }

        let constraint = match self.registry.parse(annotation) {
            Ok(constraint) => constraint,
            Err(error) => {
                return Some(ValidationError::new(
                    field.name,
                    FieldErrorKind::Syntax(error),
                ));
            },
        };

        let (valid, length) = match field.value {
            FieldValue::Str(value) => (
                constraint.check(value, self.options.length_unit),
                Some(self.options.length_unit.measure(value)),
            ),
            FieldValue::Other | FieldValue::Unreadable => match self.options.non_string_policy {
                NonStringPolicy::Fail => (false, None),
                NonStringPolicy::Skip => {
                    tracing::debug!(
                        field = field.name,
                        type_name = field.type_name,
                        "skipping non-string field"
                    );
                    return None;
                },
            },
        };

        (!valid).then(|| {
            ValidationError::new(
                field.name,
                FieldErrorKind::OutOfBounds { annotation, length },
            )
        })
    }
}

/// Validate `value` with default options.
pub fn validate<T: Inspect + ?Sized>(value: &T) -> Result<(), ValidateError> {
    Validator::default().validate(value)
}

/// Method-call form of [`validate`], available on every [`Inspect`] type.
pub trait Validate {
    /// Validate with default options.
    fn validate(&self) -> Result<(), ValidateError>;
}

impl<T: Inspect + ?Sized> Validate for T {
    fn validate(&self) -> Result<(), ValidateError> {
        validate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::LengthUnit;
    use crate::record::{RecordView, ShapeKind, Visibility};

    /// Hand-built field table, so these tests do not depend on the derive.
    struct Table(Vec<FieldDescriptor<'static>>);

    impl Inspect for Table {
        fn shape(&self) -> Shape<'_> {
            Shape::Struct(RecordView::new("Table", self.0.clone()))
        }
    }

    fn string_field(
        name: &'static str,
        annotation: Option<&'static str>,
        value: &'static str,
    ) -> FieldDescriptor<'static> {
        FieldDescriptor {
            name,
            type_name: "alloc::string::String",
            visibility: Visibility::Public,
            annotation,
            value: FieldValue::Str(value),
        }
    }

    fn errors_of(result: Result<(), ValidateError>) -> Vec<ValidationError> {
        result
            .err()
            .and_then(ValidateError::into_errors)
            .map(crate::ValidationErrors::into_vec)
            .unwrap_or_default()
    }

    #[test]
    fn unannotated_fields_are_ignored() {
        let table = Table(vec![
            string_field("a", None, "anything at all"),
            string_field("b", Some(""), "anything at all"),
        ]);
        assert_eq!(validate(&table), Ok(()));
    }

    #[test]
    fn bounds_are_half_open() {
        let ok = Table(vec![
            string_field("lower", Some("len:0,10"), ""),
            string_field("inside", Some("len:0,10"), "123"),
            string_field("below_max", Some("len:0,10"), "123456789"),
        ]);
        assert_eq!(validate(&ok), Ok(()));

        let at_max = Table(vec![string_field("f", Some("len:0,10"), "1234567890")]);
        let errors = errors_of(validate(&at_max));
        assert_eq!(errors.len(), 1);
        assert!(errors.iter().all(ValidationError::is_out_of_bounds));

        let below_min = Table(vec![string_field("f", Some("len:3,10"), "ab")]);
        assert_eq!(errors_of(validate(&below_min)).len(), 1);
    }

    #[test]
    fn private_annotated_field_is_reported_without_parsing() {
        let table = Table(vec![FieldDescriptor {
            name: "hidden",
            type_name: "alloc::string::String",
            visibility: Visibility::Private,
            annotation: Some("not even close"),
            value: FieldValue::Unreadable,
        }]);
        let errors = errors_of(validate(&table));
        assert_eq!(errors.len(), 1);
        assert!(errors.iter().all(ValidationError::is_unexported));
    }

    #[test]
    fn private_unannotated_field_is_ignored() {
        let table = Table(vec![FieldDescriptor {
            name: "hidden",
            type_name: "u8",
            visibility: Visibility::Private,
            annotation: None,
            value: FieldValue::Unreadable,
        }]);
        assert_eq!(validate(&table), Ok(()));
    }

    #[test]
    fn non_string_field_fails_by_default() {
        let table = Table(vec![FieldDescriptor {
            name: "count",
            type_name: "u32",
            visibility: Visibility::Public,
            annotation: Some("len:0,10"),
            value: FieldValue::Other,
        }]);
        let errors = errors_of(validate(&table));
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.first().map(ValidationError::kind),
            Some(&FieldErrorKind::OutOfBounds {
                annotation: "len:0,10",
                length: None,
            })
        );
    }

    #[test]
    fn non_string_field_is_skipped_when_configured() {
        let table = Table(vec![FieldDescriptor {
            name: "count",
            type_name: "u32",
            visibility: Visibility::Public,
            annotation: Some("len:0,10"),
            value: FieldValue::Other,
        }]);
        let validator = Validator::with_options(
            ValidatorOptions::default().with_non_string_policy(NonStringPolicy::Skip),
        );
        assert_eq!(validator.validate(&table), Ok(()));
    }

    #[test]
    fn skip_policy_still_reports_syntax_errors() {
        let table = Table(vec![FieldDescriptor {
            name: "count",
            type_name: "u32",
            visibility: Visibility::Public,
            annotation: Some("len:x,1"),
            value: FieldValue::Other,
        }]);
        let validator = Validator::with_options(
            ValidatorOptions::default().with_non_string_policy(NonStringPolicy::Skip),
        );
        let errors = errors_of(validator.validate(&table));
        assert!(errors.iter().all(ValidationError::is_syntax));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn chars_unit_counts_scalar_values() {
        let table = Table(vec![string_field("name", Some("len:0,4"), "héé")]);
        assert_eq!(errors_of(validate(&table)).len(), 1);

        let validator = Validator::with_options(
            ValidatorOptions::default().with_length_unit(LengthUnit::Chars),
        );
        assert_eq!(validator.validate(&table), Ok(()));
    }

    #[test]
    fn non_struct_input_short_circuits() {
        let result = validate(&42_i32);
        assert!(matches!(
            result,
            Err(ValidateError::NotAStruct {
                kind: ShapeKind::Scalar,
                ..
            })
        ));

        let result = validate("plain text");
        assert!(result.as_ref().err().is_some_and(ValidateError::is_not_a_struct));

        let result = validate(&vec![Table(Vec::new())]);
        assert!(matches!(
            result,
            Err(ValidateError::NotAStruct {
                kind: ShapeKind::Sequence,
                ..
            })
        ));
    }

    #[test]
    fn failures_keep_declaration_order() {
        let table = Table(vec![
            string_field("first", Some("len:0,1"), "xx"),
            string_field("fine", Some("len:0,5"), "xx"),
            string_field("second", Some("len:1"), "xx"),
            FieldDescriptor {
                name: "third",
                type_name: "alloc::string::String",
                visibility: Visibility::Private,
                annotation: Some("len:0,1"),
                value: FieldValue::Unreadable,
            },
        ]);
        let result = validate(&table);
        let rendered = result.as_ref().err().map(ToString::to_string);
        assert_eq!(
            rendered.as_deref(),
            Some(
                "field first: 'len:0,1' invalidation\n\
                 invalid validator syntax\n\
                 validation for unexported field is not allowed"
            )
        );
        assert_eq!(
            errors_of(result)
                .iter()
                .map(ValidationError::field)
                .collect::<Vec<_>>(),
            vec!["first", "second", "third"]
        );
    }

    #[test]
    fn custom_registry_replaces_kinds() {
        let table = Table(vec![string_field("f", Some("len:0,10"), "abc")]);
        let validator = Validator::new().with_registry(ConstraintRegistry::empty());
        let errors = errors_of(validator.validate(&table));
        assert!(errors.iter().all(ValidationError::is_syntax));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn validate_trait_matches_free_function() {
        let table = Table(vec![string_field("f", Some("len:0,2"), "abc")]);
        assert_eq!(Validate::validate(&table), validate(&table));
        assert_eq!(table.validate(), table.validate());
    }
}
