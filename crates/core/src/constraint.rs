//! Annotation parsing and constraint kinds.
//!
//! Annotation grammar:
//!
//! ```text
//! <annotation>  ::= <kind> ":" <arg1> "," <arg2>
//! <kind>        ::= "len"
//! <arg1>,<arg2> ::= signed base-10 integer literal
//! ```
//!
//! The separator and argument count are checked before the kind is looked
//! up, so `foo:1` fails on its arguments rather than on its kind.

use crate::options::LengthUnit;
use std::collections::BTreeMap;
use std::fmt;

/// Keyword of the length constraint.
pub const LENGTH_KIND: &str = "len";

/// Message shared by every annotation syntax failure.
pub const INVALID_SYNTAX_MESSAGE: &str = "invalid validator syntax";

/// A parsed, executable string rule.
pub trait StrConstraint: fmt::Debug + Send + Sync {
    /// Keyword the constraint was parsed from.
    fn kind(&self) -> &'static str;

    /// Returns true when `value` satisfies the rule.
    fn check(&self, value: &str, unit: LengthUnit) -> bool;
}

/// Half-open length interval `[min, max)`.
///
/// No ordering is enforced: with `min >= max` every string is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LengthConstraint {
    min: i64,
    max: i64,
}

impl LengthConstraint {
    /// Build a constraint from raw bounds.
    #[must_use]
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Inclusive lower bound.
    #[must_use]
    pub const fn min(&self) -> i64 {
        self.min
    }

    /// Exclusive upper bound.
    #[must_use]
    pub const fn max(&self) -> i64 {
        self.max
    }

    /// Returns true when `len` lies in `[min, max)`.
    #[must_use]
    pub fn contains_len(&self, len: usize) -> bool {
        // A length past i64::MAX is past every representable upper bound.
        let Ok(len) = i64::try_from(len) else {
            return false;
        };
        self.min <= len && len < self.max
    }
}

impl StrConstraint for LengthConstraint {
    fn kind(&self) -> &'static str {
        LENGTH_KIND
    }

    fn check(&self, value: &str, unit: LengthUnit) -> bool {
        self.contains_len(unit.measure(value))
    }
}

/// Why an annotation was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxErrorReason {
    /// Splitting on `:` did not yield exactly two parts.
    SeparatorCount {
        /// Number of parts found.
        parts: usize,
    },
    /// Splitting the arguments on `,` did not yield exactly two parts.
    ArgumentCount {
        /// Number of arguments found.
        args: usize,
    },
    /// The kind keyword is not registered.
    UnknownKind {
        /// Keyword found.
        kind: String,
    },
    /// An argument is not a base-10 integer.
    InvalidInteger {
        /// Offending argument text.
        arg: String,
    },
}

impl fmt::Display for SyntaxErrorReason {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SeparatorCount { parts } => {
                write!(formatter, "expected `<kind>:<args>`, found {parts} part(s)")
            },
            Self::ArgumentCount { args } => {
                write!(formatter, "expected 2 arguments, found {args}")
            },
            Self::UnknownKind { kind } => write!(formatter, "unknown validator kind `{kind}`"),
            Self::InvalidInteger { arg } => write!(formatter, "`{arg}` is not an integer"),
        }
    }
}

/// Annotation text could not be turned into a constraint.
///
/// Displays as the fixed [`INVALID_SYNTAX_MESSAGE`]; the specifics are
/// available through [`SyntaxError::reason`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    annotation: String,
    reason: SyntaxErrorReason,
}

impl SyntaxError {
    /// Build a syntax error for `annotation`.
    pub fn new(annotation: impl Into<String>, reason: SyntaxErrorReason) -> Self {
        Self {
            annotation: annotation.into(),
            reason,
        }
    }

    /// The rejected annotation text.
    #[must_use]
    pub fn annotation(&self) -> &str {
        &self.annotation
    }

    /// Why it was rejected.
    #[must_use]
    pub const fn reason(&self) -> &SyntaxErrorReason {
        &self.reason
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(INVALID_SYNTAX_MESSAGE)
    }
}

impl std::error::Error for SyntaxError {}

/// The two raw arguments of an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstraintArgs<'a> {
    /// Text before the comma.
    pub first: &'a str,
    /// Text after the comma.
    pub second: &'a str,
}

impl ConstraintArgs<'_> {
    /// Parse both arguments as strict base-10 `i64`s.
    pub fn integers(&self) -> Result<(i64, i64), SyntaxErrorReason> {
        Ok((parse_int(self.first)?, parse_int(self.second)?))
    }
}

fn parse_int(raw: &str) -> Result<i64, SyntaxErrorReason> {
    raw.parse::<i64>()
        .map_err(|_| SyntaxErrorReason::InvalidInteger {
            arg: raw.to_owned(),
        })
}

/// Builds a constraint of one kind from its arguments.
pub type ConstraintBuilder =
    fn(ConstraintArgs<'_>) -> Result<Box<dyn StrConstraint>, SyntaxErrorReason>;

fn length_from_args(args: ConstraintArgs<'_>) -> Result<LengthConstraint, SyntaxErrorReason> {
    let (min, max) = args.integers()?;
    Ok(LengthConstraint::new(min, max))
}

fn build_length(args: ConstraintArgs<'_>) -> Result<Box<dyn StrConstraint>, SyntaxErrorReason> {
    length_from_args(args).map(|constraint| Box::new(constraint) as Box<dyn StrConstraint>)
}

/// Constraint kinds keyed by keyword.
///
/// [`ConstraintRegistry::default`] knows only `len`.
#[derive(Clone)]
pub struct ConstraintRegistry {
    builders: BTreeMap<&'static str, ConstraintBuilder>,
}

impl ConstraintRegistry {
    /// A registry with no kinds.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            builders: BTreeMap::new(),
        }
    }

    /// Register `builder` for `kind`, returning the builder it replaced.
    pub fn register(
        &mut self,
        kind: &'static str,
        builder: ConstraintBuilder,
    ) -> Option<ConstraintBuilder> {
        self.builders.insert(kind, builder)
    }

    /// Returns true when `kind` is registered.
    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.builders.contains_key(kind)
    }

    /// Registered keywords in sorted order.
    pub fn kinds(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.builders.keys().copied()
    }

    /// Parse `annotation` into a constraint.
    pub fn parse(&self, annotation: &str) -> Result<Box<dyn StrConstraint>, SyntaxError> {
        dispatch(annotation, |kind| self.builders.get(kind).copied())
    }
}

/// Split `annotation`, resolve its kind with `lookup`, and run the builder.
fn dispatch<T, B>(
    annotation: &str,
    lookup: impl FnOnce(&str) -> Option<B>,
) -> Result<T, SyntaxError>
where
    B: FnOnce(ConstraintArgs<'_>) -> Result<T, SyntaxErrorReason>,
{
    let (kind, args) = split_annotation(annotation)?;
    let Some(builder) = lookup(kind) else {
        return Err(SyntaxError::new(
            annotation,
            SyntaxErrorReason::UnknownKind {
                kind: kind.to_owned(),
            },
        ));
    };
    builder(args).map_err(|reason| SyntaxError::new(annotation, reason))
}

fn split_annotation(annotation: &str) -> Result<(&str, ConstraintArgs<'_>), SyntaxError> {
    let parts: Vec<&str> = annotation.split(':').collect();
    let [kind, args] = parts.as_slice() else {
        return Err(SyntaxError::new(
            annotation,
            SyntaxErrorReason::SeparatorCount { parts: parts.len() },
        ));
    };

    let args: Vec<&str> = args.split(',').collect();
    let [first, second] = args.as_slice() else {
        return Err(SyntaxError::new(
            annotation,
            SyntaxErrorReason::ArgumentCount { args: args.len() },
        ));
    };

    Ok((
        *kind,
        ConstraintArgs {
            first: *first,
            second: *second,
        },
    ))
}

impl Default for ConstraintRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(LENGTH_KIND, build_length);
        registry
    }
}

impl fmt::Debug for ConstraintRegistry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ConstraintRegistry")
            .field("kinds", &self.builders.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Parse `annotation` with the default registry.
pub fn parse(annotation: &str) -> Result<Box<dyn StrConstraint>, SyntaxError> {
    ConstraintRegistry::default().parse(annotation)
}

/// Parse a `len:<min>,<max>` annotation into its typed form.
pub fn parse_length(annotation: &str) -> Result<LengthConstraint, SyntaxError> {
    dispatch(annotation, |kind| (kind == LENGTH_KIND).then_some(length_from_args))
}
