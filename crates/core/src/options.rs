//! Validator behavior switches.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What to do with a length-annotated field whose type is not string-like.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NonStringPolicy {
    /// Report the field as violating its annotation.
    #[default]
    Fail,
    /// Leave the field out of validation.
    Skip,
}

impl NonStringPolicy {
    /// Parse a policy name (case-insensitive, surrounding whitespace ignored).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "fail" => Some(Self::Fail),
            "skip" => Some(Self::Skip),
            _ => None,
        }
    }

    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fail => "fail",
            Self::Skip => "skip",
        }
    }
}

impl fmt::Display for NonStringPolicy {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Unit used to measure string length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    /// UTF-8 bytes (`str::len`).
    #[default]
    Bytes,
    /// Unicode scalar values (`str::chars().count()`).
    Chars,
}

impl LengthUnit {
    /// Parse a unit name (case-insensitive, surrounding whitespace ignored).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "bytes" => Some(Self::Bytes),
            "chars" => Some(Self::Chars),
            _ => None,
        }
    }

    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bytes => "bytes",
            Self::Chars => "chars",
        }
    }

    /// Measure `value` in this unit.
    #[must_use]
    pub fn measure(self, value: &str) -> usize {
        match self {
            Self::Bytes => value.len(),
            Self::Chars => value.chars().count(),
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Options consumed by [`crate::Validator`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ValidatorOptions {
    /// Handling of non-string fields that carry an annotation.
    pub non_string_policy: NonStringPolicy,
    /// Length unit for string fields.
    pub length_unit: LengthUnit,
}

impl ValidatorOptions {
    /// Replace the non-string policy.
    #[must_use]
    pub const fn with_non_string_policy(mut self, policy: NonStringPolicy) -> Self {
        self.non_string_policy = policy;
        self
    }

    /// Replace the length unit.
    #[must_use]
    pub const fn with_length_unit(mut self, unit: LengthUnit) -> Self {
        self.length_unit = unit;
        self
    }
}
