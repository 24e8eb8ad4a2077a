//! Environment variable parsing and env-to-options merging.
//!
//! Parsing is strict: a variable that is set must hold a known value.

use fieldlen_core::{LengthUnit, NonStringPolicy, ValidatorOptions};
use fieldlen_shared::{ErrorCode, ErrorEnvelope};
use std::collections::BTreeMap;
use std::fmt;

/// Env var: non-string field policy (`fail` | `skip`).
pub const ENV_NON_STRING_POLICY: &str = "FIELDLEN_NON_STRING_POLICY";
/// Env var: string length unit (`bytes` | `chars`).
pub const ENV_LENGTH_UNIT: &str = "FIELDLEN_LENGTH_UNIT";

/// Parsed env overrides; `None` means the variable was unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidatorEnv {
    /// Override for `nonStringPolicy`.
    pub non_string_policy: Option<NonStringPolicy>,
    /// Override for `lengthUnit`.
    pub length_unit: Option<LengthUnit>,
}

impl ValidatorEnv {
    /// Parse overrides from a name/value map.
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EnvParseError> {
        Ok(Self {
            non_string_policy: parse_optional_enum(
                map,
                ENV_NON_STRING_POLICY,
                NonStringPolicy::parse,
            )?,
            length_unit: parse_optional_enum(map, ENV_LENGTH_UNIT, LengthUnit::parse)?,
        })
    }

    /// Parse overrides from the process environment.
    pub fn from_std_env() -> Result<Self, EnvParseError> {
        let mut map = BTreeMap::new();
        for name in [ENV_NON_STRING_POLICY, ENV_LENGTH_UNIT] {
            if let Ok(value) = std::env::var(name) {
                map.insert(name.to_string(), value);
            }
        }

        Self::from_map(&map)
    }

    /// Returns true when no override is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.non_string_policy.is_none() && self.length_unit.is_none()
    }
}

/// Apply env overrides to base options (env wins over file/default values).
#[must_use]
pub fn apply_env_overrides(base: ValidatorOptions, env: &ValidatorEnv) -> ValidatorOptions {
    let mut options = base;
    if let Some(policy) = env.non_string_policy {
        tracing::debug!(env_var = ENV_NON_STRING_POLICY, value = %policy, "env override");
        options = options.with_non_string_policy(policy);
    }
    if let Some(unit) = env.length_unit {
        tracing::debug!(env_var = ENV_LENGTH_UNIT, value = %unit, "env override");
        options = options.with_length_unit(unit);
    }
    options
}

fn parse_optional_enum<T>(
    map: &BTreeMap<String, String>,
    var: &'static str,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }

    parse(raw).map(Some).ok_or_else(|| EnvParseError::InvalidEnum {
        var,
        value: raw.clone(),
    })
}

/// Env parsing failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvParseError {
    /// An env var was present but empty after trimming.
    EmptyValue {
        /// Env var name.
        var: &'static str,
    },
    /// Enum env var had an invalid value.
    InvalidEnum {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
}

impl EnvParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyValue { .. } => ErrorCode::new("config", "empty_env_var"),
            Self::InvalidEnum { .. } => ErrorCode::new("config", "invalid_env_enum"),
        }
    }
}

impl fmt::Display for EnvParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValue { var } => write!(formatter, "{var} must be non-empty"),
            Self::InvalidEnum { var, .. } => write!(formatter, "{var} has an unsupported value"),
        }
    }
}

impl std::error::Error for EnvParseError {}

impl From<EnvParseError> for ErrorEnvelope {
    fn from(error: EnvParseError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            EnvParseError::EmptyValue { var } => envelope.with_metadata("env_var", var),
            EnvParseError::InvalidEnum { var, value } => envelope
                .with_metadata("env_var", var)
                .with_metadata("value", value),
        }
    }
}
