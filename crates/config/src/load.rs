//! Validator option loading (TOML/JSON + env) and deterministic serialization.

use crate::env::{ValidatorEnv, apply_env_overrides};
use fieldlen_core::ValidatorOptions;
use fieldlen_shared::{ErrorCode, ErrorEnvelope, ResultExt};
use std::path::Path;

/// Supported option file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.json` files (also used when the path has no extension).
    Json,
    /// `.toml` files.
    Toml,
}

/// Parse options from TOML. Missing keys keep their defaults.
pub fn parse_validator_options_toml(input: &str) -> Result<ValidatorOptions, ErrorEnvelope> {
    parse_options(input, ConfigFormat::Toml)
}

/// Parse options from JSON. Missing keys keep their defaults.
pub fn parse_validator_options_json(input: &str) -> Result<ValidatorOptions, ErrorEnvelope> {
    parse_options(input, ConfigFormat::Json)
}

/// Resolve options as defaults, then the optional TOML document, then env overrides.
pub fn load_validator_options(
    toml_input: Option<&str>,
    env: &ValidatorEnv,
) -> Result<ValidatorOptions, ErrorEnvelope> {
    let base = match toml_input {
        Some(input) => parse_validator_options_toml(input)?,
        None => ValidatorOptions::default(),
    };
    Ok(finish(base, env))
}

/// Resolve options from an optional file path (format chosen by extension) plus env overrides.
pub fn load_validator_options_from_path(
    path: Option<&Path>,
    env: &ValidatorEnv,
) -> Result<ValidatorOptions, ErrorEnvelope> {
    let base = match path {
        Some(path) => {
            let format = detect_config_format(path)?;
            let input = read_config_file(path)?;
            parse_options(&input, format).with_context("path", path.to_string_lossy())?
        },
        None => ValidatorOptions::default(),
    };
    Ok(finish(base, env))
}

/// Resolve options using the process environment for overrides.
pub fn load_validator_options_std_env(
    path: Option<&Path>,
) -> Result<ValidatorOptions, ErrorEnvelope> {
    let env = ValidatorEnv::from_std_env().into_envelope()?;
    load_validator_options_from_path(path, &env)
}

/// Serialize options as deterministic pretty JSON (with trailing newline).
pub fn to_pretty_json(options: &ValidatorOptions) -> Result<String, ErrorEnvelope> {
    let mut output = serde_json::to_string_pretty(options).map_err(|error| {
        ErrorEnvelope::invariant(
            ErrorCode::new("config", "serialize_json"),
            format!("failed to serialize options: {error}"),
        )
    })?;
    output.push('\n');
    Ok(output)
}

/// Serialize options as deterministic pretty TOML (with trailing newline).
pub fn to_pretty_toml(options: &ValidatorOptions) -> Result<String, ErrorEnvelope> {
    let mut output = toml::to_string_pretty(options).map_err(|error| {
        ErrorEnvelope::invariant(
            ErrorCode::new("config", "serialize_toml"),
            format!("failed to serialize options TOML: {error}"),
        )
    })?;
    output.push('\n');
    Ok(output)
}

fn finish(base: ValidatorOptions, env: &ValidatorEnv) -> ValidatorOptions {
    let options = apply_env_overrides(base, env);
    tracing::debug!(
        non_string_policy = %options.non_string_policy,
        length_unit = %options.length_unit,
        "validator options resolved"
    );
    options
}

fn parse_options(input: &str, format: ConfigFormat) -> Result<ValidatorOptions, ErrorEnvelope> {
    match format {
        ConfigFormat::Json => serde_json::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_json"),
                format!("invalid config JSON: {error}"),
            )
            .with_metadata("source", "config")
        }),
        ConfigFormat::Toml => toml::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_toml"),
                format!("invalid config TOML: {error}"),
            )
            .with_metadata("source", "config")
        }),
    }
}

fn read_config_file(path: &Path) -> Result<String, ErrorEnvelope> {
    std::fs::read_to_string(path).map_err(|error| {
        let code = match error.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::new("config", "config_file_not_found"),
            std::io::ErrorKind::PermissionDenied => {
                ErrorCode::new("config", "config_file_permission_denied")
            },
            _ => ErrorCode::new("config", "config_file_io"),
        };

        ErrorEnvelope::expected(code, format!("failed to read config file: {error}"))
            .with_metadata("path", path.to_string_lossy())
    })
}

/// Pick the file format from the path extension.
pub fn detect_config_format(path: &Path) -> Result<ConfigFormat, ErrorEnvelope> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        None | Some("json") => Ok(ConfigFormat::Json),
        Some("toml") => Ok(ConfigFormat::Toml),
        Some(other) => Err(ErrorEnvelope::expected(
            ErrorCode::new("config", "unsupported_format"),
            "unsupported config format; use .json or .toml",
        )
        .with_metadata("extension", other)),
    }
}
