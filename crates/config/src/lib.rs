//! # fieldlen-config
//!
//! Loading of [`fieldlen_core::ValidatorOptions`] from TOML/JSON files and
//! `FIELDLEN_*` environment variables. Precedence is defaults, then file,
//! then env. This crate depends on `core` and `shared` only.

/// Environment variable parsing and merging.
pub mod env;
/// Option loading helpers (file + env).
pub mod load;

pub use env::{
    ENV_LENGTH_UNIT, ENV_NON_STRING_POLICY, EnvParseError, ValidatorEnv, apply_env_overrides,
};
pub use load::{
    ConfigFormat, detect_config_format, load_validator_options, load_validator_options_from_path,
    load_validator_options_std_env, parse_validator_options_json, parse_validator_options_toml,
    to_pretty_json, to_pretty_toml,
};

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
