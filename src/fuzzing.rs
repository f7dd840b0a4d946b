use std::time::Duration;

use clap::{ArgMatches, CommandFactory, FromArgMatches};

use crate::args::{PositiveUsize, TesterArgs, parse_duration, parse_header};
use crate::config::apply_config;
use crate::config::types::ConfigFile;
use crate::error::{AppError, AppResult, ConfigError};
use crate::stress::GrowthSpec;

thread_local! {
    static BASE_MATCHES: ArgMatches = TesterArgs::command().get_matches_from(["resttest"]);
}

/// Parses a header string in `Key: Value` or `Key=Value` format.
///
/// # Errors
///
/// Returns an error when the header is malformed.
pub fn parse_header_input(input: &str) -> AppResult<(String, String)> {
    parse_header(input).map_err(AppError::from)
}

/// Parses a duration argument (e.g. `10s`, `500ms`).
///
/// # Errors
///
/// Returns an error when the duration is invalid.
pub fn parse_duration_input(input: &str) -> AppResult<Duration> {
    parse_duration(input).map_err(AppError::from)
}

/// Parses a growth spec (`lin[a,b]` or `exp[a,b]`).
///
/// # Errors
///
/// Returns an error when the spec is invalid.
pub fn parse_growth_input(input: &str) -> AppResult<GrowthSpec> {
    input.parse::<GrowthSpec>().map_err(AppError::from)
}

/// Parses a positive usize string value.
///
/// # Errors
///
/// Returns an error when the value is invalid or zero.
pub fn parse_positive_usize_input(input: &str) -> AppResult<usize> {
    let value: PositiveUsize = input.parse()?;
    Ok(value.get())
}

/// Parses TOML config and applies it to defaults.
///
/// # Errors
///
/// Returns an error when parsing or validation fails.
pub fn apply_config_from_toml(input: &str) -> AppResult<TesterArgs> {
    let config: ConfigFile = toml::from_str(input).map_err(|err| {
        AppError::config(ConfigError::ParseToml {
            path: "<fuzz>".into(),
            source: err,
        })
    })?;
    apply_config_to_defaults(&config)
}

/// Parses JSON config and applies it to defaults.
///
/// # Errors
///
/// Returns an error when parsing or validation fails.
pub fn apply_config_from_json(input: &[u8]) -> AppResult<TesterArgs> {
    let config: ConfigFile = serde_json::from_slice(input)?;
    apply_config_to_defaults(&config)
}

fn apply_config_to_defaults(config: &ConfigFile) -> AppResult<TesterArgs> {
    BASE_MATCHES.with(|matches| {
        let mut args = TesterArgs::from_arg_matches(matches)?;
        apply_config(&mut args, matches, config)?;
        Ok(args)
    })
}
