use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{PositiveUsize, TesterArgs, parse_header};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::ConfigFile;

/// Applies configuration values to CLI arguments that were not set on the
/// command line.
///
/// # Errors
///
/// Returns an error when a config value is invalid.
pub fn apply_config(
    args: &mut TesterArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "url")
        && let Some(url) = config.url.clone()
    {
        args.url = Some(url);
    }

    if !is_cli(matches, "method")
        && let Some(method) = config.method
    {
        args.method = method;
    }

    if !is_cli(matches, "headers")
        && let Some(headers) = config.headers.as_ref()
    {
        let mut parsed = Vec::with_capacity(headers.len());
        for header in headers {
            parsed.push(
                parse_header(header)
                    .map_err(|source| AppError::config(ConfigError::InvalidHeader { source }))?,
            );
        }
        args.headers = parsed;
    }

    if !is_cli(matches, "payload")
        && let Some(payload) = config.payload.clone()
    {
        args.payload = payload;
    }

    if !is_cli(matches, "location")
        && let Some(location) = config.location
    {
        args.location = location;
    }

    if !is_cli(matches, "max_redirs")
        && let Some(max_redirs) = config.max_redirs
    {
        args.max_redirs = max_redirs;
    }

    if !is_cli(matches, "insecure")
        && let Some(insecure) = config.insecure
    {
        args.insecure = insecure;
    }

    if !is_cli(matches, "ca_certificates")
        && let Some(path) = config.ca_certificates.clone()
    {
        args.ca_certificates = Some(path);
    }

    if !is_cli(matches, "dry_run")
        && let Some(dry_run) = config.dry_run
    {
        args.dry_run = dry_run;
    }

    if !is_cli(matches, "timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        let timeout = timeout.to_duration().map_err(|source| {
            AppError::config(ConfigError::InvalidField {
                field: "timeout",
                source,
            })
        })?;
        args.timeout = Some(timeout);
    }

    if !is_cli(matches, "strategy")
        && let Some(strategy) = config.strategy.clone()
    {
        args.strategy = Some(strategy);
    }

    if !is_cli(matches, "plot")
        && let Some(plot) = config.plot.clone()
    {
        args.plot = Some(plot);
    }

    if !is_cli(matches, "export_json")
        && let Some(path) = config.export_json.clone()
    {
        args.export_json = Some(path);
    }

    if !is_cli(matches, "request_timeout")
        && let Some(timeout) = config.request_timeout.as_ref()
    {
        let timeout = timeout.to_duration().map_err(|source| {
            AppError::config(ConfigError::InvalidField {
                field: "request_timeout",
                source,
            })
        })?;
        args.request_timeout = Some(timeout);
    }

    if !is_cli(matches, "max_batch_size")
        && let Some(max_batch_size) = config.max_batch_size
    {
        args.max_batch_size = PositiveUsize::try_from(max_batch_size).map_err(|source| {
            AppError::config(ConfigError::InvalidField {
                field: "max_batch_size",
                source,
            })
        })?;
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}
