use std::ffi::OsString;
use std::path::Path;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tracing::error;

use crate::app::run_local;
use crate::args::TesterArgs;
use crate::error::AppResult;
use crate::stress::StressConfig;
use crate::system::logger::init_logging;

/// Default config filenames checked when no CLI args are provided.
const DEFAULT_CONFIG_FILES: [&str; 2] = ["resttest.toml", "resttest.json"];

/// Parses the command line, applies the config file and runs the test.
///
/// # Errors
///
/// Returns setup errors and plot/export failures. Failed requests are part of
/// the printed report instead.
pub fn run() -> AppResult<()> {
    let Some((mut args, matches)) = parse_args()? else {
        return Ok(());
    };

    init_logging(args.verbose, args.no_color);

    run_configured(&mut args, &matches).inspect_err(|err| error!("Run failed: {}", err))
}

fn run_configured(args: &mut TesterArgs, matches: &ArgMatches) -> AppResult<()> {
    apply_config(args, matches)?;
    let config = StressConfig::from_args(args)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_local(config))?;
    Ok(())
}

fn parse_args() -> AppResult<Option<(TesterArgs, ArgMatches)>> {
    let mut cmd = TesterArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    let args = TesterArgs::from_arg_matches(&matches)?;

    Ok(Some((args, matches)))
}

fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    if !treat_as_empty {
        return false;
    }

    !DEFAULT_CONFIG_FILES
        .iter()
        .any(|path| Path::new(path).exists())
}

fn apply_config(args: &mut TesterArgs, matches: &ArgMatches) -> AppResult<()> {
    if let Some(config) = crate::config::load_config(args.config.as_deref())? {
        crate::config::apply_config(args, matches, &config)?;
    }
    Ok(())
}
