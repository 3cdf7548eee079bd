use crate::cli::{
    actions::Action,
    commands::{self, ARG_LOG_LEVEL, ARG_VERBOSE},
    dispatch,
    globals::GlobalArgs,
    telemetry,
};
use anyhow::Result;
use clap::ArgMatches;
use tracing::Level;

/// `--log-level` wins; otherwise each `-v` opens one more level above the
/// default, which only shows errors since notifications already reach stderr.
fn log_level(matches: &ArgMatches) -> Level {
    if let Some(level) = matches.get_one::<Level>(ARG_LOG_LEVEL) {
        return *level;
    }
    match matches.get_count(ARG_VERBOSE) {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Parses the command line, starts logging in the output format the command
/// asked for and returns the action to run.
///
/// # Errors
///
/// Returns an error if the arguments do not map to an action or logging cannot be initialized
pub fn start() -> Result<(Action, GlobalArgs)> {
    let matches = commands::new().get_matches();

    let (action, globals) = dispatch::handler(&matches)?;
    telemetry::init(log_level(&matches), globals.output)?;

    Ok((action, globals))
}
