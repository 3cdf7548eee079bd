//! Maps parsed command-line arguments to an [`Action`] plus the settings
//! every action shares.

use crate::cli::{
    actions::{resources::Collection, session::LoginArgs, Action},
    commands::{
        ARG_API_BASE, ARG_CONFIG_DIR, ARG_JSON, ARG_SERVER_URL, CMD_DASHBOARD, CMD_LOGIN,
        CMD_LOGOUT, CMD_NAVIGATE, CMD_PERMISSIONS, CMD_ROLES, CMD_USERS, CMD_WHOAMI,
    },
    globals::GlobalArgs,
};
use anyhow::{bail, Context, Result};
use secrecy::SecretString;

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or the subcommand is unknown.
pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let globals = GlobalArgs::new(
        matches.get_one::<String>(ARG_SERVER_URL).map(String::as_str),
        matches.get_one::<String>(ARG_API_BASE).map(String::as_str),
        matches.get_one::<String>(ARG_CONFIG_DIR).map(String::as_str),
        matches.get_flag(ARG_JSON),
    )?;

    let action = match matches.subcommand() {
        Some((CMD_LOGIN, sub)) => Action::Login(LoginArgs {
            username: sub
                .get_one::<String>("username")
                .cloned()
                .context("missing required argument: <username>")?,
            password: sub
                .get_one::<String>("password")
                .cloned()
                .map(SecretString::from)
                .context("missing required argument: --password")?,
        }),
        Some((CMD_LOGOUT, _)) => Action::Logout,
        Some((CMD_WHOAMI, _)) => Action::WhoAmI,
        Some((CMD_USERS, sub)) => list(Collection::Users, sub),
        Some((CMD_ROLES, sub)) => list(Collection::Roles, sub),
        Some((CMD_PERMISSIONS, sub)) => list(Collection::Permissions, sub),
        Some((CMD_DASHBOARD, sub)) => Action::Dashboard {
            refresh: sub.get_flag("refresh"),
        },
        Some((CMD_NAVIGATE, sub)) => Action::Navigate {
            path: sub
                .get_one::<String>("path")
                .cloned()
                .context("missing required argument: <path>")?,
        },
        Some((other, _)) => bail!("unknown command: {other}"),
        None => bail!("no command given"),
    };

    Ok((action, globals))
}

fn list(collection: Collection, matches: &clap::ArgMatches) -> Action {
    Action::List {
        collection,
        refresh: matches.get_flag("refresh"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{commands, globals::OutputFormat};
    use secrecy::ExposeSecret;

    fn parse(args: &[&str]) -> Result<(Action, GlobalArgs)> {
        let matches = commands::new().try_get_matches_from(args)?;
        handler(&matches)
    }

    #[test]
    fn login_maps_credentials() -> Result<()> {
        temp_env::with_vars(
            [
                ("CREWADMIN_PASSWORD", None::<&str>),
                ("CREWADMIN_LOG_LEVEL", None::<&str>),
            ],
            || -> Result<()> {
                let (action, globals) = parse(&[
                    "crewadmin",
                    "--config-dir",
                    "/tmp/crewadmin-dispatch",
                    "login",
                    "alice",
                    "-p",
                    "s3cret",
                ])?;
                let Action::Login(args) = action else {
                    bail!("expected login action, got {action:?}");
                };
                assert_eq!(args.username, "alice");
                assert_eq!(args.password.expose_secret(), "s3cret");
                assert_eq!(globals.output, OutputFormat::Text);
                Ok(())
            },
        )
    }

    #[test]
    fn list_commands_carry_refresh_flag() -> Result<()> {
        temp_env::with_vars([("CREWADMIN_LOG_LEVEL", None::<&str>)], || -> Result<()> {
            let (action, globals) = parse(&[
                "crewadmin",
                "--config-dir",
                "/tmp/crewadmin-dispatch",
                "--json",
                "permissions",
                "--refresh",
            ])?;
            assert!(matches!(
                action,
                Action::List {
                    collection: Collection::Permissions,
                    refresh: true
                }
            ));
            assert_eq!(globals.output, OutputFormat::Json);

            let (action, _) = parse(&[
                "crewadmin",
                "--config-dir",
                "/tmp/crewadmin-dispatch",
                "navigate",
                "/users",
            ])?;
            assert!(matches!(action, Action::Navigate { ref path } if path == "/users"));
            Ok(())
        })
    }
}
