use crate::{
    config::{DEFAULT_API_BASE, ENV_API_BASE_URL, ENV_SERVER_URL},
    storage::ENV_CONFIG_DIR,
};
use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ArgAction, ColorChoice, Command,
};
use tracing::Level;

pub const ARG_SERVER_URL: &str = "server-url";
pub const ARG_API_BASE: &str = "api-base";
pub const ARG_CONFIG_DIR: &str = "config-dir";
pub const ARG_JSON: &str = "json";
pub const ARG_VERBOSE: &str = "verbose";
pub const ARG_LOG_LEVEL: &str = "log-level";
pub const ENV_LOG_LEVEL: &str = "CREWADMIN_LOG_LEVEL";

pub const CMD_LOGIN: &str = "login";
pub const CMD_LOGOUT: &str = "logout";
pub const CMD_WHOAMI: &str = "whoami";
pub const CMD_USERS: &str = "users";
pub const CMD_ROLES: &str = "roles";
pub const CMD_PERMISSIONS: &str = "permissions";
pub const CMD_DASHBOARD: &str = "dashboard";
pub const CMD_NAVIGATE: &str = "navigate";

fn parse_log_level(level: &str) -> Result<Level, String> {
    level
        .trim()
        .parse::<Level>()
        .map_err(|_| format!("unknown log level {level:?}, expected error, warn, info, debug or trace"))
}

fn refresh_arg() -> Arg {
    Arg::new("refresh")
        .long("refresh")
        .help("Fetch again even if a cached value exists")
        .action(ArgAction::SetTrue)
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    Command::new("crewadmin")
        .about("Admin console for users, roles and permissions")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new(ARG_SERVER_URL)
                .long(ARG_SERVER_URL)
                .help("Admin server origin, example: http://127.0.0.1:8000")
                .env(ENV_SERVER_URL)
                .global(true),
        )
        .arg(
            Arg::new(ARG_API_BASE)
                .long(ARG_API_BASE)
                .help("API base path or absolute URL")
                .default_value(DEFAULT_API_BASE)
                .env(ENV_API_BASE_URL)
                .global(true),
        )
        .arg(
            Arg::new(ARG_CONFIG_DIR)
                .long(ARG_CONFIG_DIR)
                .help("Directory holding credentials.json (default: ~/.config/crewadmin)")
                .env(ENV_CONFIG_DIR)
                .global(true),
        )
        .arg(
            Arg::new(ARG_JSON)
                .long(ARG_JSON)
                .help("Print results, notifications and log lines as JSON")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new(ARG_VERBOSE)
                .short('v')
                .long(ARG_VERBOSE)
                .help("Log more on stderr: -v info, -vv debug, -vvv trace")
                .action(ArgAction::Count)
                .global(true),
        )
        .arg(
            Arg::new(ARG_LOG_LEVEL)
                .long(ARG_LOG_LEVEL)
                .help("Exact log level, overrides -v")
                .env(ENV_LOG_LEVEL)
                .value_parser(parse_log_level)
                .global(true),
        )
        .subcommand(
            Command::new(CMD_LOGIN)
                .about("Sign in and store the token pair")
                .arg(Arg::new("username").help("Account name").required(true))
                .arg(
                    Arg::new("password")
                        .long("password")
                        .short('p')
                        .help("Account password")
                        .env("CREWADMIN_PASSWORD")
                        .hide_env_values(true)
                        .required(true),
                ),
        )
        .subcommand(Command::new(CMD_LOGOUT).about("Sign out and forget the stored tokens"))
        .subcommand(Command::new(CMD_WHOAMI).about("Show the signed-in user and their roles"))
        .subcommand(
            Command::new(CMD_USERS)
                .about("List users")
                .arg(refresh_arg()),
        )
        .subcommand(
            Command::new(CMD_ROLES)
                .about("List roles")
                .arg(refresh_arg()),
        )
        .subcommand(
            Command::new(CMD_PERMISSIONS)
                .about("List permissions")
                .arg(refresh_arg()),
        )
        .subcommand(
            Command::new(CMD_DASHBOARD)
                .about("Show dashboard counters")
                .arg(refresh_arg()),
        )
        .subcommand(
            Command::new(CMD_NAVIGATE)
                .about("Show where the console would land for a path")
                .arg(Arg::new("path").help("Console path, example: /users").required(true)),
        )
}
