use crate::{
    cli::{
        actions::{navigate, resources, session, Action},
        globals::GlobalArgs,
        output::{self, Report},
    },
    Console,
};
use anyhow::Result;
use tracing::debug;

/// Execute the provided action against a console backed by the credentials file.
// Single dispatch point for all CLI actions; notifications raised while the
// action ran are printed together with its result.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action, globals: &GlobalArgs) -> Result<()> {
    let console = Console::with_file_store(globals.config.clone(), globals.store())?;
    debug!(
        "Using credentials at {}",
        globals.credentials_path.display()
    );

    let outcome = dispatch(&console, action).await;
    let notifications = console.notifier.drain();
    output::emit(globals.output, &outcome, &notifications)?;

    outcome.map(|_| ())
}

async fn dispatch(console: &Console, action: Action) -> Result<Report> {
    match action {
        Action::Login(args) => session::login(console, args).await,
        Action::Logout => session::logout(console).await,
        Action::WhoAmI => session::whoami(console).await,
        Action::List {
            collection,
            refresh,
        } => resources::list(console, collection, refresh).await,
        Action::Dashboard { refresh } => resources::dashboard(console, refresh).await,
        Action::Navigate { path } => navigate::execute(console, &path).await,
    }
}
