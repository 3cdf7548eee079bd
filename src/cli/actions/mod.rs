pub mod navigate;
pub mod resources;
pub mod session;

// Internal "interpreter" for `Action`.
mod run;

use crate::cli::globals::GlobalArgs;

#[derive(Debug)]
pub enum Action {
    Login(session::LoginArgs),
    Logout,
    WhoAmI,
    List {
        collection: resources::Collection,
        refresh: bool,
    },
    Dashboard {
        refresh: bool,
    },
    Navigate {
        path: String,
    },
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self, globals: &GlobalArgs) -> anyhow::Result<()> {
        run::execute(self, globals).await
    }
}
