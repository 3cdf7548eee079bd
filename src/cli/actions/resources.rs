use crate::{
    cli::output::Report,
    router::{Resolution, LOGIN_PATH},
    Console,
};
use anyhow::{bail, Result};
use std::fmt::Write as _;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collection {
    Users,
    Roles,
    Permissions,
}

impl Collection {
    /// Console view that lists this collection.
    #[must_use]
    pub const fn view_path(self) -> &'static str {
        match self {
            Self::Users => "/users",
            Self::Roles => "/roles",
            Self::Permissions => "/permissions",
        }
    }
}

/// Enters `path` through the route guards after restoring the session.
async fn enter(console: &Console, path: &str) -> Result<Resolution> {
    console.initialize().await?;
    let resolution = console.router.navigate(path)?;
    if resolution.path == LOGIN_PATH {
        bail!("not signed in, run `crewadmin login <username>` first");
    }
    Ok(resolution)
}

/// Execute a list action.
/// # Errors
/// Returns an error if there is no session or the fetch fails.
pub async fn list(console: &Console, collection: Collection, refresh: bool) -> Result<Report> {
    enter(console, collection.view_path()).await?;

    let mut text = String::new();
    match collection {
        Collection::Users => {
            let users = console.cache.users(refresh).await?;
            for user in &users {
                let state = if user.is_active { "active" } else { "inactive" };
                writeln!(text, "{:>5}  {:<20} {}", user.id, user.username, state)?;
            }
            writeln!(text, "{} users", users.len())?;
            Report::new(&users, text.trim_end())
        }
        Collection::Roles => {
            let roles = console.cache.roles(refresh).await?;
            for role in &roles {
                writeln!(
                    text,
                    "{:>5}  {:<20} {}",
                    role.id,
                    role.name,
                    role.description.as_deref().unwrap_or_default()
                )?;
            }
            writeln!(text, "{} roles", roles.len())?;
            Report::new(&roles, text.trim_end())
        }
        Collection::Permissions => {
            let permissions = console.cache.permissions(refresh).await?;
            for permission in &permissions {
                writeln!(
                    text,
                    "{:>5}  {:<30} {}",
                    permission.id, permission.codename, permission.name
                )?;
            }
            writeln!(text, "{} permissions", permissions.len())?;
            Report::new(&permissions, text.trim_end())
        }
    }
}

/// Execute the dashboard action.
/// # Errors
/// Returns an error if there is no session or the fetch fails.
pub async fn dashboard(console: &Console, refresh: bool) -> Result<Report> {
    enter(console, crate::router::DASHBOARD_PATH).await?;

    let stats = console.cache.dashboard_stats(refresh).await?;
    let text = format!(
        "users:        {} ({} active, {} staff)\nroles:        {}\npermissions:  {}",
        stats.user_count,
        stats.active_user_count,
        stats.staff_count,
        stats.role_count,
        stats.permission_count
    );
    Report::new(&stats, text)
}
