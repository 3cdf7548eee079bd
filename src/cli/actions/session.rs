use crate::{
    cli::output::Report,
    features::auth::{types::UserInfo, LoginRequest},
    Console,
};
use anyhow::{bail, Context, Result};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

#[derive(Debug)]
pub struct LoginArgs {
    pub username: String,
    pub password: SecretString,
}

fn describe(user: &UserInfo) -> String {
    let roles: Vec<&str> = user.roles.iter().map(|role| role.name.as_str()).collect();
    let roles = if roles.is_empty() {
        "none".to_string()
    } else {
        roles.join(", ")
    };
    format!(
        "{} ({})\nroles: {}",
        user.display_name(),
        user.username,
        roles
    )
}

/// Execute the login action.
/// # Errors
/// Returns an error if the credentials are rejected or cannot be stored.
pub async fn login(console: &Console, args: LoginArgs) -> Result<Report> {
    let request = LoginRequest {
        username: args.username,
        password: args.password.expose_secret().to_string(),
    };
    let response = console
        .session
        .login(&request)
        .await
        .with_context(|| format!("login failed for {}", request.username))?;

    let landing = console.router.navigate(crate::router::LOGIN_PATH)?;
    debug!("Signed in, console lands on {}", landing.path);

    Report::new(
        &json!({"user": response.user, "landing": landing.path}),
        format!("Signed in as {}", describe(&response.user)),
    )
}

/// Execute the logout action.
/// # Errors
/// Returns an error if the output cannot be rendered.
pub async fn logout(console: &Console) -> Result<Report> {
    let was_signed_in = console.credentials.has_access();
    console.session.logout().await;
    console.router.navigate(crate::router::HOME_PATH)?;

    let text = if was_signed_in {
        "Signed out"
    } else {
        "No session to sign out of"
    };
    Report::new(&json!({"signed_out": was_signed_in}), text)
}

/// Execute the whoami action.
/// # Errors
/// Returns an error if there is no valid session.
pub async fn whoami(console: &Console) -> Result<Report> {
    console.initialize().await?;

    let session = console.session.snapshot();
    let Some(user) = session.user_info.as_ref().filter(|_| session.is_logged_in) else {
        bail!("not signed in, run `crewadmin login <username>` first");
    };

    Report::new(&session, describe(user))
}
