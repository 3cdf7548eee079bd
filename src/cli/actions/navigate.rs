use crate::{cli::output::Report, Console};
use anyhow::Result;
use std::fmt::Write as _;

/// Execute the navigate action: restore the session, then report where the
/// route guards send `path`.
/// # Errors
/// Returns an error if the redirects for `path` do not settle.
pub async fn execute(console: &Console, path: &str) -> Result<Report> {
    console.initialize().await?;
    let resolution = console.router.navigate(path)?;

    let view = resolution
        .view
        .map_or_else(|| "no view".to_string(), |view| format!("{view:?}"));
    let mut text = format!("{} -> {} ({view})", resolution.requested, resolution.path);
    if resolution.was_redirected() {
        write!(text, "\nvia {}", resolution.redirects.join(" -> "))?;
    }

    Report::new(&resolution, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::ClientConfig, testing::credentials_with};

    #[tokio::test]
    async fn guarded_path_reports_login_redirect() -> Result<()> {
        let console = Console::new(ClientConfig::default(), credentials_with(None, None)?)?;

        let report = execute(&console, "/users").await?;

        assert_eq!(report.data["path"], "/login");
        assert_eq!(report.data["requested"], "/users");
        assert!(report.text.starts_with("/users -> /login"));
        Ok(())
    }
}
