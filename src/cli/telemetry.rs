use crate::cli::globals::OutputFormat;
use anyhow::Result;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

fn filter(level: Level) -> Result<EnvFilter> {
    Ok(EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy()
        .add_directive("hyper=error".parse()?)
        .add_directive("hyper_util=error".parse()?)
        .add_directive("reqwest=warn".parse()?))
}

/// Logs go to stderr; stdout only carries command output. With `--json` the
/// log lines are JSON too, so both streams stay machine readable.
///
/// # Errors
///
/// Returns an error if a filter directive is invalid or a global subscriber is already set
pub fn init(level: Level, format: OutputFormat) -> Result<()> {
    let filter = filter(level)?;

    match format {
        OutputFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true);
            tracing::subscriber::set_global_default(Registry::default().with(fmt_layer).with(filter))?;
        }
        OutputFormat::Text => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_file(false)
                .with_line_number(false)
                .with_thread_ids(false)
                .with_target(false);
            tracing::subscriber::set_global_default(Registry::default().with(fmt_layer).with(filter))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_keeps_http_stack_quiet() -> Result<()> {
        let rendered = temp_env::with_vars([("RUST_LOG", None::<&str>)], || {
            filter(Level::DEBUG).map(|filter| filter.to_string())
        })?;
        assert!(rendered.contains("debug"));
        assert!(rendered.contains("hyper=error"));
        assert!(rendered.contains("reqwest=warn"));
        Ok(())
    }
}
