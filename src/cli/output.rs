use crate::{
    cli::globals::OutputFormat,
    notify::{Level, Notification},
};
use anyhow::Result;
use serde::Serialize;
use serde_json::{json, Value};

/// What a command produced: structured data for `--json`, lines for humans.
#[derive(Debug)]
pub struct Report {
    pub data: Value,
    pub text: String,
}

impl Report {
    /// # Errors
    /// Returns an error if `data` cannot be represented as JSON.
    pub fn new<T: Serialize>(data: &T, text: impl Into<String>) -> Result<Self> {
        Ok(Self {
            data: serde_json::to_value(data)?,
            text: text.into(),
        })
    }
}

fn level_label(level: Level) -> &'static str {
    match level {
        Level::Success => "ok",
        Level::Warning => "warning",
        Level::Error => "error",
    }
}

/// JSON document for one command run.
#[must_use]
pub fn json_document(outcome: &Result<Report>, notifications: &[Notification]) -> Value {
    match outcome {
        Ok(report) => json!({
            "success": true,
            "data": report.data,
            "notifications": notifications,
        }),
        Err(err) => json!({
            "success": false,
            "error": format!("{err:#}"),
            "notifications": notifications,
        }),
    }
}

/// Prints the outcome of a command in the requested format. Notifications
/// go to stderr in text mode and into the document in JSON mode.
///
/// # Errors
/// Returns an error if the JSON document cannot be rendered.
pub fn emit(
    format: OutputFormat,
    outcome: &Result<Report>,
    notifications: &[Notification],
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json_document(outcome, notifications))?
            );
        }
        OutputFormat::Text => {
            for notification in notifications {
                eprintln!("{}: {}", level_label(notification.level), notification.message);
            }
            if let Ok(report) = outcome {
                if !report.text.is_empty() {
                    println!("{}", report.text);
                }
            }
        }
    }
    Ok(())
}
