//! User-visible notifications. These are a side channel: the transport emits
//! them next to, never instead of, the error returned to the caller.

use serde::Serialize;
use std::sync::{Mutex, PoisonError};
use tracing::{error, info, warn};

pub const FORBIDDEN: &str = "Insufficient permission to access this resource";
pub const NOT_FOUND: &str = "The requested resource does not exist";
pub const SERVER_ERROR: &str = "Internal server error, please try again later";
pub const TIMEOUT: &str = "Request timed out, please check your network connection";
pub const NETWORK_ERROR: &str = "Network error, please check your network connection";
pub const SESSION_REFRESHED: &str = "Session refreshed";
pub const SESSION_EXPIRED: &str = "Session expired, please log in again";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: Level::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the tracing subscriber.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            Level::Success => info!(target: "crewadmin::notify", "{}", notification.message),
            Level::Warning => warn!(target: "crewadmin::notify", "{}", notification.message),
            Level::Error => error!(target: "crewadmin::notify", "{}", notification.message),
        }
    }
}

/// Collects notifications until they are drained for display.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    entries: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns and forgets everything collected so far.
    pub fn drain(&self) -> Vec<Notification> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *entries)
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<Notification> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: Notification) {
        TracingNotifier.notify(notification.clone());
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}
