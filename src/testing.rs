//! Shared fixtures for unit tests.

use crate::{
    router::Navigator,
    storage::{Credentials, KeyValueStore, MemoryStore, ACCESS_KEY, REFRESH_KEY},
};
use anyhow::Result;
use std::{
    net::TcpListener,
    sync::{Arc, Mutex, PoisonError},
};

pub(crate) fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

/// Credentials over a memory store seeded with the given entries.
pub(crate) fn credentials_with(access: Option<&str>, refresh: Option<&str>) -> Result<Credentials> {
    let store = Arc::new(MemoryStore::new());
    if let Some(access) = access {
        store.set(ACCESS_KEY, access)?;
    }
    if let Some(refresh) = refresh {
        store.set(REFRESH_KEY, refresh)?;
    }
    Ok(Credentials::new(store))
}

/// Navigator that only records where it was sent.
#[derive(Debug)]
pub(crate) struct RecordingNavigator {
    current: Mutex<String>,
    pushes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub(crate) fn at(path: &str) -> Self {
        Self {
            current: Mutex::new(path.to_string()),
            pushes: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn set_current(&self, path: &str) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = path.to_string();
    }

    pub(crate) fn pushes(&self) -> Vec<String> {
        self.pushes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn current_path(&self) -> String {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, path: &str) {
        self.pushes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
        self.set_current(path);
    }
}
