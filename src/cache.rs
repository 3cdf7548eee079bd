//! Last fetched value per list kind plus the dashboard counters.
//!
//! There is no expiry: a kind is refetched when the caller asks for it, or
//! when nothing non-empty has been cached yet. Logout clears everything.

use crate::{
    errors::ClientError,
    features::{
        auth::types::UserInfo,
        dashboard::{DashboardClient, DashboardStats},
        envelope::ListEnvelope,
        rbac::{ListQuery, Permission, RbacClient, Role},
    },
};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

/// Only the first page is cached; say so when the server holds more.
fn first_page<T>(kind: &str, envelope: ListEnvelope<T>) -> Vec<T> {
    if envelope.has_next() {
        warn!(
            "Caching the first page of {kind} only, the server reports {} in total",
            envelope.total()
        );
    }
    envelope.into_items()
}

#[derive(Debug, Default)]
struct Entries {
    users: Vec<UserInfo>,
    roles: Vec<Role>,
    permissions: Vec<Permission>,
    dashboard: Option<DashboardStats>,
}

#[derive(Debug)]
pub struct ResponseCache {
    rbac: RbacClient,
    dashboard: DashboardClient,
    entries: Mutex<Entries>,
}

impl ResponseCache {
    #[must_use]
    pub fn new(rbac: RbacClient, dashboard: DashboardClient) -> Self {
        Self {
            rbac,
            dashboard,
            entries: Mutex::new(Entries::default()),
        }
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// # Errors
    /// Propagates fetch failures; the cached list is left untouched.
    pub async fn users(&self, refresh: bool) -> Result<Vec<UserInfo>, ClientError> {
        if !refresh {
            let cached = self.entries().users.clone();
            if !cached.is_empty() {
                debug!("Serving {} cached users", cached.len());
                return Ok(cached);
            }
        }

        let users = first_page("users", self.rbac.users.list(&ListQuery::default()).await?);
        self.entries().users.clone_from(&users);
        Ok(users)
    }

    /// # Errors
    /// Propagates fetch failures; the cached list is left untouched.
    pub async fn roles(&self, refresh: bool) -> Result<Vec<Role>, ClientError> {
        if !refresh {
            let cached = self.entries().roles.clone();
            if !cached.is_empty() {
                debug!("Serving {} cached roles", cached.len());
                return Ok(cached);
            }
        }

        let roles = first_page("roles", self.rbac.roles.list(&ListQuery::default()).await?);
        self.entries().roles.clone_from(&roles);
        Ok(roles)
    }

    /// # Errors
    /// Propagates fetch failures; the cached list is left untouched.
    pub async fn permissions(&self, refresh: bool) -> Result<Vec<Permission>, ClientError> {
        if !refresh {
            let cached = self.entries().permissions.clone();
            if !cached.is_empty() {
                debug!("Serving {} cached permissions", cached.len());
                return Ok(cached);
            }
        }

        let permissions = first_page(
            "permissions",
            self.rbac.permissions.list(&ListQuery::default()).await?,
        );
        self.entries().permissions.clone_from(&permissions);
        Ok(permissions)
    }

    /// # Errors
    /// Propagates fetch failures; the cached counters are left untouched.
    pub async fn dashboard_stats(&self, refresh: bool) -> Result<DashboardStats, ClientError> {
        if !refresh {
            let cached = self.entries().dashboard;
            if let Some(stats) = cached {
                debug!("Serving cached dashboard stats");
                return Ok(stats);
            }
        }

        let stats = self.dashboard.stats().await?;
        self.entries().dashboard = Some(stats);
        Ok(stats)
    }

    pub fn clear(&self) {
        *self.entries() = Entries::default();
        debug!("Response cache cleared");
    }
}
