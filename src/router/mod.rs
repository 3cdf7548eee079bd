//! Session gatekeeper: resolves navigations against the route tree and
//! applies the auth guards. A session counts as authenticated when an access
//! token is stored; expiry is only discovered when the API answers `401`.

pub mod guards;
pub mod routes;

use crate::{errors::ClientError, storage::Credentials};
use guards::NavigationDecision;
use routes::{Route, View};
use serde::Serialize;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

pub use routes::{DASHBOARD_PATH, HOME_PATH, LOGIN_PATH, REGISTER_PATH};

/// Upper bound on guard and record redirects for one navigation.
const MAX_REDIRECTS: usize = 8;

/// Location handle used by the transport to send the user to the login view.
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;
    fn push(&self, path: &str);
}

/// Outcome of one navigation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub requested: String,
    /// Final location after all redirects.
    pub path: String,
    /// `None` when nothing in the route tree matched.
    pub view: Option<View>,
    /// Intermediate locations that were redirected away from, in order.
    pub redirects: Vec<String>,
}

impl Resolution {
    #[must_use]
    pub fn was_redirected(&self) -> bool {
        !self.redirects.is_empty()
    }
}

#[derive(Debug)]
pub struct Router {
    routes: Vec<Route>,
    credentials: Credentials,
    current: Mutex<String>,
}

impl Router {
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self::with_routes(credentials, routes::default_routes())
    }

    #[must_use]
    pub fn with_routes(credentials: Credentials, routes: Vec<Route>) -> Self {
        Self {
            routes,
            credentials,
            current: Mutex::new(HOME_PATH.to_string()),
        }
    }

    /// Whether navigation treats the session as logged in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.credentials.has_access()
    }

    /// Resolves `path` without moving the current location.
    ///
    /// # Errors
    /// Returns [`ClientError::Navigation`] when redirects do not settle.
    pub fn resolve(&self, path: &str) -> Result<Resolution, ClientError> {
        let requested = routes::normalize_path(path);
        let authenticated = self.is_authenticated();
        let mut target = requested.clone();
        let mut redirects = Vec::new();

        loop {
            if redirects.len() > MAX_REDIRECTS {
                return Err(ClientError::Navigation(format!(
                    "too many redirects while navigating to {requested}"
                )));
            }

            let matched = routes::resolve(&self.routes, &target);
            let entered = matched.last().copied();

            let decision = match entered.and_then(|route| route.redirect) {
                Some(to) => NavigationDecision::Redirect(to.to_string()),
                None => match guards::require_auth(&matched, authenticated) {
                    NavigationDecision::Proceed => entered.map_or(NavigationDecision::Proceed, |route| {
                        guards::enter_guard(route, authenticated)
                    }),
                    redirect @ NavigationDecision::Redirect(_) => redirect,
                },
            };

            match decision {
                NavigationDecision::Proceed => {
                    return Ok(Resolution {
                        requested,
                        path: target,
                        view: entered.and_then(|route| route.view),
                        redirects,
                    });
                }
                NavigationDecision::Redirect(next) => {
                    debug!("navigation to {} redirected to {}", target, next);
                    redirects.push(target);
                    target = routes::normalize_path(&next);
                }
            }
        }
    }

    /// Resolves `path` and makes the result the current location.
    ///
    /// # Errors
    /// Returns [`ClientError::Navigation`] when redirects do not settle.
    pub fn navigate(&self, path: &str) -> Result<Resolution, ClientError> {
        let resolution = self.resolve(path)?;
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        current.clone_from(&resolution.path);
        Ok(resolution)
    }
}

impl Navigator for Router {
    fn current_path(&self) -> String {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, path: &str) {
        if let Err(err) = self.navigate(path) {
            warn!("Navigation to {path} failed: {err}");
        }
    }
}
