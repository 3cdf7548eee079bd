//! Navigation guards. These are UX-only: they keep unauthenticated sessions
//! away from console views, but real access control lives on the API.

use super::routes::{EnterGuard, Route, HOME_PATH, LOGIN_PATH};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavigationDecision {
    Proceed,
    Redirect(String),
}

/// Global guard: any matched record that requires auth sends an
/// unauthenticated session to the login view.
#[must_use]
pub fn require_auth(matched: &[&Route], authenticated: bool) -> NavigationDecision {
    if !authenticated && matched.iter().any(|route| route.requires_auth) {
        NavigationDecision::Redirect(LOGIN_PATH.to_string())
    } else {
        NavigationDecision::Proceed
    }
}

/// Route-level guard of the record being entered.
#[must_use]
pub fn enter_guard(route: &Route, authenticated: bool) -> NavigationDecision {
    match route.enter_guard {
        Some(EnterGuard::GuestOnly) if authenticated => {
            NavigationDecision::Redirect(HOME_PATH.to_string())
        }
        _ => NavigationDecision::Proceed,
    }
}
