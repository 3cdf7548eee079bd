//! Static route tree of the admin console and path matching.

use serde::Serialize;

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
pub const HOME_PATH: &str = "/";
pub const DASHBOARD_PATH: &str = "/dashboard";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum View {
    Login,
    Register,
    Home,
    Dashboard,
    UserManagement,
    RoleManagement,
    PermissionManagement,
    RolePermission,
}

/// Per-route guard evaluated when the route is entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnterGuard {
    /// Authenticated sessions are sent to [`HOME_PATH`] instead.
    GuestOnly,
}

#[derive(Clone, Debug)]
pub struct Route {
    /// Absolute (`/users`) or relative to the parent (`""` is the parent's index).
    pub path: &'static str,
    pub view: Option<View>,
    pub requires_auth: bool,
    pub redirect: Option<&'static str>,
    pub enter_guard: Option<EnterGuard>,
    pub children: Vec<Route>,
}

impl Route {
    #[must_use]
    pub fn view(path: &'static str, view: View) -> Self {
        Self {
            path,
            view: Some(view),
            requires_auth: false,
            redirect: None,
            enter_guard: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn redirect(path: &'static str, to: &'static str) -> Self {
        Self {
            path,
            view: None,
            requires_auth: false,
            redirect: Some(to),
            enter_guard: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn requiring_auth(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    #[must_use]
    pub fn guarded(mut self, guard: EnterGuard) -> Self {
        self.enter_guard = Some(guard);
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<Route>) -> Self {
        self.children = children;
        self
    }
}

/// Login and registration are public; everything under `/` needs a session.
#[must_use]
pub fn default_routes() -> Vec<Route> {
    vec![
        Route::view(LOGIN_PATH, View::Login).guarded(EnterGuard::GuestOnly),
        Route::view(REGISTER_PATH, View::Register),
        Route::view(HOME_PATH, View::Home)
            .requiring_auth()
            .with_children(vec![
                Route::redirect("", DASHBOARD_PATH),
                Route::view(DASHBOARD_PATH, View::Dashboard),
                Route::view("/users", View::UserManagement),
                Route::view("/roles", View::RoleManagement),
                Route::view("/permissions", View::PermissionManagement),
                Route::view("/rbac", View::RolePermission),
            ]),
    ]
}

/// Strips query and fragment, forces a leading slash and drops trailing ones.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let path = path
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim();
    let trimmed = path.trim_end_matches('/');

    if trimmed.is_empty() {
        HOME_PATH.to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn full_path(parent: &str, child: &str) -> String {
    if child.starts_with('/') {
        normalize_path(child)
    } else if child.is_empty() {
        parent.to_string()
    } else {
        normalize_path(&format!("{}/{child}", parent.trim_end_matches('/')))
    }
}

/// Returns the chain of records matching `path`, outermost first. Children
/// are tried before their parent, so an index child wins over its parent.
/// An empty chain means nothing matched.
#[must_use]
pub fn resolve<'a>(routes: &'a [Route], path: &str) -> Vec<&'a Route> {
    let target = normalize_path(path);
    let mut chain = Vec::new();
    for route in routes {
        if match_route(route, "", &target, &mut chain) {
            break;
        }
    }
    chain
}

fn match_route<'a>(route: &'a Route, parent: &str, target: &str, chain: &mut Vec<&'a Route>) -> bool {
    let full = full_path(parent, route.path);
    chain.push(route);

    for child in &route.children {
        if match_route(child, &full, target, chain) {
            return true;
        }
    }

    if full == target {
        return true;
    }

    chain.pop();
    false
}
