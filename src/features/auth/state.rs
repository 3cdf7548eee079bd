//! Session state for the console. Holds the signed-in user and their roles
//! next to the stored token pair, and keeps the two consistent: every path
//! that drops the user also drops the tokens.

use crate::{
    cache::ResponseCache,
    errors::ClientError,
    features::{
        auth::{
            client::AuthClient,
            types::{AuthResponse, LoginRequest, RegisterRequest, UserInfo},
        },
        rbac::Role,
    },
    storage::Credentials,
};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

/// Snapshot of what the console knows about the signed-in user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user_info: Option<UserInfo>,
    pub is_logged_in: bool,
    pub roles: Vec<Role>,
}

pub struct SessionState {
    auth: AuthClient,
    credentials: Credentials,
    cache: Arc<ResponseCache>,
    session: Mutex<Session>,
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionState")
            .field("session", &self.snapshot())
            .finish_non_exhaustive()
    }
}

impl SessionState {
    #[must_use]
    pub fn new(auth: AuthClient, credentials: Credentials, cache: Arc<ResponseCache>) -> Self {
        Self {
            auth,
            credentials,
            cache,
            session: Mutex::new(Session::default()),
        }
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.session().clone()
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.session().is_logged_in
    }

    /// Signs in, stores the token pair and records the user with their roles.
    ///
    /// # Errors
    /// Propagates API failures and failures to store the tokens.
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ClientError> {
        let response = self.auth.login(request).await.inspect_err(|err| {
            error!("Login failed for {}: {err}", request.username);
        })?;
        self.credentials.store_pair(&response.credential_pair())?;

        let mut session = self.session();
        session.user_info = Some(response.user.clone());
        session.is_logged_in = true;
        session.roles.clone_from(&response.user.roles);
        info!("Signed in as {}", response.user.username);
        drop(session);

        Ok(response)
    }

    /// Creates an account and signs in with it. Roles are not copied; a new
    /// account has none until an administrator assigns them.
    ///
    /// # Errors
    /// Propagates API failures and failures to store the tokens.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        let response = self.auth.register(request).await.inspect_err(|err| {
            error!("Registration failed for {}: {err}", request.username);
        })?;
        self.credentials.store_pair(&response.credential_pair())?;

        let mut session = self.session();
        session.user_info = Some(response.user.clone());
        session.is_logged_in = true;
        info!("Registered {}", response.user.username);
        drop(session);

        Ok(response)
    }

    /// Best-effort server logout, then local cleanup that always happens.
    pub async fn logout(&self) {
        match self.credentials.refresh() {
            Ok(Some(refresh)) => {
                if let Err(err) = self.auth.logout(&refresh).await {
                    error!("Logout request failed: {err}");
                }
            }
            Ok(None) => debug!("No refresh token stored, skipping logout request"),
            Err(err) => warn!("Failed to read refresh token: {err}"),
        }

        self.clear();
        self.cache.clear();
    }

    /// Loads the user behind the stored access token.
    ///
    /// # Errors
    /// Propagates API failures after clearing the session.
    pub async fn fetch_current_user(&self) -> Result<UserInfo, ClientError> {
        match self.auth.current_user().await {
            Ok(user) => {
                let mut session = self.session();
                session.user_info = Some(user.clone());
                session.is_logged_in = true;
                session.roles.clone_from(&user.roles);
                Ok(user)
            }
            Err(err) => {
                error!("Failed to load current user: {err}");
                self.clear();
                Err(err)
            }
        }
    }

    /// Drops both tokens and resets the in-memory session.
    pub fn clear(&self) {
        if let Err(err) = self.credentials.clear() {
            warn!("Failed to clear stored credentials: {err}");
        }
        *self.session() = Session::default();
    }

    #[must_use]
    pub fn has_role(&self, name: &str) -> bool {
        self.session().roles.iter().any(|role| role.name == name)
    }

    /// Startup hydration: with a stored access token, load the current user;
    /// a rejected token is dropped quietly.
    pub async fn initialize(&self) {
        if !self.credentials.has_access() {
            debug!("No access token stored, starting signed out");
            return;
        }

        match self.fetch_current_user().await {
            Ok(user) => info!("Session restored for {}", user.username),
            Err(err) => {
                warn!("Stored session is no longer valid, clearing it: {err}");
                self.clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ClientConfig,
        features::{dashboard::DashboardClient, rbac::RbacClient},
        notify::MemoryNotifier,
        testing::{can_bind_localhost, credentials_with, RecordingNavigator},
        transport::Transport,
    };
    use anyhow::Result;
    use secrecy::ExposeSecret;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn state(server: &MockServer, credentials: &Credentials) -> Result<SessionState> {
        let transport = Transport::new(
            ClientConfig::for_server(&server.uri()),
            credentials.clone(),
            Arc::new(MemoryNotifier::new()),
            Arc::new(RecordingNavigator::at("/login")),
        )?;
        let cache = Arc::new(ResponseCache::new(
            RbacClient::new(&transport),
            DashboardClient::new(transport.clone()),
        ));
        Ok(SessionState::new(
            AuthClient::new(transport),
            credentials.clone(),
            cache,
        ))
    }

    fn auth_body() -> serde_json::Value {
        json!({
            "access": "A1",
            "refresh": "R1",
            "user": {
                "id": 1,
                "username": "admin",
                "roles": [{"id": 1, "name": "admin"}, {"id": 2, "name": "auditor"}]
            }
        })
    }

    #[tokio::test]
    async fn login_stores_tokens_and_roles() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login/"))
            .and(body_json(json!({"username": "admin", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(auth_body()))
            .expect(1)
            .mount(&server)
            .await;

        let credentials = credentials_with(None, None)?;
        let state = state(&server, &credentials)?;
        state
            .login(&LoginRequest {
                username: "admin".to_string(),
                password: "pw".to_string(),
            })
            .await?;

        assert_eq!(
            credentials.access()?.map(|s| s.expose_secret().to_string()),
            Some("A1".to_string())
        );
        assert_eq!(
            credentials.refresh()?.map(|s| s.expose_secret().to_string()),
            Some("R1".to_string())
        );
        assert!(state.is_logged_in());
        assert!(state.has_role("auditor"));
        assert!(!state.has_role("editor"));
        Ok(())
    }

    #[tokio::test]
    async fn register_does_not_copy_roles() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/register/"))
            .respond_with(ResponseTemplate::new(201).set_body_json(auth_body()))
            .expect(1)
            .mount(&server)
            .await;

        let credentials = credentials_with(None, None)?;
        let state = state(&server, &credentials)?;
        state
            .register(&RegisterRequest {
                username: "admin".to_string(),
                password: "pw123456".to_string(),
                password_confirm: "pw123456".to_string(),
                ..RegisterRequest::default()
            })
            .await?;

        let session = state.snapshot();
        assert!(session.is_logged_in);
        assert!(session.roles.is_empty());
        assert!(credentials.has_access());
        Ok(())
    }

    #[tokio::test]
    async fn failed_login_leaves_store_untouched() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login/"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"detail": "Missing fields"})),
            )
            .mount(&server)
            .await;

        let credentials = credentials_with(None, None)?;
        let state = state(&server, &credentials)?;
        let result = state
            .login(&LoginRequest {
                username: "admin".to_string(),
                password: String::new(),
            })
            .await;

        assert_eq!(result.err().and_then(|e| e.status()), Some(400));
        assert!(!credentials.has_access());
        assert!(!state.is_logged_in());
        Ok(())
    }

    #[tokio::test]
    async fn logout_clears_even_when_request_fails() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout/"))
            .and(body_json(json!({"refresh": "R1"})))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"detail": "Logout failed"})))
            .expect(1)
            .mount(&server)
            .await;

        let credentials = credentials_with(Some("A1"), Some("R1"))?;
        let state = state(&server, &credentials)?;
        state.logout().await;

        assert!(credentials.access()?.is_none());
        assert!(credentials.refresh()?.is_none());
        assert_eq!(state.snapshot(), Session::default());
        Ok(())
    }

    #[tokio::test]
    async fn logout_without_refresh_token_skips_request() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout/"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let credentials = credentials_with(Some("A1"), None)?;
        let state = state(&server, &credentials)?;
        state.logout().await;

        assert!(!credentials.has_access());
        Ok(())
    }

    #[tokio::test]
    async fn initialize_without_token_makes_no_request() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "username": "admin"})))
            .expect(0)
            .mount(&server)
            .await;

        let credentials = credentials_with(None, None)?;
        let state = state(&server, &credentials)?;
        state.initialize().await;

        assert!(!state.is_logged_in());
        Ok(())
    }

    #[tokio::test]
    async fn initialize_restores_user() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 1, "username": "admin", "roles": [{"id": 1, "name": "admin"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let credentials = credentials_with(Some("A1"), Some("R1"))?;
        let state = state(&server, &credentials)?;
        state.initialize().await;

        assert!(state.is_logged_in());
        assert!(state.has_role("admin"));
        Ok(())
    }

    #[tokio::test]
    async fn initialize_with_rejected_token_clears_quietly() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me/"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh/"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let credentials = credentials_with(Some("A1"), Some("R1"))?;
        let state = state(&server, &credentials)?;
        state.initialize().await;

        assert!(!state.is_logged_in());
        assert!(credentials.access()?.is_none());
        assert!(credentials.refresh()?.is_none());
        Ok(())
    }
}
