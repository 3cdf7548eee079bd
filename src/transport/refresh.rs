//! Single-flight access token refresh.
//!
//! The first `401` starts one exchange of the stored refresh token for a new
//! access token. Every `401` that arrives while that exchange is pending
//! awaits the same shared future instead of starting a second one, and
//! nobody but the exchange itself clears credentials or redirects.
//!
//! The exchange runs on its own task, so it settles and the coordinator
//! returns to idle even when every waiter has been dropped.
//!
//! The original request is never replayed: callers still receive their
//! `401` once the exchange has settled and decide themselves whether to try
//! again.

use crate::{
    errors::ClientError,
    notify::{Notification, Notifier, SESSION_EXPIRED, SESSION_REFRESHED},
    router::{Navigator, LOGIN_PATH},
    storage::{redact, Credentials},
};
use futures::future::{BoxFuture, FutureExt, Shared};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, error, info, info_span, warn, Instrument};
use url::Url;

/// API path of the refresh endpoint, relative to the API base.
pub const REFRESH_PATH: &str = "/auth/refresh/";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new access token was stored.
    Refreshed,
    /// Credentials were cleared and the login redirect ran.
    Expired,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
}

type SharedRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

enum RefreshState {
    Idle,
    Pending(SharedRefresh),
}

/// Everything the exchange needs, cloned into the shared future.
#[derive(Clone)]
pub(crate) struct RefreshContext {
    pub(crate) client: Client,
    pub(crate) refresh_url: Url,
    pub(crate) credentials: Credentials,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) navigator: Arc<dyn Navigator>,
}

impl RefreshContext {
    async fn exchange(self, refresh: SecretString) -> RefreshOutcome {
        debug!("Refreshing access token with {}", redact(&refresh));

        let access = match self.request_access(&refresh).await {
            Ok(access) => access,
            Err(err) => {
                error!("Access token refresh failed: {err}");
                self.expire_session();
                return RefreshOutcome::Expired;
            }
        };

        if let Err(err) = self.credentials.set_access(&access) {
            error!("Failed to store refreshed access token: {err}");
            self.expire_session();
            return RefreshOutcome::Expired;
        }

        info!("Access token refreshed");
        self.notifier
            .notify(Notification::success(SESSION_REFRESHED));
        RefreshOutcome::Refreshed
    }

    async fn request_access(&self, refresh: &SecretString) -> Result<SecretString, ClientError> {
        let span = info_span!(
            "auth.refresh",
            http.method = "POST",
            url = %self.refresh_url
        );
        let response = self
            .client
            .post(self.refresh_url.clone())
            .json(&RefreshRequest {
                refresh: refresh.expose_secret(),
            })
            .send()
            .instrument(span)
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    ClientError::Timeout(err)
                } else {
                    ClientError::Network(err)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Http {
                status: status.as_u16(),
                message: format!("Refresh rejected ({})", status.as_u16()),
                body: None,
            });
        }

        let body: RefreshResponse = response
            .json()
            .await
            .map_err(|err| ClientError::Parse(format!("Failed to decode refresh response: {err}")))?;

        Ok(SecretString::from(body.access))
    }

    /// Clears both tokens, then runs the login redirect.
    pub(crate) fn expire_session(&self) {
        if let Err(err) = self.credentials.clear() {
            error!("Failed to clear credentials: {err}");
        }
        self.redirect_to_login();
    }

    fn redirect_to_login(&self) {
        self.notifier
            .notify(Notification::warning(SESSION_EXPIRED));

        let current = self.navigator.current_path();
        if current == LOGIN_PATH {
            debug!("Already on {LOGIN_PATH}, not redirecting");
        } else {
            info!("Redirecting from {current} to {LOGIN_PATH}");
            self.navigator.push(LOGIN_PATH);
        }
    }
}

pub(crate) struct RefreshCoordinator {
    context: RefreshContext,
    state: Arc<Mutex<RefreshState>>,
}

impl RefreshCoordinator {
    pub(crate) fn new(context: RefreshContext) -> Self {
        Self {
            context,
            state: Arc::new(Mutex::new(RefreshState::Idle)),
        }
    }

    /// Runs the `401` protocol and returns once the session has either a
    /// fresh access token or has been expired.
    pub(crate) async fn handle_unauthorized(&self) -> RefreshOutcome {
        let flight = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            match &*state {
                RefreshState::Pending(flight) => {
                    debug!("Token refresh already in flight, waiting for it");
                    flight.clone()
                }
                RefreshState::Idle => {
                    let refresh = match self.context.credentials.refresh() {
                        Ok(refresh) => refresh.filter(|token| !token.expose_secret().is_empty()),
                        Err(err) => {
                            warn!("Failed to read refresh token: {err}");
                            None
                        }
                    };

                    let Some(refresh) = refresh else {
                        drop(state);
                        info!("No refresh token stored, session expired");
                        self.context.expire_session();
                        return RefreshOutcome::Expired;
                    };

                    let flight = self.spawn_exchange(refresh);
                    *state = RefreshState::Pending(flight.clone());
                    flight
                }
            }
        };

        let outcome = flight.clone().await;
        self.settle(&flight);
        outcome
    }

    /// Starts the exchange on its own task. The task resets the state to idle
    /// when done; it cannot take the lock before the caller has stored the
    /// returned future as pending, because the caller holds it while spawning.
    fn spawn_exchange(&self, refresh: SecretString) -> SharedRefresh {
        let context = self.context.clone();
        let state = Arc::clone(&self.state);

        tokio::spawn(async move {
            let outcome = context.exchange(refresh).await;
            *state.lock().unwrap_or_else(PoisonError::into_inner) = RefreshState::Idle;
            outcome
        })
        .map(|joined| {
            joined.unwrap_or_else(|err| {
                error!("Token refresh task failed: {err}");
                RefreshOutcome::Expired
            })
        })
        .boxed()
        .shared()
    }

    /// Returns to idle if `flight` is still the pending exchange.
    fn settle(&self, flight: &SharedRefresh) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let RefreshState::Pending(current) = &*state {
            if current.ptr_eq(flight) {
                *state = RefreshState::Idle;
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn is_pending(&self) -> bool {
        matches!(
            *self.state.lock().unwrap_or_else(PoisonError::into_inner),
            RefreshState::Pending(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        notify::MemoryNotifier,
        testing::{can_bind_localhost, credentials_with, RecordingNavigator},
    };
    use anyhow::Result;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct Fixture {
        coordinator: Arc<RefreshCoordinator>,
        credentials: Credentials,
        notifier: Arc<MemoryNotifier>,
        navigator: Arc<RecordingNavigator>,
    }

    fn fixture(server: &MockServer, credentials: Credentials) -> Result<Fixture> {
        let notifier = Arc::new(MemoryNotifier::new());
        let navigator = Arc::new(RecordingNavigator::at("/users"));
        let refresh_url = Url::parse(&format!("{}/api{REFRESH_PATH}", server.uri()))?;
        let coordinator = Arc::new(RefreshCoordinator::new(RefreshContext {
            client: Client::new(),
            refresh_url,
            credentials: credentials.clone(),
            notifier: notifier.clone(),
            navigator: navigator.clone(),
        }));
        Ok(Fixture {
            coordinator,
            credentials,
            notifier,
            navigator,
        })
    }

    #[tokio::test]
    async fn refresh_stores_new_access_and_keeps_refresh() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh/"))
            .and(body_json(json!({"refresh": "refresh-1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "NEW"})))
            .expect(1)
            .mount(&server)
            .await;

        let fx = fixture(&server, credentials_with(Some("old"), Some("refresh-1"))?)?;
        let outcome = fx.coordinator.handle_unauthorized().await;

        assert_eq!(outcome, RefreshOutcome::Refreshed);
        assert_eq!(
            fx.credentials.access()?.map(|s| s.expose_secret().to_string()),
            Some("NEW".to_string())
        );
        assert_eq!(
            fx.credentials.refresh()?.map(|s| s.expose_secret().to_string()),
            Some("refresh-1".to_string())
        );
        assert!(fx.navigator.pushes().is_empty());
        assert_eq!(
            fx.notifier.snapshot(),
            vec![Notification::success(SESSION_REFRESHED)]
        );
        assert!(!fx.coordinator.is_pending());
        Ok(())
    }

    #[tokio::test]
    async fn missing_refresh_token_expires_without_calling_api() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "NEW"})))
            .expect(0)
            .mount(&server)
            .await;

        let fx = fixture(&server, credentials_with(Some("old"), None)?)?;
        let outcome = fx.coordinator.handle_unauthorized().await;

        assert_eq!(outcome, RefreshOutcome::Expired);
        assert!(fx.credentials.access()?.is_none());
        assert_eq!(fx.navigator.pushes(), vec![LOGIN_PATH.to_string()]);
        assert_eq!(
            fx.notifier.snapshot(),
            vec![Notification::warning(SESSION_EXPIRED)]
        );
        Ok(())
    }

    #[tokio::test]
    async fn no_redirect_when_already_on_login() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        let fx = fixture(&server, credentials_with(Some("old"), None)?)?;
        fx.navigator.set_current(LOGIN_PATH);

        let outcome = fx.coordinator.handle_unauthorized().await;

        assert_eq!(outcome, RefreshOutcome::Expired);
        assert!(fx.navigator.pushes().is_empty());
        assert_eq!(
            fx.notifier.snapshot(),
            vec![Notification::warning(SESSION_EXPIRED)]
        );
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_unauthorized_share_one_exchange() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access": "NEW"}))
                    .set_delay(Duration::from_millis(200)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let fx = fixture(&server, credentials_with(Some("old"), Some("refresh-1"))?)?;
        let (first, second, third) = tokio::join!(
            fx.coordinator.handle_unauthorized(),
            fx.coordinator.handle_unauthorized(),
            fx.coordinator.handle_unauthorized(),
        );

        assert_eq!(first, RefreshOutcome::Refreshed);
        assert_eq!(second, RefreshOutcome::Refreshed);
        assert_eq!(third, RefreshOutcome::Refreshed);
        assert_eq!(fx.notifier.snapshot().len(), 1);
        assert!(!fx.coordinator.is_pending());
        Ok(())
    }

    #[tokio::test]
    async fn failed_exchange_clears_and_redirects_once() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh/"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"detail": "Token is invalid or expired"}))
                    .set_delay(Duration::from_millis(100)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let fx = fixture(&server, credentials_with(Some("old"), Some("stale"))?)?;
        let (first, second) = tokio::join!(
            fx.coordinator.handle_unauthorized(),
            fx.coordinator.handle_unauthorized(),
        );

        assert_eq!(first, RefreshOutcome::Expired);
        assert_eq!(second, RefreshOutcome::Expired);
        assert!(fx.credentials.access()?.is_none());
        assert!(fx.credentials.refresh()?.is_none());
        assert_eq!(fx.navigator.pushes(), vec![LOGIN_PATH.to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_refresh_body_expires_session() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "wrong"})))
            .mount(&server)
            .await;

        let fx = fixture(&server, credentials_with(Some("old"), Some("refresh-1"))?)?;
        let outcome = fx.coordinator.handle_unauthorized().await;

        assert_eq!(outcome, RefreshOutcome::Expired);
        assert!(fx.credentials.refresh()?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn empty_refresh_token_expires_without_calling_api() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "NEW"})))
            .expect(0)
            .mount(&server)
            .await;

        let fx = fixture(&server, credentials_with(Some("old"), Some(""))?)?;
        let outcome = fx.coordinator.handle_unauthorized().await;

        assert_eq!(outcome, RefreshOutcome::Expired);
        assert!(fx.credentials.access()?.is_none());
        assert_eq!(fx.navigator.pushes(), vec![LOGIN_PATH.to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn exchange_completes_after_waiter_is_dropped() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh/"))
            .and(body_json(json!({"refresh": "refresh-1"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access": "NEW"}))
                    .set_delay(Duration::from_millis(300)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let fx = fixture(&server, credentials_with(Some("old"), Some("refresh-1"))?)?;
        let abandoned = tokio::time::timeout(
            Duration::from_millis(50),
            fx.coordinator.handle_unauthorized(),
        )
        .await;
        assert!(abandoned.is_err());

        for _ in 0..40 {
            if !fx.coordinator.is_pending() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        assert!(!fx.coordinator.is_pending());
        assert_eq!(
            fx.credentials.access()?.map(|s| s.expose_secret().to_string()),
            Some("NEW".to_string())
        );
        assert_eq!(
            fx.credentials.refresh()?.map(|s| s.expose_secret().to_string()),
            Some("refresh-1".to_string())
        );
        assert!(fx.navigator.pushes().is_empty());
        assert_eq!(
            fx.notifier.snapshot(),
            vec![Notification::success(SESSION_REFRESHED)]
        );
        Ok(())
    }

    #[tokio::test]
    async fn settled_exchange_allows_a_new_one() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "NEW"})))
            .expect(2)
            .mount(&server)
            .await;

        let fx = fixture(&server, credentials_with(Some("old"), Some("refresh-1"))?)?;
        assert_eq!(
            fx.coordinator.handle_unauthorized().await,
            RefreshOutcome::Refreshed
        );
        assert_eq!(
            fx.coordinator.handle_unauthorized().await,
            RefreshOutcome::Refreshed
        );
        Ok(())
    }
}
