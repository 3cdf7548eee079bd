//! Client wrappers for the auth endpoints.

use crate::{
    errors::ClientError,
    features::auth::types::{
        AuthResponse, Detail, LoginRequest, RefreshBody, RefreshResponse, RegisterRequest,
        UserInfo,
    },
    transport::{refresh::REFRESH_PATH, Transport},
};
use secrecy::{ExposeSecret, SecretString};

pub const REGISTER_ENDPOINT: &str = "/auth/register/";
pub const LOGIN_ENDPOINT: &str = "/auth/login/";
pub const LOGOUT_ENDPOINT: &str = "/auth/logout/";
pub const CURRENT_USER_ENDPOINT: &str = "/auth/me/";

#[derive(Clone, Debug)]
pub struct AuthClient {
    transport: Transport,
}

impl AuthClient {
    #[must_use]
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Creates an account and returns a token pair for it.
    ///
    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        self.transport.post_json(REGISTER_ENDPOINT, request).await
    }

    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ClientError> {
        self.transport.post_json(LOGIN_ENDPOINT, request).await
    }

    /// Blacklists `refresh` on the server.
    ///
    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn logout(&self, refresh: &SecretString) -> Result<Detail, ClientError> {
        let body = RefreshBody {
            refresh: refresh.expose_secret(),
        };
        self.transport.post_json(LOGOUT_ENDPOINT, &body).await
    }

    /// Explicit refresh exchange. The transport runs its own exchange on
    /// `401`; this is for callers that want to renew ahead of time.
    ///
    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn refresh_token(
        &self,
        refresh: &SecretString,
    ) -> Result<RefreshResponse, ClientError> {
        let body = RefreshBody {
            refresh: refresh.expose_secret(),
        };
        self.transport.post_json(REFRESH_PATH, &body).await
    }

    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn current_user(&self) -> Result<UserInfo, ClientError> {
        self.transport.get_json(CURRENT_USER_ENDPOINT).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ClientConfig,
        notify::{MemoryNotifier, Notifier},
        router::{Navigator, LOGIN_PATH},
        testing::{can_bind_localhost, credentials_with, RecordingNavigator},
    };
    use anyhow::Result;
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> Result<AuthClient> {
        let transport = Transport::new(
            ClientConfig::for_server(&server.uri()),
            credentials_with(None, None)?,
            Arc::new(MemoryNotifier::new()) as Arc<dyn Notifier>,
            Arc::new(RecordingNavigator::at(LOGIN_PATH)) as Arc<dyn Navigator>,
        )?;
        Ok(AuthClient::new(transport))
    }

    #[tokio::test]
    async fn register_omits_empty_profile_fields() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/register/"))
            .and(body_json(json!({
                "username": "carol",
                "password": "pw",
                "password_confirm": "pw"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "access": "A1",
                "refresh": "R1",
                "user": {"id": 3, "username": "carol", "roles": null}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = client(&server)?
            .register(&RegisterRequest {
                username: "carol".to_string(),
                password: "pw".to_string(),
                password_confirm: "pw".to_string(),
                ..RegisterRequest::default()
            })
            .await?;

        assert_eq!(response.user.username, "carol");
        assert!(response.user.roles.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn refresh_token_posts_refresh_body() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh/"))
            .and(body_json(json!({"refresh": "R1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "A9"})))
            .expect(1)
            .mount(&server)
            .await;

        let response = client(&server)?
            .refresh_token(&SecretString::from("R1"))
            .await?;

        assert_eq!(response.access, "A9");
        Ok(())
    }
}
