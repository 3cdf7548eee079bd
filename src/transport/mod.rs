//! Authenticated HTTP transport for the admin API.
//!
//! Every request goes through [`Transport`], which attaches the stored access
//! token, turns non-success answers into [`ClientError`] values and emits one
//! notification per failure. A `401` additionally runs the refresh protocol
//! in [`refresh`] before the error reaches the caller.

mod failure;
pub mod refresh;
pub mod retry;

use crate::{
    config::ClientConfig,
    errors::ClientError,
    notify::{Notification, Notifier, NETWORK_ERROR, TIMEOUT},
    router::Navigator,
    storage::{redact, Credentials},
    APP_USER_AGENT,
};
use refresh::{RefreshContext, RefreshCoordinator, REFRESH_PATH};
use reqwest::{
    header::{HeaderValue, CONTENT_TYPE},
    Client, Method, RequestBuilder, Response, StatusCode,
};
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::{debug, info_span, warn, Instrument};

pub use refresh::RefreshOutcome;
pub use retry::{retry_request, retry_with_defaults, DEFAULT_RETRIES, DEFAULT_RETRY_DELAY};

/// Cheap to clone; clones share the HTTP client and the refresh state.
#[derive(Clone)]
pub struct Transport {
    inner: Arc<Inner>,
}

struct Inner {
    client: Client,
    config: ClientConfig,
    credentials: Credentials,
    notifier: Arc<dyn Notifier>,
    refresh: RefreshCoordinator,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("api_base", &self.inner.config.api_base())
            .field("timeout", &self.inner.config.timeout)
            .finish_non_exhaustive()
    }
}

impl Transport {
    /// # Errors
    /// Returns [`ClientError::Config`] if the API base does not form a valid
    /// URL or the HTTP client cannot be built.
    pub fn new(
        config: ClientConfig,
        credentials: Credentials,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|err| ClientError::Config(format!("failed to build HTTP client: {err}")))?;

        let refresh_url = config.endpoint(REFRESH_PATH)?;
        let refresh = RefreshCoordinator::new(RefreshContext {
            client: client.clone(),
            refresh_url,
            credentials: credentials.clone(),
            notifier: notifier.clone(),
            navigator,
        });

        Ok(Self {
            inner: Arc::new(Inner {
                client,
                config,
                credentials,
                notifier,
                refresh,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.inner.credentials
    }

    /// # Errors
    /// Returns the transport, status or decode failure of the call.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.execute(Method::GET, path, |request| request).await?;
        decode(response).await
    }

    /// GET with `query` serialized into the query string.
    ///
    /// # Errors
    /// Returns the transport, status or decode failure of the call.
    pub async fn get_json_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self
            .execute(Method::GET, path, |request| request.query(query))
            .await?;
        decode(response).await
    }

    /// # Errors
    /// Returns the transport, status or decode failure of the call.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = encode(body)?;
        let response = self
            .execute(Method::POST, path, |request| request.body(payload))
            .await?;
        decode(response).await
    }

    /// POST without a body.
    ///
    /// # Errors
    /// Returns the transport, status or decode failure of the call.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.execute(Method::POST, path, |request| request).await?;
        decode(response).await
    }

    /// # Errors
    /// Returns the transport, status or decode failure of the call.
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = encode(body)?;
        let response = self
            .execute(Method::PUT, path, |request| request.body(payload))
            .await?;
        decode(response).await
    }

    /// # Errors
    /// Returns the transport, status or decode failure of the call.
    pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = encode(body)?;
        let response = self
            .execute(Method::PATCH, path, |request| request.body(payload))
            .await?;
        decode(response).await
    }

    /// DELETE; whatever body the server sends back is discarded.
    ///
    /// # Errors
    /// Returns the transport or status failure of the call.
    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.execute(Method::DELETE, path, |request| request).await?;
        Ok(())
    }

    /// Adds the bearer header when a non-empty access token is stored.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let access = match self.inner.credentials.access() {
            Ok(access) => access,
            Err(err) => {
                warn!("Failed to read access token, sending unauthenticated: {err}");
                None
            }
        };

        match access {
            Some(token) if !token.expose_secret().is_empty() => {
                debug!("Attaching bearer token {}", redact(&token));
                request.bearer_auth(token.expose_secret())
            }
            _ => request,
        }
    }

    async fn execute<F>(&self, method: Method, path: &str, build: F) -> Result<Response, ClientError>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let url = self.inner.config.endpoint(path)?;
        let span = info_span!(
            "http.request",
            http.method = %method,
            url = %url,
            http.status_code = tracing::field::Empty
        );

        let request = self
            .inner
            .client
            .request(method, url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let request = build(self.authorize(request));

        let result = request.send().instrument(span.clone()).await;
        match result {
            Ok(response) => {
                span.record("http.status_code", response.status().as_u16());
                if response.status().is_success() {
                    Ok(response)
                } else {
                    Err(self.reject(response).instrument(span).await)
                }
            }
            Err(err) => Err(self.transport_failure(err)),
        }
    }

    fn transport_failure(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            warn!("Request timed out: {err}");
            self.inner.notifier.notify(Notification::error(TIMEOUT));
            ClientError::Timeout(err)
        } else {
            warn!("Request failed without a response: {err}");
            self.inner.notifier.notify(Notification::error(NETWORK_ERROR));
            ClientError::Network(err)
        }
    }

    async fn reject(&self, response: Response) -> ClientError {
        let status = response.status();
        let body = failure::read_error_body(response).await;
        let message = failure::error_message(status, body.as_ref());

        if status == StatusCode::UNAUTHORIZED {
            let outcome = self.inner.refresh.handle_unauthorized().await;
            debug!("Unauthorized response settled with {outcome:?}");
        } else {
            warn!("Request failed with status {}: {}", status.as_u16(), message);
            self.inner.notifier.notify(Notification::error(
                failure::notification_message(status, body.as_ref()),
            ));
        }

        ClientError::Http {
            status: status.as_u16(),
            message,
            body,
        }
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Vec<u8>, ClientError> {
    serde_json::to_vec(body)
        .map_err(|err| ClientError::Serialization(format!("Failed to encode request body: {err}")))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|err| ClientError::Parse(format!("Failed to read response body: {err}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|err| ClientError::Parse(format!("Failed to decode response body: {err}")))
}
