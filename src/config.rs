//! Build-time configuration for the API endpoint with a runtime override.
//! Build-time values come from `CREWADMIN_SERVER_URL` and
//! `CREWADMIN_API_BASE_URL` at compile time; the same variables read from the
//! process environment replace them at runtime so one binary can target
//! several deployments. Configuration values are public; do not store
//! secrets here.

use crate::errors::ClientError;
use std::time::Duration;
use url::Url;

pub const ENV_SERVER_URL: &str = "CREWADMIN_SERVER_URL";
pub const ENV_API_BASE_URL: &str = "CREWADMIN_API_BASE_URL";

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";
/// API base path used when nothing else is configured.
pub const DEFAULT_API_BASE: &str = "/api";
/// Request timeout (milliseconds) applied to every outbound call.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Client configuration derived from build-time environment variables.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Origin of the admin server, e.g. `http://127.0.0.1:8000`.
    pub server_url: String,
    /// API base. A path is resolved against `server_url`; an absolute URL is used as is.
    pub api_base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            api_base_url: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl ClientConfig {
    /// Loads config from build-time environment variables and applies runtime overrides.
    #[must_use]
    pub fn load() -> Self {
        let server_url = option_env!("CREWADMIN_SERVER_URL").unwrap_or(DEFAULT_SERVER_URL);
        let api_base_url = option_env!("CREWADMIN_API_BASE_URL").unwrap_or(DEFAULT_API_BASE);

        let mut config = Self {
            server_url: server_url.to_string(),
            api_base_url: api_base_url.to_string(),
            ..Self::default()
        };

        config.apply(runtime_config());

        config
    }

    /// Builds a config that talks to `server_url` with the default API base.
    #[must_use]
    pub fn for_server(server_url: &str) -> Self {
        Self {
            server_url: server_url.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replaces values for which the override carries a non-empty setting.
    pub fn apply(&mut self, runtime: RuntimeConfig) {
        if let Some(value) = runtime.server_url {
            self.server_url = value;
        }
        if let Some(value) = runtime.api_base_url {
            self.api_base_url = value;
        }
    }

    /// Resolved API base URL, without a trailing slash.
    #[must_use]
    pub fn api_base(&self) -> String {
        let base = self.api_base_url.trim();
        if base.starts_with("http://") || base.starts_with("https://") {
            base.trim_end_matches('/').to_string()
        } else {
            build_url_with_base(&self.server_url, base)
                .trim_end_matches('/')
                .to_string()
        }
    }

    /// Builds the absolute URL for an API path such as `/auth/refresh/`.
    ///
    /// # Errors
    /// Returns [`ClientError::Config`] when the configured server or base does not form a valid URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        let raw = build_url_with_base(&self.api_base(), path);
        Url::parse(&raw).map_err(|err| ClientError::Config(format!("invalid API URL {raw}: {err}")))
    }
}

/// Optional overrides, normalized so that blank values are ignored.
#[derive(Clone, Debug, Default)]
pub struct RuntimeConfig {
    pub server_url: Option<String>,
    pub api_base_url: Option<String>,
}

impl RuntimeConfig {
    #[must_use]
    pub fn new(server_url: Option<&str>, api_base_url: Option<&str>) -> Self {
        Self {
            server_url: server_url.and_then(normalize_runtime_value),
            api_base_url: api_base_url.and_then(normalize_runtime_value),
        }
    }
}

fn runtime_config() -> RuntimeConfig {
    let server_url = std::env::var(ENV_SERVER_URL).ok();
    let api_base_url = std::env::var(ENV_API_BASE_URL).ok();
    RuntimeConfig::new(server_url.as_deref(), api_base_url.as_deref())
}

fn normalize_runtime_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Joins a base URL and a path with exactly one slash between them.
fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn normalize_runtime_value_trims_and_rejects_empty() {
        assert_eq!(normalize_runtime_value(""), None);
        assert_eq!(normalize_runtime_value("   "), None);
        assert_eq!(
            normalize_runtime_value("  https://admin.example.com "),
            Some("https://admin.example.com".to_string())
        );
    }

    #[test]
    fn apply_ignores_empty_values() {
        let mut config = ClientConfig::for_server("https://admin.default");
        config.apply(RuntimeConfig::new(Some(""), Some("  ")));

        assert_eq!(config.server_url, "https://admin.default");
        assert_eq!(config.api_base_url, DEFAULT_API_BASE);
    }

    #[test]
    fn apply_overwrites_when_present() {
        let mut config = ClientConfig::for_server("https://admin.default");
        config.apply(RuntimeConfig::new(
            Some("https://admin.override"),
            Some("/v2/api"),
        ));

        assert_eq!(config.server_url, "https://admin.override");
        assert_eq!(config.api_base_url, "/v2/api");
    }

    #[test]
    fn load_reads_runtime_environment() {
        temp_env::with_vars(
            [
                (ENV_SERVER_URL, Some("https://admin.runtime")),
                (ENV_API_BASE_URL, None::<&str>),
            ],
            || {
                let config = ClientConfig::load();
                assert_eq!(config.server_url, "https://admin.runtime");
                assert_eq!(config.api_base_url, DEFAULT_API_BASE);
                assert_eq!(config.timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
            },
        );
    }

    #[test]
    fn endpoint_joins_server_base_and_path() -> Result<()> {
        let config = ClientConfig::for_server("http://localhost:8000/");
        let url = config.endpoint("/auth/refresh/")?;
        assert_eq!(url.as_str(), "http://localhost:8000/api/auth/refresh/");

        let url = config.endpoint("users/")?;
        assert_eq!(url.as_str(), "http://localhost:8000/api/users/");
        Ok(())
    }

    #[test]
    fn endpoint_uses_absolute_api_base_as_is() -> Result<()> {
        let mut config = ClientConfig::for_server("http://ignored:1");
        config.apply(RuntimeConfig::new(None, Some("https://api.example.com/v1/")));

        let url = config.endpoint("/dashboard/")?;
        assert_eq!(url.as_str(), "https://api.example.com/v1/dashboard/");
        Ok(())
    }

    #[test]
    fn endpoint_rejects_invalid_server() {
        let config = ClientConfig::for_server("not a url");
        let result = config.endpoint("/users/");
        assert!(matches!(result, Err(ClientError::Config(_))));
    }
}
