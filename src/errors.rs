use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("config error: {0}")]
    Config(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("request timed out: {0}")]
    Timeout(#[source] reqwest::Error),
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
    #[error("request failed ({status}): {message}")]
    Http {
        status: u16,
        message: String,
        body: Option<Value>,
    },
    #[error("response error: {0}")]
    Parse(String),
    #[error("request error: {0}")]
    Serialization(String),
    #[error("navigation error: {0}")]
    Navigation(String),
}

impl ClientError {
    /// HTTP status of the failed response, if one was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// True for failures where no response was received at all.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Network(_))
    }
}
