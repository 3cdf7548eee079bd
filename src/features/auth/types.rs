//! Request and response types for the auth endpoints. Passwords and tokens
//! pass through these payloads, so their `Debug` output is redacted.

use crate::{
    features::rbac::types::{null_as_empty, Role},
    storage::CredentialPair,
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Clone, Default, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Account record returned by `/auth/me/`, login, register and `/users/`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub date_joined: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub roles: Vec<Role>,
}

impl UserInfo {
    /// Full name when the server supplied a non-empty one, else the username.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => &self.username,
        }
    }
}

/// Answer of login and register.
#[derive(Clone, Deserialize)]
pub struct AuthResponse {
    pub access: String,
    pub refresh: String,
    pub user: UserInfo,
}

impl AuthResponse {
    #[must_use]
    pub fn credential_pair(&self) -> CredentialPair {
        CredentialPair {
            access: SecretString::from(self.access.clone()),
            refresh: SecretString::from(self.refresh.clone()),
        }
    }
}

impl std::fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResponse")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
pub(crate) struct RefreshBody<'a> {
    pub(crate) refresh: &'a str,
}

#[derive(Clone, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}

impl std::fmt::Debug for RefreshResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshResponse").finish_non_exhaustive()
    }
}

/// Server acknowledgement such as `{"detail": "..."}`.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Detail {
    #[serde(default)]
    pub detail: Option<String>,
}
