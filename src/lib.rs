//! Client for the CrewAI platform admin API.
//!
//! ## Session flow
//!
//! 1. **Login:** `POST /auth/login/` returns an access/refresh pair that is
//!    written to the credential store under the `access` and `refresh` keys.
//! 2. **Requests:** every call made through [`transport::Transport`] carries
//!    `Authorization: Bearer <access>` while an access token is stored.
//! 3. **Expiry:** a `401` triggers one refresh exchange against
//!    `POST /auth/refresh/`. Concurrent `401`s join the exchange already in
//!    flight instead of starting their own.
//! 4. **Re-login:** when no refresh token exists or the exchange fails, both
//!    tokens are cleared and the router is sent to `/login`.
//!
//! Navigation is gated by [`router::Router`], which only checks for the
//! presence of an access token. Token validity is always decided by the API.

pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod errors;
pub mod features;
pub mod notify;
pub mod router;
pub mod storage;
pub mod transport;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub(crate) mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub use app::Console;
pub use errors::ClientError;

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
pub(crate) mod testing;
