pub mod client;
pub mod state;
pub mod types;

pub use client::AuthClient;
pub use state::{Session, SessionState};
pub use types::{AuthResponse, LoginRequest, RegisterRequest, UserInfo};
