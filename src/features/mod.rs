//! Typed clients for the admin API, grouped by feature.

pub mod auth;
pub mod crew;
pub mod dashboard;
pub mod envelope;
pub mod rbac;
pub mod resource;

pub use envelope::ListEnvelope;
pub use resource::{Assignments, Resource};
