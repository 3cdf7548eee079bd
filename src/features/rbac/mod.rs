pub mod client;
pub mod types;

pub use client::RbacClient;
pub use types::{ListQuery, Permission, Role, RolePermission, UserRole};
