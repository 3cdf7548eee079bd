//! Client wrappers for the user, role and permission endpoints. All calls go
//! through the authenticated [`Transport`], so failures are already notified
//! by the time they are returned here.

use crate::{
    errors::ClientError,
    features::{
        auth::types::UserInfo,
        rbac::types::{
            Permission, PermissionPayload, Role, RolePayload, RolePermission,
            RolePermissionAssignment, UserPayload, UserRole, UserRoleAssignment,
        },
        resource::{Assignments, Resource},
    },
    transport::Transport,
};

pub const USERS_PATH: &str = "/users/";
pub const ROLES_PATH: &str = "/roles/";
pub const PERMISSIONS_PATH: &str = "/permissions/";
pub const USER_ROLES_PATH: &str = "/user-roles/";
pub const ROLE_PERMISSIONS_PATH: &str = "/role-permissions/";

/// Every RBAC collection behind one handle.
#[derive(Clone, Debug)]
pub struct RbacClient {
    pub users: Resource<UserInfo, UserPayload>,
    pub roles: Resource<Role, RolePayload>,
    pub permissions: Resource<Permission, PermissionPayload>,
    pub user_roles: Assignments<UserRole, UserRoleAssignment>,
    pub role_permissions: Assignments<RolePermission, RolePermissionAssignment>,
}

impl RbacClient {
    #[must_use]
    pub fn new(transport: &Transport) -> Self {
        Self {
            users: Resource::new(transport.clone(), USERS_PATH),
            roles: Resource::new(transport.clone(), ROLES_PATH),
            permissions: Resource::new(transport.clone(), PERMISSIONS_PATH),
            user_roles: Assignments::new(transport.clone(), USER_ROLES_PATH),
            role_permissions: Assignments::new(transport.clone(), ROLE_PERMISSIONS_PATH),
        }
    }

    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn assign_role(&self, user: i64, role: i64) -> Result<UserRole, ClientError> {
        self.user_roles
            .assign(&UserRoleAssignment { user, role })
            .await
    }

    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn grant_permission(
        &self,
        role: i64,
        permission: i64,
    ) -> Result<RolePermission, ClientError> {
        self.role_permissions
            .assign(&RolePermissionAssignment { role, permission })
            .await
    }
}
