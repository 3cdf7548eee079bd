//! Dashboard counters.

use crate::{errors::ClientError, transport::Transport};
use serde::{Deserialize, Serialize};

pub const DASHBOARD_ENDPOINT: &str = "/dashboard/";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(default)]
    pub user_count: u64,
    #[serde(default)]
    pub role_count: u64,
    #[serde(default)]
    pub permission_count: u64,
    #[serde(default)]
    pub active_user_count: u64,
    #[serde(default)]
    pub staff_count: u64,
}

#[derive(Clone, Debug)]
pub struct DashboardClient {
    transport: Transport,
}

impl DashboardClient {
    #[must_use]
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn stats(&self) -> Result<DashboardStats, ClientError> {
        self.transport.get_json(DASHBOARD_ENDPOINT).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;

    #[test]
    fn decodes_camel_case_counters() -> Result<()> {
        let stats: DashboardStats = serde_json::from_value(json!({
            "userCount": 12,
            "roleCount": 3,
            "permissionCount": 20,
            "activeUserCount": 10,
            "staffCount": 2
        }))?;

        assert_eq!(
            stats,
            DashboardStats {
                user_count: 12,
                role_count: 3,
                permission_count: 20,
                active_user_count: 10,
                staff_count: 2,
            }
        );
        Ok(())
    }
}
