//! Connection pool diagnostics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::tenant::TenantId;

/// Snapshot of one cached tenant session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PooledConnectionInfo {
    pub tenant_id: TenantId,
    pub last_used_at: DateTime<Utc>,
    pub age_minutes: f64,
}

/// Eventually-consistent view of the session pool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolStatus {
    pub active_connections: usize,
    pub connections: Vec<PooledConnectionInfo>,
}
