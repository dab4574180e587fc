//! Tenant connection types

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a configured tenant ("client") on the remote ERP.
pub type TenantId = Uuid;

/// Decrypted connection parameters for one tenant.
///
/// Produced by the credential resolver for every new session and never
/// persisted by the core. `Debug` output redacts the password.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantConnectionParams {
    pub tenant_id: TenantId,
    pub base_url: String,
    /// Company/tenant code on the remote instance.
    pub tenant_code: String,
    pub branch: Option<String>,
    pub username: String,
    pub password: String,
    pub endpoint_name: String,
    pub endpoint_version: Option<String>,
    pub locale: String,
    pub verify_ssl: bool,
    pub timeout_secs: u64,
    pub rate_limit_per_second: f64,
    pub persistent_login: bool,
    pub retry_on_idle_logout: bool,
}

impl TenantConnectionParams {
    /// Parameters with the remote client's usual defaults.
    pub fn new(
        tenant_id: TenantId,
        base_url: impl Into<String>,
        tenant_code: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id,
            base_url: base_url.into(),
            tenant_code: tenant_code.into(),
            branch: None,
            username: username.into(),
            password: password.into(),
            endpoint_name: "Default".to_string(),
            endpoint_version: None,
            locale: "en-US".to_string(),
            verify_ssl: true,
            timeout_secs: 60,
            rate_limit_per_second: 10.0,
            persistent_login: true,
            retry_on_idle_logout: true,
        }
    }
}

impl fmt::Debug for TenantConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantConnectionParams")
            .field("tenant_id", &self.tenant_id)
            .field("base_url", &self.base_url)
            .field("tenant_code", &self.tenant_code)
            .field("branch", &self.branch)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("endpoint_name", &self.endpoint_name)
            .field("endpoint_version", &self.endpoint_version)
            .field("locale", &self.locale)
            .field("verify_ssl", &self.verify_ssl)
            .field("timeout_secs", &self.timeout_secs)
            .field("rate_limit_per_second", &self.rate_limit_per_second)
            .field("persistent_login", &self.persistent_login)
            .field("retry_on_idle_logout", &self.retry_on_idle_logout)
            .finish()
    }
}
