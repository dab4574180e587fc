//! SQLite-backed tenant store and credential resolver.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use orbu_core::CredentialResolver;
use orbu_domain::{GatewayError, Result, TenantConnectionParams, TenantId};
use rusqlite::{params, OptionalExtension, Row};
use tokio::task;
use tracing::{debug, error};

use super::columns::{to_i64, to_millis, uuid_at};
use super::manager::{map_sql_error, DbManager, SqliteConnection};
use crate::errors::map_join_error;

const TENANT_SELECT_SQL: &str = "SELECT id, base_url, tenant_code, branch, username, password,
        endpoint_name, endpoint_version, locale, verify_ssl, timeout_secs,
        rate_limit_per_second, persistent_login, retry_on_idle_logout, is_active
    FROM tenants WHERE id = ?1";

const TENANT_INSERT_SQL: &str = "INSERT INTO tenants (
        id, name, base_url, tenant_code, branch, username, password, endpoint_name,
        endpoint_version, locale, verify_ssl, timeout_secs, rate_limit_per_second,
        persistent_login, retry_on_idle_logout, is_active, created_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, 1, ?16)";

/// Tenant rows with their stored connection parameters.
pub struct SqliteTenantRepository {
    db: Arc<DbManager>,
}

impl SqliteTenantRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Store a new, active tenant.
    pub async fn insert_tenant(&self, name: &str, params: &TenantConnectionParams) -> Result<()> {
        let db = Arc::clone(&self.db);
        let name = name.to_string();
        let params = params.clone();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            insert_tenant(&conn, &name, &params)
        })
        .await
        .map_err(map_join_error)?
    }

    /// Enable or disable a tenant. Returns `false` when it does not exist.
    pub async fn set_active(&self, tenant_id: TenantId, active: bool) -> Result<bool> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<bool> {
            let conn = db.get_connection()?;
            let updated = conn
                .execute(
                    "UPDATE tenants SET is_active = ?2 WHERE id = ?1",
                    params![tenant_id.to_string(), active],
                )
                .map_err(map_sql_error)?;
            Ok(updated > 0)
        })
        .await
        .map_err(map_join_error)?
    }
}

fn insert_tenant(
    conn: &SqliteConnection,
    name: &str,
    params: &TenantConnectionParams,
) -> Result<()> {
    conn.execute(
        TENANT_INSERT_SQL,
        params![
            params.tenant_id.to_string(),
            name,
            params.base_url,
            params.tenant_code,
            params.branch,
            params.username,
            params.password,
            params.endpoint_name,
            params.endpoint_version,
            params.locale,
            params.verify_ssl,
            to_i64(params.timeout_secs),
            params.rate_limit_per_second,
            params.persistent_login,
            params.retry_on_idle_logout,
            to_millis(Utc::now()),
        ],
    )
    .map_err(map_sql_error)?;
    Ok(())
}

struct StoredTenant {
    params: TenantConnectionParams,
    is_active: bool,
}

fn map_tenant_row(row: &Row<'_>) -> rusqlite::Result<StoredTenant> {
    let timeout: i64 = row.get(10)?;
    Ok(StoredTenant {
        params: TenantConnectionParams {
            tenant_id: uuid_at(row, 0)?,
            base_url: row.get(1)?,
            tenant_code: row.get(2)?,
            branch: row.get(3)?,
            username: row.get(4)?,
            password: row.get(5)?,
            endpoint_name: row.get(6)?,
            endpoint_version: row.get(7)?,
            locale: row.get(8)?,
            verify_ssl: row.get(9)?,
            timeout_secs: u64::try_from(timeout).unwrap_or_default(),
            rate_limit_per_second: row.get(11)?,
            persistent_login: row.get(12)?,
            retry_on_idle_logout: row.get(13)?,
        },
        is_active: row.get(14)?,
    })
}

#[async_trait]
impl CredentialResolver for SqliteTenantRepository {
    async fn resolve(&self, tenant_id: TenantId) -> Result<TenantConnectionParams> {
        let db = Arc::clone(&self.db);

        let stored = task::spawn_blocking(move || -> Result<Option<StoredTenant>> {
            let conn = db.get_connection()?;
            conn.query_row(TENANT_SELECT_SQL, params![tenant_id.to_string()], map_tenant_row)
                .optional()
                .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)??;

        let Some(stored) = stored else {
            return Err(GatewayError::NotFound(format!("Tenant {tenant_id} not found")));
        };

        if !stored.is_active {
            return Err(GatewayError::ConnectionFailure(format!("Tenant {tenant_id} is inactive")));
        }

        if stored.params.username.is_empty() || stored.params.password.is_empty() {
            error!(tenant_id = %tenant_id, "Stored tenant credentials are unusable");
            return Err(GatewayError::ConnectionFailure(
                "Failed to decrypt tenant credentials. Recreate the tenant with valid credentials."
                    .to_string(),
            ));
        }

        debug!(tenant_id = %tenant_id, "Resolved tenant credentials");
        Ok(stored.params)
    }
}
