//! SQLite-backed service groups and endpoint definitions.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use orbu_core::{EndpointRegistrar, EndpointResolver};
use orbu_domain::{
    EndpointDefinition, EndpointId, NewEndpoint, Result, ServiceGroup, ServiceGroupId, TenantId,
};
use rusqlite::{params, OptionalExtension, Row};
use tokio::task;
use tracing::info;
use uuid::Uuid;

use super::columns::{json_at, to_millis, uuid_at};
use super::manager::{map_sql_error, DbManager, SqliteConnection};
use crate::errors::map_join_error;

const ENDPOINT_COLUMNS: &str = "id, tenant_id, service_group_id, service_name, method_name,
    display_name, is_active, request_schema, response_schema, log_retention_hours";

/// Endpoint catalogue stored in SQLite.
pub struct SqliteEndpointRepository {
    db: Arc<DbManager>,
}

impl SqliteEndpointRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Create an active service group for a tenant.
    pub async fn create_service_group(&self, tenant_id: TenantId, name: &str) -> Result<ServiceGroup> {
        let db = Arc::clone(&self.db);
        let group = ServiceGroup { id: Uuid::now_v7(), tenant_id, name: name.to_string(), is_active: true };
        let stored = group.clone();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT INTO service_groups (id, tenant_id, name, is_active, created_at)
                 VALUES (?1, ?2, ?3, 1, ?4)",
                params![
                    stored.id.to_string(),
                    stored.tenant_id.to_string(),
                    stored.name,
                    to_millis(Utc::now())
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)??;

        info!(tenant_id = %tenant_id, group = %group.name, "Created service group");
        Ok(group)
    }

    /// Enable or disable a service group. Returns `false` when it does not exist.
    pub async fn set_service_group_active(&self, group_id: ServiceGroupId, active: bool) -> Result<bool> {
        self.set_flag("UPDATE service_groups SET is_active = ?2 WHERE id = ?1", group_id, active).await
    }

    /// Enable or disable an endpoint. Returns `false` when it does not exist.
    pub async fn set_endpoint_active(&self, endpoint_id: EndpointId, active: bool) -> Result<bool> {
        self.set_flag("UPDATE endpoints SET is_active = ?2 WHERE id = ?1", endpoint_id, active).await
    }

    async fn set_flag(&self, sql: &'static str, id: Uuid, active: bool) -> Result<bool> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<bool> {
            let conn = db.get_connection()?;
            let updated = conn.execute(sql, params![id.to_string(), active]).map_err(map_sql_error)?;
            Ok(updated > 0)
        })
        .await
        .map_err(map_join_error)?
    }

    fn query_endpoints(
        conn: &SqliteConnection,
        filter: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<EndpointDefinition>> {
        let sql = format!("SELECT {ENDPOINT_COLUMNS} FROM endpoints {filter}");
        let mut stmt = conn.prepare(&sql).map_err(map_sql_error)?;
        let rows = stmt.query_map(args, map_endpoint_row).map_err(map_sql_error)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
    }
}

fn map_group_row(row: &Row<'_>) -> rusqlite::Result<ServiceGroup> {
    Ok(ServiceGroup {
        id: uuid_at(row, 0)?,
        tenant_id: uuid_at(row, 1)?,
        name: row.get(2)?,
        is_active: row.get(3)?,
    })
}

fn map_endpoint_row(row: &Row<'_>) -> rusqlite::Result<EndpointDefinition> {
    Ok(EndpointDefinition {
        id: uuid_at(row, 0)?,
        tenant_id: uuid_at(row, 1)?,
        service_group_id: uuid_at(row, 2)?,
        service_name: row.get(3)?,
        method_name: row.get(4)?,
        display_name: row.get(5)?,
        is_active: row.get(6)?,
        request_schema: json_at(row, 7)?,
        response_schema: json_at(row, 8)?,
        log_retention_hours: row.get(9)?,
    })
}

#[async_trait]
impl EndpointResolver for SqliteEndpointRepository {
    async fn find_service_group(&self, tenant_id: TenantId, name: &str) -> Result<Option<ServiceGroup>> {
        let db = Arc::clone(&self.db);
        let name = name.to_string();

        task::spawn_blocking(move || -> Result<Option<ServiceGroup>> {
            let conn = db.get_connection()?;
            conn.query_row(
                "SELECT id, tenant_id, name, is_active FROM service_groups
                 WHERE tenant_id = ?1 AND name = ?2",
                params![tenant_id.to_string(), name],
                map_group_row,
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_endpoint(
        &self,
        service_group_id: ServiceGroupId,
        service_name: &str,
        method_name: &str,
    ) -> Result<Option<EndpointDefinition>> {
        let db = Arc::clone(&self.db);
        let service_name = service_name.to_string();
        let method_name = method_name.to_string();

        task::spawn_blocking(move || -> Result<Option<EndpointDefinition>> {
            let conn = db.get_connection()?;
            let group = service_group_id.to_string();
            let found = Self::query_endpoints(
                &conn,
                "WHERE service_group_id = ?1 AND service_name = ?2 AND method_name = ?3",
                &[&group, &service_name, &method_name],
            )?;
            Ok(found.into_iter().next())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get_endpoint(&self, endpoint_id: EndpointId) -> Result<Option<EndpointDefinition>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Option<EndpointDefinition>> {
            let conn = db.get_connection()?;
            let id = endpoint_id.to_string();
            let found = Self::query_endpoints(&conn, "WHERE id = ?1", &[&id])?;
            Ok(found.into_iter().next())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_endpoints(&self) -> Result<Vec<EndpointDefinition>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Vec<EndpointDefinition>> {
            let conn = db.get_connection()?;
            Self::query_endpoints(&conn, "ORDER BY created_at", &[])
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl EndpointRegistrar for SqliteEndpointRepository {
    async fn endpoint_exists(
        &self,
        service_group_id: ServiceGroupId,
        service_name: &str,
        method_name: &str,
    ) -> Result<bool> {
        let db = Arc::clone(&self.db);
        let service_name = service_name.to_string();
        let method_name = method_name.to_string();

        task::spawn_blocking(move || -> Result<bool> {
            let conn = db.get_connection()?;
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM endpoints
                 WHERE service_group_id = ?1 AND service_name = ?2 AND method_name = ?3)",
                params![service_group_id.to_string(), service_name, method_name],
                |row| row.get(0),
            )
            .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn create_endpoint(&self, endpoint: NewEndpoint) -> Result<EndpointDefinition> {
        let db = Arc::clone(&self.db);

        let created = EndpointDefinition {
            id: Uuid::now_v7(),
            tenant_id: endpoint.tenant_id,
            service_group_id: endpoint.service_group_id,
            service_name: endpoint.service_name,
            method_name: endpoint.method_name,
            display_name: endpoint.display_name,
            is_active: true,
            request_schema: endpoint.request_schema,
            response_schema: endpoint.response_schema,
            log_retention_hours: endpoint.log_retention_hours,
        };
        let stored = created.clone();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            conn.execute(
                &format!(
                    "INSERT INTO endpoints ({ENDPOINT_COLUMNS}, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
                ),
                params![
                    stored.id.to_string(),
                    stored.tenant_id.to_string(),
                    stored.service_group_id.to_string(),
                    stored.service_name,
                    stored.method_name,
                    stored.display_name,
                    stored.is_active,
                    stored.request_schema.to_string(),
                    stored.response_schema.to_string(),
                    stored.log_retention_hours,
                    to_millis(Utc::now()),
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)??;

        info!(
            endpoint_id = %created.id,
            service = %created.service_name,
            method = %created.method_name,
            "Created endpoint"
        );
        Ok(created)
    }
}
