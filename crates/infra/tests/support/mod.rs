#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use orbu_core::{
    EndpointRegistrar, InvocationError, MethodRegistry, Parameters, RegistrySession,
    RemoteSession, SessionAuthenticator, SessionFactory,
};
use orbu_domain::{
    EndpointDefinition, ExecutionRecord, NewEndpoint, Result, ServiceGroup,
    TenantConnectionParams, TenantId,
};
use orbu_infra::database::{
    DbManager, SqliteEndpointRepository, SqliteExecutionLog, SqliteTenantRepository,
};
use serde_json::json;
use tempfile::TempDir;
use uuid::Uuid;

/// Migrated database in a temporary directory that lives as long as the
/// harness.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    pub tenants: SqliteTenantRepository,
    pub endpoints: SqliteEndpointRepository,
    pub executions: SqliteExecutionLog,
    _temp_dir: TempDir,
}

impl TestDatabase {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let manager = Arc::new(
            DbManager::new(temp_dir.path().join("gateway.db"), 4)
                .expect("db manager should be created"),
        );
        manager.run_migrations().expect("schema migrations should apply");

        Self {
            tenants: SqliteTenantRepository::new(Arc::clone(&manager)),
            endpoints: SqliteEndpointRepository::new(Arc::clone(&manager)),
            executions: SqliteExecutionLog::new(Arc::clone(&manager)),
            manager,
            _temp_dir: temp_dir,
        }
    }

    pub async fn tenant(&self) -> TenantId {
        let tenant_id = Uuid::now_v7();
        self.tenants
            .insert_tenant("Acme", &tenant_params(tenant_id))
            .await
            .expect("tenant inserted");
        tenant_id
    }

    pub async fn group(&self, tenant_id: TenantId, name: &str) -> ServiceGroup {
        self.endpoints.create_service_group(tenant_id, name).await.expect("group created")
    }

    pub async fn endpoint(
        &self,
        group: &ServiceGroup,
        service: &str,
        method: &str,
        retention_hours: u32,
    ) -> EndpointDefinition {
        self.endpoints
            .create_endpoint(NewEndpoint {
                tenant_id: group.tenant_id,
                service_group_id: group.id,
                service_name: service.to_string(),
                method_name: method.to_string(),
                display_name: Some(format!("{service}.{method}")),
                request_schema: json!({"type": "object", "properties": {}}),
                response_schema: json!({"type": "object"}),
                log_retention_hours: retention_hours,
            })
            .await
            .expect("endpoint created")
    }
}

pub fn tenant_params(tenant_id: TenantId) -> TenantConnectionParams {
    TenantConnectionParams::new(tenant_id, "https://erp.example.com", "Company", "admin", "secret")
}

pub fn record_at(endpoint: &EndpointDefinition, executed_at: DateTime<Utc>, status_code: u16, duration_ms: u64) -> ExecutionRecord {
    ExecutionRecord {
        id: Uuid::now_v7(),
        endpoint_id: endpoint.id,
        executed_at,
        duration_ms,
        status_code,
        error_message: (status_code != 200).then(|| "Execution error: boom".to_string()),
        request_payload: Some(json!({"filter": "Active"})),
        response_payload: (status_code == 200).then(|| json!({"result": "ok"})),
        request_method: Some("POST".into()),
        request_path: Some("/api/v1/sales/Contact/get_list".into()),
        caller_ip: Some("203.0.113.7".into()),
        caller_agent: Some("integration-test".into()),
    }
}

struct AlwaysAuthenticated;

#[async_trait]
impl SessionAuthenticator for AlwaysAuthenticated {
    async fn login(&self) -> Result<()> {
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        Ok(())
    }
}

/// Session factory over a small registry with a `Contact` service.
pub struct ContactSessions {
    registry: Arc<MethodRegistry>,
}

impl ContactSessions {
    pub fn new() -> Self {
        let mut registry = MethodRegistry::new();
        registry
            .register(
                "Contact",
                "get_list(filter: str, top: int = 100) -> list[Contact]",
                |params: Parameters| async move {
                    Ok::<_, InvocationError>(json!([{"id": "C-1", "filter": params.get("filter")}]))
                },
            )
            .expect("valid signature")
            .register("Contact", "count() -> int", |_params: Parameters| async {
                Ok::<_, InvocationError>(json!(3))
            })
            .expect("valid signature");
        Self { registry: Arc::new(registry) }
    }
}

impl SessionFactory for ContactSessions {
    fn create(&self, _params: &TenantConnectionParams) -> Result<Arc<dyn RemoteSession>> {
        Ok(Arc::new(RegistrySession::new(Arc::clone(&self.registry), Arc::new(AlwaysAuthenticated))))
    }
}
