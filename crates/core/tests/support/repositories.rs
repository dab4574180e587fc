//! In-memory implementations of the persistence ports.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use orbu_core::{EndpointRegistrar, EndpointResolver, ExecutionLog};
use orbu_domain::{
    EndpointCleanup, EndpointDefinition, EndpointId, ExecutionRecord, ExecutionStats,
    GatewayError, NewEndpoint, Result, RetentionCutoff, ServiceGroup, ServiceGroupId, TenantId,
};
use serde_json::json;
use uuid::Uuid;

/// Service groups and endpoints held in memory.
#[derive(Default)]
pub struct InMemoryEndpoints {
    groups: Mutex<Vec<ServiceGroup>>,
    endpoints: Mutex<Vec<EndpointDefinition>>,
}

impl InMemoryEndpoints {
    pub fn add_group(&self, tenant_id: TenantId, name: &str, is_active: bool) -> ServiceGroup {
        let group = ServiceGroup { id: Uuid::now_v7(), tenant_id, name: name.to_string(), is_active };
        self.groups.lock().unwrap().push(group.clone());
        group
    }

    pub fn add_endpoint(
        &self,
        group: &ServiceGroup,
        service_name: &str,
        method_name: &str,
        is_active: bool,
        log_retention_hours: u32,
    ) -> EndpointDefinition {
        let endpoint = EndpointDefinition {
            id: Uuid::now_v7(),
            tenant_id: group.tenant_id,
            service_group_id: group.id,
            service_name: service_name.to_string(),
            method_name: method_name.to_string(),
            display_name: None,
            is_active,
            request_schema: json!({}),
            response_schema: json!({}),
            log_retention_hours,
        };
        self.endpoints.lock().unwrap().push(endpoint.clone());
        endpoint
    }

    pub fn endpoints(&self) -> Vec<EndpointDefinition> {
        self.endpoints.lock().unwrap().clone()
    }
}

#[async_trait]
impl EndpointResolver for InMemoryEndpoints {
    async fn find_service_group(&self, tenant_id: TenantId, name: &str) -> Result<Option<ServiceGroup>> {
        Ok(self
            .groups
            .lock()
            .unwrap()
            .iter()
            .find(|group| group.tenant_id == tenant_id && group.name == name)
            .cloned())
    }

    async fn find_endpoint(
        &self,
        service_group_id: ServiceGroupId,
        service_name: &str,
        method_name: &str,
    ) -> Result<Option<EndpointDefinition>> {
        Ok(self
            .endpoints
            .lock()
            .unwrap()
            .iter()
            .find(|e| {
                e.service_group_id == service_group_id
                    && e.service_name == service_name
                    && e.method_name == method_name
            })
            .cloned())
    }

    async fn get_endpoint(&self, endpoint_id: EndpointId) -> Result<Option<EndpointDefinition>> {
        Ok(self.endpoints.lock().unwrap().iter().find(|e| e.id == endpoint_id).cloned())
    }

    async fn list_endpoints(&self) -> Result<Vec<EndpointDefinition>> {
        Ok(self.endpoints())
    }
}

#[async_trait]
impl EndpointRegistrar for InMemoryEndpoints {
    async fn endpoint_exists(
        &self,
        service_group_id: ServiceGroupId,
        service_name: &str,
        method_name: &str,
    ) -> Result<bool> {
        Ok(self.find_endpoint(service_group_id, service_name, method_name).await?.is_some())
    }

    async fn create_endpoint(&self, endpoint: NewEndpoint) -> Result<EndpointDefinition> {
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
        self.endpoints.lock().unwrap().push(created.clone());
        Ok(created)
    }
}

/// Execution log held in memory, with switchable failures.
#[derive(Default)]
pub struct InMemoryExecutionLog {
    records: Mutex<Vec<ExecutionRecord>>,
    fail_appends: AtomicBool,
    fail_purges: AtomicBool,
}

impl InMemoryExecutionLog {
    pub fn records(&self) -> Vec<ExecutionRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn insert_at(&self, endpoint_id: EndpointId, executed_at: DateTime<Utc>) {
        self.records.lock().unwrap().push(ExecutionRecord {
            id: Uuid::now_v7(),
            endpoint_id,
            executed_at,
            duration_ms: 5,
            status_code: 200,
            error_message: None,
            request_payload: None,
            response_payload: None,
            request_method: None,
            request_path: None,
            caller_ip: None,
            caller_agent: None,
        });
    }

    pub fn fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    pub fn fail_purges(&self, fail: bool) {
        self.fail_purges.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ExecutionLog for InMemoryExecutionLog {
    async fn append(&self, record: &ExecutionRecord) -> Result<()> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(GatewayError::Database("disk full".into()));
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn purge_expired(&self, cutoffs: &[RetentionCutoff]) -> Result<Vec<EndpointCleanup>> {
        if self.fail_purges.load(Ordering::SeqCst) {
            return Err(GatewayError::Database("database is locked".into()));
        }

        let mut records = self.records.lock().unwrap();
        let mut results = Vec::with_capacity(cutoffs.len());
        for cutoff in cutoffs {
            let before = records.len();
            records.retain(|r| !(r.endpoint_id == cutoff.endpoint_id && r.executed_at < cutoff.cutoff));
            results.push(EndpointCleanup {
                endpoint_id: cutoff.endpoint_id,
                deleted_count: before - records.len(),
            });
        }
        Ok(results)
    }

    async fn recent(&self, endpoint_id: EndpointId, limit: usize) -> Result<Vec<ExecutionRecord>> {
        let mut matching: Vec<ExecutionRecord> =
            self.records().into_iter().filter(|r| r.endpoint_id == endpoint_id).collect();
        matching.sort_by(|a, b| b.executed_at.cmp(&a.executed_at));
        matching.truncate(limit);
        Ok(matching)
    }

    async fn stats(&self, endpoint_id: EndpointId) -> Result<ExecutionStats> {
        let matching: Vec<ExecutionRecord> =
            self.records().into_iter().filter(|r| r.endpoint_id == endpoint_id).collect();
        Ok(ExecutionStats::from_records(&matching))
    }
}
