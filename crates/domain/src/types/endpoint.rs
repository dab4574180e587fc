//! Service group and endpoint definitions

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::tenant::TenantId;

pub type ServiceGroupId = Uuid;
pub type EndpointId = Uuid;

/// Logical namespace grouping endpoints within a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceGroup {
    pub id: ServiceGroupId,
    pub tenant_id: TenantId,
    /// URL slug used by callers.
    pub name: String,
    pub is_active: bool,
}

/// A published binding of one remote method to a REST path.
///
/// Unique by `(service_group_id, service_name, method_name)`. Schemas are
/// captured when the endpoint is created and are not recomputed per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointDefinition {
    pub id: EndpointId,
    pub tenant_id: TenantId,
    pub service_group_id: ServiceGroupId,
    /// Public (capitalised-word) service name, e.g. `SalesOrder`.
    pub service_name: String,
    pub method_name: String,
    pub display_name: Option<String>,
    pub is_active: bool,
    pub request_schema: Value,
    pub response_schema: Value,
    pub log_retention_hours: u32,
}

/// Insert payload for a new endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEndpoint {
    pub tenant_id: TenantId,
    pub service_group_id: ServiceGroupId,
    pub service_name: String,
    pub method_name: String,
    pub display_name: Option<String>,
    pub request_schema: Value,
    pub response_schema: Value,
    pub log_retention_hours: u32,
}

/// Request to publish the methods of one remote service as endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployRequest {
    pub tenant_id: TenantId,
    pub service_group_id: ServiceGroupId,
    pub service_name: String,
    /// Specific methods to publish; `None` or empty publishes every method
    /// the service exposes.
    pub methods: Option<Vec<String>>,
    pub log_retention_hours: Option<u32>,
}

/// Method left out of a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedMethod {
    pub method_name: String,
    pub reason: String,
}

/// Method whose endpoint could not be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployFailure {
    pub method_name: String,
    pub error: String,
}

/// Outcome of a bulk service deployment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentSummary {
    pub created: Vec<EndpointDefinition>,
    pub skipped: Vec<SkippedMethod>,
    pub errors: Vec<DeployFailure>,
}

impl DeploymentSummary {
    pub fn created_count(&self) -> usize {
        self.created.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}
