//! Endpoint persistence port interfaces

use async_trait::async_trait;
use orbu_domain::{
    EndpointDefinition, EndpointId, NewEndpoint, Result, ServiceGroup, ServiceGroupId, TenantId,
};

/// Read access to service groups and endpoint definitions.
#[async_trait]
pub trait EndpointResolver: Send + Sync {
    /// Find a tenant's service group by its URL name.
    async fn find_service_group(
        &self,
        tenant_id: TenantId,
        name: &str,
    ) -> Result<Option<ServiceGroup>>;

    /// Find the endpoint bound to `(group, service, method)`.
    async fn find_endpoint(
        &self,
        service_group_id: ServiceGroupId,
        service_name: &str,
        method_name: &str,
    ) -> Result<Option<EndpointDefinition>>;

    /// Get an endpoint by id.
    async fn get_endpoint(&self, endpoint_id: EndpointId) -> Result<Option<EndpointDefinition>>;

    /// Every endpoint across all tenants.
    async fn list_endpoints(&self) -> Result<Vec<EndpointDefinition>>;
}

/// Write access used when publishing endpoints.
#[async_trait]
pub trait EndpointRegistrar: Send + Sync {
    /// Whether `(group, service, method)` is already bound.
    async fn endpoint_exists(
        &self,
        service_group_id: ServiceGroupId,
        service_name: &str,
        method_name: &str,
    ) -> Result<bool>;

    /// Persist a new, active endpoint.
    async fn create_endpoint(&self, endpoint: NewEndpoint) -> Result<EndpointDefinition>;
}
