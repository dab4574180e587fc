//! Bulk endpoint deployment
//!
//! Publishes the methods of one remote service as endpoints, capturing each
//! method's schemas at creation time.

use std::sync::Arc;

use orbu_domain::constants::DEFAULT_LOG_RETENTION_HOURS;
use orbu_domain::{
    CompleteSchema, DeployFailure, DeployRequest, DeploymentSummary, GatewayError, NewEndpoint,
    Result, SkippedMethod, TenantId,
};
use tracing::{info, instrument, warn};

use crate::endpoint_ports::EndpointRegistrar;
use crate::executor::to_attribute_name;
use crate::pool::ConnectionPool;
use crate::schema::SchemaIntrospector;
use crate::session_ports::ServiceObject;

/// Creates endpoints from live remote services.
pub struct ServiceDeployer {
    pool: Arc<ConnectionPool>,
    registrar: Arc<dyn EndpointRegistrar>,
    introspector: SchemaIntrospector,
}

impl ServiceDeployer {
    pub fn new(pool: Arc<ConnectionPool>, registrar: Arc<dyn EndpointRegistrar>) -> Self {
        Self { pool, registrar, introspector: SchemaIntrospector::new() }
    }

    /// Publish methods of `request.service_name` as endpoints.
    ///
    /// Methods already bound in the group are skipped. Per-method failures
    /// are collected in the summary; only session or service lookup
    /// failures abort the whole deployment.
    #[instrument(skip(self, request), fields(tenant_id = %request.tenant_id, service = %request.service_name))]
    pub async fn deploy_service(&self, request: DeployRequest) -> Result<DeploymentSummary> {
        let service = self.resolve_service(request.tenant_id, &request.service_name).await?;

        let methods = match request.methods.as_deref() {
            Some(methods) if !methods.is_empty() => methods.to_vec(),
            _ => service.method_names(),
        };
        let retention = request.log_retention_hours.unwrap_or(DEFAULT_LOG_RETENTION_HOURS);

        let mut summary = DeploymentSummary::default();
        for method_name in methods {
            let exists = self
                .registrar
                .endpoint_exists(request.service_group_id, &request.service_name, &method_name)
                .await?;
            if exists {
                summary.skipped.push(SkippedMethod {
                    method_name,
                    reason: "Already exists".to_string(),
                });
                continue;
            }

            if service.method(&method_name).is_none() {
                summary.errors.push(DeployFailure {
                    error: format!("Method not found: {}.{method_name}", request.service_name),
                    method_name,
                });
                continue;
            }

            let schema = self.introspector.complete_schema(service.as_ref(), &method_name);
            let endpoint = NewEndpoint {
                tenant_id: request.tenant_id,
                service_group_id: request.service_group_id,
                service_name: request.service_name.clone(),
                method_name: method_name.clone(),
                display_name: Some(format!("{}.{method_name}", request.service_name)),
                request_schema: schema.request_schema,
                response_schema: schema.response_schema,
                log_retention_hours: retention,
            };

            match self.registrar.create_endpoint(endpoint).await {
                Ok(created) => summary.created.push(created),
                Err(err) => {
                    warn!(method = %method_name, error = %err, "Failed to create endpoint");
                    summary.errors.push(DeployFailure { method_name, error: err.to_string() });
                }
            }
        }

        info!(
            created = summary.created_count(),
            skipped = summary.skipped_count(),
            errors = summary.error_count(),
            "Service deployment finished"
        );
        Ok(summary)
    }

    /// Complete schema of one remote method, for previews before deploying.
    pub async fn describe_method(
        &self,
        tenant_id: TenantId,
        service_name: &str,
        method_name: &str,
    ) -> Result<CompleteSchema> {
        let service = self.resolve_service(tenant_id, service_name).await?;
        Ok(self.introspector.complete_schema(service.as_ref(), method_name))
    }

    /// Public method names of a remote service.
    pub async fn list_methods(&self, tenant_id: TenantId, service_name: &str) -> Result<Vec<String>> {
        let service = self.resolve_service(tenant_id, service_name).await?;
        Ok(service.method_names())
    }

    async fn resolve_service(
        &self,
        tenant_id: TenantId,
        service_name: &str,
    ) -> Result<Arc<dyn ServiceObject>> {
        let session = self.pool.get_connection(tenant_id).await?;
        session
            .service(&to_attribute_name(service_name))
            .ok_or_else(|| GatewayError::NotFound(format!("Service not found: {service_name}")))
    }
}
