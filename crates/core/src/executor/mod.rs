//! Endpoint execution
//!
//! Resolves `(tenant, group, service, method)` to a published endpoint,
//! invokes the remote method through the tenant's pooled session and writes
//! one audit record per identified invocation.

mod naming;

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use orbu_common::Clock;
use orbu_domain::constants::DEFAULT_EXECUTION_LOG_LIMIT;
use orbu_domain::{
    CallerContext, EndpointDefinition, EndpointId, ExecutionMeta, ExecutionRecord,
    ExecutionStats, GatewayError, ResponseEnvelope, Result, TenantId,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

pub use naming::to_attribute_name;

use crate::endpoint_ports::EndpointResolver;
use crate::execution_ports::ExecutionLog;
use crate::pool::ConnectionPool;
use crate::session_ports::Parameters;

/// One inbound call to a published endpoint.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub tenant_id: TenantId,
    /// Service group URL name.
    pub service_group: String,
    /// Public service name, e.g. `SalesOrder`.
    pub service_name: String,
    pub method_name: String,
    pub params: Parameters,
    pub caller: CallerContext,
}

/// Status code and response body for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOutcome {
    pub status: u16,
    pub envelope: ResponseEnvelope,
}

impl ExecutionOutcome {
    fn failure(err: &GatewayError) -> Self {
        Self { status: err.status_code(), envelope: ResponseEnvelope::failure(err.to_string()) }
    }

    pub fn is_success(&self) -> bool {
        self.envelope.success
    }
}

/// Executes published endpoints against tenant sessions.
pub struct EndpointExecutor {
    endpoints: Arc<dyn EndpointResolver>,
    pool: Arc<ConnectionPool>,
    log: Arc<dyn ExecutionLog>,
    clock: Arc<dyn Clock>,
}

impl EndpointExecutor {
    pub fn new(
        endpoints: Arc<dyn EndpointResolver>,
        pool: Arc<ConnectionPool>,
        log: Arc<dyn ExecutionLog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { endpoints, pool, log, clock }
    }

    /// Execute one endpoint call.
    ///
    /// Lookup failures (unknown or inactive group/endpoint) return without an
    /// audit record. Every call that reaches an identified endpoint produces
    /// exactly one record, success or failure.
    #[instrument(
        skip(self, request),
        fields(
            tenant_id = %request.tenant_id,
            group = %request.service_group,
            service = %request.service_name,
            method = %request.method_name,
        )
    )]
    pub async fn execute(&self, request: ExecutionRequest) -> ExecutionOutcome {
        let started = self.clock.now();

        let endpoint = match self.identify(&request).await {
            Ok(endpoint) => endpoint,
            Err(err) => {
                debug!(error = %err, "Endpoint lookup failed");
                return ExecutionOutcome::failure(&err);
            }
        };

        let result = self.invoke(&request).await;
        let timing =
            CallTiming { executed_at: self.clock.utc_now(), duration_ms: self.elapsed_ms(started) };

        match result {
            Ok(data) => {
                let record = ExecutionRecord {
                    response_payload: Some(normalize_response(data.clone())),
                    ..audit_record(&endpoint, &request, timing)
                };
                if let Err(err) = self.log.append(&record).await {
                    error!(error = %err, "Failed to write execution record");
                    let err = GatewayError::Internal(format!(
                        "Failed to record execution: {err}"
                    ));
                    return ExecutionOutcome::failure(&err);
                }

                info!(duration_ms = timing.duration_ms, "Endpoint executed");
                let meta = ExecutionMeta {
                    duration_ms: timing.duration_ms,
                    endpoint_id: endpoint.id,
                    executed_at: timing.executed_at,
                };
                ExecutionOutcome { status: 200, envelope: ResponseEnvelope::success(data, meta) }
            }
            Err(err) => {
                warn!(
                    error = %err,
                    kind = err.kind(),
                    duration_ms = timing.duration_ms,
                    "Endpoint execution failed"
                );
                let record = ExecutionRecord {
                    status_code: err.status_code(),
                    error_message: Some(err.to_string()),
                    ..audit_record(&endpoint, &request, timing)
                };
                if let Err(log_err) = self.log.append(&record).await {
                    error!(error = %log_err, "Failed to write execution record");
                }
                ExecutionOutcome::failure(&err)
            }
        }
    }

    /// Most recent records for an endpoint, newest first. `None` returns up
    /// to 100 records.
    pub async fn recent_executions(
        &self,
        endpoint_id: EndpointId,
        limit: Option<usize>,
    ) -> Result<Vec<ExecutionRecord>> {
        self.log.recent(endpoint_id, limit.unwrap_or(DEFAULT_EXECUTION_LOG_LIMIT)).await
    }

    /// Aggregate statistics for an endpoint.
    pub async fn execution_stats(&self, endpoint_id: EndpointId) -> Result<ExecutionStats> {
        self.log.stats(endpoint_id).await
    }

    async fn identify(&self, request: &ExecutionRequest) -> Result<EndpointDefinition> {
        let group = self
            .endpoints
            .find_service_group(request.tenant_id, &request.service_group)
            .await?
            .ok_or_else(|| {
                GatewayError::NotFound(format!(
                    "Service group not found: {}",
                    request.service_group
                ))
            })?;
        if !group.is_active {
            return Err(GatewayError::Inactive("Service group is inactive".to_string()));
        }

        let endpoint = self
            .endpoints
            .find_endpoint(group.id, &request.service_name, &request.method_name)
            .await?
            .ok_or_else(|| {
                GatewayError::NotFound(format!(
                    "Endpoint not found: {}.{}",
                    request.service_name, request.method_name
                ))
            })?;
        if !endpoint.is_active {
            return Err(GatewayError::Inactive("Endpoint is inactive".to_string()));
        }

        Ok(endpoint)
    }

    async fn invoke(&self, request: &ExecutionRequest) -> Result<Value> {
        let session = self.pool.get_connection(request.tenant_id).await?;

        let attribute = to_attribute_name(&request.service_name);
        let service = session.service(&attribute).ok_or_else(|| {
            GatewayError::NotFound(format!("Service not found: {}", request.service_name))
        })?;

        let method = service.method(&request.method_name).ok_or_else(|| {
            GatewayError::NotFound(format!(
                "Method not found: {}.{}",
                request.service_name, request.method_name
            ))
        })?;

        Ok(method.invoke(request.params.clone()).await?)
    }

    fn elapsed_ms(&self, started: Instant) -> u64 {
        let elapsed = self.clock.now().saturating_duration_since(started);
        u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
    }
}

#[derive(Debug, Clone, Copy)]
struct CallTiming {
    executed_at: DateTime<Utc>,
    duration_ms: u64,
}

/// Successful audit record without a response payload.
fn audit_record(
    endpoint: &EndpointDefinition,
    request: &ExecutionRequest,
    timing: CallTiming,
) -> ExecutionRecord {
    ExecutionRecord {
        id: Uuid::now_v7(),
        endpoint_id: endpoint.id,
        executed_at: timing.executed_at,
        duration_ms: timing.duration_ms,
        status_code: 200,
        error_message: None,
        request_payload: Some(Value::Object(request.params.clone())),
        response_payload: None,
        request_method: request.caller.method.clone(),
        request_path: request.caller.path.clone(),
        caller_ip: request.caller.ip.clone(),
        caller_agent: request.caller.user_agent.clone(),
    }
}

/// Stored response payload: non-object results become
/// `{"result": "<stringified>"}`.
fn normalize_response(value: Value) -> Value {
    match value {
        Value::Object(_) => value,
        Value::String(text) => json!({ "result": text }),
        other => json!({ "result": other.to_string() }),
    }
}
