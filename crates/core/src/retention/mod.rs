//! Execution log retention
//!
//! Each endpoint keeps its records for `log_retention_hours`. A full pass
//! computes every endpoint's cutoff up front and applies them in one atomic
//! purge.

use std::sync::Arc;

use chrono::Duration;
use orbu_common::Clock;
use orbu_domain::{
    CleanupReport, EndpointCleanup, EndpointDefinition, EndpointId, GatewayError, Result,
    RetentionCutoff,
};
use tracing::{debug, error, info, instrument};

use crate::endpoint_ports::EndpointResolver;
use crate::execution_ports::ExecutionLog;

/// Deletes execution records past each endpoint's retention window.
pub struct LogRetentionService {
    endpoints: Arc<dyn EndpointResolver>,
    log: Arc<dyn ExecutionLog>,
    clock: Arc<dyn Clock>,
}

impl LogRetentionService {
    pub fn new(
        endpoints: Arc<dyn EndpointResolver>,
        log: Arc<dyn ExecutionLog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { endpoints, log, clock }
    }

    /// Purge expired records for every endpoint.
    ///
    /// On failure nothing is deleted and the error is returned.
    #[instrument(skip(self))]
    pub async fn cleanup_old_logs(&self) -> Result<CleanupReport> {
        let endpoints = self.endpoints.list_endpoints().await.inspect_err(|err| {
            error!(error = %err, "Failed to list endpoints for log cleanup");
        })?;
        if endpoints.is_empty() {
            debug!("No endpoints, nothing to clean up");
            return Ok(CleanupReport::default());
        }

        let cutoffs: Vec<RetentionCutoff> =
            endpoints.iter().map(|endpoint| self.cutoff_for(endpoint)).collect();

        let results = self.log.purge_expired(&cutoffs).await.inspect_err(|err| {
            error!(error = %err, "Log cleanup failed, no records deleted");
        })?;

        let mut report = CleanupReport::default();
        for result in results.iter().filter(|result| result.deleted_count > 0) {
            debug!(endpoint_id = %result.endpoint_id, deleted = result.deleted_count, "Purged expired records");
            report.total_deleted += result.deleted_count;
            report.endpoints_processed += 1;
        }

        info!(
            total_deleted = report.total_deleted,
            endpoints_processed = report.endpoints_processed,
            "Log cleanup finished"
        );
        Ok(report)
    }

    /// Purge expired records for a single endpoint.
    #[instrument(skip(self), fields(endpoint_id = %endpoint_id))]
    pub async fn cleanup_logs_for_endpoint(&self, endpoint_id: EndpointId) -> Result<EndpointCleanup> {
        let endpoint = self
            .endpoints
            .get_endpoint(endpoint_id)
            .await?
            .ok_or_else(|| GatewayError::NotFound(format!("Endpoint not found: {endpoint_id}")))?;

        let cutoff = self.cutoff_for(&endpoint);
        let deleted_count = self
            .log
            .purge_expired(&[cutoff])
            .await?
            .into_iter()
            .map(|result| result.deleted_count)
            .sum();

        info!(deleted = deleted_count, "Endpoint log cleanup finished");
        Ok(EndpointCleanup { endpoint_id, deleted_count })
    }

    fn cutoff_for(&self, endpoint: &EndpointDefinition) -> RetentionCutoff {
        let window = Duration::hours(i64::from(endpoint.log_retention_hours));
        RetentionCutoff { endpoint_id: endpoint.id, cutoff: self.clock.utc_now() - window }
    }
}
