//! Execution log port interface

use async_trait::async_trait;
use orbu_domain::{
    EndpointCleanup, EndpointId, ExecutionRecord, ExecutionStats, Result, RetentionCutoff,
};

/// Append-only audit log of endpoint invocations.
#[async_trait]
pub trait ExecutionLog: Send + Sync {
    /// Persist one execution record.
    async fn append(&self, record: &ExecutionRecord) -> Result<()>;

    /// Delete records older than each endpoint's cutoff.
    ///
    /// The whole batch is applied atomically: either every cutoff is applied
    /// or, on error, nothing is deleted. Returns one entry per cutoff.
    async fn purge_expired(&self, cutoffs: &[RetentionCutoff]) -> Result<Vec<EndpointCleanup>>;

    /// Most recent records for an endpoint, newest first.
    async fn recent(&self, endpoint_id: EndpointId, limit: usize) -> Result<Vec<ExecutionRecord>>;

    /// Aggregate statistics for an endpoint.
    async fn stats(&self, endpoint_id: EndpointId) -> Result<ExecutionStats>;
}
