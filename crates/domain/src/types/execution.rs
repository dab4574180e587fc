//! Execution records, response envelopes and retention bookkeeping

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::endpoint::EndpointId;

/// Audit row for one endpoint invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub id: Uuid,
    pub endpoint_id: EndpointId,
    pub executed_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub status_code: u16,
    pub error_message: Option<String>,
    pub request_payload: Option<Value>,
    pub response_payload: Option<Value>,
    pub request_method: Option<String>,
    pub request_path: Option<String>,
    pub caller_ip: Option<String>,
    pub caller_agent: Option<String>,
}

impl ExecutionRecord {
    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

/// Aggregate statistics over an endpoint's execution records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStats {
    pub total_executions: u64,
    pub avg_duration_ms: u64,
    pub min_duration_ms: u64,
    pub max_duration_ms: u64,
    pub successful: u64,
    pub failed: u64,
    /// Percentage of successful executions (0-100).
    pub success_rate: f64,
}

impl ExecutionStats {
    /// Compute statistics from a slice of records.
    pub fn from_records(records: &[ExecutionRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let total = records.len() as u64;
        let sum: u64 = records.iter().map(|r| r.duration_ms).sum();
        let successful = records.iter().filter(|r| r.is_success()).count() as u64;

        Self {
            total_executions: total,
            avg_duration_ms: sum / total,
            min_duration_ms: records.iter().map(|r| r.duration_ms).min().unwrap_or(0),
            max_duration_ms: records.iter().map(|r| r.duration_ms).max().unwrap_or(0),
            successful,
            failed: total - successful,
            success_rate: successful as f64 / total as f64 * 100.0,
        }
    }
}

/// Request-scoped details about the inbound caller, stored with each record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerContext {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub method: Option<String>,
    pub path: Option<String>,
}

impl CallerContext {
    /// Pick the caller address from proxy headers or the socket address.
    ///
    /// The first hop of `X-Forwarded-For` wins, then `X-Real-IP`, then the
    /// remote socket address.
    pub fn resolve_ip(
        forwarded_for: Option<&str>,
        real_ip: Option<&str>,
        remote_addr: Option<&str>,
    ) -> Option<String> {
        let first_hop = forwarded_for
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|hop| !hop.is_empty());

        first_hop
            .or_else(|| real_ip.map(str::trim).filter(|ip| !ip.is_empty()))
            .or(remote_addr)
            .map(ToOwned::to_owned)
    }
}

/// Metadata attached to successful responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionMeta {
    pub duration_ms: u64,
    pub endpoint_id: EndpointId,
    pub executed_at: DateTime<Utc>,
}

/// JSON body returned for every invocation.
///
/// Success: `{"success": true, "data": ..., "meta": {...}}`.
/// Failure: `{"success": false, "error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ExecutionMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponseEnvelope {
    pub fn success(data: Value, meta: ExecutionMeta) -> Self {
        Self { success: true, data: Some(data), meta: Some(meta), error: None }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self { success: false, data: None, meta: None, error: Some(error.into()) }
    }
}

/// Deletion bound for one endpoint within a retention pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionCutoff {
    pub endpoint_id: EndpointId,
    /// Records executed strictly before this instant are deleted.
    pub cutoff: DateTime<Utc>,
}

/// Totals from a full retention pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupReport {
    pub total_deleted: usize,
    /// Endpoints that had at least one record deleted.
    pub endpoints_processed: usize,
}

/// Result of a single-endpoint retention run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointCleanup {
    pub endpoint_id: EndpointId,
    pub deleted_count: usize,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(duration_ms: u64, status_code: u16) -> ExecutionRecord {
        ExecutionRecord {
            id: Uuid::now_v7(),
            endpoint_id: Uuid::nil(),
            executed_at: Utc::now(),
            duration_ms,
            status_code,
            error_message: None,
            request_payload: None,
            response_payload: None,
            request_method: None,
            request_path: None,
            caller_ip: None,
            caller_agent: None,
        }
    }

    #[test]
    fn caller_ip_prefers_first_forwarded_hop() {
        let ip = CallerContext::resolve_ip(
            Some(" 203.0.113.7 , 10.0.0.1"),
            Some("10.0.0.2"),
            Some("127.0.0.1"),
        );
        assert_eq!(ip.as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn caller_ip_falls_back_to_real_ip_then_socket() {
        assert_eq!(
            CallerContext::resolve_ip(None, Some("10.0.0.2"), Some("127.0.0.1")).as_deref(),
            Some("10.0.0.2")
        );
        assert_eq!(
            CallerContext::resolve_ip(None, None, Some("127.0.0.1")).as_deref(),
            Some("127.0.0.1")
        );
        assert_eq!(CallerContext::resolve_ip(None, None, None), None);
    }

    #[test]
    fn failure_envelope_serializes_without_data() {
        let body = serde_json::to_value(ResponseEnvelope::failure("Endpoint is inactive"))
            .expect("envelope serializes");
        assert_eq!(body, json!({"success": false, "error": "Endpoint is inactive"}));
    }

    #[test]
    fn stats_from_records() {
        let stats = ExecutionStats::from_records(&[record(10, 200), record(30, 500), record(20, 200)]);

        assert_eq!(stats.total_executions, 3);
        assert_eq!(stats.avg_duration_ms, 20);
        assert_eq!(stats.min_duration_ms, 10);
        assert_eq!(stats.max_duration_ms, 30);
        assert_eq!(stats.successful, 2);
        assert_eq!(stats.failed, 1);
        assert!((stats.success_rate - 66.666).abs() < 0.01);
    }

    #[test]
    fn stats_from_no_records_are_zeroed() {
        assert_eq!(ExecutionStats::from_records(&[]), ExecutionStats::default());
    }
}
