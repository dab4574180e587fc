//! Domain constants

/// Idle window after which a pooled tenant session is discarded (30 minutes).
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;

/// Retention applied to newly deployed endpoints when none is requested.
pub const DEFAULT_LOG_RETENTION_HOURS: u32 = 168;

/// Cron expression for the retention pass (top of every hour).
pub const DEFAULT_RETENTION_CRON: &str = "0 0 * * * *";

/// Execution records returned by a log listing when no limit is given.
pub const DEFAULT_EXECUTION_LOG_LIMIT: usize = 100;

/// Type assumed for signature parameters written without an annotation.
pub const UNANNOTATED_PARAMETER_TYPE: &str = "str";
