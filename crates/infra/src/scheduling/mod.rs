//! Cron-driven background jobs
//!
//! Schedulers have explicit `start`/`stop`, track their join handles, cancel
//! through a token and wrap every async step in a timeout.

pub mod error;
pub mod retention_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use retention_scheduler::{RetentionPassStats, RetentionScheduler, RetentionSchedulerConfig};
