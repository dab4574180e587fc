//! # Orbu Infrastructure
//!
//! Infrastructure implementations of core gateway ports.
//!
//! This crate contains:
//! - SQLite persistence (`rusqlite` over an `r2d2` pool)
//! - Configuration loading from the environment and config files
//! - Tracing subscriber setup
//! - The cron-driven log retention scheduler
//! - Runtime wiring of every gateway service
//!
//! ## Architecture
//! - Implements traits defined in `orbu-core`
//! - Contains all "impure" code (I/O, scheduling)

pub mod config;
pub mod database;
pub mod errors;
pub mod observability;
pub mod runtime;
pub mod scheduling;

pub use database::{
    DbManager, SqliteEndpointRepository, SqliteExecutionLog, SqliteTenantRepository,
};
pub use errors::InfraError;
pub use observability::init_tracing;
pub use runtime::GatewayRuntime;
pub use scheduling::{
    RetentionPassStats, RetentionScheduler, RetentionSchedulerConfig, SchedulerError,
};
