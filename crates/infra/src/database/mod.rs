//! SQLite persistence adapters

mod columns;
pub mod endpoint_repository;
pub mod execution_repository;
pub mod manager;
pub mod tenant_repository;

pub use endpoint_repository::SqliteEndpointRepository;
pub use execution_repository::SqliteExecutionLog;
pub use manager::{DbManager, SqliteConnection};
pub use tenant_repository::SqliteTenantRepository;
