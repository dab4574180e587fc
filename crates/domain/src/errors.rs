//! Error types used throughout the gateway

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the gateway
///
/// Every variant carries a human-readable message. The `Display` output of
/// the caller-facing variants is exactly the message returned in failure
/// envelopes, so internal type names never reach API consumers.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum GatewayError {
    /// Tenant, service group, endpoint, remote service or remote method is
    /// missing.
    #[error("{0}")]
    NotFound(String),

    /// Service group or endpoint exists but is disabled.
    #[error("{0}")]
    Inactive(String),

    /// Credentials could not be resolved or the remote login failed.
    #[error("{0}")]
    ConnectionFailure(String),

    /// The request body does not match the remote method's parameters.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// The remote method raised during invocation.
    #[error("Execution error: {0}")]
    ExecutionError(String),

    /// Signature lookup or parsing failed.
    #[error("Schema introspection failed: {0}")]
    SchemaIntrospection(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// HTTP-style status code used in response envelopes and execution
    /// records.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Inactive(_) => 403,
            Self::InvalidParameters(_) => 400,
            Self::ConnectionFailure(_)
            | Self::ExecutionError(_)
            | Self::SchemaIntrospection(_)
            | Self::Database(_)
            | Self::Config(_)
            | Self::Internal(_) => 500,
        }
    }

    /// Short machine-friendly label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Inactive(_) => "inactive",
            Self::ConnectionFailure(_) => "connection_failure",
            Self::InvalidParameters(_) => "invalid_parameters",
            Self::ExecutionError(_) => "execution_error",
            Self::SchemaIntrospection(_) => "schema_introspection",
            Self::Database(_) => "database",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;
