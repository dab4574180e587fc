//! Conversions from external infrastructure errors into domain errors.

use orbu_domain::GatewayError;
use rusqlite::Error as SqlError;
use tokio::task::JoinError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub GatewayError);

impl From<InfraError> for GatewayError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<GatewayError> for InfraError {
    fn from(value: GatewayError) -> Self {
        InfraError(value)
    }
}

trait IntoGatewayError {
    fn into_gateway(self) -> GatewayError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → GatewayError */
/* -------------------------------------------------------------------------- */

impl IntoGatewayError for SqlError {
    fn into_gateway(self) -> GatewayError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => GatewayError::Database("database is busy".into()),
                    (ErrorCode::DatabaseLocked, _) => {
                        GatewayError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067 | 1555) => {
                        GatewayError::Database("unique constraint violation".into())
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        GatewayError::Database("foreign key constraint violation".into())
                    }
                    _ => GatewayError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => GatewayError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                GatewayError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                GatewayError::Database(format!("invalid column type: {ty}"))
            }
            RE::InvalidPath(path) => GatewayError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => GatewayError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_gateway())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → GatewayError */
/* -------------------------------------------------------------------------- */

impl IntoGatewayError for r2d2::Error {
    fn into_gateway(self) -> GatewayError {
        GatewayError::Database(format!("connection pool unavailable: {self}"))
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(value.into_gateway())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → GatewayError */
/* -------------------------------------------------------------------------- */

impl IntoGatewayError for serde_json::Error {
    fn into_gateway(self) -> GatewayError {
        GatewayError::Database(format!("stored JSON is invalid: {self}"))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(value.into_gateway())
    }
}

/// Map a failed `spawn_blocking` join into a domain error.
pub fn map_join_error(err: JoinError) -> GatewayError {
    if err.is_cancelled() {
        GatewayError::Internal("blocking task cancelled".into())
    } else {
        GatewayError::Internal(format!("blocking task panicked: {err}"))
    }
}
