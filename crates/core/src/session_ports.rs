//! Remote ERP client port interfaces
//!
//! The remote client is treated as an opaque capability: a session can log
//! in and out and exposes named services, each holding named methods that
//! accept keyword parameters.

use std::sync::Arc;

use async_trait::async_trait;
use orbu_domain::{DeclaredParameter, GatewayError, Result, TenantConnectionParams, TenantId};
use serde_json::{Map, Value};
use thiserror::Error;

/// Named arguments passed to a remote method.
pub type Parameters = Map<String, Value>;

/// Failure raised by a remote method invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvocationError {
    /// Wrong, missing or unexpected arguments.
    #[error("{0}")]
    InvalidParameters(String),

    /// Any other failure reported by the remote system.
    #[error("{0}")]
    Remote(String),
}

impl From<InvocationError> for GatewayError {
    fn from(err: InvocationError) -> Self {
        match err {
            InvocationError::InvalidParameters(message) => GatewayError::InvalidParameters(message),
            InvocationError::Remote(message) => GatewayError::ExecutionError(message),
        }
    }
}

/// A callable remote method.
#[async_trait]
pub trait RemoteMethod: Send + Sync {
    /// Parameters as declared by the callable itself (receiver excluded).
    fn declared_parameters(&self) -> Vec<DeclaredParameter>;

    /// Declared return type, when the callable exposes one.
    fn declared_return_type(&self) -> Option<String> {
        None
    }

    /// Invoke the method with named arguments.
    async fn invoke(&self, params: Parameters) -> std::result::Result<Value, InvocationError>;
}

/// A named group of remote methods.
pub trait ServiceObject: Send + Sync {
    /// Look up a method by name.
    fn method(&self, name: &str) -> Option<Arc<dyn RemoteMethod>>;

    /// Names of every public method on the service.
    fn method_names(&self) -> Vec<String>;

    /// Registry-backed signature string, e.g.
    /// `get_list(filter: str, top: int = 100) -> list[Contact]`.
    fn signature(&self, _method_name: &str) -> Option<String> {
        None
    }
}

/// A live, authenticated handle to the remote system.
#[async_trait]
pub trait RemoteSession: Send + Sync {
    /// Authenticate against the remote system.
    async fn login(&self) -> Result<()>;

    /// End the remote session.
    async fn logout(&self) -> Result<()>;

    /// Resolve a service by its attribute name (`sales_order`).
    fn service(&self, attribute_name: &str) -> Option<Arc<dyn ServiceObject>>;

    /// Attribute names of every service on the session.
    fn service_names(&self) -> Vec<String>;
}

/// Builds remote sessions from tenant connection parameters.
pub trait SessionFactory: Send + Sync {
    /// Construct a session. The session is not logged in yet.
    fn create(&self, params: &TenantConnectionParams) -> Result<Arc<dyn RemoteSession>>;
}

/// Resolves decrypted connection parameters for a tenant.
#[async_trait]
pub trait CredentialResolver: Send + Sync {
    /// Fetch parameters for `tenant_id`.
    ///
    /// Returns `NotFound` for an unknown tenant and `ConnectionFailure` when
    /// stored credentials cannot be decrypted.
    async fn resolve(&self, tenant_id: TenantId) -> Result<TenantConnectionParams>;
}
