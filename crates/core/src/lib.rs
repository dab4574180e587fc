//! # Orbu Core
//!
//! Pure gateway logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for the remote ERP client,
//!   credentials and persistence
//! - The tenant connection pool
//! - The endpoint executor and method registry
//! - Schema introspection of remote method signatures
//! - Service deployment and log retention use cases
//!
//! ## Architecture Principles
//! - Only depends on `orbu-common` and `orbu-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits

pub mod deploy;
pub mod executor;
pub mod pool;
pub mod registry;
pub mod retention;
pub mod schema;

// Ports
pub mod endpoint_ports;
pub mod execution_ports;
pub mod session_ports;

pub use deploy::ServiceDeployer;
pub use endpoint_ports::{EndpointRegistrar, EndpointResolver};
pub use execution_ports::ExecutionLog;
pub use executor::{to_attribute_name, EndpointExecutor, ExecutionOutcome, ExecutionRequest};
pub use pool::ConnectionPool;
pub use registry::{MethodHandler, MethodRegistry, RegistrySession, SessionAuthenticator};
pub use retention::LogRetentionService;
pub use schema::SchemaIntrospector;
pub use session_ports::{
    CredentialResolver, InvocationError, Parameters, RemoteMethod, RemoteSession,
    ServiceObject, SessionFactory,
};
