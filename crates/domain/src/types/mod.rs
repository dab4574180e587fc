//! Domain types and models

pub mod endpoint;
pub mod execution;
pub mod pool;
pub mod schema;
pub mod tenant;

pub use endpoint::{
    DeployFailure, DeployRequest, DeploymentSummary, EndpointDefinition, EndpointId,
    NewEndpoint, ServiceGroup, ServiceGroupId, SkippedMethod,
};
pub use execution::{
    CallerContext, CleanupReport, EndpointCleanup, ExecutionMeta, ExecutionRecord,
    ExecutionStats, ResponseEnvelope, RetentionCutoff,
};
pub use pool::{PoolStatus, PooledConnectionInfo};
pub use schema::{
    CompleteSchema, DeclaredParameter, JsonType, MethodSignature, ParameterInfo, TypeInfo,
};
pub use tenant::{TenantConnectionParams, TenantId};
