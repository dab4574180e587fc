//! Remote method schema introspection
//!
//! Signatures come from the service's registry string when it has one and
//! from the callable's declared parameters otherwise. Schemas are computed
//! when an endpoint is defined and stored with it.

mod generator;
mod signature;
mod types;

use orbu_domain::{CompleteSchema, GatewayError, MethodSignature, Result};
use serde_json::{json, Value};
use tracing::{debug, warn};

pub use generator::{example_request, request_schema, response_schema};
pub use signature::{from_declared, parse, parse_signature, SignatureParseError};
pub use types::{json_type_of, normalize_type};

use crate::session_ports::ServiceObject;

/// Derives signatures and schemas from remote service objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaIntrospector;

impl SchemaIntrospector {
    pub fn new() -> Self {
        Self
    }

    /// Signature of `method_name` on `service`.
    ///
    /// A registry signature string that fails to parse falls back to the
    /// callable's declared parameters.
    pub fn method_signature(
        &self,
        service: &dyn ServiceObject,
        method_name: &str,
    ) -> Result<MethodSignature> {
        if let Some(raw) = service.signature(method_name) {
            match parse_signature(method_name, &raw) {
                Ok(signature) => return Ok(signature),
                Err(err) => {
                    warn!(method = method_name, error = %err, "Registry signature unparseable, using declared parameters");
                }
            }
        }

        let method = service.method(method_name).ok_or_else(|| {
            GatewayError::SchemaIntrospection(format!("method not found: {method_name}"))
        })?;

        debug!(method = method_name, "Building signature from declared parameters");
        let return_type = method.declared_return_type();
        Ok(from_declared(method_name, &method.declared_parameters(), return_type.as_deref()))
    }

    /// Signature, schemas and example for a method.
    ///
    /// Never fails: introspection errors yield empty schemas with `error` set.
    pub fn complete_schema(&self, service: &dyn ServiceObject, method_name: &str) -> CompleteSchema {
        match self.method_signature(service, method_name) {
            Ok(signature) => CompleteSchema {
                method_name: method_name.to_string(),
                request_schema: request_schema(&signature),
                response_schema: response_schema(&signature),
                example_request: example_request(&signature),
                signature: Some(signature),
                error: None,
            },
            Err(err) => {
                warn!(method = method_name, error = %err, "Schema introspection failed");
                CompleteSchema {
                    method_name: method_name.to_string(),
                    signature: None,
                    request_schema: empty_object(),
                    response_schema: empty_object(),
                    example_request: empty_object(),
                    error: Some(err.to_string()),
                }
            }
        }
    }
}

fn empty_object() -> Value {
    json!({})
}
