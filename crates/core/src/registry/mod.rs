//! Explicit method registry
//!
//! Remote services are described by signature strings and async handlers
//! instead of being discovered at runtime. A [`RegistrySession`] exposes a
//! registry through the [`RemoteSession`] port, so registry-backed clients
//! plug straight into the pool and executor.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use orbu_domain::{DeclaredParameter, MethodSignature, Result};
use serde_json::Value;

use crate::executor::to_attribute_name;
use crate::schema::{parse, SignatureParseError};
use crate::session_ports::{
    InvocationError, Parameters, RemoteMethod, RemoteSession, ServiceObject,
};

/// Async callable behind a registered method.
#[async_trait]
pub trait MethodHandler: Send + Sync {
    async fn call(&self, params: Parameters) -> std::result::Result<Value, InvocationError>;
}

#[async_trait]
impl<F, Fut> MethodHandler for F
where
    F: Fn(Parameters) -> Fut + Send + Sync,
    Fut: Future<Output = std::result::Result<Value, InvocationError>> + Send + 'static,
{
    async fn call(&self, params: Parameters) -> std::result::Result<Value, InvocationError> {
        (self)(params).await
    }
}

/// Signature and handler of one registered method.
#[derive(Clone)]
pub struct MethodDescriptor {
    signature: MethodSignature,
    raw_signature: String,
    handler: Arc<dyn MethodHandler>,
}

impl MethodDescriptor {
    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    pub fn raw_signature(&self) -> &str {
        &self.raw_signature
    }
}

/// Services keyed by attribute name, each with its methods.
#[derive(Clone, Default)]
pub struct MethodRegistry {
    services: BTreeMap<String, BTreeMap<String, MethodDescriptor>>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a method on a service.
    ///
    /// `service` may be the public (`SalesOrder`) or attribute
    /// (`sales_order`) name. The method name comes from the signature.
    pub fn register(
        &mut self,
        service: &str,
        signature: &str,
        handler: impl MethodHandler + 'static,
    ) -> std::result::Result<&mut Self, SignatureParseError> {
        let parsed = parse(signature)?;
        let descriptor = MethodDescriptor {
            raw_signature: signature.trim().to_string(),
            handler: Arc::new(handler),
            signature: parsed,
        };

        self.services
            .entry(to_attribute_name(service))
            .or_default()
            .insert(descriptor.signature.method_name.clone(), descriptor);
        Ok(self)
    }

    pub fn service(&self, attribute_name: &str) -> Option<RegisteredService> {
        self.services.get(attribute_name).map(|methods| RegisteredService {
            name: attribute_name.to_string(),
            methods: methods.clone(),
        })
    }

    pub fn service_names(&self) -> Vec<String> {
        self.services.keys().cloned().collect()
    }
}

/// One service from a [`MethodRegistry`].
#[derive(Clone)]
pub struct RegisteredService {
    name: String,
    methods: BTreeMap<String, MethodDescriptor>,
}

impl RegisteredService {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ServiceObject for RegisteredService {
    fn method(&self, name: &str) -> Option<Arc<dyn RemoteMethod>> {
        self.methods
            .get(name)
            .map(|descriptor| Arc::new(RegisteredMethod(descriptor.clone())) as Arc<dyn RemoteMethod>)
    }

    fn method_names(&self) -> Vec<String> {
        self.methods.keys().cloned().collect()
    }

    fn signature(&self, method_name: &str) -> Option<String> {
        self.methods.get(method_name).map(|descriptor| descriptor.raw_signature.clone())
    }
}

/// Registered method that checks arguments against its signature before
/// calling the handler.
pub struct RegisteredMethod(MethodDescriptor);

#[async_trait]
impl RemoteMethod for RegisteredMethod {
    fn declared_parameters(&self) -> Vec<DeclaredParameter> {
        self.0
            .signature
            .parameters
            .iter()
            .map(|param| DeclaredParameter {
                name: param.name.clone(),
                default: param.default.clone(),
                annotation: Some(param.type_info.source_type.clone()),
            })
            .collect()
    }

    fn declared_return_type(&self) -> Option<String> {
        self.0.signature.return_type.as_ref().map(|ty| ty.source_type.clone())
    }

    async fn invoke(&self, params: Parameters) -> std::result::Result<Value, InvocationError> {
        check_arguments(&self.0.signature, &params)?;
        self.0.handler.call(params).await
    }
}

fn check_arguments(
    signature: &MethodSignature,
    params: &Parameters,
) -> std::result::Result<(), InvocationError> {
    let method = &signature.method_name;

    if let Some(unexpected) = params.keys().find(|key| signature.parameter(key).is_none()) {
        return Err(InvocationError::InvalidParameters(format!(
            "{method}() got an unexpected keyword argument '{unexpected}'"
        )));
    }

    if let Some(missing) = signature.required_parameters().find(|name| !params.contains_key(*name)) {
        return Err(InvocationError::InvalidParameters(format!(
            "{method}() missing required argument '{missing}'"
        )));
    }

    Ok(())
}

/// Authenticates a registry-backed session against the remote system.
#[async_trait]
pub trait SessionAuthenticator: Send + Sync {
    async fn login(&self) -> Result<()>;
    async fn logout(&self) -> Result<()>;
}

/// [`RemoteSession`] backed by a [`MethodRegistry`].
pub struct RegistrySession {
    registry: Arc<MethodRegistry>,
    authenticator: Arc<dyn SessionAuthenticator>,
}

impl RegistrySession {
    pub fn new(registry: Arc<MethodRegistry>, authenticator: Arc<dyn SessionAuthenticator>) -> Self {
        Self { registry, authenticator }
    }
}

#[async_trait]
impl RemoteSession for RegistrySession {
    async fn login(&self) -> Result<()> {
        self.authenticator.login().await
    }

    async fn logout(&self) -> Result<()> {
        self.authenticator.logout().await
    }

    fn service(&self, attribute_name: &str) -> Option<Arc<dyn ServiceObject>> {
        self.registry
            .service(attribute_name)
            .map(|service| Arc::new(service) as Arc<dyn ServiceObject>)
    }

    fn service_names(&self) -> Vec<String> {
        self.registry.service_names()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn registry() -> MethodRegistry {
        let mut registry = MethodRegistry::new();
        registry
            .register(
                "Contact",
                "get_list(filter: str, top: int = 100) -> list[Contact]",
                |params: Parameters| async move {
                    Ok::<_, InvocationError>(json!({"echo": params}))
                },
            )
            .expect("valid signature")
            .register("SalesOrder", "get_by_id(id: str) -> SalesOrder", |_params: Parameters| async {
                Ok::<_, InvocationError>(json!({"id": "SO-1"}))
            })
            .expect("valid signature");
        registry
    }

    #[test]
    fn services_keyed_by_attribute_name() {
        let registry = registry();

        assert_eq!(registry.service_names(), vec!["contact", "sales_order"]);
        let service = registry.service("sales_order").expect("registered");
        assert_eq!(service.method_names(), vec!["get_by_id"]);
        assert_eq!(service.signature("get_by_id").as_deref(), Some("get_by_id(id: str) -> SalesOrder"));
    }

    #[test]
    fn invalid_signature_is_rejected() {
        let mut registry = MethodRegistry::new();
        let result = registry.register("Contact", "broken", |_p: Parameters| async {
            Ok::<_, InvocationError>(Value::Null)
        });
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn invoke_passes_valid_arguments() {
        let method = registry().service("contact").and_then(|s| s.method("get_list")).expect("method");

        let mut params = Parameters::new();
        params.insert("filter".into(), json!("Active"));
        let result = method.invoke(params).await.expect("invokes");

        assert_eq!(result, json!({"echo": {"filter": "Active"}}));
    }

    #[tokio::test]
    async fn invoke_rejects_unknown_and_missing_arguments() {
        let method = registry().service("contact").and_then(|s| s.method("get_list")).expect("method");

        let mut unknown = Parameters::new();
        unknown.insert("filter".into(), json!("x"));
        unknown.insert("bogus".into(), json!(1));
        assert_eq!(
            method.invoke(unknown).await,
            Err(InvocationError::InvalidParameters(
                "get_list() got an unexpected keyword argument 'bogus'".into()
            ))
        );

        assert_eq!(
            method.invoke(Parameters::new()).await,
            Err(InvocationError::InvalidParameters(
                "get_list() missing required argument 'filter'".into()
            ))
        );
    }

    #[test]
    fn declared_parameters_mirror_signature() {
        let method = registry().service("contact").and_then(|s| s.method("get_list")).expect("method");
        let declared = method.declared_parameters();

        assert_eq!(declared[1], DeclaredParameter::new("top").annotated("int").with_default("100"));
        assert_eq!(method.declared_return_type().as_deref(), Some("list[Contact]"));
    }
}
