//! Method signature and schema types

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structural type vocabulary used in generated schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
    Null,
    Any,
}

impl JsonType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Null => "null",
            Self::Any => "any",
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalised type of a parameter or return value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInfo {
    pub json_type: JsonType,
    /// Type as written in the source signature (after union folding).
    pub source_type: String,
    /// Set when a `... | None` union was folded into a single alternative.
    #[serde(default)]
    pub nullable: bool,
}

/// One parameter of a remote method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterInfo {
    pub name: String,
    /// True when the parameter has no declared default.
    pub required: bool,
    /// Default value exactly as written in the signature.
    pub default: Option<String>,
    pub type_info: TypeInfo,
}

/// Derived description of a remote method's inputs and output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    pub method_name: String,
    pub parameters: Vec<ParameterInfo>,
    pub return_type: Option<TypeInfo>,
}

impl MethodSignature {
    pub fn has_return_type(&self) -> bool {
        self.return_type.is_some()
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterInfo> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Names of the parameters without defaults, in declaration order.
    pub fn required_parameters(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().filter(|p| p.required).map(|p| p.name.as_str())
    }
}

/// Parameter as declared by a callable, used when no registry signature
/// string is available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredParameter {
    pub name: String,
    pub default: Option<String>,
    pub annotation: Option<String>,
}

impl DeclaredParameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), default: None, annotation: None }
    }

    #[must_use]
    pub fn annotated(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Everything captured about a method when its endpoint is defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteSchema {
    pub method_name: String,
    pub signature: Option<MethodSignature>,
    pub request_schema: Value,
    pub response_schema: Value,
    pub example_request: Value,
    /// Introspection failure that degraded this result to empty schemas.
    pub error: Option<String>,
}
