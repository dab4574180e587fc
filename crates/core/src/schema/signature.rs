//! Signature string parsing
//!
//! Grammar: `name(param[: type][ = default], ...)[ -> return_type]`.
//! Commas, `=` and `|` only separate at bracket depth zero, so
//! `dict[str, int]` or a `{...}` default stays one token.

use orbu_domain::constants::UNANNOTATED_PARAMETER_TYPE;
use orbu_domain::{DeclaredParameter, MethodSignature, ParameterInfo};
use thiserror::Error;

use super::types::normalize_type;

/// Malformed signature string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureParseError {
    #[error("signature has no parameter list: {0}")]
    MissingParameterList(String),

    #[error("unbalanced brackets in signature: {0}")]
    UnbalancedBrackets(String),

    #[error("signature has an empty method name: {0}")]
    MissingMethodName(String),
}

/// Parse a full signature string, taking the method name from its prefix.
pub fn parse(signature: &str) -> Result<MethodSignature, SignatureParseError> {
    let open = signature
        .find('(')
        .ok_or_else(|| SignatureParseError::MissingParameterList(signature.to_string()))?;
    let name = signature[..open].trim();
    if name.is_empty() {
        return Err(SignatureParseError::MissingMethodName(signature.to_string()));
    }
    parse_signature(name, signature)
}

/// Parse `signature` for the method called `method_name`.
///
/// Unannotated parameters are treated as `str`. A parameter is required iff
/// it has no default; defaults are kept verbatim. `self` and bare `*`/`/`
/// markers are skipped, as are `*args`/`**kwargs` collectors.
pub fn parse_signature(
    method_name: &str,
    signature: &str,
) -> Result<MethodSignature, SignatureParseError> {
    let open = signature
        .find('(')
        .ok_or_else(|| SignatureParseError::MissingParameterList(signature.to_string()))?;
    let close = matching_close(signature, open)
        .ok_or_else(|| SignatureParseError::UnbalancedBrackets(signature.to_string()))?;

    let mut parameters = Vec::new();
    for raw in split_top_level(&signature[open + 1..close], ',') {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }

        let (declaration, default) = match split_once_top_level(raw, '=') {
            Some((declaration, default)) => (declaration.trim(), Some(default.trim().to_string())),
            None => (raw, None),
        };
        let (name, annotation) = match declaration.split_once(':') {
            Some((name, annotation)) => (name.trim(), annotation.trim()),
            None => (declaration, UNANNOTATED_PARAMETER_TYPE),
        };
        if is_skipped(name) {
            continue;
        }

        parameters.push(ParameterInfo {
            name: name.to_string(),
            required: default.is_none(),
            default,
            type_info: normalize_type(annotation),
        });
    }

    let return_type = signature[close + 1..]
        .trim()
        .strip_prefix("->")
        .map(str::trim)
        .filter(|ty| !ty.is_empty())
        .map(normalize_type);

    Ok(MethodSignature { method_name: method_name.to_string(), parameters, return_type })
}

/// Build a signature from parameters declared on the callable itself.
///
/// Unlike signature strings, an unannotated parameter here has type `any`.
pub fn from_declared(
    method_name: &str,
    declared: &[DeclaredParameter],
    return_annotation: Option<&str>,
) -> MethodSignature {
    let parameters = declared
        .iter()
        .filter(|param| !is_skipped(&param.name))
        .map(|param| ParameterInfo {
            name: param.name.clone(),
            required: param.default.is_none(),
            default: param.default.clone(),
            type_info: normalize_type(param.annotation.as_deref().unwrap_or("Any")),
        })
        .collect();

    MethodSignature {
        method_name: method_name.to_string(),
        parameters,
        return_type: return_annotation.filter(|ty| !ty.trim().is_empty()).map(normalize_type),
    }
}

/// Split on `separator` at bracket depth zero.
pub(crate) fn split_top_level(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    for (i, ch) in input.char_indices() {
        match ch {
            '[' | '{' | '(' => depth += 1,
            ']' | '}' | ')' => depth -= 1,
            c if c == separator && depth == 0 => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn split_once_top_level(input: &str, separator: char) -> Option<(&str, &str)> {
    let mut depth = 0i32;
    for (i, ch) in input.char_indices() {
        match ch {
            '[' | '{' | '(' => depth += 1,
            ']' | '}' | ')' => depth -= 1,
            c if c == separator && depth == 0 => {
                return Some((&input[..i], &input[i + c.len_utf8()..]));
            }
            _ => {}
        }
    }
    None
}

fn matching_close(input: &str, open: usize) -> Option<usize> {
    let mut depth = 0i32;
    for (i, ch) in input[open..].char_indices() {
        match ch {
            '[' | '{' | '(' => depth += 1,
            ']' | '}' | ')' => {
                depth -= 1;
                if depth == 0 {
                    return (ch == ')').then_some(open + i);
                }
                if depth < 0 {
                    return None;
                }
            }
            _ => {}
        }
    }
    None
}

fn is_skipped(name: &str) -> bool {
    name == "self" || name == "/" || name.starts_with('*')
}
