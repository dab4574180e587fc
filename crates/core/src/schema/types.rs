//! Source type normalisation

use orbu_domain::{JsonType, TypeInfo};

use super::signature::split_top_level;

const ARRAY_HEADS: &[&str] = &["list", "array", "sequence", "tuple", "set", "frozenset", "iterable"];
const OBJECT_HEADS: &[&str] = &["dict", "mapping"];

/// Normalise a source type annotation.
///
/// Unions (`A | B`, `Optional[A]`, `Union[A, B]`) are folded first: `None`
/// alternatives are dropped and mark the result nullable, and when several
/// alternatives remain the first one is used.
pub fn normalize_type(source: &str) -> TypeInfo {
    let source = source.trim();
    let (folded, nullable) = fold_union(source);

    TypeInfo { json_type: json_type_of(&folded), source_type: folded, nullable }
}

/// Map a single (non-union) type name onto the JSON type vocabulary.
///
/// Matching is by substring after container heads are checked, so unknown
/// names that happen to contain `int` or `str` map accordingly. Anything
/// unrecognised is an object.
pub fn json_type_of(type_name: &str) -> JsonType {
    let lower = type_name.trim().to_lowercase();
    if lower.is_empty() {
        return JsonType::Any;
    }

    let head = container_head(&lower);
    if ARRAY_HEADS.contains(&head) {
        return JsonType::Array;
    }
    if OBJECT_HEADS.contains(&head) {
        return JsonType::Object;
    }

    if lower.contains("str") {
        JsonType::String
    } else if lower.contains("int") {
        JsonType::Integer
    } else if lower.contains("float") || lower.contains("number") || lower.contains("decimal") {
        JsonType::Number
    } else if lower.contains("bool") {
        JsonType::Boolean
    } else if lower.contains("list") || lower.contains("array") {
        JsonType::Array
    } else if lower.contains("dict") || lower.contains("object") {
        JsonType::Object
    } else if lower.contains("none") || lower.contains("null") {
        JsonType::Null
    } else if head == "any" {
        JsonType::Any
    } else {
        JsonType::Object
    }
}

/// Element type of a generic container: `list[Contact]` gives `Contact`.
pub fn inner_type(type_name: &str) -> Option<&str> {
    let open = type_name.find('[')?;
    let close = type_name.rfind(']')?;
    (close > open + 1).then(|| type_name[open + 1..close].trim())
}

/// Lowercased generic head with any module path removed:
/// `typing.list[int]` gives `list`.
fn container_head(lower: &str) -> &str {
    let head = lower.split('[').next().unwrap_or(lower).trim();
    head.rsplit('.').next().unwrap_or(head)
}

fn is_none(alternative: &str) -> bool {
    matches!(alternative.trim(), "None" | "NoneType" | "none" | "null")
}

fn fold_union(source: &str) -> (String, bool) {
    let lower = source.to_lowercase();
    let head = container_head(&lower);

    let alternatives: Vec<&str> = if head == "optional" {
        let Some(inner) = inner_type(source) else {
            return (source.to_string(), false);
        };
        let (folded, _) = fold_union(inner);
        return (folded, true);
    } else if head == "union" {
        match inner_type(source) {
            Some(inner) => split_top_level(inner, ','),
            None => return (source.to_string(), false),
        }
    } else {
        split_top_level(source, '|')
    };

    if alternatives.len() < 2 {
        return (source.to_string(), false);
    }

    let concrete: Vec<&str> =
        alternatives.iter().map(|alt| alt.trim()).filter(|alt| !is_none(alt)).collect();
    let nullable = concrete.len() < alternatives.len();

    match concrete.first() {
        Some(first) => (first.to_string(), nullable),
        None => ("None".to_string(), true),
    }
}
