//! Property tests for signature parsing and service naming.

use orbu_core::schema::{example_request, parse};
use orbu_core::to_attribute_name;
use proptest::prelude::*;

const TYPES: &[&str] = &["str", "int", "float", "bool", "list[str]", "dict[str, int]", "Contact"];

proptest! {
    #[test]
    fn parsed_parameters_match_written_ones(
        params in proptest::collection::btree_map("[a-z][a-z0-9_]{0,8}", (0..TYPES.len(), proptest::option::of(0u16..1000)), 0..6)
    ) {
        let params: Vec<(String, usize, Option<u16>)> = params
            .into_iter()
            .filter(|(name, _)| name != "self")
            .map(|(name, (ty, default))| (name, ty, default))
            .collect();

        let rendered: Vec<String> = params
            .iter()
            .map(|(name, ty, default)| match default {
                Some(value) => format!("{name}: {} = {value}", TYPES[*ty]),
                None => format!("{name}: {}", TYPES[*ty]),
            })
            .collect();
        let signature = format!("method({})", rendered.join(", "));

        let parsed = parse(&signature).unwrap();

        prop_assert_eq!(parsed.parameters.len(), params.len());
        for (info, (name, ty, default)) in parsed.parameters.iter().zip(&params) {
            prop_assert_eq!(&info.name, name);
            prop_assert_eq!(info.required, default.is_none());
            prop_assert_eq!(info.default.clone(), default.map(|v| v.to_string()));
            prop_assert_eq!(info.type_info.source_type.as_str(), TYPES[*ty]);
        }
    }

    #[test]
    fn attribute_names_are_idempotent(name in "[A-Za-z][A-Za-z0-9]{0,15}") {
        let once = to_attribute_name(&name);
        prop_assert_eq!(to_attribute_name(&once), once.clone());
        prop_assert!(!once.chars().any(char::is_uppercase));
    }

    #[test]
    fn example_requests_cover_required_parameters(
        params in proptest::collection::btree_map("[a-z][a-z0-9_]{0,8}", (0..TYPES.len(), any::<bool>()), 0..6)
    ) {
        let rendered: Vec<String> = params
            .iter()
            .filter(|(name, _)| name.as_str() != "self")
            .map(|(name, (ty, has_default))| {
                if *has_default {
                    format!("{name}: {} = None", TYPES[*ty])
                } else {
                    format!("{name}: {}", TYPES[*ty])
                }
            })
            .collect();
        let signature = parse(&format!("method({})", rendered.join(", "))).unwrap();

        let example = example_request(&signature);
        let example = example.as_object().unwrap();
        for required in signature.required_parameters() {
            prop_assert!(example.contains_key(required));
        }
        prop_assert_eq!(example.len(), signature.parameters.len());
    }
}
