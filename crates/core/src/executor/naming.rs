//! Public service name to client attribute name mapping

/// Convert a public service name into the attribute name used on the remote
/// client: `SalesOrder` becomes `sales_order`.
///
/// An underscore goes before each capital that starts a new word, i.e. one
/// that follows a lowercase letter or digit, or that ends a run of capitals
/// and is followed by a lowercase letter. Acronyms stay together, so `GL`
/// becomes `gl` and `HTTPServer` becomes `http_server`. Names that are
/// already lowercase come back unchanged.
pub fn to_attribute_name(public_name: &str) -> String {
    let chars: Vec<char> = public_name.chars().collect();
    let mut attribute = String::with_capacity(public_name.len() + 4);

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());
            let starts_word = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if starts_word {
                attribute.push('_');
            }
        }
        attribute.extend(ch.to_lowercase());
    }

    attribute
}
