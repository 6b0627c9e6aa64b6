//! String and serialization helpers shared by the generators

use serde::Serialize;

use crate::core::error::Result;

/// Lowercases the first character of a string, leaving the rest untouched.
///
/// Used to turn PascalCase service names into camelCase package segments.
///
/// # Examples
/// ```
/// use openapi_packager::core::utils::first_char_to_lower;
///
/// assert_eq!(first_char_to_lower("CaseService"), "caseService");
/// assert_eq!(first_char_to_lower("ABC"), "aBC");
/// assert_eq!(first_char_to_lower(""), "");
/// ```
pub fn first_char_to_lower(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
    }
}

/// Replaces every hyphen with an underscore.
///
/// # Examples
/// ```
/// use openapi_packager::core::utils::hyphens_to_underscores;
///
/// assert_eq!(hyphens_to_underscores("other-test-service"), "other_test_service");
/// ```
pub fn hyphens_to_underscores(s: &str) -> String {
    s.replace('-', "_")
}

/// Serializes a value as two-space indented JSON with a trailing newline
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut data = serde_json::to_vec_pretty(value)?;
    data.push(b'\n');
    Ok(data)
}
