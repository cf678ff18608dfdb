//! Key casing between the JSON wire (`pageId`) and decoded keywords (`:page-id`).
//!
//! Names without an uppercase letter (resp. without a hyphen) are kept as is,
//! so digit-suffixed fields such as `x1` survive both directions unchanged.

use convert_case::{Case, Casing};

use crate::value::Keyword;

/// Convert a camelCase wire key into a kebab-cased keyword.
pub fn to_keyword(key: &str) -> Keyword {
    if key.chars().any(|c| c.is_ascii_uppercase()) {
        Keyword::new(key.to_case(Case::Kebab))
    } else {
        Keyword::new(key)
    }
}

/// Convert a kebab-cased keyword name back into a camelCase wire key.
pub fn to_camel(name: &str) -> String {
    if name.contains('-') {
        name.to_case(Case::Camel)
    } else {
        name.to_owned()
    }
}
