//! Canonical record keys.

use serde_json::{Map, Value};

/// Separator between the class and the DN in a record key.
pub const KEY_SEPARATOR: char = ':';

/// Format the canonical index key for a record: `class:dn`.
///
/// ```
/// use mit_types::record_key;
///
/// assert_eq!(record_key("fvTenant", "uni/tn-common"), "fvTenant:uni/tn-common");
/// ```
pub fn record_key(class: &str, dn: &str) -> String {
    let mut key = String::with_capacity(class.len() + dn.len() + 1);
    key.push_str(class);
    key.push(KEY_SEPARATOR);
    key.push_str(dn);
    key
}

/// The non-empty `dn` attribute of an attributes object, if present.
pub fn explicit_dn(attributes: &Map<String, Value>) -> Option<&str> {
    attributes
        .get("dn")
        .and_then(Value::as_str)
        .filter(|dn| !dn.is_empty())
}
