//! Glob patterns over record keys.
//!
//! `*` matches any run of characters (including none) and `?` matches exactly
//! one character. Every other character matches itself.

use std::fmt;

/// Anything a query can be built from: `&str`, `String`, or
/// `format_args!` output.
///
/// ```
/// use mit_store::{InMemoryIndex, IndexStore};
///
/// let index = InMemoryIndex::new();
/// index.set("fvTenant:uni/tn-a", r#"{"name":"a"}"#).unwrap();
/// let class = "fvTenant";
/// assert_eq!(index.find(format_args!("{class}:*")).unwrap().len(), 1);
/// ```
pub trait KeyPattern {
    fn into_pattern(self) -> String;
}

impl KeyPattern for &str {
    fn into_pattern(self) -> String {
        self.to_string()
    }
}

impl KeyPattern for String {
    fn into_pattern(self) -> String {
        self
    }
}

impl KeyPattern for &String {
    fn into_pattern(self) -> String {
        self.clone()
    }
}

impl KeyPattern for fmt::Arguments<'_> {
    fn into_pattern(self) -> String {
        self.to_string()
    }
}

/// Collapse doubled path separators left by joining empty DN segments.
pub fn normalize(pattern: &str) -> String {
    pattern.replace("//", "/")
}

/// Whether the pattern selects a whole class (`class:*`).
pub fn is_class_wildcard(pattern: &str) -> bool {
    pattern.ends_with(":*")
}

/// The literal text before the first wildcard. Every matching key starts
/// with it, so it bounds the range scan.
pub fn literal_prefix(pattern: &str) -> &str {
    match pattern.find(['*', '?']) {
        Some(i) => &pattern[..i],
        None => pattern,
    }
}

/// Match `key` against a glob `pattern`.
pub fn matches(pattern: &str, key: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let key: Vec<char> = key.chars().collect();

    let (mut p, mut k) = (0, 0);
    // Position of the last `*` seen and the key position it was tried at.
    let mut backtrack: Option<(usize, usize)> = None;

    while k < key.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, k));
                p += 1;
            }
            Some('?') => {
                p += 1;
                k += 1;
            }
            Some(c) if *c == key[k] => {
                p += 1;
                k += 1;
            }
            _ => match backtrack {
                // Let the last star absorb one more character.
                Some((star, at)) => {
                    p = star + 1;
                    k = at + 1;
                    backtrack = Some((star, at + 1));
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|c| *c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn literal_matches_only_itself() {
        assert!(matches("fvTenant:uni/tn-a", "fvTenant:uni/tn-a"));
        assert!(!matches("fvTenant:uni/tn-a", "fvTenant:uni/tn-ab"));
        assert!(!matches("fvTenant:uni/tn-ab", "fvTenant:uni/tn-a"));
    }

    #[test]
    fn trailing_star_matches_class() {
        assert!(matches("fvTenant:*", "fvTenant:uni/tn-a"));
        assert!(matches("fvTenant:*", "fvTenant:"));
        assert!(!matches("fvTenant:*", "fvTenantX:uni/tn-a"));
        assert!(!matches("fvTenant:*", "fvAp:uni/tn-a/ap-b"));
    }

    #[test]
    fn embedded_star_and_question_mark() {
        assert!(matches("fvTenant:*-a", "fvTenant:uni/tn-a"));
        assert!(!matches("fvTenant:*-a", "fvTenant:uni/tn-b"));
        assert!(matches("healthInst:*/node-10?/sys/health", "healthInst:topology/pod-1/node-101/sys/health"));
        assert!(!matches("node-10?", "node-10"));
        assert!(matches("a*b*c", "aXXbYYc"));
        assert!(matches("a*b*c", "abbbc"));
        assert!(!matches("a*b*c", "acb"));
    }

    #[test]
    fn star_only_matches_everything() {
        assert!(matches("*", ""));
        assert!(matches("*", "anything:at/all"));
        assert!(matches("**", "x"));
    }

    #[test]
    fn normalize_collapses_double_slashes() {
        assert_eq!(normalize("healthInst:uni//tn-a/health"), "healthInst:uni/tn-a/health");
        assert_eq!(normalize("a///b"), "a//b");
        assert_eq!(normalize("plain"), "plain");
    }

    #[test]
    fn literal_prefix_stops_at_first_wildcard() {
        assert_eq!(literal_prefix("fvTenant:*"), "fvTenant:");
        assert_eq!(literal_prefix("fv?enant:*"), "fv");
        assert_eq!(literal_prefix("*"), "");
        assert_eq!(literal_prefix("exact:key"), "exact:key");
    }

    #[test]
    fn class_wildcard_detection() {
        assert!(is_class_wildcard("fvTenant:*"));
        assert!(!is_class_wildcard("fvTenant:*-a"));
        assert!(!is_class_wildcard("fvTenant*"));
    }

    #[test]
    fn key_pattern_from_format_args() {
        let dn = "uni/tn-a";
        assert_eq!(format_args!("fvTenant:{dn}").into_pattern(), "fvTenant:uni/tn-a");
        assert_eq!("x".into_pattern(), "x");
        assert_eq!(String::from("y").into_pattern(), "y");
    }

    proptest! {
        #[test]
        fn literal_pattern_matches_exactly(key in "[a-zA-Z0-9:/_-]{0,24}", other in "[a-zA-Z0-9:/_-]{0,24}") {
            prop_assert!(matches(&key, &key));
            prop_assert_eq!(matches(&key, &other), key == other);
        }

        #[test]
        fn prefix_star_matches_prefixed_keys(prefix in "[a-zA-Z:/-]{0,12}", key in "[a-zA-Z:/-]{0,24}") {
            let pattern = format!("{prefix}*");
            prop_assert_eq!(matches(&pattern, &key), key.starts_with(&prefix));
        }

        #[test]
        fn matching_keys_start_with_literal_prefix(prefix in "[a-z:]{0,8}", rest in "[a-z?*]{0,8}", key in "[a-z:]{0,16}") {
            let pattern = format!("{prefix}{rest}");
            if matches(&pattern, &key) {
                prop_assert!(key.starts_with(literal_prefix(&pattern)));
            }
        }
    }
}
