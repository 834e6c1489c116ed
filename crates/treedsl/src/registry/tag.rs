// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tag protocol: signature composition, defaulting and validation.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::config::{DEFAULT_TAG_SUFFIX, REF_TAG, TAG_DELIMITER, TAG_PATTERN};
use crate::errors::TagError;
use crate::types::TypeDescriptor;

/// Ordered `(key, value)` signature components.
///
/// ```rust
/// use treedsl::registry::{compose_tag, Signature};
///
/// let sig = Signature::new()
///     .with("ns", "calculator")
///     .with("name", "add")
///     .with("version", "1.0");
/// assert_eq!(compose_tag("Add", &sig).unwrap(), "calculator.add.1.0");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Signature {
    components: Vec<(String, String)>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a component.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.components.push((key.into(), value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.components
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.components
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn check_unique(&self) -> Result<(), TagError> {
        for (i, (key, _)) in self.components.iter().enumerate() {
            if self.components[..i].iter().any(|(k, _)| k == key) {
                return Err(TagError::DuplicateComponent { key: key.clone() });
            }
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Signature {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            components: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.components.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={:?}", k, v)?;
        }
        Ok(())
    }
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| match Regex::new(TAG_PATTERN) {
        Ok(re) => re,
        Err(e) => unreachable!("TAG_PATTERN is a valid regex: {}", e),
    })
}

/// Lower-cased kind name with the conventional suffix stripped.
///
/// `AddNode` -> `add`, `Literal` -> `literal`.
pub fn default_tag(type_name: &str) -> String {
    let lower = type_name.to_lowercase();
    match lower.strip_suffix(DEFAULT_TAG_SUFFIX) {
        Some(stem) => stem.to_string(),
        None => lower,
    }
}

/// Check a tag against the wire pattern.
pub fn validate_tag(tag: &str) -> Result<(), TagError> {
    if tag_regex().is_match(tag) {
        Ok(())
    } else {
        Err(TagError::Invalid {
            tag: tag.to_string(),
        })
    }
}

/// Tags that can never name a node kind.
pub fn is_reserved_tag(tag: &str) -> bool {
    tag == REF_TAG || TypeDescriptor::is_descriptor_tag(tag)
}

/// Compute and validate the tag for a kind.
///
/// Signature values joined by `.` in supplied order; without a signature,
/// the default derived from `type_name`.
pub fn compose_tag(type_name: &str, signature: &Signature) -> Result<String, TagError> {
    signature.check_unique()?;
    let tag = if signature.is_empty() {
        let tag = default_tag(type_name);
        if tag.is_empty() {
            return Err(TagError::Empty {
                type_name: type_name.to_string(),
            });
        }
        tag
    } else {
        signature
            .components
            .iter()
            .map(|(_, v)| v.as_str())
            .collect::<Vec<_>>()
            .join(TAG_DELIMITER)
    };
    validate_tag(&tag)?;
    if is_reserved_tag(&tag) {
        return Err(TagError::Reserved { tag });
    }
    Ok(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tag_strips_suffix() {
        assert_eq!(default_tag("AddNode"), "add");
        assert_eq!(default_tag("Number"), "number");
        assert_eq!(default_tag("Node"), "");
    }

    #[test]
    fn test_compose_from_signature() {
        let sig: Signature = [("ns", "calculator"), ("name", "add"), ("version", "2.0")]
            .into_iter()
            .collect();
        assert_eq!(compose_tag("AddV2", &sig), Ok("calculator.add.2.0".into()));
    }

    #[test]
    fn test_single_component_signature() {
        let sig = Signature::new().with("tag", "custom_tag");
        assert_eq!(compose_tag("Whatever", &sig), Ok("custom_tag".into()));
    }

    #[test]
    fn test_invalid_tags_rejected() {
        for bad in ["Add", "1add", "add..x", "add.", "a b", "add.X"] {
            assert!(validate_tag(bad).is_err(), "{} should be invalid", bad);
        }
        for good in ["add", "a-b_c9", "calculator.add.1.0", "x.0"] {
            assert!(validate_tag(good).is_ok(), "{} should be valid", good);
        }
    }

    #[test]
    fn test_empty_default_rejected() {
        assert_eq!(
            compose_tag("Node", &Signature::new()),
            Err(TagError::Empty {
                type_name: "Node".into()
            })
        );
    }

    #[test]
    fn test_reserved_tags_rejected() {
        assert_eq!(
            compose_tag("RefNode", &Signature::new()),
            Err(TagError::Reserved { tag: "ref".into() })
        );
        assert_eq!(
            compose_tag("ListNode", &Signature::new()),
            Err(TagError::Reserved { tag: "list".into() })
        );
    }

    #[test]
    fn test_duplicate_component_rejected() {
        let sig = Signature::new().with("name", "a").with("name", "b");
        assert_eq!(
            compose_tag("X", &sig),
            Err(TagError::DuplicateComponent { key: "name".into() })
        );
    }
}
