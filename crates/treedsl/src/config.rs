// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! treedsl configuration - wire constants and codec options.
//!
//! Every discriminant key, reserved tag and delimiter used by the registry
//! and the serialization layer lives here. **Never hardcode them elsewhere.**
//!
//! # Example
//!
//! ```rust
//! use treedsl::config::{CodecConfig, REF_TAG, TAG_KEY};
//!
//! assert_eq!(TAG_KEY, "tag");
//! assert_eq!(REF_TAG, "ref");
//!
//! let strict = CodecConfig::default().with_strict_fields(true);
//! assert!(strict.strict_fields);
//! ```

use serde::Deserialize;

// =======================================================================
// Structured representation keys
// =======================================================================

/// Discriminant key present in every encoded node, descriptor and ref.
pub const TAG_KEY: &str = "tag";

/// Reserved tag value marking an encoded [`Ref`](crate::Ref).
///
/// Never a valid node or descriptor tag.
pub const REF_TAG: &str = "ref";

/// Key holding the identifier of an encoded ref.
pub const REF_ID_KEY: &str = "id";

// =======================================================================
// Tag composition
// =======================================================================

/// Delimiter joining signature component values into a tag.
pub const TAG_DELIMITER: &str = ".";

/// Suffix stripped from a kind's lower-cased name when no signature is given.
///
/// `AddNode` -> `add`.
pub const DEFAULT_TAG_SUFFIX: &str = "node";

/// Pattern every tag must match.
///
/// First dot-separated segment starts with a lowercase letter; the
/// remaining segments are non-empty runs of `[a-z0-9_-]`.
pub const TAG_PATTERN: &str = r"^[a-z][a-z0-9_-]*(\.[a-z0-9_-]+)*$";

// =======================================================================
// Codec options
// =======================================================================

/// Options for the structured encoder/decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Reject incoming keys that are not declared fields of the node kind.
    pub strict_fields: bool,
    /// Indent JSON text output.
    pub pretty: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            strict_fields: false,
            pretty: true,
        }
    }
}

impl CodecConfig {
    /// Toggle strict field checking on decode.
    #[must_use]
    pub fn with_strict_fields(mut self, strict: bool) -> Self {
        self.strict_fields = strict;
        self
    }

    /// Toggle indented JSON text output.
    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}
