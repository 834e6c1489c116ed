// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tag-discriminated serialization.
//!
//! Every encoded node, descriptor and ref is a mapping carrying a `"tag"`
//! key. Nodes encode their public fields in schema order and get the tag
//! applied last; refs encode as `{"tag": "ref", "id": ...}`; descriptors
//! use their variant tag. Decoding dispatches on the tag alone, so callers
//! never name the concrete kind.
//!
//! # Example
//!
//! ```rust
//! use treedsl::annotation::Annotation;
//! use treedsl::registry::KindDecl;
//! use treedsl::serialization::{from_structured, to_structured};
//! use treedsl::{NodeInstance, Registry, Value};
//!
//! let registry = Registry::new();
//! registry
//!     .register_kind(KindDecl::new("Number").field("value", Annotation::name("int")))
//!     .unwrap();
//!
//! let node = Value::from(NodeInstance::new("number").with("value", 3i64));
//! let doc = to_structured(&registry, &node).unwrap();
//! assert_eq!(doc["tag"], "number");
//! assert_eq!(from_structured(&registry, &doc).unwrap(), node);
//! ```

mod json;

pub use json::{Document, JsonAdapter};

use crate::errors::{DecodeError, EncodeError};
use crate::registry::Registry;
use crate::schema::NodeSchema;
use crate::types::TypeDescriptor;
use crate::value::{NodeInstance, Value};

/// Format-specific encoder/decoder over a structured document type.
pub trait FormatAdapter {
    /// Mapping type of the structured representation.
    type Document;

    /// Encode a node instance, declared public fields first, tag last.
    fn encode_node(&self, node: &NodeInstance) -> Result<Self::Document, EncodeError>;

    /// Decode a node mapping into [`Value::Node`], or [`Value::Ref`] for a ref mapping.
    fn decode_node(&self, doc: &Self::Document) -> Result<Value, DecodeError>;

    fn encode_descriptor(&self, td: &TypeDescriptor) -> Self::Document;

    fn decode_descriptor(&self, doc: &Self::Document) -> Result<TypeDescriptor, DecodeError>;

    /// Export a schema. One-directional: schemas are never decoded.
    fn encode_schema(&self, schema: &NodeSchema) -> Self::Document;
}

/// Encode a node, ref or descriptor (or any other value) with default options.
pub fn to_structured(registry: &Registry, value: &Value) -> Result<serde_json::Value, EncodeError> {
    JsonAdapter::new(registry).encode_value(value)
}

/// Decode a tagged mapping into a node, ref or descriptor value.
pub fn from_structured(
    registry: &Registry,
    json: &serde_json::Value,
) -> Result<Value, DecodeError> {
    JsonAdapter::new(registry).decode_document(json)
}

/// Encode to indented JSON text.
pub fn to_json(registry: &Registry, value: &Value) -> Result<String, EncodeError> {
    JsonAdapter::new(registry).to_json(value)
}

pub fn from_json(registry: &Registry, text: &str) -> Result<Value, DecodeError> {
    JsonAdapter::new(registry).from_json(text)
}
