// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # treedsl - typed node trees with tag-discriminated serialization
//!
//! Declare node kinds (typed records with a return type), give each a
//! stable string tag, derive machine-readable schemas from their field
//! annotations, and serialize trees of nodes to and from a structured
//! representation in which every node, ref and type descriptor carries a
//! `"tag"` key.
//!
//! ## Quick Start
//!
//! ```rust
//! use treedsl::{JsonAdapter, Node, Registry};
//!
//! #[derive(Debug, Clone, PartialEq, Node)]
//! #[node(sig(ns = "calc", name = "const"), returns = "float")]
//! struct Const {
//!     value: f64,
//! }
//!
//! let registry = Registry::new();
//! registry.register::<Const>().unwrap();
//! registry.seal();
//!
//! let adapter = JsonAdapter::new(&registry);
//! let doc = adapter.encode(&Const { value: 1.5 }).unwrap();
//! assert_eq!(doc["tag"], "calc.const");
//! assert_eq!(adapter.decode::<Const>(&doc).unwrap(), Const { value: 1.5 });
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |  annotation text -> Annotation  (annotation)                        |
//! +---------------------------------------------------------------------+
//! |  Registry: kinds by tag | markers | aliases | schema cache          |
//! +---------------------------------------------------------------------+
//! |  Extractor: Annotation -> TypeDescriptor   |  NodeSchema assembly   |
//! +---------------------------------------------------------------------+
//! |  FormatAdapter / JsonAdapter: Value <-> tagged structured form      |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Modules Overview
//!
//! - [`registry`] - kind declarations, tag protocol, registry (start here)
//! - [`types`] - type descriptor model
//! - [`extract`] - annotation to descriptor extraction
//! - [`schema`] - schema assembly
//! - [`serialization`] - tagged structured encoding
//! - [`ast`] - flat node containers linked by refs
//! - [`loaders`] - YAML/JSON declaration documents (feature `loaders`)

// Allow the derive macro to work inside this crate's tests
extern crate self as treedsl;

/// Annotation syntax tree and its text front-end.
pub mod annotation;
/// Flat AST container of ref-linked nodes.
pub mod ast;
/// Wire constants and codec options.
pub mod config;
/// Error types for every layer.
pub mod errors;
/// Annotation-to-descriptor extraction.
pub mod extract;
/// Declaration documents (YAML and JSON).
#[cfg(feature = "loaders")]
pub mod loaders;
/// Node kinds, tag protocol and the registry.
pub mod registry;
/// Node schema assembly.
pub mod schema;
/// Tag-discriminated serialization.
pub mod serialization;
/// Type descriptor model.
pub mod types;
/// Runtime node values and typed conversions.
pub mod value;

pub use ast::Ast;
pub use errors::{Error, Result};
pub use registry::{KindDecl, Node, Registry};
pub use schema::NodeSchema;
pub use serialization::{FormatAdapter, JsonAdapter};
pub use types::TypeDescriptor;
pub use value::{FromValue, NodeInstance, Ref, ToValue, Value};

// Derive macro (for #[derive(treedsl::Node)]); the trait shares the name.
pub use treedsl_codegen::Node;

/// treedsl version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
