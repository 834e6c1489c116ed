// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptor model.
//!
//! A [`TypeDescriptor`] records the *shape* of a field: primitives,
//! element and key/value containers, tuples, literals, embedded nodes,
//! refs, unions and generic placeholders. Descriptors carry no behavior
//! beyond structural equality and traversal, and every consumer matches
//! over the variant set exhaustively.
//!
//! # Example
//!
//! ```rust
//! use treedsl::types::TypeDescriptor;
//!
//! let td = TypeDescriptor::dict(TypeDescriptor::str(), TypeDescriptor::float());
//! assert_eq!(td.tag(), "dict");
//! assert_eq!(td.to_string(), "dict[str, float]");
//! ```

mod descriptor;

pub use descriptor::{LiteralValue, PrimitiveKind, TypeDescriptor};
