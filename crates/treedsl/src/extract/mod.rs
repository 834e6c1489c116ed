// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type extraction: annotation -> [`TypeDescriptor`].
//!
//! [`classify`] normalizes an annotation into a closed [`Shape`];
//! [`Extractor::extract`] is an exhaustive match over it.
//!
//! # Example
//!
//! ```rust
//! use treedsl::annotation::Annotation;
//! use treedsl::types::TypeDescriptor;
//! use treedsl::Registry;
//!
//! let registry = Registry::new();
//! let ann = Annotation::parse("dict[str, float]").unwrap();
//! assert_eq!(
//!     registry.extract(&ann).unwrap(),
//!     TypeDescriptor::dict(TypeDescriptor::str(), TypeDescriptor::float()),
//! );
//! ```

mod classify;

pub use classify::{classify, ElementContainer, KeyValueContainer, Shape};

use crate::annotation::{Annotation, Constant};
use crate::errors::ExtractError;
use crate::registry::{NodeKind, Registry, NODE_BASE};
use crate::types::{LiteralValue, PrimitiveKind, TypeDescriptor};

/// Recursive extractor bound to a registry.
///
/// Tracks the kinds whose return type is being resolved so that a kind
/// returning itself is reported instead of recursing forever.
pub struct Extractor<'r> {
    registry: &'r Registry,
    resolving: Vec<String>,
}

impl<'r> Extractor<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            resolving: Vec::new(),
        }
    }

    pub fn extract(&mut self, annotation: &Annotation) -> Result<TypeDescriptor, ExtractError> {
        match classify(annotation, self.registry)? {
            Shape::Param(decl) => Ok(TypeDescriptor::TypeParameter {
                name: decl.name.clone(),
                bound: match &decl.bound {
                    Some(bound) => Some(Box::new(self.extract(bound)?)),
                    None => None,
                },
            }),
            Shape::Marker(descriptor) => Ok(descriptor),
            Shape::Alias { alias, args } => {
                let substituted = alias.apply(args)?;
                self.extract(&substituted)
            }
            Shape::Primitive(kind) => Ok(TypeDescriptor::Primitive(kind)),
            Shape::Elements { container, args } => match args {
                [element] => Ok(container.wrap(self.extract(element)?)),
                _ => Err(ExtractError::Arity {
                    container: container.name(),
                    expected: "an element type",
                }),
            },
            Shape::KeyValue { container, args } => match args {
                [key, value] => Ok(container.wrap(self.extract(key)?, self.extract(value)?)),
                _ => Err(ExtractError::Arity {
                    container: container.name(),
                    expected: "key and value types",
                }),
            },
            Shape::Tuple(args) => {
                if args.is_empty() {
                    return Err(ExtractError::EmptyTuple);
                }
                Ok(TypeDescriptor::Tuple {
                    elements: self.extract_all(args)?,
                })
            }
            Shape::Literal(args) => {
                if args.is_empty() {
                    return Err(ExtractError::EmptyLiteral);
                }
                let values = args
                    .iter()
                    .map(literal_value)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(TypeDescriptor::Literal { values })
            }
            Shape::BaseNode(args) => match args {
                [] => Ok(TypeDescriptor::node(TypeDescriptor::none())),
                [returns] => Ok(TypeDescriptor::node(self.extract(returns)?)),
                _ => Err(ExtractError::Arity {
                    container: NODE_BASE,
                    expected: "at most one return type",
                }),
            },
            Shape::Kind { kind, args } => match args {
                [] => Ok(TypeDescriptor::node(self.returns_of(&kind)?)),
                [returns] => Ok(TypeDescriptor::node(self.extract(returns)?)),
                _ => Err(ExtractError::KindArity {
                    kind: kind.name().to_string(),
                    got: args.len(),
                }),
            },
            Shape::Ref(args) => match args {
                [] => Ok(TypeDescriptor::reference(TypeDescriptor::none())),
                [target] => Ok(TypeDescriptor::reference(self.extract(target)?)),
                _ => Err(ExtractError::Arity {
                    container: "Ref",
                    expected: "at most one target type",
                }),
            },
            Shape::Union(options) => {
                if options.is_empty() {
                    return Err(ExtractError::Arity {
                        container: "Union",
                        expected: "at least one option",
                    });
                }
                let mut flat = Vec::with_capacity(options.len());
                for option in self.extract_all(options)? {
                    splice_option(&mut flat, option);
                }
                Ok(TypeDescriptor::Union { options: flat })
            }
            Shape::Optional(args) => match args {
                [inner] => Ok(optional(self.extract(inner)?)),
                _ => Err(ExtractError::Arity {
                    container: "Optional",
                    expected: "exactly one type",
                }),
            },
            Shape::Unrecognized => Err(ExtractError::Unrecognized {
                annotation: annotation.to_string(),
            }),
        }
    }

    fn extract_all(&mut self, args: &[Annotation]) -> Result<Vec<TypeDescriptor>, ExtractError> {
        args.iter().map(|a| self.extract(a)).collect()
    }

    /// Return type a kind produces.
    ///
    /// The first base that is `Node[X]` or a node-kind application `K[X]`
    /// yields `X`; a bare node-kind base yields that kind's own return type.
    /// Without such a base the kind returns `None`.
    pub fn returns_of(&mut self, kind: &NodeKind) -> Result<TypeDescriptor, ExtractError> {
        if self.resolving.iter().any(|t| t == kind.tag()) {
            return Err(ExtractError::RecursiveReturns {
                name: kind.name().to_string(),
            });
        }
        self.resolving.push(kind.tag().to_string());
        let result = self.search_bases(kind);
        self.resolving.pop();
        result
    }

    fn search_bases(&mut self, kind: &NodeKind) -> Result<TypeDescriptor, ExtractError> {
        for base in kind.bases() {
            match base {
                Annotation::Generic { name, args } if !args.is_empty() => {
                    if name == NODE_BASE || self.registry.kind_by_name(name)?.is_some() {
                        if args.len() > 1 {
                            return Err(ExtractError::KindArity {
                                kind: name.clone(),
                                got: args.len(),
                            });
                        }
                        return self.extract(&args[0]);
                    }
                }
                Annotation::Name(name) => {
                    if let Some(parent) = self.registry.kind_by_name(name)? {
                        return self.returns_of(&parent);
                    }
                }
                _ => {}
            }
        }
        Ok(TypeDescriptor::none())
    }
}

fn literal_value(annotation: &Annotation) -> Result<LiteralValue, ExtractError> {
    match annotation {
        Annotation::Constant(Constant::Str(s)) => Ok(LiteralValue::Str(s.clone())),
        Annotation::Constant(Constant::Int(i)) => Ok(LiteralValue::Int(*i)),
        Annotation::Constant(Constant::Bool(b)) => Ok(LiteralValue::Bool(*b)),
        Annotation::Constant(Constant::Float(_)) => Err(ExtractError::LiteralValue {
            got: "float".to_string(),
        }),
        other => Err(ExtractError::LiteralValue {
            got: other.to_string(),
        }),
    }
}

/// `X | None`, splicing when `X` is already a union.
fn optional(inner: TypeDescriptor) -> TypeDescriptor {
    let mut options = Vec::new();
    splice_option(&mut options, inner);
    splice_option(&mut options, TypeDescriptor::Primitive(PrimitiveKind::None));
    TypeDescriptor::Union { options }
}

/// Nested unions contribute their options; `None` appears at most once.
fn splice_option(options: &mut Vec<TypeDescriptor>, option: TypeDescriptor) {
    match option {
        TypeDescriptor::Union { options: nested } => {
            for inner in nested {
                splice_option(options, inner);
            }
        }
        TypeDescriptor::Primitive(PrimitiveKind::None)
            if options.contains(&TypeDescriptor::Primitive(PrimitiveKind::None)) => {}
        other => options.push(other),
    }
}
