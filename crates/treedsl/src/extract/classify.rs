// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Annotation classification.
//!
//! Rule precedence, first match wins:
//!
//! | # | Shape | Matches |
//! |---|-------|---------|
//! | 1 | `Param` | bound type-parameter placeholder |
//! | 2 | `Marker` | bare name registered as a marker type |
//! | 3 | `Alias` | registered generic alias, bare or applied |
//! | 4 | `Primitive` | bare primitive name |
//! | 5 | `Elements` | `list`, `set`, `frozenset`, `Sequence`, `AbstractSet` |
//! | 6 | `KeyValue` | `dict`, `Mapping` |
//! | 7 | `Tuple` | `tuple` |
//! | 8 | `Literal` | `Literal` |
//! | 9 | `BaseNode` / `Kind` | `Node`, or a registered kind name |
//! | 10 | `Ref` | `Ref` |
//! | 11 | `Union` / `Optional` | `a \| b`, `Union[...]`, `Optional[x]` |
//! | 12 | `Unrecognized` | anything else |

use std::sync::Arc;

use crate::annotation::{Annotation, ParamDecl};
use crate::errors::ExtractError;
use crate::registry::{NodeKind, Registry, TypeAlias, NODE_BASE};
use crate::types::{PrimitiveKind, TypeDescriptor};

/// One-argument container kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementContainer {
    List,
    Set,
    FrozenSet,
    Sequence,
    AbstractSet,
}

impl ElementContainer {
    pub fn name(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Set => "set",
            Self::FrozenSet => "frozenset",
            Self::Sequence => "Sequence",
            Self::AbstractSet => "AbstractSet",
        }
    }

    pub fn wrap(self, element: TypeDescriptor) -> TypeDescriptor {
        let element = Box::new(element);
        match self {
            Self::List => TypeDescriptor::List { element },
            Self::Set => TypeDescriptor::Set { element },
            Self::FrozenSet => TypeDescriptor::FrozenSet { element },
            Self::Sequence => TypeDescriptor::Sequence { element },
            Self::AbstractSet => TypeDescriptor::AbstractSet { element },
        }
    }
}

/// Two-argument container kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyValueContainer {
    Dict,
    Mapping,
}

impl KeyValueContainer {
    pub fn name(self) -> &'static str {
        match self {
            Self::Dict => "dict",
            Self::Mapping => "Mapping",
        }
    }

    pub fn wrap(self, key: TypeDescriptor, value: TypeDescriptor) -> TypeDescriptor {
        let (key, value) = (Box::new(key), Box::new(value));
        match self {
            Self::Dict => TypeDescriptor::Dict { key, value },
            Self::Mapping => TypeDescriptor::Mapping { key, value },
        }
    }
}

/// Classified annotation.
#[derive(Debug, Clone)]
pub enum Shape<'a> {
    Param(&'a ParamDecl),
    Marker(TypeDescriptor),
    Alias {
        alias: Arc<TypeAlias>,
        args: &'a [Annotation],
    },
    Primitive(PrimitiveKind),
    Elements {
        container: ElementContainer,
        args: &'a [Annotation],
    },
    KeyValue {
        container: KeyValueContainer,
        args: &'a [Annotation],
    },
    Tuple(&'a [Annotation]),
    Literal(&'a [Annotation]),
    BaseNode(&'a [Annotation]),
    Kind {
        kind: Arc<NodeKind>,
        args: &'a [Annotation],
    },
    Ref(&'a [Annotation]),
    Union(&'a [Annotation]),
    Optional(&'a [Annotation]),
    Unrecognized,
}

const NO_ARGS: &[Annotation] = &[];

/// Builtin names are matched on their last dotted segment (`typing.List`).
fn builtin_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

pub(crate) fn primitive_named(name: &str) -> Option<PrimitiveKind> {
    let kind = match builtin_name(name) {
        "int" => PrimitiveKind::Int,
        "float" => PrimitiveKind::Float,
        "str" | "string" => PrimitiveKind::Str,
        "bool" => PrimitiveKind::Bool,
        "None" | "none" | "NoneType" => PrimitiveKind::None,
        "bytes" => PrimitiveKind::Bytes,
        "Decimal" | "decimal" => PrimitiveKind::Decimal,
        "date" => PrimitiveKind::Date,
        "time" => PrimitiveKind::Time,
        "datetime" => PrimitiveKind::DateTime,
        "timedelta" | "duration" => PrimitiveKind::Duration,
        _ => return None,
    };
    Some(kind)
}

fn element_container(name: &str) -> Option<ElementContainer> {
    let container = match builtin_name(name) {
        "list" | "List" => ElementContainer::List,
        "set" | "MutableSet" => ElementContainer::Set,
        "frozenset" | "FrozenSet" => ElementContainer::FrozenSet,
        "Sequence" => ElementContainer::Sequence,
        "AbstractSet" => ElementContainer::AbstractSet,
        _ => return None,
    };
    Some(container)
}

fn key_value_container(name: &str) -> Option<KeyValueContainer> {
    let container = match builtin_name(name) {
        "dict" | "Dict" => KeyValueContainer::Dict,
        "Mapping" => KeyValueContainer::Mapping,
        _ => return None,
    };
    Some(container)
}

/// Classify `annotation` against `registry`.
///
/// Fails only when a kind name is ambiguous.
pub fn classify<'a>(
    annotation: &'a Annotation,
    registry: &Registry,
) -> Result<Shape<'a>, ExtractError> {
    let (name, args): (&str, &'a [Annotation]) = match annotation {
        Annotation::Param(decl) => return Ok(Shape::Param(decl)),
        Annotation::Union(options) => return Ok(Shape::Union(options)),
        Annotation::Constant(_) => return Ok(Shape::Unrecognized),
        Annotation::Name(name) => {
            if let Some(descriptor) = registry.marker(name) {
                return Ok(Shape::Marker(descriptor));
            }
            (name.as_str(), NO_ARGS)
        }
        Annotation::Generic { name, args } => (name.as_str(), args.as_slice()),
    };
    let bare = matches!(annotation, Annotation::Name(_));

    if let Some(alias) = registry.alias(name) {
        return Ok(Shape::Alias { alias, args });
    }
    if bare {
        if let Some(kind) = primitive_named(name) {
            return Ok(Shape::Primitive(kind));
        }
    }
    if let Some(container) = element_container(name) {
        return Ok(Shape::Elements { container, args });
    }
    if let Some(container) = key_value_container(name) {
        return Ok(Shape::KeyValue { container, args });
    }

    let shape = match builtin_name(name) {
        "tuple" | "Tuple" => Shape::Tuple(args),
        "Literal" => Shape::Literal(args),
        _ if name == NODE_BASE => Shape::BaseNode(args),
        _ => match registry.kind_by_name(name)? {
            Some(kind) => Shape::Kind { kind, args },
            None => match builtin_name(name) {
                "Ref" => Shape::Ref(args),
                "Union" if !bare => Shape::Union(args),
                "Optional" if !bare => Shape::Optional(args),
                _ => Shape::Unrecognized,
            },
        },
    };
    Ok(shape)
}
