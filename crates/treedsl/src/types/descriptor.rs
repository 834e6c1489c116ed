// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors: the closed vocabulary of field type shapes.

use std::fmt;

/// Primitive type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveKind {
    Int,
    Float,
    Str,
    Bool,
    None,
    Bytes,
    Decimal,
    Date,
    Time,
    DateTime,
    Duration,
}

impl PrimitiveKind {
    /// Every primitive kind, in declaration order.
    pub const ALL: [PrimitiveKind; 11] = [
        Self::Int,
        Self::Float,
        Self::Str,
        Self::Bool,
        Self::None,
        Self::Bytes,
        Self::Decimal,
        Self::Date,
        Self::Time,
        Self::DateTime,
        Self::Duration,
    ];

    /// Wire discriminant of this primitive.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::Bool => "bool",
            Self::None => "none",
            Self::Bytes => "bytes",
            Self::Decimal => "decimal",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "datetime",
            Self::Duration => "duration",
        }
    }

    /// Look up a primitive by its wire discriminant.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.tag() == tag)
    }

    /// Annotation spelling (`None`, `Decimal`, `timedelta` ...).
    pub fn annotation_name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Decimal => "Decimal",
            Self::Duration => "timedelta",
            other => other.tag(),
        }
    }
}

/// Scalar admitted inside a `Literal` descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{:?}", s),
            Self::Int(i) => write!(f, "{}", i),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
        }
    }
}

impl From<&str> for LiteralValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<i64> for LiteralValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for LiteralValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

/// A complete type descriptor.
///
/// Descriptors are finite trees; cycles in a node graph are expressed
/// through [`TypeDescriptor::Ref`], never through nesting.
///
/// Equality is structural. `Union` options compare as a multiset; every
/// other payload compares in order.
#[derive(Debug, Clone, Eq)]
pub enum TypeDescriptor {
    /// Atomic scalar.
    Primitive(PrimitiveKind),
    /// Mutable ordered sequence.
    List { element: Box<TypeDescriptor> },
    /// Mutable unordered set.
    Set { element: Box<TypeDescriptor> },
    /// Immutable unordered set.
    FrozenSet { element: Box<TypeDescriptor> },
    /// Read-only ordered sequence.
    Sequence { element: Box<TypeDescriptor> },
    /// Read-only unordered set.
    AbstractSet { element: Box<TypeDescriptor> },
    /// Mutable mapping.
    Dict {
        key: Box<TypeDescriptor>,
        value: Box<TypeDescriptor>,
    },
    /// Read-only mapping.
    Mapping {
        key: Box<TypeDescriptor>,
        value: Box<TypeDescriptor>,
    },
    /// Fixed-arity heterogeneous sequence.
    Tuple { elements: Vec<TypeDescriptor> },
    /// Enumerated constant set.
    Literal { values: Vec<LiteralValue> },
    /// Embedded node producing `returns`.
    Node { returns: Box<TypeDescriptor> },
    /// Identifier of a node stored elsewhere.
    Ref { target: Box<TypeDescriptor> },
    /// Exactly one of `options`.
    Union { options: Vec<TypeDescriptor> },
    /// Unresolved generic placeholder.
    TypeParameter {
        name: String,
        bound: Option<Box<TypeDescriptor>>,
    },
}

impl TypeDescriptor {
    /// Every descriptor wire discriminant.
    ///
    /// `treedsl-codegen` keeps its own copy for compile-time tag checks.
    pub const TAGS: [&'static str; 24] = [
        "int",
        "float",
        "str",
        "bool",
        "none",
        "bytes",
        "decimal",
        "date",
        "time",
        "datetime",
        "duration",
        "list",
        "set",
        "frozenset",
        "sequence",
        "abstractset",
        "dict",
        "mapping",
        "tuple",
        "literal",
        "node",
        "reference",
        "union",
        "typeparam",
    ];

    pub fn primitive(kind: PrimitiveKind) -> Self {
        Self::Primitive(kind)
    }

    pub fn int() -> Self {
        Self::Primitive(PrimitiveKind::Int)
    }

    pub fn float() -> Self {
        Self::Primitive(PrimitiveKind::Float)
    }

    pub fn str() -> Self {
        Self::Primitive(PrimitiveKind::Str)
    }

    pub fn bool() -> Self {
        Self::Primitive(PrimitiveKind::Bool)
    }

    pub fn none() -> Self {
        Self::Primitive(PrimitiveKind::None)
    }

    pub fn list(element: TypeDescriptor) -> Self {
        Self::List {
            element: Box::new(element),
        }
    }

    pub fn set(element: TypeDescriptor) -> Self {
        Self::Set {
            element: Box::new(element),
        }
    }

    pub fn dict(key: TypeDescriptor, value: TypeDescriptor) -> Self {
        Self::Dict {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn tuple(elements: Vec<TypeDescriptor>) -> Self {
        Self::Tuple { elements }
    }

    pub fn literal(values: Vec<LiteralValue>) -> Self {
        Self::Literal { values }
    }

    pub fn node(returns: TypeDescriptor) -> Self {
        Self::Node {
            returns: Box::new(returns),
        }
    }

    pub fn reference(target: TypeDescriptor) -> Self {
        Self::Ref {
            target: Box::new(target),
        }
    }

    pub fn union(options: Vec<TypeDescriptor>) -> Self {
        Self::Union { options }
    }

    pub fn param(name: impl Into<String>) -> Self {
        Self::TypeParameter {
            name: name.into(),
            bound: None,
        }
    }

    pub fn bounded_param(name: impl Into<String>, bound: TypeDescriptor) -> Self {
        Self::TypeParameter {
            name: name.into(),
            bound: Some(Box::new(bound)),
        }
    }

    /// Wire discriminant of this descriptor.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Primitive(p) => p.tag(),
            Self::List { .. } => "list",
            Self::Set { .. } => "set",
            Self::FrozenSet { .. } => "frozenset",
            Self::Sequence { .. } => "sequence",
            Self::AbstractSet { .. } => "abstractset",
            Self::Dict { .. } => "dict",
            Self::Mapping { .. } => "mapping",
            Self::Tuple { .. } => "tuple",
            Self::Literal { .. } => "literal",
            Self::Node { .. } => "node",
            Self::Ref { .. } => "reference",
            Self::Union { .. } => "union",
            Self::TypeParameter { .. } => "typeparam",
        }
    }

    /// Check whether `tag` names a descriptor variant.
    pub fn is_descriptor_tag(tag: &str) -> bool {
        Self::TAGS.contains(&tag)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }

    /// Direct sub-descriptors, in payload order.
    pub fn children(&self) -> Vec<&TypeDescriptor> {
        match self {
            Self::Primitive(_) | Self::Literal { .. } => Vec::new(),
            Self::List { element }
            | Self::Set { element }
            | Self::FrozenSet { element }
            | Self::Sequence { element }
            | Self::AbstractSet { element } => vec![element.as_ref()],
            Self::Dict { key, value } | Self::Mapping { key, value } => {
                vec![key.as_ref(), value.as_ref()]
            }
            Self::Tuple { elements } => elements.iter().collect(),
            Self::Node { returns } => vec![returns.as_ref()],
            Self::Ref { target } => vec![target.as_ref()],
            Self::Union { options } => options.iter().collect(),
            Self::TypeParameter { bound, .. } => bound.as_deref().into_iter().collect(),
        }
    }

    /// Visit this descriptor and every nested one, depth-first, parents first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a TypeDescriptor)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// Names of the type parameters mentioned anywhere in the tree.
    pub fn type_parameters(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        self.walk(&mut |td| {
            if let Self::TypeParameter { name, .. } = td {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        });
        names
    }

    /// Element type of a one-argument container.
    pub fn element(&self) -> Option<&TypeDescriptor> {
        match self {
            Self::List { element }
            | Self::Set { element }
            | Self::FrozenSet { element }
            | Self::Sequence { element }
            | Self::AbstractSet { element } => Some(element),
            _ => None,
        }
    }
}

impl From<PrimitiveKind> for TypeDescriptor {
    fn from(kind: PrimitiveKind) -> Self {
        Self::Primitive(kind)
    }
}

/// Multiset comparison: every option in `a` pairs with a distinct equal option in `b`.
fn same_options(a: &[TypeDescriptor], b: &[TypeDescriptor]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut used = vec![false; b.len()];
    a.iter().all(|option| {
        let found = b
            .iter()
            .enumerate()
            .position(|(i, candidate)| !used[i] && candidate == option);
        match found {
            Some(i) => {
                used[i] = true;
                true
            }
            None => false,
        }
    })
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        use TypeDescriptor as T;
        match (self, other) {
            (T::Primitive(a), T::Primitive(b)) => a == b,
            (T::List { element: a }, T::List { element: b })
            | (T::Set { element: a }, T::Set { element: b })
            | (T::FrozenSet { element: a }, T::FrozenSet { element: b })
            | (T::Sequence { element: a }, T::Sequence { element: b })
            | (T::AbstractSet { element: a }, T::AbstractSet { element: b }) => a == b,
            (T::Dict { key: ka, value: va }, T::Dict { key: kb, value: vb })
            | (T::Mapping { key: ka, value: va }, T::Mapping { key: kb, value: vb }) => {
                ka == kb && va == vb
            }
            (T::Tuple { elements: a }, T::Tuple { elements: b }) => a == b,
            (T::Literal { values: a }, T::Literal { values: b }) => a == b,
            (T::Node { returns: a }, T::Node { returns: b }) => a == b,
            (T::Ref { target: a }, T::Ref { target: b }) => a == b,
            (T::Union { options: a }, T::Union { options: b }) => same_options(a, b),
            (
                T::TypeParameter { name: na, bound: ba },
                T::TypeParameter { name: nb, bound: bb },
            ) => na == nb && ba == bb,
            _ => false,
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[TypeDescriptor], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => f.write_str(p.annotation_name()),
            Self::List { element } => write!(f, "list[{}]", element),
            Self::Set { element } => write!(f, "set[{}]", element),
            Self::FrozenSet { element } => write!(f, "frozenset[{}]", element),
            Self::Sequence { element } => write!(f, "Sequence[{}]", element),
            Self::AbstractSet { element } => write!(f, "AbstractSet[{}]", element),
            Self::Dict { key, value } => write!(f, "dict[{}, {}]", key, value),
            Self::Mapping { key, value } => write!(f, "Mapping[{}, {}]", key, value),
            Self::Tuple { elements } => {
                f.write_str("tuple[")?;
                write_joined(f, elements, ", ")?;
                f.write_str("]")
            }
            Self::Literal { values } => {
                f.write_str("Literal[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                f.write_str("]")
            }
            Self::Node { returns } => write!(f, "Node[{}]", returns),
            Self::Ref { target } => write!(f, "Ref[{}]", target),
            Self::Union { options } => write_joined(f, options, " | "),
            Self::TypeParameter { name, .. } => f.write_str(name),
        }
    }
}
