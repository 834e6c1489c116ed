// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic values, node instances and refs.

mod convert;

pub use convert::{FromValue, ToValue};

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::errors::ValueError;
use crate::types::TypeDescriptor;

/// Identifier of a node stored elsewhere.
///
/// `T` is the referenced node type; it only exists at compile time and is
/// erased on the wire.
pub struct Ref<T = ()> {
    id: String,
    _target: PhantomData<fn() -> T>,
}

impl<T> Ref<T> {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            _target: PhantomData,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn into_id(self) -> String {
        self.id
    }

    /// Re-type the ref, keeping its identifier.
    pub fn cast<U>(self) -> Ref<U> {
        Ref::new(self.id)
    }

    /// Drop the target type.
    pub fn erase(&self) -> Ref {
        Ref::new(self.id.clone())
    }
}

impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Self::new(self.id.clone())
    }
}

impl<T> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Ref").field(&self.id).finish()
    }
}

impl<T> fmt::Display for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.id)
    }
}

impl<T, U> PartialEq<Ref<U>> for Ref<T> {
    fn eq(&self, other: &Ref<U>) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Ref<T> {}

impl<T> Hash for Ref<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A concrete value of a node kind: tag plus field values.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeInstance {
    pub tag: String,
    pub fields: BTreeMap<String, Value>,
}

impl NodeInstance {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field insertion.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Read a field as a typed value.
    pub fn field<T: FromValue>(&self, field: &str) -> Result<T, ValueError> {
        match self.fields.get(field) {
            Some(value) => T::from_value(value.clone()),
            None => Err(self.missing(field)),
        }
    }

    /// Remove a field and convert it.
    pub fn take<T: FromValue>(&mut self, field: &str) -> Result<T, ValueError> {
        match self.fields.remove(field) {
            Some(value) => T::from_value(value),
            None => Err(self.missing(field)),
        }
    }

    /// Remove a field and convert it, falling back to `default` when absent.
    pub fn take_or_else<T: FromValue>(
        &mut self,
        field: &str,
        default: impl FnOnce() -> T,
    ) -> Result<T, ValueError> {
        match self.fields.remove(field) {
            Some(value) => T::from_value(value),
            None => Ok(default()),
        }
    }

    /// Fail unless this instance has tag `expected`.
    pub fn expect_tag(&self, expected: &str) -> Result<(), ValueError> {
        if self.tag == expected {
            Ok(())
        } else {
            Err(ValueError::WrongKind {
                expected: expected.to_string(),
                got: self.tag.clone(),
            })
        }
    }

    fn missing(&self, field: &str) -> ValueError {
        ValueError::MissingField {
            tag: self.tag.clone(),
            field: field.to_string(),
        }
    }
}

/// A dynamic value carried by a node field.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Node(Box<NodeInstance>),
    Ref(Ref),
    /// Descriptor-typed field value.
    Type(TypeDescriptor),
}

impl Value {
    /// Short name of the variant, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Node(_) => "node",
            Self::Ref(_) => "ref",
            Self::Type(_) => "type",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Integers widen to floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Map(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&NodeInstance> {
        match self {
            Self::Node(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_ref_id(&self) -> Option<&str> {
        match self {
            Self::Ref(r) => Some(r.id()),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&TypeDescriptor> {
        match self {
            Self::Type(v) => Some(v),
            _ => None,
        }
    }

    /// Visit every nested ref, depth-first.
    pub fn visit_refs<'a>(&'a self, visit: &mut impl FnMut(&'a Ref)) {
        match self {
            Self::Ref(r) => visit(r),
            Self::List(items) => items.iter().for_each(|v| v.visit_refs(visit)),
            Self::Map(entries) => entries.values().for_each(|v| v.visit_refs(visit)),
            Self::Node(node) => node.fields.values().for_each(|v| v.visit_refs(visit)),
            Self::Null
            | Self::Bool(_)
            | Self::Int(_)
            | Self::Float(_)
            | Self::Str(_)
            | Self::Type(_) => {}
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<NodeInstance> for Value {
    fn from(v: NodeInstance) -> Self {
        Self::Node(Box::new(v))
    }
}

impl<T> From<Ref<T>> for Value {
    fn from(v: Ref<T>) -> Self {
        Self::Ref(v.cast())
    }
}

impl From<TypeDescriptor> for Value {
    fn from(v: TypeDescriptor) -> Self {
        Self::Type(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Expr;

    #[test]
    fn test_ref_equality_ignores_target_type() {
        let typed: Ref<Expr> = Ref::new("n7");
        let erased: Ref = Ref::new("n7");
        assert!(typed == erased);
        assert_eq!(typed.erase(), erased);
        assert_eq!(typed.to_string(), "@n7");
    }

    #[test]
    fn test_node_instance_fields() {
        let mut node = NodeInstance::new("add").with("left", 1.5).with("right", 2i64);
        assert_eq!(node.field::<f64>("left"), Ok(1.5));
        assert_eq!(node.get("right").and_then(Value::as_i64), Some(2));
        assert_eq!(node.take::<i64>("right"), Ok(2));
        assert_eq!(
            node.take::<i64>("right"),
            Err(ValueError::MissingField {
                tag: "add".into(),
                field: "right".into()
            })
        );
        assert_eq!(node.take_or_else("right", || 9i64), Ok(9));
    }

    #[test]
    fn test_expect_tag() {
        let node = NodeInstance::new("add");
        assert!(node.expect_tag("add").is_ok());
        assert_eq!(
            node.expect_tag("mul"),
            Err(ValueError::WrongKind {
                expected: "mul".into(),
                got: "add".into()
            })
        );
    }

    #[test]
    fn test_visit_refs_reaches_nested_nodes() {
        let inner = NodeInstance::new("var").with("target", Ref::<()>::new("a"));
        let outer = Value::from(
            NodeInstance::new("call")
                .with("callee", inner)
                .with("args", vec![Value::from(Ref::<()>::new("b"))]),
        );
        let mut ids = Vec::new();
        outer.visit_refs(&mut |r| ids.push(r.id().to_string()));
        ids.sort();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_int_widens_to_float() {
        assert_eq!(Value::Int(3).as_f64(), Some(3.0));
        assert_eq!(Value::Str("x".into()).as_f64(), None);
    }
}
