// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Kind declarations and registered node kinds.

use std::collections::{BTreeMap, HashSet};

use super::tag::{compose_tag, Signature};
use crate::annotation::{Annotation, ParamDecl};
use crate::errors::{ParseError, RegistryError, ValueError};
use crate::value::{NodeInstance, Value};

/// Base-type head naming an embedded node production (`Node[float]`).
pub const NODE_BASE: &str = "Node";

/// One declared field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub annotation: Annotation,
    /// Used by [`NodeKind::instantiate`] when the field is absent.
    pub default: Option<Value>,
    /// Bookkeeping field, never part of the schema or the wire form.
    pub computed: bool,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, annotation: Annotation) -> Self {
        Self {
            name: name.into(),
            annotation,
            default: None,
            computed: false,
        }
    }

    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    #[must_use]
    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    /// Public fields appear in schemas and on the wire.
    pub fn is_public(&self) -> bool {
        !self.computed && !self.name.starts_with('_')
    }
}

/// Declaration of a node kind, as written by the application.
///
/// ```rust
/// use treedsl::annotation::Annotation;
/// use treedsl::registry::KindDecl;
///
/// let decl = KindDecl::new("AddNode")
///     .returns(Annotation::name("float"))
///     .field("left", Annotation::name("float"))
///     .field("right", Annotation::name("float"));
/// assert_eq!(decl.fields.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct KindDecl {
    pub name: String,
    pub signature: Signature,
    pub type_params: Vec<ParamDecl>,
    /// Declared base types; the first `Node[X]` (or node-kind application) sets `returns`.
    pub bases: Vec<Annotation>,
    pub fields: Vec<FieldDecl>,
}

impl KindDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signature: Signature::new(),
            type_params: Vec::new(),
            bases: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Append one signature component.
    #[must_use]
    pub fn component(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.signature.push(key, value);
        self
    }

    #[must_use]
    pub fn signature(mut self, signature: Signature) -> Self {
        self.signature = signature;
        self
    }

    #[must_use]
    pub fn type_param(mut self, param: ParamDecl) -> Self {
        self.type_params.push(param);
        self
    }

    #[must_use]
    pub fn extends(mut self, base: Annotation) -> Self {
        self.bases.push(base);
        self
    }

    /// Shorthand for `extends(Node[returns])`.
    #[must_use]
    pub fn returns(self, returns: Annotation) -> Self {
        self.extends(Annotation::generic(NODE_BASE, vec![returns]))
    }

    #[must_use]
    pub fn field(self, name: impl Into<String>, annotation: Annotation) -> Self {
        self.field_decl(FieldDecl::new(name, annotation))
    }

    #[must_use]
    pub fn field_decl(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    /// Parse `text` as the annotation of a new field.
    pub fn parse_field(self, name: impl Into<String>, text: &str) -> Result<Self, ParseError> {
        Ok(self.field(name, Annotation::parse(text)?))
    }
}

/// A registered node kind: its tag plus the declaration with type
/// parameters bound in every annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeKind {
    tag: String,
    decl: KindDecl,
}

impl NodeKind {
    /// Compute the tag and bind type parameters.
    pub fn new(decl: KindDecl) -> Result<Self, RegistryError> {
        let tag = compose_tag(&decl.name, &decl.signature)?;

        let mut seen = HashSet::new();
        for field in &decl.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(RegistryError::DuplicateField {
                    kind: decl.name.clone(),
                    field: field.name.clone(),
                });
            }
        }

        let params = decl.type_params.clone();
        let type_params = params
            .iter()
            .map(|p| ParamDecl {
                name: p.name.clone(),
                bound: p.bound.as_ref().map(|b| Box::new(b.bind_params(&params))),
            })
            .collect();
        let bases = decl.bases.iter().map(|b| b.bind_params(&params)).collect();
        let fields = decl
            .fields
            .into_iter()
            .map(|f| FieldDecl {
                annotation: f.annotation.bind_params(&params),
                ..f
            })
            .collect();

        Ok(Self {
            tag,
            decl: KindDecl {
                name: decl.name,
                signature: decl.signature,
                type_params,
                bases,
                fields,
            },
        })
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Declared type name.
    pub fn name(&self) -> &str {
        &self.decl.name
    }

    pub fn signature(&self) -> &Signature {
        &self.decl.signature
    }

    pub fn type_params(&self) -> &[ParamDecl] {
        &self.decl.type_params
    }

    pub fn bases(&self) -> &[Annotation] {
        &self.decl.bases
    }

    /// Every declared field, in declaration order.
    pub fn fields(&self) -> &[FieldDecl] {
        &self.decl.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.decl.fields.iter().find(|f| f.name == name)
    }

    pub fn public_fields(&self) -> impl Iterator<Item = &FieldDecl> {
        self.decl.fields.iter().filter(|f| f.is_public())
    }

    pub fn is_public_field(&self, name: &str) -> bool {
        self.field(name).is_some_and(FieldDecl::is_public)
    }

    pub fn declaration(&self) -> &KindDecl {
        &self.decl
    }

    /// Build an instance, filling absent fields from declared defaults.
    ///
    /// A public field with neither a value nor a default is an error, as is
    /// any key the kind does not declare.
    pub fn instantiate(
        &self,
        mut values: BTreeMap<String, Value>,
    ) -> Result<NodeInstance, ValueError> {
        if let Some(unknown) = values.keys().find(|k| self.field(k).is_none()) {
            return Err(ValueError::UnknownField {
                tag: self.tag.clone(),
                field: unknown.clone(),
            });
        }

        let mut instance = NodeInstance::new(self.tag.clone());
        for field in &self.decl.fields {
            match values.remove(&field.name) {
                Some(value) => {
                    instance.fields.insert(field.name.clone(), value);
                }
                None => match (&field.default, field.is_public()) {
                    (Some(default), _) => {
                        instance.fields.insert(field.name.clone(), default.clone());
                    }
                    (None, true) => {
                        return Err(ValueError::MissingField {
                            tag: self.tag.clone(),
                            field: field.name.clone(),
                        })
                    }
                    (None, false) => {}
                },
            }
        }
        Ok(instance)
    }
}

/// A Rust type declared as a node kind.
///
/// Usually implemented with `#[derive(Node)]`.
pub trait Node: Sized {
    /// Tag computed from the declaration.
    const TAG: &'static str;

    fn declaration() -> Result<KindDecl, ParseError>;

    fn to_instance(&self) -> NodeInstance;

    fn from_instance(instance: NodeInstance) -> Result<Self, ValueError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(text: &str) -> Annotation {
        Annotation::parse(text).expect("parse annotation")
    }

    fn pair_decl() -> KindDecl {
        KindDecl::new("PairNode")
            .type_param(ParamDecl::new("T").with_bound(parsed("int | float")))
            .returns(parsed("tuple[T, T]"))
            .field("first", parsed("T"))
            .field("second", parsed("T"))
            .field_decl(FieldDecl::new("label", parsed("str")).with_default("pair"))
            .field_decl(FieldDecl::new("_cache", parsed("dict[str, int]")))
            .field_decl(FieldDecl::new("depth", parsed("int")).computed())
    }

    #[test]
    fn test_kind_binds_type_params() {
        let kind = NodeKind::new(pair_decl()).expect("kind");
        assert_eq!(kind.tag(), "pair");
        let first = kind.field("first").expect("first field");
        assert!(matches!(first.annotation, Annotation::Param(ref p) if p.name == "T"));
        let Annotation::Generic { args, .. } = &kind.bases()[0] else {
            panic!("expected a generic base");
        };
        assert!(matches!(
            &args[0],
            Annotation::Generic { args: inner, .. } if matches!(inner[0], Annotation::Param(_))
        ));
    }

    #[test]
    fn test_public_fields_skip_private_and_computed() {
        let kind = NodeKind::new(pair_decl()).expect("kind");
        let names: Vec<_> = kind.public_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "label"]);
        assert!(!kind.is_public_field("_cache"));
        assert!(!kind.is_public_field("depth"));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let decl = KindDecl::new("X")
            .field("a", parsed("int"))
            .field("a", parsed("str"));
        assert_eq!(
            NodeKind::new(decl),
            Err(RegistryError::DuplicateField {
                kind: "X".into(),
                field: "a".into()
            })
        );
    }

    #[test]
    fn test_instantiate_applies_defaults() {
        let kind = NodeKind::new(pair_decl()).expect("kind");
        let mut values = BTreeMap::new();
        values.insert("first".to_string(), Value::Int(1));
        values.insert("second".to_string(), Value::Int(2));
        let node = kind.instantiate(values).expect("instance");
        assert_eq!(node.tag, "pair");
        assert_eq!(node.get("label"), Some(&Value::Str("pair".into())));
        assert!(node.get("_cache").is_none());
    }

    #[test]
    fn test_instantiate_reports_missing_and_unknown() {
        let kind = NodeKind::new(pair_decl()).expect("kind");

        let mut values = BTreeMap::new();
        values.insert("first".to_string(), Value::Int(1));
        assert_eq!(
            kind.instantiate(values.clone()),
            Err(ValueError::MissingField {
                tag: "pair".into(),
                field: "second".into()
            })
        );

        values.insert("second".to_string(), Value::Int(2));
        values.insert("third".to_string(), Value::Int(3));
        assert_eq!(
            kind.instantiate(values),
            Err(ValueError::UnknownField {
                tag: "pair".into(),
                field: "third".into()
            })
        );
    }
}
