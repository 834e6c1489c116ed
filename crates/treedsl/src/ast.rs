// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Flat AST container.
//!
//! Nodes are stored by identifier and point at each other through
//! [`Ref`]s; the structured form is `{"root": id, "nodes": {id: node}}`.

use std::collections::BTreeMap;

use serde_json::{Map, Value as Json};

use crate::errors::AstError;
use crate::registry::{Node, Registry};
use crate::serialization::{FormatAdapter, JsonAdapter};
use crate::value::{NodeInstance, Ref, Value};

const ROOT_KEY: &str = "root";
const NODES_KEY: &str = "nodes";

/// Flat tree of nodes keyed by identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ast {
    pub root: String,
    pub nodes: BTreeMap<String, NodeInstance>,
}

impl Ast {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            nodes: BTreeMap::new(),
        }
    }

    /// Insert a node; returns a ref to it.
    pub fn insert(&mut self, id: impl Into<String>, node: NodeInstance) -> Ref {
        let id = id.into();
        let r = Ref::new(id.clone());
        self.nodes.insert(id, node);
        r
    }

    pub fn resolve<T>(&self, r: &Ref<T>) -> Result<&NodeInstance, AstError> {
        self.nodes.get(r.id()).ok_or_else(|| AstError::DanglingRef {
            id: r.id().to_string(),
        })
    }

    /// Resolve and convert to a typed node.
    pub fn resolve_as<N: Node>(&self, r: &Ref<N>) -> Result<N, AstError> {
        let instance = self.resolve(r)?.clone();
        N::from_instance(instance).map_err(|e| AstError::Decode(e.into()))
    }

    pub fn root_node(&self) -> Result<&NodeInstance, AstError> {
        self.nodes.get(&self.root).ok_or_else(|| AstError::UnknownRoot {
            id: self.root.clone(),
        })
    }

    /// Ref identifiers with no matching node, sorted and deduplicated.
    pub fn dangling_refs(&self) -> Vec<String> {
        let mut missing = Vec::new();
        for node in self.nodes.values() {
            for value in node.fields.values() {
                value.visit_refs(&mut |r| {
                    if !self.nodes.contains_key(r.id()) {
                        missing.push(r.id().to_string());
                    }
                });
            }
        }
        missing.sort();
        missing.dedup();
        missing
    }

    pub fn to_structured(&self, registry: &Registry) -> Result<Json, AstError> {
        let adapter = JsonAdapter::new(registry);
        let mut nodes = Map::new();
        for (id, node) in &self.nodes {
            nodes.insert(id.clone(), Json::Object(adapter.encode_node(node)?));
        }
        let mut doc = Map::new();
        doc.insert(ROOT_KEY.to_string(), Json::String(self.root.clone()));
        doc.insert(NODES_KEY.to_string(), Json::Object(nodes));
        Ok(Json::Object(doc))
    }

    pub fn from_structured(registry: &Registry, json: &Json) -> Result<Self, AstError> {
        let adapter = JsonAdapter::new(registry);
        let Json::Object(doc) = json else {
            return Err(AstError::Malformed("expected a mapping"));
        };
        let Some(Json::String(root)) = doc.get(ROOT_KEY) else {
            return Err(AstError::Malformed("'root' must be a string"));
        };
        let Some(Json::Object(entries)) = doc.get(NODES_KEY) else {
            return Err(AstError::Malformed("'nodes' must be a mapping"));
        };

        let mut nodes = BTreeMap::new();
        for (id, entry) in entries {
            let Json::Object(entry) = entry else {
                return Err(AstError::NotANode { id: id.clone() });
            };
            match adapter.decode_node(entry)? {
                Value::Node(node) => {
                    nodes.insert(id.clone(), *node);
                }
                _ => return Err(AstError::NotANode { id: id.clone() }),
            }
        }
        log::debug!("[ast] loaded {} node(s), root '{}'", nodes.len(), root);
        Ok(Self {
            root: root.clone(),
            nodes,
        })
    }

    pub fn to_json(&self, registry: &Registry) -> Result<String, AstError> {
        Ok(format!("{:#}", self.to_structured(registry)?))
    }

    pub fn from_json(registry: &Registry, text: &str) -> Result<Self, AstError> {
        let json: Json = serde_json::from_str(text).map_err(|e| AstError::Decode(e.into()))?;
        Self::from_structured(registry, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Annotation;
    use crate::registry::KindDecl;

    fn registry() -> Registry {
        let registry = Registry::new();
        registry
            .register_kind(KindDecl::new("Const").field("value", Annotation::name("int")))
            .expect("register const");
        registry
            .register_kind(KindDecl::new("Neg").field(
                "operand",
                Annotation::parse("NodeRef[int]").expect("ann"),
            ))
            .expect("register neg");
        registry
    }

    #[test]
    fn test_resolve_and_root() {
        let mut ast = Ast::new("n1");
        let c = ast.insert("n0", NodeInstance::new("const").with("value", 5i64));
        ast.insert("n1", NodeInstance::new("neg").with("operand", c.clone()));

        assert_eq!(ast.root_node().map(|n| n.tag.as_str()).ok(), Some("neg"));
        assert_eq!(ast.resolve(&c).ok().and_then(|n| n.get("value")), Some(&Value::Int(5)));
        assert!(ast.dangling_refs().is_empty());
    }

    #[test]
    fn test_dangling_refs_reported() {
        let mut ast = Ast::new("n1");
        ast.insert("n1", NodeInstance::new("neg").with("operand", Ref::<()>::new("gone")));
        assert_eq!(ast.dangling_refs(), vec!["gone".to_string()]);
        assert!(matches!(
            ast.resolve(&Ref::<()>::new("gone")),
            Err(AstError::DanglingRef { .. })
        ));
        assert!(matches!(
            Ast::new("missing").root_node(),
            Err(AstError::UnknownRoot { .. })
        ));
    }

    #[test]
    fn test_structured_layout() {
        let registry = registry();
        let mut ast = Ast::new("n0");
        ast.insert("n0", NodeInstance::new("const").with("value", 1i64));
        assert_eq!(
            ast.to_structured(&registry).expect("encode"),
            serde_json::json!({
                "root": "n0",
                "nodes": {"n0": {"value": 1, "tag": "const"}}
            })
        );
    }

    #[test]
    fn test_rejects_ref_entries() {
        let registry = registry();
        let json = serde_json::json!({
            "root": "a",
            "nodes": {"a": {"tag": "ref", "id": "b"}}
        });
        assert!(matches!(
            Ast::from_structured(&registry, &json),
            Err(AstError::NotANode { ref id }) if id == "a"
        ));
    }
}
