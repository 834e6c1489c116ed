// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! JSON-compatible structured representation (`serde_json::Map`).

use serde_json::{Map, Number, Value as Json};

use super::FormatAdapter;
use crate::config::{CodecConfig, REF_ID_KEY, REF_TAG, TAG_KEY};
use crate::errors::{DecodeError, EncodeError};
use crate::registry::{Node, Registry};
use crate::schema::NodeSchema;
use crate::types::{LiteralValue, PrimitiveKind, TypeDescriptor};
use crate::value::{NodeInstance, Ref, Value};

/// Structured document produced by [`JsonAdapter`].
pub type Document = Map<String, Json>;

/// Tag-discriminated JSON adapter.
///
/// Node kinds are looked up in the borrowed registry; descriptor variants
/// use their fixed tags.
#[derive(Debug, Clone, Copy)]
pub struct JsonAdapter<'r> {
    registry: &'r Registry,
    config: CodecConfig,
}

impl<'r> JsonAdapter<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            config: CodecConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    // -----------------------------------------------------------------------
    // Generic values
    // -----------------------------------------------------------------------

    /// Encode any value; nodes, refs and descriptors become tagged mappings.
    pub fn encode_value(&self, value: &Value) -> Result<Json, EncodeError> {
        Ok(match value {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::Number(Number::from(*i)),
            Value::Float(x) => Json::Number(Number::from_f64(*x).ok_or_else(|| {
                EncodeError::NonFiniteFloat {
                    value: x.to_string(),
                }
            })?),
            Value::Str(s) => Json::String(s.clone()),
            Value::List(items) => Json::Array(
                items
                    .iter()
                    .map(|v| self.encode_value(v))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Map(entries) => Json::Object(
                entries
                    .iter()
                    .map(|(k, v)| self.encode_value(v).map(|v| (k.clone(), v)))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Node(node) => Json::Object(self.encode_node(node)?),
            Value::Ref(r) => Json::Object(encode_ref(r)),
            Value::Type(td) => Json::Object(self.encode_descriptor(td)),
        })
    }

    /// Decode any value.
    ///
    /// A mapping carrying `"tag"` is dispatched by tag (ref, node kind,
    /// descriptor); lists and mappings decode element-wise; scalars pass
    /// through.
    pub fn decode_value(&self, json: &Json) -> Result<Value, DecodeError> {
        Ok(match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().ok_or_else(|| DecodeError::InvalidValue {
                    context: n.to_string(),
                    expected: "finite number",
                })?),
            },
            Json::String(s) => Value::Str(s.clone()),
            Json::Array(items) => Value::List(
                items
                    .iter()
                    .map(|v| self.decode_value(v))
                    .collect::<Result<_, _>>()?,
            ),
            Json::Object(map) if map.contains_key(TAG_KEY) => self.decode_tagged(map)?,
            Json::Object(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| self.decode_value(v).map(|v| (k.clone(), v)))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }

    fn decode_tagged(&self, map: &Document) -> Result<Value, DecodeError> {
        let tag = read_tag(map)?;
        if tag == REF_TAG {
            return decode_ref(map).map(Value::Ref);
        }
        if self.registry.contains_tag(tag) {
            return self.decode_node(map);
        }
        if TypeDescriptor::is_descriptor_tag(tag) {
            return self.decode_descriptor(map).map(Value::Type);
        }
        Err(DecodeError::UnknownTag {
            tag: tag.to_string(),
        })
    }

    // -----------------------------------------------------------------------
    // Typed nodes
    // -----------------------------------------------------------------------

    /// Encode a [`Node`] value.
    pub fn encode<N: Node>(&self, node: &N) -> Result<Document, EncodeError> {
        self.encode_node(&node.to_instance())
    }

    /// Decode a mapping into a [`Node`] value.
    pub fn decode<N: Node>(&self, doc: &Document) -> Result<N, DecodeError> {
        match self.decode_node(doc)? {
            Value::Node(instance) => Ok(N::from_instance(*instance)?),
            _ => Err(DecodeError::InvalidValue {
                context: N::TAG.to_string(),
                expected: "node mapping, got ref",
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Text
    // -----------------------------------------------------------------------

    /// Render a document as JSON text (indented when `pretty` is set).
    pub fn render(&self, json: &Json) -> String {
        if self.config.pretty {
            format!("{:#}", json)
        } else {
            json.to_string()
        }
    }

    pub fn to_json(&self, value: &Value) -> Result<String, EncodeError> {
        Ok(self.render(&self.encode_value(value)?))
    }

    pub fn from_json(&self, text: &str) -> Result<Value, DecodeError> {
        let json: Json = serde_json::from_str(text)?;
        self.decode_document(&json)
    }

    /// Decode a top-level document, which must be a tagged mapping.
    pub fn decode_document(&self, json: &Json) -> Result<Value, DecodeError> {
        match json {
            Json::Object(map) => self.decode_tagged(map),
            _ => Err(DecodeError::InvalidValue {
                context: "document".to_string(),
                expected: "tagged mapping",
            }),
        }
    }
}

impl FormatAdapter for JsonAdapter<'_> {
    type Document = Document;

    fn encode_node(&self, node: &NodeInstance) -> Result<Document, EncodeError> {
        let kind = self
            .registry
            .kind(&node.tag)
            .ok_or_else(|| EncodeError::UnknownKind {
                tag: node.tag.clone(),
            })?;

        let mut doc = Map::new();
        for field in kind.public_fields() {
            let value = node
                .fields
                .get(&field.name)
                .ok_or_else(|| EncodeError::MissingField {
                    tag: node.tag.clone(),
                    field: field.name.clone(),
                })?;
            doc.insert(field.name.clone(), self.encode_value(value)?);
        }
        // Applied last so no field can shadow it.
        doc.insert(TAG_KEY.to_string(), Json::String(node.tag.clone()));
        log::trace!("[serialization] encoded '{}' ({} field(s))", node.tag, doc.len() - 1);
        Ok(doc)
    }

    fn decode_node(&self, doc: &Document) -> Result<Value, DecodeError> {
        let tag = read_tag(doc)?;
        if tag == REF_TAG {
            return decode_ref(doc).map(Value::Ref);
        }
        let kind = self
            .registry
            .kind(tag)
            .ok_or_else(|| DecodeError::UnknownNodeTag {
                tag: tag.to_string(),
            })?;

        let mut values = std::collections::BTreeMap::new();
        for (key, json) in doc {
            if key == TAG_KEY {
                continue;
            }
            if kind.is_public_field(key) {
                values.insert(key.clone(), self.decode_value(json)?);
            } else if self.config.strict_fields {
                return Err(DecodeError::UnknownField {
                    tag: tag.to_string(),
                    field: key.clone(),
                });
            } else {
                log::warn!("[serialization] '{}' ignoring unknown field '{}'", tag, key);
            }
        }

        let instance = kind.instantiate(values)?;
        log::trace!("[serialization] decoded '{}'", tag);
        Ok(Value::Node(Box::new(instance)))
    }

    fn encode_descriptor(&self, td: &TypeDescriptor) -> Document {
        let mut doc = Map::new();
        match td {
            TypeDescriptor::Primitive(_) => {}
            TypeDescriptor::List { element }
            | TypeDescriptor::Set { element }
            | TypeDescriptor::FrozenSet { element }
            | TypeDescriptor::Sequence { element }
            | TypeDescriptor::AbstractSet { element } => {
                doc.insert("element".into(), self.descriptor_json(element));
            }
            TypeDescriptor::Dict { key, value } | TypeDescriptor::Mapping { key, value } => {
                doc.insert("key".into(), self.descriptor_json(key));
                doc.insert("value".into(), self.descriptor_json(value));
            }
            TypeDescriptor::Tuple { elements } => {
                doc.insert("elements".into(), self.descriptor_list(elements));
            }
            TypeDescriptor::Literal { values } => {
                let values = values
                    .iter()
                    .map(|v| match v {
                        LiteralValue::Str(s) => Json::String(s.clone()),
                        LiteralValue::Int(i) => Json::Number(Number::from(*i)),
                        LiteralValue::Bool(b) => Json::Bool(*b),
                    })
                    .collect();
                doc.insert("values".into(), Json::Array(values));
            }
            TypeDescriptor::Node { returns } => {
                doc.insert("returns".into(), self.descriptor_json(returns));
            }
            TypeDescriptor::Ref { target } => {
                doc.insert("target".into(), self.descriptor_json(target));
            }
            TypeDescriptor::Union { options } => {
                doc.insert("options".into(), self.descriptor_list(options));
            }
            TypeDescriptor::TypeParameter { name, bound } => {
                doc.insert("name".into(), Json::String(name.clone()));
                let bound = match bound {
                    Some(b) => self.descriptor_json(b),
                    None => Json::Null,
                };
                doc.insert("bound".into(), bound);
            }
        }
        doc.insert(TAG_KEY.to_string(), Json::String(td.tag().to_string()));
        doc
    }

    fn decode_descriptor(&self, doc: &Document) -> Result<TypeDescriptor, DecodeError> {
        let tag = read_tag(doc)?;
        if let Some(kind) = PrimitiveKind::from_tag(tag) {
            return Ok(TypeDescriptor::Primitive(kind));
        }
        let field = |key: &'static str| self.nested_descriptor(doc, tag, key).map(Box::new);
        let td = match tag {
            "list" => TypeDescriptor::List {
                element: field("element")?,
            },
            "set" => TypeDescriptor::Set {
                element: field("element")?,
            },
            "frozenset" => TypeDescriptor::FrozenSet {
                element: field("element")?,
            },
            "sequence" => TypeDescriptor::Sequence {
                element: field("element")?,
            },
            "abstractset" => TypeDescriptor::AbstractSet {
                element: field("element")?,
            },
            "dict" => TypeDescriptor::Dict {
                key: field("key")?,
                value: field("value")?,
            },
            "mapping" => TypeDescriptor::Mapping {
                key: field("key")?,
                value: field("value")?,
            },
            "tuple" => TypeDescriptor::Tuple {
                elements: self.nested_descriptors(doc, tag, "elements")?,
            },
            "literal" => TypeDescriptor::Literal {
                values: decode_literals(doc, tag)?,
            },
            "node" => TypeDescriptor::Node {
                returns: field("returns")?,
            },
            "reference" => TypeDescriptor::Ref {
                target: field("target")?,
            },
            "union" => TypeDescriptor::Union {
                options: self.nested_descriptors(doc, tag, "options")?,
            },
            "typeparam" => {
                let name = match required(doc, tag, "name")? {
                    Json::String(s) => s.clone(),
                    _ => return Err(invalid(tag, "name", "string")),
                };
                let bound = match doc.get("bound") {
                    None | Some(Json::Null) => None,
                    Some(_) => Some(field("bound")?),
                };
                TypeDescriptor::TypeParameter { name, bound }
            }
            other => {
                return Err(DecodeError::UnknownDescriptorTag {
                    tag: other.to_string(),
                })
            }
        };
        Ok(td)
    }

    fn encode_schema(&self, schema: &NodeSchema) -> Document {
        let signature: Map<String, Json> = schema
            .signature
            .iter()
            .map(|(k, v)| (k.to_string(), Json::String(v.to_string())))
            .collect();
        let fields = schema
            .fields
            .iter()
            .map(|f| {
                let mut entry = Map::new();
                entry.insert("name".into(), Json::String(f.name.clone()));
                entry.insert("type".into(), self.descriptor_json(&f.ty));
                Json::Object(entry)
            })
            .collect();

        let mut doc = Map::new();
        doc.insert(TAG_KEY.to_string(), Json::String(schema.tag.clone()));
        doc.insert("signature".into(), Json::Object(signature));
        doc.insert("type_params".into(), self.descriptor_list(&schema.type_params));
        doc.insert("returns".into(), self.descriptor_json(&schema.returns));
        doc.insert("fields".into(), Json::Array(fields));
        doc
    }
}

impl JsonAdapter<'_> {
    fn descriptor_json(&self, td: &TypeDescriptor) -> Json {
        Json::Object(self.encode_descriptor(td))
    }

    fn descriptor_list(&self, tds: &[TypeDescriptor]) -> Json {
        Json::Array(tds.iter().map(|td| self.descriptor_json(td)).collect())
    }

    fn nested_descriptor(
        &self,
        doc: &Document,
        tag: &str,
        key: &'static str,
    ) -> Result<TypeDescriptor, DecodeError> {
        match required(doc, tag, key)? {
            Json::Object(inner) => self.decode_descriptor(inner),
            _ => Err(invalid(tag, key, "descriptor mapping")),
        }
    }

    fn nested_descriptors(
        &self,
        doc: &Document,
        tag: &str,
        key: &'static str,
    ) -> Result<Vec<TypeDescriptor>, DecodeError> {
        let Json::Array(items) = required(doc, tag, key)? else {
            return Err(invalid(tag, key, "list of descriptor mappings"));
        };
        items
            .iter()
            .map(|item| match item {
                Json::Object(inner) => self.decode_descriptor(inner),
                _ => Err(invalid(tag, key, "list of descriptor mappings")),
            })
            .collect()
    }
}

fn encode_ref(r: &Ref) -> Document {
    let mut doc = Map::new();
    doc.insert(TAG_KEY.to_string(), Json::String(REF_TAG.to_string()));
    doc.insert(REF_ID_KEY.to_string(), Json::String(r.id().to_string()));
    doc
}

fn decode_ref(doc: &Document) -> Result<Ref, DecodeError> {
    match required(doc, REF_TAG, REF_ID_KEY)? {
        Json::String(id) => Ok(Ref::new(id.clone())),
        _ => Err(invalid(REF_TAG, REF_ID_KEY, "string")),
    }
}

fn read_tag(doc: &Document) -> Result<&str, DecodeError> {
    match doc.get(TAG_KEY) {
        Some(Json::String(tag)) => Ok(tag),
        Some(other) => Err(DecodeError::InvalidTag {
            got: other.to_string(),
        }),
        None => Err(DecodeError::MissingTag),
    }
}

fn required<'d>(doc: &'d Document, tag: &str, key: &'static str) -> Result<&'d Json, DecodeError> {
    doc.get(key).ok_or_else(|| DecodeError::MissingKey {
        tag: tag.to_string(),
        key,
    })
}

fn invalid(tag: &str, key: &str, expected: &'static str) -> DecodeError {
    DecodeError::InvalidValue {
        context: format!("{}.{}", tag, key),
        expected,
    }
}

fn decode_literals(doc: &Document, tag: &str) -> Result<Vec<LiteralValue>, DecodeError> {
    let expected = "list of str, int or bool";
    let Json::Array(items) = required(doc, tag, "values")? else {
        return Err(invalid(tag, "values", expected));
    };
    items
        .iter()
        .map(|item| match item {
            Json::String(s) => Ok(LiteralValue::Str(s.clone())),
            Json::Bool(b) => Ok(LiteralValue::Bool(*b)),
            Json::Number(n) => n
                .as_i64()
                .map(LiteralValue::Int)
                .ok_or_else(|| invalid(tag, "values", expected)),
            _ => Err(invalid(tag, "values", expected)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Annotation;
    use crate::registry::KindDecl;
    use serde_json::json;

    fn registry() -> Registry {
        let registry = Registry::new();
        registry
            .register_kind(
                KindDecl::new("AddNode")
                    .returns(Annotation::name("float"))
                    .field("left", Annotation::name("float"))
                    .field("right", Annotation::name("float")),
            )
            .expect("register add");
        registry
    }

    fn object(json: Json) -> Document {
        match json {
            Json::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    #[test]
    fn test_tag_is_last_key() {
        let registry = registry();
        let adapter = JsonAdapter::new(&registry);
        let node = NodeInstance::new("add").with("left", 1.0).with("right", 2.5);
        let doc = adapter.encode_node(&node).expect("encode");
        let keys: Vec<_> = doc.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["left", "right", "tag"]);
    }

    #[test]
    fn test_encode_missing_field_fails() {
        let registry = registry();
        let adapter = JsonAdapter::new(&registry);
        let node = NodeInstance::new("add").with("left", 1.0);
        assert_eq!(
            adapter.encode_node(&node),
            Err(EncodeError::MissingField {
                tag: "add".into(),
                field: "right".into()
            })
        );
    }

    #[test]
    fn test_non_finite_float_rejected() {
        let registry = registry();
        let adapter = JsonAdapter::new(&registry);
        assert!(matches!(
            adapter.encode_value(&Value::Float(f64::NAN)),
            Err(EncodeError::NonFiniteFloat { .. })
        ));
    }

    #[test]
    fn test_strict_mode_rejects_unknown_fields() {
        let registry = registry();
        let doc = object(json!({"left": 1.0, "right": 2.0, "extra": true, "tag": "add"}));

        let lenient = JsonAdapter::new(&registry);
        assert!(lenient.decode_node(&doc).is_ok());

        let strict = JsonAdapter::new(&registry)
            .with_config(CodecConfig::default().with_strict_fields(true));
        assert!(matches!(
            strict.decode_node(&doc),
            Err(DecodeError::UnknownField { ref field, .. }) if field == "extra"
        ));
    }

    #[test]
    fn test_decode_numbers() {
        let registry = registry();
        let adapter = JsonAdapter::new(&registry);
        assert_eq!(adapter.decode_value(&json!(3)).ok(), Some(Value::Int(3)));
        assert_eq!(adapter.decode_value(&json!(3.0)).ok(), Some(Value::Float(3.0)));
    }

    #[test]
    fn test_untagged_map_decodes_elementwise() {
        let registry = registry();
        let adapter = JsonAdapter::new(&registry);
        let decoded = adapter
            .decode_value(&json!({"a": [{"tag": "ref", "id": "x"}]}))
            .expect("decode");
        let inner = decoded.as_map().and_then(|m| m.get("a")).and_then(Value::as_list);
        assert_eq!(inner, Some(&[Value::Ref(Ref::new("x"))][..]));
    }

    #[test]
    fn test_descriptor_layout() {
        let registry = registry();
        let adapter = JsonAdapter::new(&registry);
        let td = TypeDescriptor::dict(TypeDescriptor::str(), TypeDescriptor::param("T"));
        assert_eq!(
            Json::Object(adapter.encode_descriptor(&td)),
            json!({
                "key": {"tag": "str"},
                "value": {"name": "T", "bound": null, "tag": "typeparam"},
                "tag": "dict"
            })
        );
    }

    #[test]
    fn test_descriptor_missing_key() {
        let registry = registry();
        let adapter = JsonAdapter::new(&registry);
        let doc = object(json!({"tag": "list"}));
        assert!(matches!(
            adapter.decode_descriptor(&doc),
            Err(DecodeError::MissingKey { key: "element", .. })
        ));
        let doc = object(json!({"tag": "add"}));
        assert!(matches!(
            adapter.decode_descriptor(&doc),
            Err(DecodeError::UnknownDescriptorTag { .. })
        ));
    }

    #[test]
    fn test_schema_export() {
        let registry = registry();
        let adapter = JsonAdapter::new(&registry);
        let schema = registry.schema("add").expect("schema");
        assert_eq!(
            Json::Object(adapter.encode_schema(&schema)),
            json!({
                "tag": "add",
                "signature": {},
                "type_params": [],
                "returns": {"tag": "float"},
                "fields": [
                    {"name": "left", "type": {"tag": "float"}},
                    {"name": "right", "type": {"tag": "float"}}
                ]
            })
        );
    }

    #[test]
    fn test_render_compact() {
        let registry = registry();
        let adapter =
            JsonAdapter::new(&registry).with_config(CodecConfig::default().with_pretty(false));
        let text = adapter
            .to_json(&Value::Ref(Ref::new("n7")))
            .expect("to_json");
        assert_eq!(text, r#"{"tag":"ref","id":"n7"}"#);
    }
}
