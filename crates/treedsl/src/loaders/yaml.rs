// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Declaration document structure.
//!
//! # Example YAML
//!
//! ```yaml
//! # calculator.yaml
//! codec:
//!   strict_fields: true
//!
//! aliases:
//!   - name: Pair
//!     params: [T]
//!     body: "tuple[T, T]"
//!
//! markers:
//!   - name: Vector3
//!     type: "tuple[float, float, float]"
//!
//! kinds:
//!   - name: AddV2
//!     signature: { ns: calculator, name: add, version: "2.0" }
//!     returns: float
//!     fields:
//!       - { name: left, type: "Child[float]" }
//!       - { name: right, type: "Child[float]" }
//!       - { name: precision, type: int, default: 2 }
//! ```
//!
//! The same structure is accepted as JSON.

use serde::Deserialize;

use super::LoadReport;
use crate::annotation::{Annotation, ParamDecl};
use crate::config::CodecConfig;
use crate::errors::LoadError;
use crate::registry::{FieldDecl, KindDecl, Registry, Signature, TypeAlias};
use crate::serialization::JsonAdapter;

/// Root declaration document.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct DeclarationDocument {
    /// Codec options applied by callers that decode with this document's kinds.
    pub codec: CodecConfig,

    /// Generic aliases, registered first.
    pub aliases: Vec<AliasEntry>,

    /// Marker types, registered after aliases.
    pub markers: Vec<MarkerEntry>,

    /// Node kinds, registered last.
    pub kinds: Vec<KindEntry>,
}

/// Type parameter: a bare name or `{ name, bound }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ParamEntry {
    Name(String),
    Bounded {
        name: String,
        #[serde(default)]
        bound: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
pub struct AliasEntry {
    pub name: String,
    #[serde(default)]
    pub params: Vec<ParamEntry>,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct MarkerEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Deserialize)]
pub struct KindEntry {
    pub name: String,

    /// Ordered signature components; document order is kept.
    #[serde(default)]
    pub signature: serde_yaml::Mapping,

    #[serde(default)]
    pub type_params: Vec<ParamEntry>,

    /// Shorthand for an `extends: ["Node[...]"]` entry.
    #[serde(default)]
    pub returns: Option<String>,

    #[serde(default)]
    pub extends: Vec<String>,

    #[serde(default)]
    pub fields: Vec<FieldEntry>,
}

#[derive(Debug, Deserialize)]
pub struct FieldEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    /// Structured value; tagged mappings decode to nodes, refs or descriptors.
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub computed: bool,
}

fn parse(context: &str, text: &str) -> Result<Annotation, LoadError> {
    Annotation::parse(text).map_err(|source| LoadError::Parse {
        context: context.to_string(),
        source,
    })
}

impl ParamEntry {
    fn to_decl(&self, context: &str) -> Result<ParamDecl, LoadError> {
        match self {
            Self::Name(name) => Ok(ParamDecl::new(name.clone())),
            Self::Bounded { name, bound: None } => Ok(ParamDecl::new(name.clone())),
            Self::Bounded {
                name,
                bound: Some(bound),
            } => Ok(ParamDecl::new(name.clone())
                .with_bound(parse(&format!("{}.{}", context, name), bound)?)),
        }
    }
}

impl KindEntry {
    fn signature(&self) -> Result<Signature, LoadError> {
        let invalid = |key: String| LoadError::InvalidSignature {
            kind: self.name.clone(),
            key,
        };
        let mut signature = Signature::new();
        for (key, value) in &self.signature {
            let key = match key {
                serde_yaml::Value::String(k) => k.clone(),
                other => return Err(invalid(format!("{:?}", other))),
            };
            let value = match value {
                serde_yaml::Value::String(s) => s.clone(),
                serde_yaml::Value::Bool(b) => b.to_string(),
                serde_yaml::Value::Number(n) if n.is_i64() || n.is_u64() => n.to_string(),
                _ => return Err(invalid(key)),
            };
            signature.push(key, value);
        }
        Ok(signature)
    }

    fn to_decl(&self, adapter: &JsonAdapter<'_>) -> Result<KindDecl, LoadError> {
        let mut decl = KindDecl::new(self.name.clone()).signature(self.signature()?);
        for param in &self.type_params {
            decl = decl.type_param(param.to_decl(&self.name)?);
        }
        if let Some(returns) = &self.returns {
            decl = decl.returns(parse(&format!("{}.returns", self.name), returns)?);
        }
        for base in &self.extends {
            decl = decl.extends(parse(&format!("{}.extends", self.name), base)?);
        }
        for field in &self.fields {
            let context = format!("{}.{}", self.name, field.name);
            let mut fd = FieldDecl::new(field.name.clone(), parse(&context, &field.ty)?);
            if let Some(default) = &field.default {
                let value = adapter
                    .decode_value(default)
                    .map_err(|source| LoadError::Decode {
                        context: context.clone(),
                        source,
                    })?;
                fd = fd.with_default(value);
            }
            if field.computed {
                fd = fd.computed();
            }
            decl = decl.field_decl(fd);
        }
        Ok(decl)
    }
}

impl DeclarationDocument {
    /// Register the document's aliases, markers and kinds, in that order.
    pub fn apply(&self, registry: &Registry) -> Result<LoadReport, LoadError> {
        let mut report = LoadReport {
            codec: self.codec,
            ..LoadReport::default()
        };

        for entry in &self.aliases {
            let params = entry
                .params
                .iter()
                .map(|p| p.to_decl(&entry.name))
                .collect::<Result<Vec<_>, _>>()?;
            let body = parse(&entry.name, &entry.body)?;
            registry.register_alias(TypeAlias::new(entry.name.clone(), params, body))?;
            report.aliases.push(entry.name.clone());
        }

        for entry in &self.markers {
            let annotation = parse(&entry.name, &entry.ty)?;
            let descriptor =
                registry
                    .extract(&annotation)
                    .map_err(|source| LoadError::Extract {
                        context: entry.name.clone(),
                        source,
                    })?;
            registry.register_marker(entry.name.clone(), descriptor)?;
            report.markers.push(entry.name.clone());
        }

        let adapter = JsonAdapter::new(registry).with_config(self.codec);
        for entry in &self.kinds {
            let kind = registry.register_kind(entry.to_decl(&adapter)?)?;
            report.tags.push(kind.tag().to_string());
        }

        log::debug!(
            "[loaders] applied {} alias(es), {} marker(s), {} kind(s)",
            report.aliases.len(),
            report.markers.len(),
            report.tags.len()
        );
        Ok(report)
    }
}
