// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Node schemas.
//!
//! A [`NodeSchema`] packages a kind's tag, signature, type parameters,
//! return type and public field descriptors. Schemas are introspection
//! output; they are built lazily by [`Registry::schema`] and cached per tag.

use crate::errors::SchemaError;
use crate::extract::Extractor;
use crate::registry::{NodeKind, Registry, Signature};
use crate::types::TypeDescriptor;

/// One public field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    pub name: String,
    pub ty: TypeDescriptor,
}

/// Complete schema of a node kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSchema {
    pub tag: String,
    pub signature: Signature,
    /// `TypeParameter` descriptors, in declaration order.
    pub type_params: Vec<TypeDescriptor>,
    pub returns: TypeDescriptor,
    /// Public fields, in declaration order.
    pub fields: Vec<FieldSchema>,
}

impl NodeSchema {
    pub fn field(&self, name: &str) -> Option<&TypeDescriptor> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.ty)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

/// Assemble the schema of `kind`.
pub fn assemble(registry: &Registry, kind: &NodeKind) -> Result<NodeSchema, SchemaError> {
    let tag = kind.tag().to_string();
    let mut extractor = Extractor::new(registry);

    let mut type_params = Vec::with_capacity(kind.type_params().len());
    for param in kind.type_params() {
        let bound = match &param.bound {
            Some(bound) => {
                let td = extractor
                    .extract(bound)
                    .map_err(|source| SchemaError::TypeParam {
                        tag: tag.clone(),
                        param: param.name.clone(),
                        source,
                    })?;
                Some(Box::new(td))
            }
            None => None,
        };
        type_params.push(TypeDescriptor::TypeParameter {
            name: param.name.clone(),
            bound,
        });
    }

    let returns = extractor
        .returns_of(kind)
        .map_err(|source| SchemaError::Returns {
            tag: tag.clone(),
            source,
        })?;

    let fields = kind
        .public_fields()
        .map(|field| {
            extractor
                .extract(&field.annotation)
                .map(|ty| FieldSchema {
                    name: field.name.clone(),
                    ty,
                })
                .map_err(|source| SchemaError::Field {
                    tag: tag.clone(),
                    field: field.name.clone(),
                    source,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NodeSchema {
        tag,
        signature: kind.signature().clone(),
        type_params,
        returns,
        fields,
    })
}
