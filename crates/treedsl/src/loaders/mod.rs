// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Declaration loaders for YAML and JSON documents.
//!
//! Kinds, marker types and aliases can be declared in a document instead
//! of Rust code. Loading registers everything into an existing
//! [`Registry`]; call [`Registry::seal`] afterwards as usual.
//!
//! # Example
//!
//! ```rust,ignore
//! use treedsl::loaders::DeclarationLoader;
//! use treedsl::{JsonAdapter, Registry};
//!
//! let registry = Registry::new();
//! let report = DeclarationLoader::load("calculator.yaml", &registry)?;
//! registry.seal();
//!
//! let adapter = JsonAdapter::new(&registry).with_config(report.codec);
//! ```

pub mod yaml;

pub use yaml::{AliasEntry, DeclarationDocument, FieldEntry, KindEntry, MarkerEntry, ParamEntry};

use std::fs;
use std::path::Path;

use crate::config::CodecConfig;
use crate::errors::LoadError;
use crate::registry::Registry;

/// Declaration document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationFormat {
    Json,
    Yaml,
}

impl DeclarationFormat {
    /// Detect format from file extension; anything but `.json` is YAML.
    pub fn from_extension(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// Outcome of a successful load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Tags of the registered kinds, in document order.
    pub tags: Vec<String>,
    pub aliases: Vec<String>,
    pub markers: Vec<String>,
    /// Codec options carried by the document.
    pub codec: CodecConfig,
}

/// Declaration document loader.
pub struct DeclarationLoader;

impl DeclarationLoader {
    /// Load a declaration file into `registry`.
    ///
    /// The format is chosen from the extension (`.json` or YAML otherwise).
    pub fn load<P: AsRef<Path>>(path: P, registry: &Registry) -> Result<LoadReport, LoadError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        log::debug!("[loaders] reading declarations from {}", path.display());
        Self::load_str(&content, DeclarationFormat::from_extension(path), registry)
    }

    pub fn load_str(
        content: &str,
        format: DeclarationFormat,
        registry: &Registry,
    ) -> Result<LoadReport, LoadError> {
        let document = match format {
            DeclarationFormat::Json => Self::parse_json(content)?,
            DeclarationFormat::Yaml => Self::parse_yaml(content)?,
        };
        document.apply(registry)
    }

    pub fn load_yaml_str(content: &str, registry: &Registry) -> Result<LoadReport, LoadError> {
        Self::load_str(content, DeclarationFormat::Yaml, registry)
    }

    pub fn load_json_str(content: &str, registry: &Registry) -> Result<LoadReport, LoadError> {
        Self::load_str(content, DeclarationFormat::Json, registry)
    }

    /// Parse a YAML document without registering it.
    pub fn parse_yaml(content: &str) -> Result<DeclarationDocument, LoadError> {
        let doc: DeclarationDocument = serde_yaml::from_str(content)?;
        Ok(doc)
    }

    /// Parse a JSON document without registering it.
    pub fn parse_json(content: &str) -> Result<DeclarationDocument, LoadError> {
        let doc: DeclarationDocument = serde_json::from_str(content)?;
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            DeclarationFormat::from_extension(Path::new("kinds.json")),
            DeclarationFormat::Json
        );
        assert_eq!(
            DeclarationFormat::from_extension(Path::new("kinds.yml")),
            DeclarationFormat::Yaml
        );
        assert_eq!(
            DeclarationFormat::from_extension(Path::new("kinds")),
            DeclarationFormat::Yaml
        );
    }

    #[test]
    fn test_json_document() {
        let registry = Registry::new();
        let report = DeclarationLoader::load_json_str(
            r#"{"kinds": [{"name": "Literal", "signature": {"name": "lit"},
                "fields": [{"name": "value", "type": "int | str"}]}]}"#,
            &registry,
        )
        .expect("load");
        assert_eq!(report.tags, vec!["lit"]);
        assert_eq!(report.codec, CodecConfig::default());
    }

    #[test]
    fn test_empty_yaml_document() {
        let registry = Registry::new();
        let report = DeclarationLoader::load_yaml_str("{}", &registry).expect("load");
        assert!(report.tags.is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_bad_annotation_names_context() {
        let registry = Registry::new();
        let err = DeclarationLoader::load_yaml_str(
            "kinds:\n  - name: Bad\n    fields:\n      - { name: x, type: \"list[\" }\n",
            &registry,
        )
        .expect_err("bad annotation");
        assert!(matches!(err, LoadError::Parse { ref context, .. } if context == "Bad.x"));
    }
}
