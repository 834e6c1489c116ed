// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for treedsl.
//!
//! Every failure is raised synchronously at the point of detection and
//! carries enough context to name the offending tag, field or annotation.
//! Nothing here is recovered internally.

/// Tag composition / validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    /// Tag does not match the lowercase identifier pattern.
    #[error("invalid tag '{tag}': must start with a lowercase letter followed by lowercase letters, digits, '-' or '_' (segments joined by '.')")]
    Invalid { tag: String },

    /// Default tag derivation produced an empty string (e.g. a kind named `Node`).
    #[error("kind '{type_name}' derives an empty default tag; declare a signature")]
    Empty { type_name: String },

    /// Tag is reserved for refs or descriptor variants.
    #[error("tag '{tag}' is reserved")]
    Reserved { tag: String },

    /// Signature repeats a component key.
    #[error("signature component '{key}' given more than once")]
    DuplicateComponent { key: String },
}

/// Registry population failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    Tag(#[from] TagError),

    /// A different kind already owns the tag.
    #[error("tag '{tag}' already registered to {existing}; cannot register {new}. Choose a different tag")]
    Collision {
        tag: String,
        existing: String,
        new: String,
    },

    /// Registration attempted after [`Registry::seal`](crate::Registry::seal).
    #[error("registry is sealed; declarations must happen before sealing")]
    Sealed,

    /// Marker name already maps to a different descriptor.
    #[error("marker type '{name}' already registered with a different descriptor")]
    MarkerConflict { name: String },

    /// Alias name already maps to a different template.
    #[error("type alias '{name}' already registered with a different definition")]
    AliasConflict { name: String },

    /// Kind declares the same field twice.
    #[error("kind '{kind}' declares field '{field}' more than once")]
    DuplicateField { kind: String, field: String },

    /// Generated declaration carries annotation text that does not parse.
    #[error("kind '{kind}' has an invalid annotation: {source}")]
    Annotation {
        kind: String,
        #[source]
        source: ParseError,
    },
}

/// Annotation text front-end failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("unexpected {found} at offset {offset}, expected {expected}")]
    UnexpectedToken {
        found: String,
        offset: usize,
        expected: &'static str,
    },

    #[error("unexpected end of annotation, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("invalid number '{text}' at offset {offset}")]
    InvalidNumber { text: String, offset: usize },
}

/// Type extraction failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    /// Annotation matches none of the supported shapes.
    #[error("cannot extract type from: {annotation}")]
    Unrecognized { annotation: String },

    /// Container got the wrong number of type arguments.
    #[error("{container} type must have {expected}")]
    Arity {
        container: &'static str,
        expected: &'static str,
    },

    #[error("tuple type must have element types")]
    EmptyTuple,

    #[error("Literal type must have values")]
    EmptyLiteral,

    /// Literal value is not a string, integer or boolean.
    #[error("Literal values must be str, int, or bool, got {got}")]
    LiteralValue { got: String },

    /// Node-kind application with more than one return type.
    #[error("node kind {kind} takes at most one return type but got {got}")]
    KindArity { kind: String, got: usize },

    /// Generic alias applied with the wrong number of arguments.
    #[error("type alias {alias} expects {expected} arguments but got {got}")]
    AliasArity {
        alias: String,
        expected: usize,
        got: usize,
    },

    /// Kind name resolves to more than one registered tag.
    #[error("kind name '{name}' is ambiguous: registered under tags {tags:?}")]
    AmbiguousKind { name: String, tags: Vec<String> },

    /// A kind's return type refers back to itself.
    #[error("return type of kind '{name}' refers to itself")]
    RecursiveReturns { name: String },
}

/// Schema assembly failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("no kind registered under tag '{tag}'")]
    UnknownKind { tag: String },

    #[error("kind '{tag}' field '{field}': {source}")]
    Field {
        tag: String,
        field: String,
        #[source]
        source: ExtractError,
    },

    #[error("kind '{tag}' return type: {source}")]
    Returns {
        tag: String,
        #[source]
        source: ExtractError,
    },

    #[error("kind '{tag}' type parameter '{param}': {source}")]
    TypeParam {
        tag: String,
        param: String,
        #[source]
        source: ExtractError,
    },
}

/// Typed/dynamic value conversion and instance construction failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("type mismatch: expected {expected}, got {got}")]
    Mismatch { expected: &'static str, got: String },

    #[error("kind '{tag}' requires field '{field}'")]
    MissingField { tag: String, field: String },

    #[error("kind '{tag}' has no field '{field}'")]
    UnknownField { tag: String, field: String },

    #[error("expected node of kind '{expected}', got '{got}'")]
    WrongKind { expected: String, got: String },

    #[error("integer {value} out of range for {target}")]
    OutOfRange { value: i64, target: &'static str },
}

/// Structured encoding failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("cannot encode node: no kind registered under tag '{tag}'")]
    UnknownKind { tag: String },

    #[error("node '{tag}' is missing declared field '{field}'")]
    MissingField { tag: String, field: String },

    #[error("cannot encode non-finite float {value}")]
    NonFiniteFloat { value: String },
}

/// Structured decoding failures.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("mapping has no 'tag' key")]
    MissingTag,

    #[error("'tag' must be a string, got {got}")]
    InvalidTag { got: String },

    /// Tag is neither `ref`, a node kind, nor a descriptor variant.
    #[error("unknown tag: {tag}")]
    UnknownTag { tag: String },

    #[error("unknown node tag: {tag}")]
    UnknownNodeTag { tag: String },

    #[error("unknown type descriptor tag: {tag}")]
    UnknownDescriptorTag { tag: String },

    #[error("'{tag}' mapping is missing key '{key}'")]
    MissingKey { tag: String, key: &'static str },

    #[error("invalid value for {context}: expected {expected}")]
    InvalidValue {
        context: String,
        expected: &'static str,
    },

    /// Strict mode only.
    #[error("kind '{tag}' has no field '{field}'")]
    UnknownField { tag: String, field: String },

    #[error(transparent)]
    Value(#[from] ValueError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Flat AST container failures.
#[derive(Debug, thiserror::Error)]
pub enum AstError {
    #[error("reference to unknown node id '{id}'")]
    DanglingRef { id: String },

    #[error("root id '{id}' is not present in the node table")]
    UnknownRoot { id: String },

    #[error("entry '{id}' does not decode to a node")]
    NotANode { id: String },

    #[error("invalid AST document: {0}")]
    Malformed(&'static str),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Declaration document failures.
#[cfg(feature = "loaders")]
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read declaration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("'{context}': {source}")]
    Parse {
        context: String,
        #[source]
        source: ParseError,
    },

    #[error("'{context}': {source}")]
    Extract {
        context: String,
        #[source]
        source: ExtractError,
    },

    #[error("'{context}': {source}")]
    Decode {
        context: String,
        #[source]
        source: DecodeError,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("kind '{kind}' signature component '{key}' must be a string, integer or boolean (quote versions such as \"1.0\")")]
    InvalidSignature { kind: String, key: String },
}

/// Umbrella error for application code.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Tag(#[from] TagError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Value(#[from] ValueError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Ast(#[from] AstError),
    #[cfg(feature = "loaders")]
    #[error(transparent)]
    Load(#[from] LoadError),
}

pub type Result<T> = std::result::Result<T, Error>;
