// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Node registry and tag protocol.
//!
//! A [`Registry`] is an explicit object with a declaration phase and a
//! read phase:
//!
//! 1. construct it with [`Registry::new`] (built-in aliases `NodeRef[T]`
//!    and `Child[T]` are pre-registered);
//! 2. populate it with kinds, marker types and generic aliases;
//! 3. [`seal`](Registry::seal) it, then share it with extraction and
//!    serialization.
//!
//! Registration is append-only. "Check for collision, then insert" runs
//! under one write guard, so two conflicting kinds can never both appear
//! registered. Re-registering an identical declaration is a no-op.
//!
//! # Example
//!
//! ```rust
//! use treedsl::annotation::Annotation;
//! use treedsl::registry::{KindDecl, Registry};
//!
//! let registry = Registry::new();
//! let add = |version: &str| {
//!     KindDecl::new("Add")
//!         .component("ns", "calculator")
//!         .component("name", "add")
//!         .component("version", version)
//!         .field("left", Annotation::name("float"))
//! };
//!
//! assert_eq!(registry.register_kind(add("1.0")).unwrap().tag(), "calculator.add.1.0");
//! assert_eq!(registry.register_kind(add("2.0")).unwrap().tag(), "calculator.add.2.0");
//! assert!(registry.register_kind(add("1.0")).is_ok());
//! ```

mod kind;
mod tag;

#[cfg(test)]
mod tests;

pub use kind::{FieldDecl, KindDecl, Node, NodeKind, NODE_BASE};
pub use tag::{compose_tag, default_tag, is_reserved_tag, validate_tag, Signature};

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::annotation::{Annotation, ParamDecl};
use crate::errors::{ExtractError, RegistryError, SchemaError};
use crate::extract::Extractor;
use crate::schema::{self, NodeSchema};
use crate::types::TypeDescriptor;

/// Generic alias: a named template over placeholders.
///
/// `Pair[T] = tuple[T, T]`; applying `Pair[int]` substitutes `T` in the body.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAlias {
    name: String,
    params: Vec<ParamDecl>,
    body: Annotation,
}

impl TypeAlias {
    /// Build an alias; bare names in `body` matching `params` become placeholders.
    pub fn new(name: impl Into<String>, params: Vec<ParamDecl>, body: Annotation) -> Self {
        let body = body.bind_params(&params);
        Self {
            name: name.into(),
            params,
            body,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[ParamDecl] {
        &self.params
    }

    pub fn body(&self) -> &Annotation {
        &self.body
    }

    /// Substitute `args` for the placeholders, positionally.
    pub fn apply(&self, args: &[Annotation]) -> Result<Annotation, ExtractError> {
        if args.len() != self.params.len() {
            return Err(ExtractError::AliasArity {
                alias: self.name.clone(),
                expected: self.params.len(),
                got: args.len(),
            });
        }
        let map: HashMap<String, Annotation> = self
            .params
            .iter()
            .zip(args)
            .map(|(p, a)| (p.name.clone(), a.clone()))
            .collect();
        Ok(self.body.substitute(&map))
    }
}

/// Schema cache hit/miss counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Default)]
struct RegistryState {
    kinds: BTreeMap<String, Arc<NodeKind>>,
    names: HashMap<String, Vec<String>>,
    markers: HashMap<String, TypeDescriptor>,
    aliases: HashMap<String, Arc<TypeAlias>>,
}

/// Tag-indexed store of node kinds, marker types and generic aliases.
pub struct Registry {
    state: RwLock<RegistryState>,
    sealed: AtomicBool,
    // Bumped on every successful registration; stale schemas are never cached.
    generation: AtomicU64,
    schemas: RwLock<HashMap<String, Arc<NodeSchema>>>,
    stats: RwLock<CacheStats>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Registry")
            .field("kinds", &state.kinds.keys().collect::<Vec<_>>())
            .field("markers", &state.markers.len())
            .field("aliases", &state.aliases.len())
            .field("sealed", &self.is_sealed())
            .finish()
    }
}

impl Registry {
    /// Registry with the built-in `NodeRef[T]` and `Child[T]` aliases.
    #[must_use]
    pub fn new() -> Self {
        let registry = Self::empty();
        {
            let mut state = registry.state.write();
            for alias in builtin_aliases() {
                state
                    .aliases
                    .insert(alias.name.clone(), Arc::new(alias));
            }
        }
        registry
    }

    /// Registry without any pre-registered alias.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            sealed: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            schemas: RwLock::new(HashMap::new()),
            stats: RwLock::new(CacheStats::default()),
        }
    }

    // -----------------------------------------------------------------------
    // Declaration phase
    // -----------------------------------------------------------------------

    /// Register a kind declaration and return the stored kind.
    pub fn register_kind(&self, decl: KindDecl) -> Result<Arc<NodeKind>, RegistryError> {
        let kind = NodeKind::new(decl)?;
        let mut state = self.state.write();
        self.check_open()?;

        if let Some(existing) = state.kinds.get(kind.tag()) {
            if existing.declaration() == kind.declaration() {
                log::trace!("[registry] '{}' already registered, keeping it", kind.tag());
                return Ok(Arc::clone(existing));
            }
            return Err(RegistryError::Collision {
                tag: kind.tag().to_string(),
                existing: existing.name().to_string(),
                new: kind.name().to_string(),
            });
        }

        let tag = kind.tag().to_string();
        let kind = Arc::new(kind);
        state
            .names
            .entry(kind.name().to_string())
            .or_default()
            .push(tag.clone());
        state.kinds.insert(tag.clone(), Arc::clone(&kind));
        drop(state);

        self.invalidate();
        log::debug!("[registry] registered kind '{}' as '{}'", kind.name(), tag);
        Ok(kind)
    }

    /// Register a Rust type implementing [`Node`].
    pub fn register<N: Node>(&self) -> Result<Arc<NodeKind>, RegistryError> {
        let decl = N::declaration().map_err(|source| RegistryError::Annotation {
            kind: std::any::type_name::<N>().to_string(),
            source,
        })?;
        let kind = self.register_kind(decl)?;
        debug_assert_eq!(kind.tag(), N::TAG, "derived tag must match registered tag");
        Ok(kind)
    }

    /// Map a marker type name to a fixed descriptor.
    ///
    /// Extraction returns `descriptor` for a bare `name` before any
    /// structural rule is tried.
    pub fn register_marker(
        &self,
        name: impl Into<String>,
        descriptor: TypeDescriptor,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        let mut state = self.state.write();
        self.check_open()?;

        match state.markers.get(&name) {
            Some(existing) if *existing == descriptor => return Ok(()),
            Some(_) => return Err(RegistryError::MarkerConflict { name }),
            None => {}
        }
        log::debug!("[registry] marker '{}' -> {}", name, descriptor);
        state.markers.insert(name, descriptor);
        drop(state);

        self.invalidate();
        Ok(())
    }

    /// Register a generic alias.
    pub fn register_alias(&self, alias: TypeAlias) -> Result<Arc<TypeAlias>, RegistryError> {
        let mut state = self.state.write();
        self.check_open()?;

        if let Some(existing) = state.aliases.get(alias.name()) {
            if **existing == alias {
                return Ok(Arc::clone(existing));
            }
            return Err(RegistryError::AliasConflict {
                name: alias.name().to_string(),
            });
        }
        log::debug!(
            "[registry] alias '{}' over {} parameter(s)",
            alias.name(),
            alias.params().len()
        );
        let alias = Arc::new(alias);
        state
            .aliases
            .insert(alias.name().to_string(), Arc::clone(&alias));
        drop(state);

        self.invalidate();
        Ok(alias)
    }

    /// End the declaration phase. Further registration fails.
    pub fn seal(&self) {
        let state = self.state.write();
        if !self.sealed.swap(true, Ordering::SeqCst) {
            log::debug!("[registry] sealed with {} kind(s)", state.kinds.len());
        }
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::SeqCst)
    }

    fn check_open(&self) -> Result<(), RegistryError> {
        if self.is_sealed() {
            return Err(RegistryError::Sealed);
        }
        Ok(())
    }

    fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.schemas.write().clear();
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    pub fn kind(&self, tag: &str) -> Option<Arc<NodeKind>> {
        self.state.read().kinds.get(tag).cloned()
    }

    /// Resolve a declared type name to its kind.
    ///
    /// Two versions of the same type name registered under distinct tags
    /// cannot be referenced by name.
    pub fn kind_by_name(&self, name: &str) -> Result<Option<Arc<NodeKind>>, ExtractError> {
        let state = self.state.read();
        match state.names.get(name).map(Vec::as_slice) {
            None | Some([]) => Ok(None),
            Some([tag]) => Ok(state.kinds.get(tag).cloned()),
            Some(tags) => Err(ExtractError::AmbiguousKind {
                name: name.to_string(),
                tags: tags.to_vec(),
            }),
        }
    }

    pub fn marker(&self, name: &str) -> Option<TypeDescriptor> {
        self.state.read().markers.get(name).cloned()
    }

    pub fn alias(&self, name: &str) -> Option<Arc<TypeAlias>> {
        self.state.read().aliases.get(name).cloned()
    }

    pub fn contains_tag(&self, tag: &str) -> bool {
        self.state.read().kinds.contains_key(tag)
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<String> {
        self.state.read().kinds.keys().cloned().collect()
    }

    /// Registered kinds, in tag order.
    pub fn kinds(&self) -> Vec<Arc<NodeKind>> {
        self.state.read().kinds.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.state.read().kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().kinds.is_empty()
    }

    // -----------------------------------------------------------------------
    // Extraction and schemas
    // -----------------------------------------------------------------------

    /// Extract the descriptor of an annotation against this registry.
    pub fn extract(&self, annotation: &Annotation) -> Result<TypeDescriptor, ExtractError> {
        Extractor::new(self).extract(annotation)
    }

    /// Schema of the kind registered under `tag`, built once and cached.
    pub fn schema(&self, tag: &str) -> Result<Arc<NodeSchema>, SchemaError> {
        if let Some(hit) = self.schemas.read().get(tag) {
            self.stats.write().hits += 1;
            return Ok(Arc::clone(hit));
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let kind = self.kind(tag).ok_or_else(|| SchemaError::UnknownKind {
            tag: tag.to_string(),
        })?;
        let built = Arc::new(schema::assemble(self, &kind)?);
        self.stats.write().misses += 1;
        log::debug!(
            "[registry] built schema for '{}' ({} field(s))",
            tag,
            built.fields.len()
        );

        let mut cache = self.schemas.write();
        if self.generation.load(Ordering::SeqCst) != generation {
            return Ok(built);
        }
        Ok(Arc::clone(
            cache.entry(tag.to_string()).or_insert(built),
        ))
    }

    /// Schema of a [`Node`] type.
    pub fn schema_of<N: Node>(&self) -> Result<Arc<NodeSchema>, SchemaError> {
        self.schema(N::TAG)
    }

    /// Every schema, keyed by tag.
    pub fn all_schemas(&self) -> Result<BTreeMap<String, Arc<NodeSchema>>, SchemaError> {
        self.tags()
            .into_iter()
            .map(|tag| self.schema(&tag).map(|s| (tag, s)))
            .collect()
    }

    #[must_use]
    pub fn schema_stats(&self) -> CacheStats {
        *self.stats.read()
    }
}

fn builtin_aliases() -> [TypeAlias; 2] {
    let t = || Annotation::name("T");
    let node_t = || Annotation::generic(NODE_BASE, vec![t()]);
    let ref_node_t = || Annotation::generic("Ref", vec![node_t()]);
    [
        TypeAlias::new("NodeRef", vec![ParamDecl::new("T")], ref_node_t()),
        TypeAlias::new(
            "Child",
            vec![ParamDecl::new("T")],
            Annotation::Union(vec![node_t(), ref_node_t()]),
        ),
    ]
}
