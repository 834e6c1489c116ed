// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::sync::Arc;

use super::*;
use crate::errors::TagError;

fn ann(text: &str) -> Annotation {
    Annotation::parse(text).expect("parse annotation")
}

fn add(version: &str) -> KindDecl {
    KindDecl::new("Add")
        .component("ns", "calculator")
        .component("name", "add")
        .component("version", version)
        .returns(ann("float"))
        .field("left", ann("Child[float]"))
        .field("right", ann("Child[float]"))
}

#[test]
fn test_default_tag_from_name() {
    let registry = Registry::new();
    let kind = registry
        .register_kind(KindDecl::new("AddNode").field("x", ann("int")))
        .expect("register");
    assert_eq!(kind.tag(), "add");
    assert!(registry.contains_tag("add"));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_versions_coexist() {
    let registry = Registry::new();
    registry.register_kind(add("1.0")).expect("v1");
    registry.register_kind(add("2.0")).expect("v2");
    assert_eq!(
        registry.tags(),
        vec!["calculator.add.1.0".to_string(), "calculator.add.2.0".to_string()]
    );
}

#[test]
fn test_identical_reregistration_is_noop() {
    let registry = Registry::new();
    let first = registry.register_kind(add("1.0")).expect("first");
    let second = registry.register_kind(add("1.0")).expect("second");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_collision_names_both_kinds() {
    let registry = Registry::new();
    registry
        .register_kind(KindDecl::new("AddNode").field("x", ann("int")))
        .expect("first");
    let err = registry
        .register_kind(KindDecl::new("Add").field("x", ann("int")))
        .expect_err("collision");
    assert_eq!(
        err,
        RegistryError::Collision {
            tag: "add".into(),
            existing: "AddNode".into(),
            new: "Add".into(),
        }
    );
    assert_eq!(registry.kind("add").map(|k| k.name().to_string()), Some("AddNode".into()));
}

#[test]
fn test_changed_declaration_collides() {
    let registry = Registry::new();
    registry.register_kind(add("1.0")).expect("first");
    let changed = add("1.0").field("scale", ann("int"));
    assert!(matches!(
        registry.register_kind(changed),
        Err(RegistryError::Collision { .. })
    ));
}

#[test]
fn test_invalid_and_reserved_tags() {
    let registry = Registry::new();
    assert!(matches!(
        registry.register_kind(KindDecl::new("X").component("name", "Bad Tag")),
        Err(RegistryError::Tag(TagError::Invalid { .. }))
    ));
    assert!(matches!(
        registry.register_kind(KindDecl::new("Ref")),
        Err(RegistryError::Tag(TagError::Reserved { .. }))
    ));
    assert!(matches!(
        registry.register_kind(KindDecl::new("X").component("name", "list")),
        Err(RegistryError::Tag(TagError::Reserved { .. }))
    ));
    assert!(matches!(
        registry.register_kind(KindDecl::new("Node")),
        Err(RegistryError::Tag(TagError::Empty { .. }))
    ));
    assert!(registry.is_empty());
}

#[test]
fn test_sealed_registry_rejects_declarations() {
    let registry = Registry::new();
    registry.register_kind(add("1.0")).expect("register");
    registry.seal();
    assert!(registry.is_sealed());

    assert_eq!(registry.register_kind(add("2.0")).map(|_| ()), Err(RegistryError::Sealed));
    assert_eq!(
        registry.register_marker("Vec3", TypeDescriptor::float()),
        Err(RegistryError::Sealed)
    );
    assert!(registry.kind("calculator.add.1.0").is_some());
}

#[test]
fn test_marker_conflict() {
    let registry = Registry::new();
    registry
        .register_marker("Meters", TypeDescriptor::float())
        .expect("marker");
    registry
        .register_marker("Meters", TypeDescriptor::float())
        .expect("same marker again");
    assert_eq!(
        registry.register_marker("Meters", TypeDescriptor::int()),
        Err(RegistryError::MarkerConflict {
            name: "Meters".into()
        })
    );
}

#[test]
fn test_alias_conflict_and_builtins() {
    let registry = Registry::new();
    assert!(registry.alias("NodeRef").is_some());
    assert!(registry.alias("Child").is_some());
    assert!(Registry::empty().alias("Child").is_none());

    let pair = || TypeAlias::new("Pair", vec![ParamDecl::new("T")], ann("tuple[T, T]"));
    registry.register_alias(pair()).expect("alias");
    registry.register_alias(pair()).expect("same alias again");
    assert!(matches!(
        registry.register_alias(TypeAlias::new("Pair", vec![ParamDecl::new("T")], ann("list[T]"))),
        Err(RegistryError::AliasConflict { .. })
    ));
}

#[test]
fn test_alias_arity() {
    let alias = TypeAlias::new("Pair", vec![ParamDecl::new("T")], ann("tuple[T, T]"));
    assert_eq!(alias.apply(&[ann("int")]), Ok(ann("tuple[int, int]")));
    assert_eq!(
        alias.apply(&[]),
        Err(ExtractError::AliasArity {
            alias: "Pair".into(),
            expected: 1,
            got: 0,
        })
    );
}

#[test]
fn test_kind_by_name_ambiguous_across_versions() {
    let registry = Registry::new();
    registry.register_kind(add("1.0")).expect("v1");
    assert!(registry.kind_by_name("Add").expect("lookup").is_some());
    registry.register_kind(add("2.0")).expect("v2");
    assert!(matches!(
        registry.kind_by_name("Add"),
        Err(ExtractError::AmbiguousKind { ref tags, .. }) if tags.len() == 2
    ));
    assert_eq!(registry.kind_by_name("Missing"), Ok(None));
}

#[test]
fn test_all_schemas_keyed_by_tag() {
    let registry = Registry::new();
    registry.register_kind(add("1.0")).expect("v1");
    registry
        .register_kind(KindDecl::new("Const").returns(ann("float")).field("value", ann("float")))
        .expect("const");

    let schemas = registry.all_schemas().expect("schemas");
    assert_eq!(
        schemas.keys().cloned().collect::<Vec<_>>(),
        vec!["calculator.add.1.0".to_string(), "const".to_string()]
    );
    let add = &schemas["calculator.add.1.0"];
    let child = TypeDescriptor::union(vec![
        TypeDescriptor::node(TypeDescriptor::float()),
        TypeDescriptor::reference(TypeDescriptor::node(TypeDescriptor::float())),
    ]);
    assert_eq!(add.field("left"), Some(&child));
    assert_eq!(add.returns, TypeDescriptor::float());
}

#[test]
fn test_registration_invalidates_cached_schemas() {
    let registry = Registry::new();
    registry
        .register_kind(KindDecl::new("Wrapper").field("inner", ann("Inner")))
        .expect("wrapper");
    assert!(registry.schema("wrapper").is_err());

    registry
        .register_kind(KindDecl::new("Inner").returns(ann("int")))
        .expect("inner");
    let schema = registry.schema("wrapper").expect("schema");
    assert_eq!(
        schema.field("inner"),
        Some(&TypeDescriptor::node(TypeDescriptor::int()))
    );
}

#[test]
fn test_concurrent_registration_single_winner() {
    let registry = Registry::new();
    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = &registry;
                scope.spawn(move || {
                    registry.register_kind(
                        KindDecl::new(format!("Kind{}", i))
                            .component("name", "shared")
                            .field("x", ann("int")),
                    )
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("thread"))
            .collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(RegistryError::Collision { .. })))
            .count(),
        7
    );
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_concurrent_schema_reads() {
    let registry = Registry::new();
    registry.register_kind(add("1.0")).expect("register");
    registry.seal();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..16 {
                    let schema = registry.schema("calculator.add.1.0").expect("schema");
                    assert_eq!(schema.fields.len(), 2);
                }
            });
        }
    });
    let stats = registry.schema_stats();
    assert_eq!(stats.hits + stats.misses, 64);
    assert!(stats.misses >= 1);
}
