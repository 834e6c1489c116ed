// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registry integration tests: tag protocol and declaration lifecycle.

use std::sync::{Arc, Barrier};
use std::thread;

use treedsl::annotation::Annotation;
use treedsl::errors::{RegistryError, TagError};
use treedsl::registry::{compose_tag, Signature};
use treedsl::serialization::to_structured;
use treedsl::{KindDecl, NodeInstance, Registry, Value};

fn calculator_add(version: &str) -> KindDecl {
    KindDecl::new("Add")
        .component("ns", "calculator")
        .component("name", "add")
        .component("version", version)
        .returns(Annotation::name("float"))
        .field("left", Annotation::name("float"))
        .field("right", Annotation::name("float"))
}

#[test]
fn test_signature_tagging_versions_coexist() {
    let registry = Registry::new();
    let v1 = registry.register_kind(calculator_add("1.0")).expect("v1");
    let v2 = registry.register_kind(calculator_add("2.0")).expect("v2");

    assert_eq!(v1.tag(), "calculator.add.1.0");
    assert_eq!(v2.tag(), "calculator.add.2.0");
    assert!(registry.contains_tag("calculator.add.1.0"));
    assert!(registry.contains_tag("calculator.add.2.0"));
    assert_eq!(v1.signature().get("version"), Some("1.0"));
}

#[test]
fn test_compose_tag_rules() {
    assert_eq!(compose_tag("AddNode", &Signature::new()), Ok("add".to_string()));
    assert_eq!(compose_tag("Literal", &Signature::new()).ok(), None);

    let sig = Signature::new().with("name", "mul").with("ns", "math");
    assert_eq!(compose_tag("Mul", &sig), Ok("mul.math".to_string()));

    assert_eq!(
        compose_tag("X", &Signature::new().with("name", "9lives")),
        Err(TagError::Invalid {
            tag: "9lives".into()
        })
    );
    assert_eq!(
        compose_tag("X", &Signature::new().with("a", "x").with("a", "y")),
        Err(TagError::DuplicateComponent { key: "a".into() })
    );
}

#[test]
fn test_collision_invariant() {
    let registry = Registry::new();
    registry
        .register_kind(KindDecl::new("Mul").component("name", "op"))
        .expect("first");
    assert!(registry
        .register_kind(KindDecl::new("Mul").component("name", "op"))
        .is_ok());
    assert!(matches!(
        registry.register_kind(KindDecl::new("Div").component("name", "op")),
        Err(RegistryError::Collision { ref tag, .. }) if tag == "op"
    ));
}

#[test]
fn test_tag_determinism_across_values() {
    let registry = Registry::new();
    registry.register_kind(calculator_add("1.0")).expect("register");

    for (left, right) in [(0.0, 1.0), (-2.5, 3.75), (1e9, -1e-9)] {
        let node = NodeInstance::new("calculator.add.1.0")
            .with("left", left)
            .with("right", right);
        let doc = to_structured(&registry, &Value::from(node)).expect("encode");
        assert_eq!(doc["tag"], "calculator.add.1.0");
    }
}

#[test]
fn test_sealed_registry_shared_across_threads() {
    let registry = Arc::new(Registry::new());
    registry.register_kind(calculator_add("1.0")).expect("register");
    registry.seal();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let node = NodeInstance::new("calculator.add.1.0")
                    .with("left", f64::from(i))
                    .with("right", 1.0);
                to_structured(&registry, &Value::from(node)).map(|doc| doc["left"].clone())
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let left = handle.join().expect("thread").expect("encode");
        assert_eq!(left.as_f64(), Some(i as f64));
    }
    assert_eq!(
        registry.register_kind(calculator_add("3.0")).map(|_| ()),
        Err(RegistryError::Sealed)
    );
}

#[test]
fn test_concurrent_conflicting_registrations() {
    const THREADS: usize = 8;
    let registry = Arc::new(Registry::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let name = format!("Op{}", i);
                let decl = KindDecl::new(name.clone())
                    .component("name", "op")
                    .field("arg", Annotation::name("int"));
                barrier.wait();
                (name, registry.register_kind(decl).map(|kind| kind.tag().to_string()))
            })
        })
        .collect();

    let mut winners = Vec::new();
    let mut collisions = 0;
    for handle in handles {
        match handle.join().expect("thread") {
            (name, Ok(tag)) => {
                assert_eq!(tag, "op");
                winners.push(name);
            }
            (name, Err(RegistryError::Collision { tag, existing, new })) => {
                assert_eq!(tag, "op");
                assert_eq!(new, name);
                assert_ne!(existing, name);
                collisions += 1;
            }
            (_, Err(other)) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(winners.len(), 1);
    assert_eq!(collisions, THREADS - 1);
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.kind("op").expect("kind").name(), winners[0]);
}
