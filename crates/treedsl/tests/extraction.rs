// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Extraction integration tests: annotation text -> descriptor.

use treedsl::annotation::{Annotation, ParamDecl};
use treedsl::errors::ExtractError;
use treedsl::registry::{KindDecl, TypeAlias};
use treedsl::types::{LiteralValue, PrimitiveKind};
use treedsl::{Registry, TypeDescriptor};

fn extract(registry: &Registry, text: &str) -> Result<TypeDescriptor, ExtractError> {
    registry.extract(&Annotation::parse(text).expect("parse annotation"))
}

fn ok(registry: &Registry, text: &str) -> TypeDescriptor {
    extract(registry, text).unwrap_or_else(|e| panic!("extract {text}: {e}"))
}

// ============================================================================
// Primitives and containers
// ============================================================================

#[test]
fn test_primitive_and_container() {
    let registry = Registry::new();
    assert_eq!(ok(&registry, "list[int]"), TypeDescriptor::list(TypeDescriptor::int()));
    assert_eq!(
        ok(&registry, "dict[str, float]"),
        TypeDescriptor::dict(TypeDescriptor::str(), TypeDescriptor::float())
    );
}

#[test]
fn test_every_primitive_name() {
    let registry = Registry::new();
    let table = [
        ("int", PrimitiveKind::Int),
        ("float", PrimitiveKind::Float),
        ("str", PrimitiveKind::Str),
        ("string", PrimitiveKind::Str),
        ("bool", PrimitiveKind::Bool),
        ("None", PrimitiveKind::None),
        ("bytes", PrimitiveKind::Bytes),
        ("Decimal", PrimitiveKind::Decimal),
        ("date", PrimitiveKind::Date),
        ("time", PrimitiveKind::Time),
        ("datetime", PrimitiveKind::DateTime),
        ("timedelta", PrimitiveKind::Duration),
    ];
    for (name, kind) in table {
        assert_eq!(ok(&registry, name), TypeDescriptor::Primitive(kind), "{name}");
    }
}

#[test]
fn test_container_variants_distinct() {
    let registry = Registry::new();
    let int = || Box::new(TypeDescriptor::int());
    assert_eq!(ok(&registry, "set[int]"), TypeDescriptor::Set { element: int() });
    assert_eq!(ok(&registry, "frozenset[int]"), TypeDescriptor::FrozenSet { element: int() });
    assert_eq!(ok(&registry, "Sequence[int]"), TypeDescriptor::Sequence { element: int() });
    assert_eq!(ok(&registry, "AbstractSet[int]"), TypeDescriptor::AbstractSet { element: int() });
    assert_eq!(
        ok(&registry, "typing.Mapping[str, int]"),
        TypeDescriptor::Mapping {
            key: Box::new(TypeDescriptor::str()),
            value: int(),
        }
    );
    assert_ne!(ok(&registry, "set[int]"), ok(&registry, "frozenset[int]"));
}

#[test]
fn test_nested_containers() {
    let registry = Registry::new();
    assert_eq!(
        ok(&registry, "list[dict[str, tuple[int, float]]]"),
        TypeDescriptor::list(TypeDescriptor::dict(
            TypeDescriptor::str(),
            TypeDescriptor::tuple(vec![TypeDescriptor::int(), TypeDescriptor::float()]),
        ))
    );
}

// ============================================================================
// Unions, literals, refs
// ============================================================================

#[test]
fn test_union_order_preserved() {
    let registry = Registry::new();
    let TypeDescriptor::Union { options } = ok(&registry, "int | str | float") else {
        panic!("expected a union");
    };
    assert_eq!(
        options,
        vec![TypeDescriptor::int(), TypeDescriptor::str(), TypeDescriptor::float()]
    );

    let TypeDescriptor::Union { options } = ok(&registry, "Union[bool, None]") else {
        panic!("expected a union");
    };
    assert_eq!(options, vec![TypeDescriptor::bool(), TypeDescriptor::none()]);
}

#[test]
fn test_optional_is_union_with_none() {
    let registry = Registry::new();
    assert_eq!(
        ok(&registry, "Optional[int]"),
        TypeDescriptor::union(vec![TypeDescriptor::int(), TypeDescriptor::none()])
    );
}

#[test]
fn test_literal_values_in_order() {
    let registry = Registry::new();
    assert_eq!(
        ok(&registry, "Literal['add', 1, True]"),
        TypeDescriptor::literal(vec![
            LiteralValue::from("add"),
            LiteralValue::from(1),
            LiteralValue::from(true),
        ])
    );
}

#[test]
fn test_ref_target() {
    let registry = Registry::new();
    assert_eq!(ok(&registry, "Ref"), TypeDescriptor::reference(TypeDescriptor::none()));
    assert_eq!(
        ok(&registry, "NodeRef[int]"),
        TypeDescriptor::reference(TypeDescriptor::node(TypeDescriptor::int()))
    );
}

// ============================================================================
// Node kinds, markers, aliases
// ============================================================================

#[test]
fn test_node_kind_as_value_type() {
    let registry = Registry::new();
    registry
        .register_kind(KindDecl::new("Expr").returns(Annotation::name("float")))
        .expect("expr");

    assert_eq!(ok(&registry, "Expr"), TypeDescriptor::node(TypeDescriptor::float()));
    assert_eq!(ok(&registry, "Expr[int]"), TypeDescriptor::node(TypeDescriptor::int()));
    assert_eq!(ok(&registry, "Node"), TypeDescriptor::node(TypeDescriptor::none()));
    assert_eq!(
        ok(&registry, "Child[str]"),
        TypeDescriptor::union(vec![
            TypeDescriptor::node(TypeDescriptor::str()),
            TypeDescriptor::reference(TypeDescriptor::node(TypeDescriptor::str())),
        ])
    );
}

#[test]
fn test_marker_bypasses_structure() {
    let registry = Registry::new();
    let vec3 = TypeDescriptor::tuple(vec![TypeDescriptor::float(); 3]);
    registry.register_marker("Vector3", vec3.clone()).expect("marker");
    assert_eq!(ok(&registry, "Vector3"), vec3);
    assert_eq!(ok(&registry, "list[Vector3]"), TypeDescriptor::list(vec3));
}

#[test]
fn test_generic_substitution() {
    let registry = Registry::new();
    registry
        .register_alias(TypeAlias::new(
            "Table",
            vec![ParamDecl::new("T")],
            Annotation::parse("Dict[string, T]").expect("parse"),
        ))
        .expect("alias");
    assert_eq!(
        ok(&registry, "Table[int]"),
        TypeDescriptor::dict(TypeDescriptor::str(), TypeDescriptor::int())
    );
    assert_eq!(
        extract(&registry, "Table[int, str]"),
        Err(ExtractError::AliasArity {
            alias: "Table".into(),
            expected: 1,
            got: 2,
        })
    );
}

#[test]
fn test_substitution_splices_unions() {
    let registry = Registry::new();
    registry
        .register_alias(TypeAlias::new(
            "OrNone",
            vec![ParamDecl::new("T")],
            Annotation::parse("T | None").expect("parse"),
        ))
        .expect("alias");
    let TypeDescriptor::Union { options } = ok(&registry, "OrNone[int | str]") else {
        panic!("expected a union");
    };
    assert_eq!(
        options,
        vec![TypeDescriptor::int(), TypeDescriptor::str(), TypeDescriptor::none()]
    );
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_unsupported_annotations_fail() {
    let registry = Registry::new();
    assert_eq!(
        extract(&registry, "Mystery"),
        Err(ExtractError::Unrecognized {
            annotation: "Mystery".into()
        })
    );
    assert_eq!(
        extract(&registry, "list"),
        Err(ExtractError::Arity {
            container: "list",
            expected: "an element type",
        })
    );
    assert_eq!(
        extract(&registry, "dict[str]"),
        Err(ExtractError::Arity {
            container: "dict",
            expected: "key and value types",
        })
    );
    assert_eq!(extract(&registry, "tuple[]"), Err(ExtractError::EmptyTuple));
    assert_eq!(extract(&registry, "Literal[]"), Err(ExtractError::EmptyLiteral));
    assert_eq!(
        extract(&registry, "Literal[1.5]"),
        Err(ExtractError::LiteralValue { got: "float".into() })
    );
}

#[test]
fn test_descriptor_variant_matches_rule() {
    let registry = Registry::new();
    let cases = [
        ("int", "int"),
        ("list[int]", "list"),
        ("set[int]", "set"),
        ("dict[str, int]", "dict"),
        ("tuple[int]", "tuple"),
        ("Literal['a']", "literal"),
        ("Node[int]", "node"),
        ("Ref[int]", "reference"),
        ("int | str", "union"),
    ];
    for (text, tag) in cases {
        assert_eq!(ok(&registry, text).tag(), tag, "{text}");
    }
}
