// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Rust type -> annotation text, and compile-time tag checks.

use syn::{GenericArgument, PathArguments, Type};

/// Tags a node kind can never take.
///
/// `"ref"` followed by `TypeDescriptor::TAGS` from the runtime crate; a test
/// below keeps the two lists in step.
const RESERVED_TAGS: &[&str] = &[
    "ref",
    "int",
    "float",
    "str",
    "bool",
    "none",
    "bytes",
    "decimal",
    "date",
    "time",
    "datetime",
    "duration",
    "list",
    "set",
    "frozenset",
    "sequence",
    "abstractset",
    "dict",
    "mapping",
    "tuple",
    "literal",
    "node",
    "reference",
    "union",
    "typeparam",
];

/// Lower-cased name with a trailing `node` stripped.
pub(crate) fn default_tag(type_name: &str) -> String {
    let lower = type_name.to_lowercase();
    match lower.strip_suffix("node") {
        Some(stem) => stem.to_string(),
        None => lower,
    }
}

/// Compose and validate a tag; returns the reason on failure.
pub(crate) fn compose_tag(
    type_name: &str,
    signature: &[(String, String)],
) -> Result<String, String> {
    for (i, (key, _)) in signature.iter().enumerate() {
        if signature[..i].iter().any(|(k, _)| k == key) {
            return Err(format!("signature component '{key}' given more than once"));
        }
    }
    let tag = if signature.is_empty() {
        let tag = default_tag(type_name);
        if tag.is_empty() {
            return Err(format!(
                "'{type_name}' derives an empty default tag; add #[node(tag = \"...\")]"
            ));
        }
        tag
    } else {
        signature
            .iter()
            .map(|(_, v)| v.as_str())
            .collect::<Vec<_>>()
            .join(".")
    };
    if !is_valid_tag(&tag) {
        return Err(format!(
            "invalid tag '{tag}': lowercase letters, digits, '-' or '_', segments joined by '.'"
        ));
    }
    if RESERVED_TAGS.contains(&tag.as_str()) {
        return Err(format!("tag '{tag}' is reserved"));
    }
    Ok(tag)
}

fn is_valid_tag(tag: &str) -> bool {
    let segment_ok = |s: &str| {
        !s.is_empty()
            && s.bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-')
    };
    let mut segments = tag.split('.');
    match segments.next() {
        Some(first) if first.starts_with(|c: char| c.is_ascii_lowercase()) => {
            segment_ok(first) && segments.all(segment_ok)
        }
        _ => false,
    }
}

/// Map a field type to annotation text.
///
/// `Box`, `Arc` and `Rc` are transparent; unknown paths keep their last
/// identifier so node kinds, markers and aliases resolve by name.
pub(crate) fn annotation_of(ty: &Type) -> syn::Result<String> {
    match ty {
        Type::Paren(inner) => annotation_of(&inner.elem),
        Type::Group(inner) => annotation_of(&inner.elem),
        Type::Tuple(tuple) if tuple.elems.is_empty() => Ok("None".to_string()),
        Type::Tuple(tuple) => {
            let elements = tuple
                .elems
                .iter()
                .map(annotation_of)
                .collect::<syn::Result<Vec<_>>>()?;
            Ok(format!("tuple[{}]", elements.join(", ")))
        }
        Type::Path(path) if path.qself.is_none() => {
            let Some(segment) = path.path.segments.last() else {
                return Err(unsupported(ty));
            };
            let args = type_args(&segment.arguments)?;
            let name = segment.ident.to_string();
            let mapped = match (name.as_str(), args.as_slice()) {
                ("i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" | "u64" | "usize", []) => {
                    "int".to_string()
                }
                ("f32" | "f64", []) => "float".to_string(),
                ("String", []) => "str".to_string(),
                ("bool", []) => "bool".to_string(),
                ("Box" | "Arc" | "Rc", [inner]) => inner.clone(),
                ("Vec" | "VecDeque", [element]) => format!("list[{element}]"),
                ("HashSet" | "BTreeSet", [element, ..]) => format!("set[{element}]"),
                ("HashMap" | "BTreeMap", [key, value, ..]) => format!("dict[{key}, {value}]"),
                ("Option", [inner]) => format!("Optional[{inner}]"),
                (_, _) => format_generic(&name, &args),
            };
            Ok(mapped)
        }
        _ => Err(unsupported(ty)),
    }
}

fn format_generic(name: &str, args: &[String]) -> String {
    if args.is_empty() {
        name.to_string()
    } else {
        format!("{}[{}]", name, args.join(", "))
    }
}

fn type_args(arguments: &PathArguments) -> syn::Result<Vec<String>> {
    match arguments {
        PathArguments::None => Ok(Vec::new()),
        PathArguments::AngleBracketed(angle) => angle
            .args
            .iter()
            .filter_map(|arg| match arg {
                GenericArgument::Type(ty) => Some(annotation_of(ty)),
                _ => None,
            })
            .collect(),
        PathArguments::Parenthesized(p) => Err(syn::Error::new_spanned(
            p,
            "function types have no annotation; add #[node(annotation = \"...\")]",
        )),
    }
}

fn unsupported(ty: &Type) -> syn::Error {
    syn::Error::new_spanned(
        ty,
        "cannot derive an annotation for this type; add #[node(annotation = \"...\")]",
    )
}
