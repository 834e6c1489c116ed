// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field annotations as explicit expression trees.
//!
//! Kinds declare their field types, bases and type-parameter bounds as
//! [`Annotation`] values, either built directly or parsed from text such
//! as `dict[str, list[int]]` or `Node[T] | Ref[Node[T]]`. The extractor
//! classifies these trees; it never inspects runtime type objects.
//!
//! # Example
//!
//! ```rust
//! use treedsl::annotation::{Annotation, ParamDecl};
//!
//! let ann = Annotation::parse("dict[str, T]").unwrap();
//! let bound = ann.bind_params(&[ParamDecl::new("T")]);
//! assert_eq!(bound.to_string(), "dict[str, T]");
//! ```

mod parse;
mod tokenize;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::errors::ParseError;

/// Declared generic placeholder with an optional bound.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub name: String,
    pub bound: Option<Box<Annotation>>,
}

impl ParamDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bound: None,
        }
    }

    #[must_use]
    pub fn with_bound(mut self, bound: Annotation) -> Self {
        self.bound = Some(Box::new(bound));
        self
    }
}

/// Constant appearing as a type argument (`Literal['a', 1]`).
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{:?}", s),
            Self::Int(i) => write!(f, "{}", i),
            // `{:?}` keeps the fractional part (`2.0`), so the text reparses as a float.
            Self::Float(x) => write!(f, "{:?}", x),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
        }
    }
}

/// A type expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    /// Bare name: `int`, `Vector3`, `AddNode`.
    Name(String),
    /// Bound type-parameter placeholder.
    Param(ParamDecl),
    /// Name applied to arguments: `list[int]`, `Node[float]`.
    Generic { name: String, args: Vec<Annotation> },
    /// Constant argument.
    Constant(Constant),
    /// Alternation, in declared order.
    Union(Vec<Annotation>),
}

impl Annotation {
    /// Parse annotation text.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        parse::parse(text)
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    pub fn generic(name: impl Into<String>, args: Vec<Annotation>) -> Self {
        Self::Generic {
            name: name.into(),
            args,
        }
    }

    /// Build a union, splicing nested unions; a single option is returned as is.
    pub fn union(options: Vec<Annotation>) -> Self {
        let mut flat = Vec::with_capacity(options.len());
        for option in options {
            parse::push_flat(&mut flat, option);
        }
        if flat.len() == 1 {
            return flat.remove(0);
        }
        Self::Union(flat)
    }

    /// Head name of a `Name` or `Generic`.
    pub fn head(&self) -> Option<&str> {
        match self {
            Self::Name(name) | Self::Generic { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Rewrite bare names matching one of `params` into [`Annotation::Param`].
    pub fn bind_params(&self, params: &[ParamDecl]) -> Annotation {
        if params.is_empty() {
            return self.clone();
        }
        match self {
            Self::Name(name) => match params.iter().find(|p| &p.name == name) {
                Some(decl) => Self::Param(decl.clone()),
                None => self.clone(),
            },
            Self::Generic { name, args } => Self::Generic {
                name: name.clone(),
                args: args.iter().map(|a| a.bind_params(params)).collect(),
            },
            Self::Union(options) => {
                Self::Union(options.iter().map(|o| o.bind_params(params)).collect())
            }
            Self::Param(_) | Self::Constant(_) => self.clone(),
        }
    }

    /// Replace placeholders by name, recursively.
    ///
    /// A placeholder replaced by a union inside a union is spliced into it.
    pub fn substitute(&self, map: &HashMap<String, Annotation>) -> Annotation {
        match self {
            Self::Param(decl) => match map.get(&decl.name) {
                Some(replacement) => replacement.clone(),
                None => self.clone(),
            },
            Self::Generic { name, args } => Self::Generic {
                name: name.clone(),
                args: args.iter().map(|a| a.substitute(map)).collect(),
            },
            Self::Union(options) => {
                let mut flat = Vec::with_capacity(options.len());
                for option in options {
                    parse::push_flat(&mut flat, option.substitute(map));
                }
                Self::Union(flat)
            }
            Self::Name(_) | Self::Constant(_) => self.clone(),
        }
    }
}

impl FromStr for Annotation {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Param(decl) => f.write_str(&decl.name),
            Self::Generic { name, args } => {
                write!(f, "{}[", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str("]")
            }
            Self::Constant(c) => write!(f, "{}", c),
            Self::Union(options) => {
                for (i, option) in options.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    match option {
                        Self::Union(_) => write!(f, "({})", option)?,
                        _ => write!(f, "{}", option)?,
                    }
                }
                Ok(())
            }
        }
    }
}
