// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed <-> dynamic value conversions.
//!
//! `#[derive(Node)]` relies on these impls for every field type; node
//! structs get their own impls from the derive.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::{BuildHasher, Hash};
use std::rc::Rc;
use std::sync::Arc;

use super::{Ref, Value};
use crate::errors::ValueError;
use crate::types::TypeDescriptor;

/// Convert a typed value into a dynamic [`Value`].
pub trait ToValue {
    fn to_value(&self) -> Value;
}

/// Rebuild a typed value from a dynamic [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, ValueError>;
}

fn mismatch(expected: &'static str, got: &Value) -> ValueError {
    ValueError::Mismatch {
        expected,
        got: got.type_name().to_string(),
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        Ok(value)
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(v) => Ok(v),
            other => Err(mismatch("bool", &other)),
        }
    }
}

impl ToValue for () {
    fn to_value(&self) -> Value {
        Value::Null
    }
}

impl FromValue for () {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(()),
            other => Err(mismatch("null", &other)),
        }
    }
}

macro_rules! impl_int {
    ($($t:ty),*) => {
        $(
            impl ToValue for $t {
                fn to_value(&self) -> Value {
                    Value::Int(i64::from(*self))
                }
            }

            impl FromValue for $t {
                fn from_value(value: Value) -> Result<Self, ValueError> {
                    match value {
                        Value::Int(v) => <$t>::try_from(v).map_err(|_| ValueError::OutOfRange {
                            value: v,
                            target: stringify!($t),
                        }),
                        other => Err(mismatch("int", &other)),
                    }
                }
            }
        )*
    };
}

impl_int!(i8, i16, i32, i64, u8, u16, u32);

// Values above i64::MAX travel as floats; integral floats up to the
// type's maximum decode back, saturating at the top of the range.
macro_rules! impl_wide_int {
    ($($t:ty),*) => {
        $(
            impl ToValue for $t {
                fn to_value(&self) -> Value {
                    match i64::try_from(*self) {
                        Ok(v) => Value::Int(v),
                        Err(_) => Value::Float(*self as f64),
                    }
                }
            }

            impl FromValue for $t {
                fn from_value(value: Value) -> Result<Self, ValueError> {
                    match value {
                        Value::Int(v) => <$t>::try_from(v).map_err(|_| ValueError::OutOfRange {
                            value: v,
                            target: stringify!($t),
                        }),
                        Value::Float(f)
                            if f.fract() == 0.0 && f >= i64::MAX as f64 && f <= <$t>::MAX as f64 =>
                        {
                            Ok(f as $t)
                        }
                        other => Err(mismatch("int", &other)),
                    }
                }
            }
        )*
    };
}

impl_wide_int!(u64, usize);

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(v) => Ok(v),
            Value::Int(v) => Ok(v as f64),
            other => Err(mismatch("float", &other)),
        }
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        f64::from_value(value).map(|v| v as f32)
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::Str(self.to_string())
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Str(v) => Ok(v),
            other => Err(mismatch("str", &other)),
        }
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

macro_rules! impl_pointer {
    ($($p:ident),*) => {
        $(
            impl<T: ToValue + ?Sized> ToValue for $p<T> {
                fn to_value(&self) -> Value {
                    (**self).to_value()
                }
            }

            impl<T: FromValue> FromValue for $p<T> {
                fn from_value(value: Value) -> Result<Self, ValueError> {
                    T::from_value(value).map($p::new)
                }
            }
        )*
    };
}

impl_pointer!(Box, Rc, Arc);

fn into_list(value: Value) -> Result<Vec<Value>, ValueError> {
    match value {
        Value::List(items) => Ok(items),
        other => Err(mismatch("list", &other)),
    }
}

fn into_map(value: Value) -> Result<BTreeMap<String, Value>, ValueError> {
    match value {
        Value::Map(entries) => Ok(entries),
        other => Err(mismatch("map", &other)),
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        into_list(value)?.into_iter().map(T::from_value).collect()
    }
}

impl<T: ToValue> ToValue for VecDeque<T> {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: FromValue> FromValue for VecDeque<T> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        into_list(value)?.into_iter().map(T::from_value).collect()
    }
}

impl<T: ToValue> ToValue for BTreeSet<T> {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: FromValue + Ord> FromValue for BTreeSet<T> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        into_list(value)?.into_iter().map(T::from_value).collect()
    }
}

impl<T: ToValue, S> ToValue for HashSet<T, S> {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: FromValue + Eq + Hash, S: BuildHasher + Default> FromValue for HashSet<T, S> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        into_list(value)?.into_iter().map(T::from_value).collect()
    }
}

impl<V: ToValue> ToValue for BTreeMap<String, V> {
    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.clone(), v.to_value()))
                .collect(),
        )
    }
}

impl<V: FromValue> FromValue for BTreeMap<String, V> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        into_map(value)?
            .into_iter()
            .map(|(k, v)| V::from_value(v).map(|v| (k, v)))
            .collect()
    }
}

impl<V: ToValue, S> ToValue for HashMap<String, V, S> {
    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.clone(), v.to_value()))
                .collect(),
        )
    }
}

impl<V: FromValue, S: BuildHasher + Default> FromValue for HashMap<String, V, S> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        into_map(value)?
            .into_iter()
            .map(|(k, v)| V::from_value(v).map(|v| (k, v)))
            .collect()
    }
}

macro_rules! impl_tuple {
    ($len:expr; $($name:ident $idx:tt),+) => {
        impl<$($name: ToValue),+> ToValue for ($($name,)+) {
            fn to_value(&self) -> Value {
                Value::List(vec![$(self.$idx.to_value()),+])
            }
        }

        impl<$($name: FromValue),+> FromValue for ($($name,)+) {
            fn from_value(value: Value) -> Result<Self, ValueError> {
                let items = into_list(value)?;
                if items.len() != $len {
                    return Err(ValueError::Mismatch {
                        expected: concat!("tuple of ", stringify!($len)),
                        got: format!("list of {}", items.len()),
                    });
                }
                let mut items = items.into_iter();
                Ok(($(
                    match items.next() {
                        Some(v) => $name::from_value(v)?,
                        None => unreachable!("tuple length checked"),
                    },
                )+))
            }
        }
    };
}

impl_tuple!(1; A 0);
impl_tuple!(2; A 0, B 1);
impl_tuple!(3; A 0, B 1, C 2);
impl_tuple!(4; A 0, B 1, C 2, D 3);

impl<T> ToValue for Ref<T> {
    fn to_value(&self) -> Value {
        Value::Ref(self.erase())
    }
}

impl<T> FromValue for Ref<T> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Ref(r) => Ok(r.cast()),
            other => Err(mismatch("ref", &other)),
        }
    }
}

impl ToValue for TypeDescriptor {
    fn to_value(&self) -> Value {
        Value::Type(self.clone())
    }
}

impl FromValue for TypeDescriptor {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Type(td) => Ok(td),
            other => Err(mismatch("type descriptor", &other)),
        }
    }
}
