//! # Typed Conversions
//!
//! `FromValue` and `ToValue` bridge the dynamic [`Value`] model and plain
//! Rust field types. Resolvers only ever produce and consume `Value`s; typed
//! structs use these traits in their `from_object` / `to_object`
//! implementations.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::error::ConversionError;
use crate::value::{Object, Value};

/// Conversion from a resolved [`Value`].
pub trait FromValue: Sized {
    /// Convert, consuming the value.
    fn from_value(value: Value) -> Result<Self, ConversionError>;
}

/// Conversion into a [`Value`] for output resolution.
pub trait ToValue {
    /// Produce the dynamic representation of `self`.
    fn to_value(&self) -> Value;
}

fn mismatch(expected: &'static str, found: &Value) -> ConversionError {
    ConversionError::TypeMismatch {
        expected,
        found: found.kind_name(),
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        Ok(value)
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        value.as_bool().ok_or_else(|| mismatch("bool", &value))
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        value.as_i64().ok_or_else(|| mismatch("int", &value))
    }
}

impl ToValue for i64 {
    fn to_value(&self) -> Value {
        Value::Int(*self)
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        value
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(|| mismatch("32-bit int", &value))
    }
}

impl ToValue for i32 {
    fn to_value(&self) -> Value {
        Value::Int(i64::from(*self))
    }
}

impl FromValue for u32 {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        value
            .as_i64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| mismatch("unsigned 32-bit int", &value))
    }
}

impl ToValue for u32 {
    fn to_value(&self) -> Value {
        Value::Int(i64::from(*self))
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        value.as_f64().ok_or_else(|| mismatch("float", &value))
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(mismatch("string", &other)),
        }
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl FromValue for Object {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Object(o) => Ok(o),
            other => Err(mismatch("object", &other)),
        }
    }
}

impl ToValue for Object {
    fn to_value(&self) -> Value {
        Value::Object(self.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
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

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Seq(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| T::from_value(item).map_err(|e| e.in_field(i.to_string())))
                .collect(),
            // A keyed collection read positionally keeps its iteration order.
            Value::Map(map) => map
                .into_iter()
                .map(|(k, item)| T::from_value(item).map_err(|e| e.in_field(k)))
                .collect(),
            other => Err(mismatch("sequence", &other)),
        }
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::Seq(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: FromValue> FromValue for IndexMap<String, T> {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Map(map) => map
                .into_iter()
                .map(|(k, item)| match T::from_value(item) {
                    Ok(v) => Ok((k, v)),
                    Err(e) => Err(e.in_field(k)),
                })
                .collect(),
            Value::Seq(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| match T::from_value(item) {
                    Ok(v) => Ok((i.to_string(), v)),
                    Err(e) => Err(e.in_field(i.to_string())),
                })
                .collect(),
            other => Err(mismatch("map", &other)),
        }
    }
}

impl<T: ToValue> ToValue for IndexMap<String, T> {
    fn to_value(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.clone(), v.to_value())).collect())
    }
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        IndexMap::<String, T>::from_value(value).map(|m| m.into_iter().collect())
    }
}

impl<T: ToValue> ToValue for BTreeMap<String, T> {
    fn to_value(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.clone(), v.to_value())).collect())
    }
}
