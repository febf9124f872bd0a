// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime values.

mod decimal;

pub use decimal::{Decimal, DecimalError};

use std::collections::BTreeMap;

/// A value conforming to some [`TypeDescriptor`](crate::types::TypeDescriptor).
///
/// Byte arrays are plain `Array`s of `Byte`; see [`Value::bytes`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
    Byte(u8),
    Decimal(Decimal),

    // Composites
    Array(Vec<Value>),
    Record(BTreeMap<String, Value>),
    Map(BTreeMap<String, Value>),
    Table(Vec<Value>),
    Tuple(Vec<Value>),
}

impl Value {
    /// Byte array value.
    pub fn bytes(data: &[u8]) -> Self {
        Self::Array(data.iter().copied().map(Self::Byte).collect())
    }

    /// Record value from `(field, value)` pairs.
    pub fn record<K: Into<String>>(fields: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Map value from `(key, value)` pairs.
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Check if value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to get as i64.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as f64.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as decimal.
    pub fn as_decimal(&self) -> Option<&Decimal> {
        match self {
            Self::Decimal(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as a slice of elements (array, table or tuple).
    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Self::Array(v) | Self::Table(v) | Self::Tuple(v) => Some(v),
            _ => None,
        }
    }

    /// Collect a byte array's contents, `None` if any element is not a byte.
    pub fn as_bytes(&self) -> Option<Vec<u8>> {
        match self {
            Self::Array(items) => items
                .iter()
                .map(|item| match item {
                    Self::Byte(b) => Some(*b),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }

    /// Get a record field or map entry.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Record(fields) | Self::Map(fields) => fields.get(key),
            _ => None,
        }
    }

    /// Short name of the runtime kind, used in mismatch reports.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "()",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "boolean",
            Self::String(_) => "string",
            Self::Byte(_) => "byte",
            Self::Decimal(_) => "decimal",
            Self::Array(_) => "array",
            Self::Record(_) => "record",
            Self::Map(_) => "map",
            Self::Table(_) => "table",
            Self::Tuple(_) => "tuple",
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Self::Byte(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Self::Decimal(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::Array(v.into_iter().map(Into::into).collect())
    }
}
