// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Canonical wire names.
//!
//! Pure functions mapping a type and its structural position to the field
//! and nested-message names used on the wire. The compiler, encoder and
//! decoder all derive names from here, so a value always lands in the field
//! the schema declared for it.

use crate::error::{Error, Result};
use crate::types::{
    PrimitiveKind, RecordDescriptor, TupleDescriptor, TypeDescriptor, UnionDescriptor,
};

/// Separator between a type key and a role suffix.
pub const TYPE_SEPARATOR: &str = "__";
/// Separator between a role and its index.
pub const SEPARATOR: &str = "_";

pub const UNION_FIELD: &str = "unionField";
pub const NULL_FIELD: &str = "nullField";
pub const ARRAY_FIELD: &str = "arrayField";
pub const ATOMIC_FIELD: &str = "atomicField";
pub const MAP_FIELD: &str = "mapField";
pub const MAP_ENTRY: &str = "MapFieldEntry";
pub const KEY_FIELD: &str = "key";
pub const VALUE_FIELD: &str = "value";
pub const TABLE_ENTRY: &str = "table_entry";
pub const ELEMENT_FIELD: &str = "element";

pub const DECIMAL_VALUE: &str = "DecimalValue";
pub const SCALE_FIELD: &str = "scale";
pub const PRECISION_FIELD: &str = "precision";
pub const UNSCALED_VALUE_FIELD: &str = "unscaled_value";

pub const ARRAY_BUILDER: &str = "ArrayBuilder";
pub const RECORD_BUILDER: &str = "RecordBuilder";
pub const MAP_BUILDER: &str = "MapBuilder";
pub const TABLE_BUILDER: &str = "TableBuilder";
pub const TUPLE_BUILDER: &str = "TupleBuilder";
pub const UNION_BUILDER: &str = "UnionBuilder";

/// Structural position of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentKind {
    TopLevel,
    RecordField,
    TupleElement,
    MapValue,
    TableRow,
    ArrayElement,
    UnionMember,
}

/// One union member with its wire key.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionMember<'a> {
    pub key: String,
    pub ty: &'a TypeDescriptor,
}

/// `arrayField_<d>`
pub fn array_field_name(dimensions: u32) -> String {
    format!("{}{}{}", ARRAY_FIELD, SEPARATOR, dimensions)
}

/// `element_<index>`, 1-based.
pub fn tuple_element_name(index: usize) -> String {
    format!("{}{}{}", ELEMENT_FIELD, SEPARATOR, index)
}

fn suffixed(prefix: &str, suffix: &str) -> String {
    format!("{}{}{}", prefix, TYPE_SEPARATOR, suffix)
}

/// Root message name of a top-level primitive, e.g. `IntValue`.
pub fn primitive_root_name(kind: PrimitiveKind) -> String {
    let name = kind.type_name();
    let mut chars = name.chars();
    let capitalized: String = chars
        .next()
        .map(|first| first.to_ascii_uppercase().to_string() + chars.as_str())
        .unwrap_or_default();
    format!("{}Value", capitalized)
}

/// Root message name for a top-level type.
pub fn root_message_name(ty: &TypeDescriptor) -> Result<String> {
    match ty {
        TypeDescriptor::Primitive(kind) => Ok(primitive_root_name(*kind)),
        TypeDescriptor::Decimal => Ok(DECIMAL_VALUE.to_string()),
        TypeDescriptor::Array(array) => {
            let (_, dims) = array.flatten();
            Ok(format!("{}{}{}", ARRAY_BUILDER, SEPARATOR, dims))
        }
        TypeDescriptor::Union(_) => Ok(UNION_BUILDER.to_string()),
        TypeDescriptor::Record(record) if record.anonymous => Ok(RECORD_BUILDER.to_string()),
        TypeDescriptor::Record(record) => Ok(record.name.clone()),
        TypeDescriptor::Map(_) => Ok(MAP_BUILDER.to_string()),
        TypeDescriptor::Table(_) => Ok(TABLE_BUILDER.to_string()),
        TypeDescriptor::Tuple(_) => Ok(TUPLE_BUILDER.to_string()),
        TypeDescriptor::Null => Err(Error::unsupported(ty, "nil is not a top-level type")),
        TypeDescriptor::Reference(_) => Err(Error::unsupported(
            ty,
            "a record reference cannot be the top-level type",
        )),
    }
}

/// Nested message name of a record in field `field`.
pub fn record_message_name(record: &RecordDescriptor, field: &str) -> String {
    if record.anonymous {
        suffixed(field, RECORD_BUILDER)
    } else {
        record.name.clone()
    }
}

/// `<field>__UnionBuilder`
pub fn union_message_name(field: &str) -> String {
    suffixed(field, UNION_BUILDER)
}

/// `<field>__MapBuilder`
pub fn map_message_name(field: &str) -> String {
    suffixed(field, MAP_BUILDER)
}

/// `<field>__TableBuilder`
pub fn table_message_name(field: &str) -> String {
    suffixed(field, TABLE_BUILDER)
}

/// Nested message name of a tuple.
///
/// Named tuples inside a union are named after the tuple; everywhere else
/// the enclosing field name is used.
pub fn tuple_message_name(tuple: &TupleDescriptor, field: &str, parent: ParentKind) -> String {
    match (&tuple.name, parent) {
        (Some(name), ParentKind::UnionMember) if !name.is_empty() => {
            suffixed(name, TUPLE_BUILDER)
        }
        _ => suffixed(field, TUPLE_BUILDER),
    }
}

/// Wrapper message for one inner array of `dimensions` levels.
///
/// Prefixed by the base element's type key when it has one, otherwise by
/// the enclosing field name.
pub fn array_wrapper_name(base: &TypeDescriptor, dimensions: u32, field: &str) -> String {
    let prefix = type_key(base).unwrap_or_else(|| field.to_string());
    format!(
        "{}{}{}{}{}",
        prefix, TYPE_SEPARATOR, ARRAY_BUILDER, SEPARATOR, dimensions
    )
}

/// Type key of a nameable type: primitives, decimal, named records and tuples.
pub fn type_key(ty: &TypeDescriptor) -> Option<String> {
    match ty {
        TypeDescriptor::Primitive(kind) => Some(kind.type_name().to_string()),
        TypeDescriptor::Decimal => Some("decimal".to_string()),
        TypeDescriptor::Record(record) if !record.anonymous => Some(record.name.clone()),
        TypeDescriptor::Reference(name) => Some(name.clone()),
        TypeDescriptor::Tuple(TupleDescriptor {
            name: Some(name), ..
        }) if !name.is_empty() => Some(name.clone()),
        _ => None,
    }
}

/// Wire field name of a union member.
pub fn union_member_key(ty: &TypeDescriptor) -> Result<String> {
    match ty {
        TypeDescriptor::Null => Ok(NULL_FIELD.to_string()),
        TypeDescriptor::Record(record) if record.anonymous => Err(Error::unsupported(
            ty,
            "anonymous records cannot be union members",
        )),
        TypeDescriptor::Tuple(_) if type_key(ty).is_none() => Err(Error::unsupported(
            ty,
            "tuples without a name cannot be union members",
        )),
        TypeDescriptor::Map(_) => Err(Error::unsupported(ty, "maps cannot be union members")),
        TypeDescriptor::Table(_) => {
            Err(Error::unsupported(ty, "tables cannot be union members"))
        }
        TypeDescriptor::Union(_) => Err(Error::unsupported(
            ty,
            "nested unions must be flattened before keying",
        )),
        TypeDescriptor::Array(array) => {
            let (base, dims) = array.flatten();
            let base_key = array_member_base_key(ty, base)?;
            Ok(format!(
                "{}{}{}{}",
                base_key,
                TYPE_SEPARATOR,
                array_field_name(dims),
                suffix_union()
            ))
        }
        other => {
            let key = type_key(other)
                .ok_or_else(|| Error::unsupported(other, "type has no union member key"))?;
            Ok(format!("{}{}", key, suffix_union()))
        }
    }
}

fn suffix_union() -> String {
    format!("{}{}", TYPE_SEPARATOR, UNION_FIELD)
}

fn array_member_base_key(array: &TypeDescriptor, base: &TypeDescriptor) -> Result<String> {
    match base {
        TypeDescriptor::Union(_) => Ok("union".to_string()),
        TypeDescriptor::Map(_) => Err(Error::unsupported(
            array,
            "arrays of maps cannot be union members",
        )),
        TypeDescriptor::Table(_) => Err(Error::unsupported(
            array,
            "arrays of tables cannot be union members",
        )),
        TypeDescriptor::Null => Err(Error::unsupported(array, "arrays of nil are not supported")),
        other => type_key(other).ok_or_else(|| {
            Error::unsupported(
                array,
                "arrays of anonymous records or tuples cannot be union members",
            )
        }),
    }
}

/// Canonical member list of a union: flattened, keyed, sorted by key.
///
/// Identical members collapse; two different types sharing a key are rejected.
pub fn union_members(union: &UnionDescriptor) -> Result<Vec<UnionMember<'_>>> {
    let mut members: Vec<UnionMember<'_>> = Vec::new();
    for ty in union.flattened_members() {
        let key = union_member_key(ty)?;
        members.push(UnionMember { key, ty });
    }
    members.sort_by(|a, b| a.key.cmp(&b.key));

    let mut canonical: Vec<UnionMember<'_>> = Vec::with_capacity(members.len());
    for member in members {
        match canonical.last() {
            Some(prev) if prev.key == member.key => {
                if prev.ty != member.ty {
                    return Err(Error::unsupported(
                        member.ty,
                        format!("union member key `{}` is ambiguous", member.key),
                    ));
                }
            }
            _ => canonical.push(member),
        }
    }

    if canonical.is_empty() {
        return Err(Error::UnsupportedType {
            type_name: "()".to_string(),
            reason: "empty union".to_string(),
        });
    }
    Ok(canonical)
}
