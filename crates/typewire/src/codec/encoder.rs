// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structural encoder: `(TypeDescriptor, Value)` to a populated message.

use crate::codec::{descend, FieldSlot};
use crate::config::CodecConfig;
use crate::error::{Error, Result};
use crate::naming::{self, ParentKind};
use crate::schema::Schema;
use crate::types::{
    ArrayDescriptor, PrimitiveKind, RecordDescriptor, RecordRegistry, TupleDescriptor,
    TypeDescriptor, UnionDescriptor,
};
use crate::value::{Decimal, Value};
use crate::wire::{DynamicMessage, WireError, WireValue};
use std::collections::BTreeMap;

/// Encodes values against a compiled schema.
#[derive(Debug, Clone, Copy)]
pub struct Encoder<'s> {
    schema: &'s Schema,
    config: &'s CodecConfig,
}

/// A compiled schema that rejects what the encoder writes means the
/// descriptor and schema disagree.
fn schema_mismatch(e: WireError) -> Error {
    Error::SchemaGeneration(format!("value does not fit the compiled schema: {}", e))
}

fn child_path(path: &str, field: &str) -> String {
    format!("{}.{}", path, field)
}

fn index_path(path: &str, index: usize) -> String {
    format!("{}[{}]", path, index)
}

impl<'s> Encoder<'s> {
    /// Create an encoder for `schema`, which must be compiled from the
    /// descriptor later passed to [`Encoder::encode`].
    pub fn new(schema: &'s Schema, config: &'s CodecConfig) -> Self {
        Self { schema, config }
    }

    /// Encode `value` to wire bytes.
    pub fn encode(&self, ty: &TypeDescriptor, value: &Value) -> Result<Vec<u8>> {
        let message = self.encode_message(ty, value)?;
        let bytes = message.encode_to_vec();
        log::debug!(
            "[typewire::encoder] encoded `{}` into {} bytes",
            self.schema.root_descriptor().name(),
            bytes.len()
        );
        Ok(bytes)
    }

    /// Encode `value` into a populated root message.
    pub fn encode_message(&self, ty: &TypeDescriptor, value: &Value) -> Result<DynamicMessage<'s>> {
        let mut root = DynamicMessage::root(self.schema);
        match ty {
            TypeDescriptor::Primitive(_) => {
                let slot = FieldSlot::new(naming::ATOMIC_FIELD, ParentKind::TopLevel);
                self.encode_field(&mut root, slot, ty, value, "$", 0)?;
            }
            TypeDescriptor::Array(array) => {
                let field = naming::array_field_name(array.flatten().1);
                let slot = FieldSlot::new(&field, ParentKind::TopLevel);
                self.encode_field(&mut root, slot, ty, value, "$", 0)?;
            }
            TypeDescriptor::Null | TypeDescriptor::Reference(_) => {
                return Err(Error::unsupported(ty, "not a valid top-level type"));
            }
            _ => self.encode_composite(&mut root, ty, value, "$", 0)?,
        }
        Ok(root)
    }

    fn descend(&self, depth: usize) -> Result<usize> {
        descend(depth, self.config.max_depth)
    }

    fn new_child(&self, msg: &DynamicMessage<'s>, field: &str) -> Result<DynamicMessage<'s>> {
        msg.new_child(field).map_err(schema_mismatch)
    }

    fn put(
        &self,
        msg: &mut DynamicMessage<'s>,
        slot: FieldSlot<'_>,
        value: WireValue<'s>,
    ) -> Result<()> {
        let result = if slot.repeated {
            msg.push(slot.name, value)
        } else {
            msg.set(slot.name, value)
        };
        result.map_err(schema_mismatch)
    }

    /// Write a scalar; default values outside unions are left off the wire.
    fn put_scalar(
        &self,
        msg: &mut DynamicMessage<'s>,
        slot: FieldSlot<'_>,
        value: WireValue<'s>,
    ) -> Result<()> {
        let implicit = !slot.repeated && slot.parent != ParentKind::UnionMember;
        if implicit && self.config.omit_default_scalars && value.is_default() {
            log::trace!("[typewire::encoder] omitting default `{}`", slot.name);
            return Ok(());
        }
        self.put(msg, slot, value)
    }

    fn encode_field(
        &self,
        msg: &mut DynamicMessage<'s>,
        slot: FieldSlot<'_>,
        ty: &TypeDescriptor,
        value: &Value,
        path: &str,
        depth: usize,
    ) -> Result<()> {
        let depth = self.descend(depth)?;
        match ty {
            TypeDescriptor::Primitive(kind) => {
                let wire = primitive_to_wire(*kind, value, path)?;
                self.put_scalar(msg, slot, wire)
            }
            TypeDescriptor::Null => {
                if !value.is_null() {
                    return Err(Error::mismatch(path, "()", value.kind_name()));
                }
                self.put(msg, slot, WireValue::Bool(true))
            }
            TypeDescriptor::Array(array) if slot.repeated => {
                let mut wrapper = self.new_child(msg, slot.name)?;
                let inner = naming::array_field_name(array.flatten().1);
                let inner_slot = FieldSlot::new(&inner, ParentKind::ArrayElement);
                self.encode_array_elements(&mut wrapper, inner_slot, array, value, path, depth)?;
                self.put(msg, slot, WireValue::Message(wrapper))
            }
            TypeDescriptor::Array(array) => {
                self.encode_array_elements(msg, slot, array, value, path, depth)
            }
            _ => {
                let mut child = self.new_child(msg, slot.name)?;
                self.encode_composite(&mut child, ty, value, path, depth)?;
                self.put(msg, slot, WireValue::Message(child))
            }
        }
    }

    /// Fill `msg` with the body of a message-backed type.
    fn encode_composite(
        &self,
        msg: &mut DynamicMessage<'s>,
        ty: &TypeDescriptor,
        value: &Value,
        path: &str,
        depth: usize,
    ) -> Result<()> {
        match ty {
            TypeDescriptor::Decimal => {
                let decimal = value
                    .as_decimal()
                    .ok_or_else(|| Error::mismatch(path, "decimal", value.kind_name()))?;
                self.encode_decimal(msg, decimal)
            }
            TypeDescriptor::Record(record) => self.encode_record(msg, record, value, path, depth),
            TypeDescriptor::Reference(name) => {
                let record = self.schema.records().resolve(name)?;
                self.encode_record(msg, record, value, path, depth)
            }
            TypeDescriptor::Union(union) => self.encode_union(msg, union, value, path, depth),
            TypeDescriptor::Map(value_ty) => self.encode_map(msg, value_ty, value, path, depth),
            TypeDescriptor::Table(row) => self.encode_table(msg, row, value, path, depth),
            TypeDescriptor::Tuple(tuple) => self.encode_tuple(msg, tuple, value, path, depth),
            TypeDescriptor::Primitive(_) | TypeDescriptor::Null | TypeDescriptor::Array(_) => {
                Err(Error::unsupported(ty, "not encoded as a nested message"))
            }
        }
    }

    fn encode_decimal(&self, msg: &mut DynamicMessage<'s>, decimal: &Decimal) -> Result<()> {
        msg.set(naming::SCALE_FIELD, WireValue::Uint32(decimal.scale()))
            .and_then(|()| {
                msg.set(
                    naming::PRECISION_FIELD,
                    WireValue::Uint32(decimal.precision()),
                )
            })
            .and_then(|()| {
                msg.set(
                    naming::UNSCALED_VALUE_FIELD,
                    WireValue::Bytes(decimal.unscaled_bytes()),
                )
            })
            .map_err(schema_mismatch)
    }

    fn encode_array_elements(
        &self,
        msg: &mut DynamicMessage<'s>,
        slot: FieldSlot<'_>,
        array: &ArrayDescriptor,
        value: &Value,
        path: &str,
        depth: usize,
    ) -> Result<()> {
        let Value::Array(items) = value else {
            return Err(Error::mismatch(
                path,
                TypeDescriptor::Array(array.clone()).to_string(),
                value.kind_name(),
            ));
        };
        if array.is_byte_string() {
            let bytes = value
                .as_bytes()
                .ok_or_else(|| Error::mismatch(path, "byte[]", "array with non-byte elements"))?;
            return self.put_scalar(msg, slot, WireValue::Bytes(bytes));
        }

        let element = array.element_type();
        let element_slot = slot.as_repeated();
        for (index, item) in items.iter().enumerate() {
            self.encode_field(
                msg,
                element_slot,
                &element,
                item,
                &index_path(path, index),
                depth,
            )?;
        }
        Ok(())
    }

    fn encode_record(
        &self,
        msg: &mut DynamicMessage<'s>,
        record: &RecordDescriptor,
        value: &Value,
        path: &str,
        depth: usize,
    ) -> Result<()> {
        let Value::Record(fields) = value else {
            return Err(Error::mismatch(
                path,
                format!("record {}", record.name),
                value.kind_name(),
            ));
        };
        if let Some(extra) = fields.keys().find(|k| !record.fields.contains_key(*k)) {
            return Err(Error::mismatch(
                &child_path(path, extra),
                "no such field",
                fields[extra].kind_name(),
            ));
        }

        for (name, field_ty) in &record.fields {
            let field_path = child_path(path, name);
            let field_value = fields
                .get(name)
                .ok_or_else(|| Error::mismatch(&field_path, field_ty.to_string(), "missing field"))?;
            let slot = FieldSlot::new(name, ParentKind::RecordField);
            self.encode_field(msg, slot, field_ty, field_value, &field_path, depth)?;
        }
        Ok(())
    }

    fn encode_union(
        &self,
        msg: &mut DynamicMessage<'s>,
        union: &UnionDescriptor,
        value: &Value,
        path: &str,
        depth: usize,
    ) -> Result<()> {
        let members = naming::union_members(union)?;
        let mut selected = None;
        for member in &members {
            if self.conforms(value, member.ty, depth)? {
                selected = Some(member);
                break;
            }
        }
        let Some(member) = selected else {
            let keys: Vec<&str> = members.iter().map(|m| m.key.as_str()).collect();
            return Err(Error::mismatch(
                path,
                format!("one of [{}]", keys.join(", ")),
                value.kind_name(),
            ));
        };
        log::trace!("[typewire::encoder] {} selects `{}`", path, member.key);
        let slot = FieldSlot::new(&member.key, ParentKind::UnionMember);
        self.encode_field(msg, slot, member.ty, value, path, depth)
    }

    fn encode_map(
        &self,
        msg: &mut DynamicMessage<'s>,
        value_ty: &TypeDescriptor,
        value: &Value,
        path: &str,
        depth: usize,
    ) -> Result<()> {
        let Value::Map(entries) = value else {
            return Err(Error::mismatch(
                path,
                format!("map<{}>", value_ty),
                value.kind_name(),
            ));
        };
        let entries_slot = FieldSlot::new(naming::MAP_FIELD, ParentKind::TopLevel).as_repeated();
        for (key, item) in entries {
            let mut entry = self.new_child(msg, naming::MAP_FIELD)?;
            let key_slot = FieldSlot::new(naming::KEY_FIELD, ParentKind::MapValue);
            self.put_scalar(&mut entry, key_slot, WireValue::String(key.clone()))?;
            let value_slot = FieldSlot::new(naming::VALUE_FIELD, ParentKind::MapValue);
            let entry_path = format!("{}[{:?}]", path, key);
            self.encode_field(&mut entry, value_slot, value_ty, item, &entry_path, depth)?;
            self.put(msg, entries_slot, WireValue::Message(entry))?;
        }
        Ok(())
    }

    fn encode_table(
        &self,
        msg: &mut DynamicMessage<'s>,
        row_ty: &TypeDescriptor,
        value: &Value,
        path: &str,
        depth: usize,
    ) -> Result<()> {
        let Value::Table(rows) = value else {
            return Err(Error::mismatch(
                path,
                format!("table<{}>", row_ty),
                value.kind_name(),
            ));
        };
        let slot = FieldSlot::new(naming::TABLE_ENTRY, ParentKind::TableRow).as_repeated();
        for (index, row) in rows.iter().enumerate() {
            self.encode_field(msg, slot, row_ty, row, &index_path(path, index), depth)?;
        }
        Ok(())
    }

    fn encode_tuple(
        &self,
        msg: &mut DynamicMessage<'s>,
        tuple: &TupleDescriptor,
        value: &Value,
        path: &str,
        depth: usize,
    ) -> Result<()> {
        let expected = TypeDescriptor::Tuple(tuple.clone());
        let items = match value {
            Value::Tuple(items) if items.len() == tuple.elements.len() => items,
            Value::Tuple(items) => {
                return Err(Error::mismatch(
                    path,
                    expected.to_string(),
                    format!("tuple of {} elements", items.len()),
                ));
            }
            other => return Err(Error::mismatch(path, expected.to_string(), other.kind_name())),
        };
        for (index, (element_ty, item)) in tuple.elements.iter().zip(items).enumerate() {
            let name = naming::tuple_element_name(index + 1);
            let slot = FieldSlot::new(&name, ParentKind::TupleElement);
            self.encode_field(msg, slot, element_ty, item, &index_path(path, index), depth)?;
        }
        Ok(())
    }

    /// Whether `value` structurally belongs to `ty`.
    ///
    /// Used to pick the union member a value encodes as; the first
    /// conforming member in canonical order wins.
    fn conforms(&self, value: &Value, ty: &TypeDescriptor, depth: usize) -> Result<bool> {
        let depth = self.descend(depth)?;
        let matched = match (ty, value) {
            (TypeDescriptor::Primitive(kind), _) => primitive_matches(*kind, value),
            (TypeDescriptor::Decimal, Value::Decimal(_)) | (TypeDescriptor::Null, Value::Null) => {
                true
            }
            (TypeDescriptor::Array(array), Value::Array(items)) => {
                let element = array.element_type();
                self.all_conform(items.iter().map(|item| (item, &element)), depth)?
            }
            (TypeDescriptor::Union(union), _) => {
                for member in union.flattened_members() {
                    if self.conforms(value, member, depth)? {
                        return Ok(true);
                    }
                }
                false
            }
            (TypeDescriptor::Record(record), Value::Record(fields)) => {
                self.record_conforms(record, fields, depth)?
            }
            (TypeDescriptor::Reference(name), Value::Record(fields)) => {
                match self.schema.records().lookup(name) {
                    Some(record) => self.record_conforms(record, fields, depth)?,
                    None => false,
                }
            }
            (TypeDescriptor::Map(value_ty), Value::Map(entries)) => self.all_conform(
                entries.values().map(|item| (item, value_ty.as_ref())),
                depth,
            )?,
            (TypeDescriptor::Table(row_ty), Value::Table(rows)) => {
                self.all_conform(rows.iter().map(|row| (row, row_ty.as_ref())), depth)?
            }
            (TypeDescriptor::Tuple(tuple), Value::Tuple(items)) => {
                tuple.elements.len() == items.len()
                    && self.all_conform(items.iter().zip(&tuple.elements), depth)?
            }
            _ => false,
        };
        Ok(matched)
    }

    fn all_conform<'v>(
        &self,
        pairs: impl IntoIterator<Item = (&'v Value, &'v TypeDescriptor)>,
        depth: usize,
    ) -> Result<bool> {
        for (value, ty) in pairs {
            if !self.conforms(value, ty, depth)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn record_conforms(
        &self,
        record: &RecordDescriptor,
        fields: &BTreeMap<String, Value>,
        depth: usize,
    ) -> Result<bool> {
        if fields.len() != record.fields.len() {
            return Ok(false);
        }
        for (name, field_ty) in &record.fields {
            let Some(value) = fields.get(name) else {
                return Ok(false);
            };
            if !self.conforms(value, field_ty, depth)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn primitive_matches(kind: PrimitiveKind, value: &Value) -> bool {
    matches!(
        (kind, value),
        (PrimitiveKind::Int, Value::Int(_))
            | (PrimitiveKind::Float, Value::Float(_))
            | (PrimitiveKind::Boolean, Value::Bool(_))
            | (PrimitiveKind::String, Value::String(_))
            | (PrimitiveKind::Byte, Value::Byte(_))
    )
}

fn primitive_to_wire<'s>(kind: PrimitiveKind, value: &Value, path: &str) -> Result<WireValue<'s>> {
    let wire = match (kind, value) {
        (PrimitiveKind::Int, Value::Int(v)) => WireValue::Int64(*v),
        (PrimitiveKind::Float, Value::Float(v)) => WireValue::Double(*v),
        (PrimitiveKind::Boolean, Value::Bool(v)) => WireValue::Bool(*v),
        (PrimitiveKind::String, Value::String(v)) => WireValue::String(v.clone()),
        (PrimitiveKind::Byte, Value::Byte(v)) => WireValue::Bytes(vec![*v]),
        _ => return Err(Error::mismatch(path, kind.type_name(), value.kind_name())),
    };
    Ok(wire)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaCompiler;
    use crate::types::RecordBuilder;

    fn person() -> TypeDescriptor {
        RecordBuilder::new("Person")
            .field("age", TypeDescriptor::int())
            .field("name", TypeDescriptor::string())
            .optional("email", TypeDescriptor::string())
            .build()
    }

    #[test]
    fn test_default_scalars_omitted() {
        let ty = person();
        let config = CodecConfig::default();
        let schema = SchemaCompiler::new(&config).compile(&ty).expect("compile");
        let encoder = Encoder::new(&schema, &config);

        let value = Value::record([
            ("age", Value::Int(0)),
            ("name", Value::from("")),
            ("email", Value::Null),
        ]);
        let msg = encoder.encode_message(&ty, &value).expect("encode");
        assert!(!msg.is_set("age"));
        assert!(!msg.is_set("name"));
        let email = msg.get("email").and_then(WireValue::as_message).expect("union");
        assert_eq!(email.get("nullField"), Some(&WireValue::Bool(true)));
    }

    #[test]
    fn test_default_scalars_kept_when_configured() {
        let ty = person();
        let config = CodecConfig {
            omit_default_scalars: false,
            ..CodecConfig::default()
        };
        let schema = SchemaCompiler::new(&config).compile(&ty).expect("compile");
        let value = Value::record([
            ("age", Value::Int(0)),
            ("name", Value::from("")),
            ("email", Value::from("a@b.c")),
        ]);
        let msg = Encoder::new(&schema, &config)
            .encode_message(&ty, &value)
            .expect("encode");
        assert!(msg.is_set("age"));
        assert!(msg.is_set("name"));
    }

    #[test]
    fn test_mismatch_reports_path() {
        let ty = person();
        let config = CodecConfig::default();
        let schema = SchemaCompiler::new(&config).compile(&ty).expect("compile");
        let encoder = Encoder::new(&schema, &config);

        let wrong_type = Value::record([
            ("age", Value::from("old")),
            ("name", Value::from("x")),
            ("email", Value::Null),
        ]);
        match encoder.encode(&ty, &wrong_type) {
            Err(Error::TypeMismatch {
                path,
                expected,
                found,
            }) => {
                assert_eq!(path, "$.age");
                assert_eq!(expected, "int");
                assert_eq!(found, "string");
            }
            other => panic!("expected type mismatch, got {:?}", other),
        }

        let missing = Value::record([("age", Value::Int(1)), ("name", Value::from("x"))]);
        assert!(matches!(
            encoder.encode(&ty, &missing),
            Err(Error::TypeMismatch { path, .. }) if path == "$.email"
        ));

        let extra = Value::record([
            ("age", Value::Int(1)),
            ("name", Value::from("x")),
            ("email", Value::Null),
            ("phone", Value::from("555")),
        ]);
        assert!(matches!(
            encoder.encode(&ty, &extra),
            Err(Error::TypeMismatch { path, .. }) if path == "$.phone"
        ));

        let bad_union = Value::record([
            ("age", Value::Int(1)),
            ("name", Value::from("x")),
            ("email", Value::Int(3)),
        ]);
        assert!(matches!(
            encoder.encode(&ty, &bad_union),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_union_member_selection() {
        let ty = TypeDescriptor::union(vec![
            TypeDescriptor::int(),
            TypeDescriptor::array(TypeDescriptor::string()),
            TypeDescriptor::Null,
        ]);
        let config = CodecConfig::default();
        let schema = SchemaCompiler::new(&config).compile(&ty).expect("compile");
        let encoder = Encoder::new(&schema, &config);

        let msg = encoder.encode_message(&ty, &Value::Int(0)).expect("encode");
        assert_eq!(msg.get("int__unionField"), Some(&WireValue::Int64(0)));

        let msg = encoder
            .encode_message(&ty, &Value::from(vec!["a", "b"]))
            .expect("encode");
        assert_eq!(
            msg.get_repeated("string__arrayField_1__unionField").len(),
            2
        );
        assert_eq!(msg.set_fields().count(), 1);
    }
}
