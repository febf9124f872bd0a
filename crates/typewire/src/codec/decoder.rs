// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structural decoder: wire bytes back to a [`Value`] of the declared type.

use crate::codec::{descend, FieldSlot};
use crate::config::CodecConfig;
use crate::error::{Error, Result};
use crate::naming::{self, ParentKind};
use crate::schema::Schema;
use crate::types::{
    ArrayDescriptor, PrimitiveKind, RecordDescriptor, TupleDescriptor, TypeDescriptor,
    UnionDescriptor,
};
use crate::value::{Decimal, Value};
use crate::wire::{DynamicMessage, WireValue};
use std::collections::BTreeMap;

/// Decodes wire bytes against a compiled schema.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'s> {
    schema: &'s Schema,
    config: &'s CodecConfig,
}

impl<'s> Decoder<'s> {
    /// Create a decoder for `schema`, which must be compiled from the
    /// descriptor later passed to [`Decoder::decode`].
    pub fn new(schema: &'s Schema, config: &'s CodecConfig) -> Self {
        Self { schema, config }
    }

    /// Decode wire bytes into a value of type `ty`.
    pub fn decode(&self, ty: &TypeDescriptor, bytes: &[u8]) -> Result<Value> {
        // The root message adds one nesting level over the type depth.
        let wire_depth = self.config.max_depth.saturating_add(1);
        let message = DynamicMessage::decode(self.schema, self.schema.root(), bytes, wire_depth)?;
        log::debug!(
            "[typewire::decoder] decoded `{}` from {} bytes",
            self.schema.root_descriptor().name(),
            bytes.len()
        );
        self.decode_message(ty, &message)
    }

    /// Rebuild a value from an already parsed root message.
    pub fn decode_message(&self, ty: &TypeDescriptor, message: &DynamicMessage<'s>) -> Result<Value> {
        match ty {
            TypeDescriptor::Primitive(_) => {
                let slot = FieldSlot::new(naming::ATOMIC_FIELD, ParentKind::TopLevel);
                self.field_value(message, slot, ty, 0)
            }
            TypeDescriptor::Array(array) => {
                let field = naming::array_field_name(array.flatten().1);
                let slot = FieldSlot::new(&field, ParentKind::TopLevel);
                self.field_value(message, slot, ty, 0)
            }
            TypeDescriptor::Null | TypeDescriptor::Reference(_) => {
                Err(Error::unsupported(ty, "not a valid top-level type"))
            }
            _ => self.composite_value(message, ty, 0),
        }
    }

    fn descend(&self, depth: usize) -> Result<usize> {
        descend(depth, self.config.max_depth)
    }

    /// Value of a singular field; absent scalars read as their default.
    fn field_value(
        &self,
        msg: &DynamicMessage<'s>,
        slot: FieldSlot<'_>,
        ty: &TypeDescriptor,
        depth: usize,
    ) -> Result<Value> {
        let depth = self.descend(depth)?;
        match ty {
            TypeDescriptor::Primitive(kind) => match msg.get(slot.name) {
                Some(wire) => primitive_from_wire(*kind, wire, slot.name),
                None => Ok(default_primitive(*kind)),
            },
            TypeDescriptor::Null => Ok(Value::Null),
            TypeDescriptor::Array(array) => self.array_value(msg, slot.name, array, depth),
            _ => {
                let child = required_message(msg, slot.name)?;
                self.composite_value(child, ty, depth)
            }
        }
    }

    /// Value of one element of a repeated field.
    fn element_value(
        &self,
        wire: &WireValue<'s>,
        field: &str,
        ty: &TypeDescriptor,
        depth: usize,
    ) -> Result<Value> {
        let depth = self.descend(depth)?;
        match ty {
            TypeDescriptor::Primitive(kind) => primitive_from_wire(*kind, wire, field),
            TypeDescriptor::Null => Err(Error::Deserialization(format!(
                "repeated field `{}` cannot hold nil",
                field
            ))),
            TypeDescriptor::Array(array) => {
                let wrapper = wire_message(wire, field)?;
                let inner = naming::array_field_name(array.flatten().1);
                self.array_value(wrapper, &inner, array, depth)
            }
            _ => self.composite_value(wire_message(wire, field)?, ty, depth),
        }
    }

    /// Read the body of a message-backed type out of `msg`.
    fn composite_value(
        &self,
        msg: &DynamicMessage<'s>,
        ty: &TypeDescriptor,
        depth: usize,
    ) -> Result<Value> {
        match ty {
            TypeDescriptor::Decimal => decimal_value(msg).map(Value::Decimal),
            TypeDescriptor::Record(record) => self.record_value(msg, record, depth),
            TypeDescriptor::Reference(name) => {
                let record = self.schema.records().resolve(name)?;
                self.record_value(msg, record, depth)
            }
            TypeDescriptor::Union(union) => self.union_value(msg, union, depth),
            TypeDescriptor::Map(value_ty) => self.map_value(msg, value_ty, depth),
            TypeDescriptor::Table(row_ty) => self.table_value(msg, row_ty, depth),
            TypeDescriptor::Tuple(tuple) => self.tuple_value(msg, tuple, depth),
            TypeDescriptor::Primitive(_) | TypeDescriptor::Null | TypeDescriptor::Array(_) => {
                Err(Error::unsupported(ty, "not decoded from a nested message"))
            }
        }
    }

    fn array_value(
        &self,
        msg: &DynamicMessage<'s>,
        field: &str,
        array: &ArrayDescriptor,
        depth: usize,
    ) -> Result<Value> {
        if array.is_byte_string() {
            return match msg.get(field) {
                Some(WireValue::Bytes(bytes)) => Ok(Value::bytes(bytes)),
                None => Ok(Value::Array(Vec::new())),
                Some(other) => Err(Error::Deserialization(format!(
                    "field `{}` holds {}, expected bytes",
                    field,
                    other.kind_name()
                ))),
            };
        }

        let element = array.element_type();
        msg.get_repeated(field)
            .iter()
            .map(|wire| self.element_value(wire, field, &element, depth))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }

    fn record_value(
        &self,
        msg: &DynamicMessage<'s>,
        record: &RecordDescriptor,
        depth: usize,
    ) -> Result<Value> {
        let mut fields = BTreeMap::new();
        for (name, field_ty) in &record.fields {
            let slot = FieldSlot::new(name, ParentKind::RecordField);
            fields.insert(name.clone(), self.field_value(msg, slot, field_ty, depth)?);
        }
        Ok(Value::Record(fields))
    }

    /// Exactly one member field may be set; its name selects the member.
    fn union_value(
        &self,
        msg: &DynamicMessage<'s>,
        union: &UnionDescriptor,
        depth: usize,
    ) -> Result<Value> {
        let members = naming::union_members(union)?;
        let mut selected = None;
        for field in msg.set_fields() {
            let member = members
                .iter()
                .find(|m| m.key == field.name())
                .ok_or_else(|| {
                    Error::Deserialization(format!(
                        "`{}` is not a member of union `{}`",
                        field.name(),
                        msg.descriptor().full_name()
                    ))
                })?;
            if selected.replace(member).is_some() {
                return Err(Error::Deserialization(format!(
                    "union `{}` has more than one member set",
                    msg.descriptor().full_name()
                )));
            }
        }

        match selected {
            Some(member) => {
                log::trace!("[typewire::decoder] union member `{}`", member.key);
                let slot = FieldSlot::new(&member.key, ParentKind::UnionMember);
                self.field_value(msg, slot, member.ty, depth)
            }
            // An empty array member leaves nothing on the wire.
            None if members
                .iter()
                .any(|m| matches!(m.ty, TypeDescriptor::Array(_))) =>
            {
                Ok(Value::Array(Vec::new()))
            }
            None => Err(Error::Deserialization(format!(
                "union `{}` has no member set",
                msg.descriptor().full_name()
            ))),
        }
    }

    fn map_value(
        &self,
        msg: &DynamicMessage<'s>,
        value_ty: &TypeDescriptor,
        depth: usize,
    ) -> Result<Value> {
        let mut entries = BTreeMap::new();
        for wire in msg.get_repeated(naming::MAP_FIELD) {
            let entry = wire_message(wire, naming::MAP_FIELD)?;
            let key = match entry.get(naming::KEY_FIELD) {
                Some(WireValue::String(key)) => key.clone(),
                None => String::new(),
                Some(other) => {
                    return Err(Error::Deserialization(format!(
                        "map key holds {}, expected string",
                        other.kind_name()
                    )));
                }
            };
            let slot = FieldSlot::new(naming::VALUE_FIELD, ParentKind::MapValue);
            let value = self.field_value(entry, slot, value_ty, depth)?;
            entries.insert(key, value);
        }
        Ok(Value::Map(entries))
    }

    fn table_value(
        &self,
        msg: &DynamicMessage<'s>,
        row_ty: &TypeDescriptor,
        depth: usize,
    ) -> Result<Value> {
        msg.get_repeated(naming::TABLE_ENTRY)
            .iter()
            .map(|wire| self.element_value(wire, naming::TABLE_ENTRY, row_ty, depth))
            .collect::<Result<Vec<_>>>()
            .map(Value::Table)
    }

    fn tuple_value(
        &self,
        msg: &DynamicMessage<'s>,
        tuple: &TupleDescriptor,
        depth: usize,
    ) -> Result<Value> {
        let mut items = Vec::with_capacity(tuple.elements.len());
        for (index, element_ty) in tuple.elements.iter().enumerate() {
            let name = naming::tuple_element_name(index + 1);
            let slot = FieldSlot::new(&name, ParentKind::TupleElement);
            items.push(self.field_value(msg, slot, element_ty, depth)?);
        }
        Ok(Value::Tuple(items))
    }
}

fn required_message<'m, 's>(
    msg: &'m DynamicMessage<'s>,
    field: &str,
) -> Result<&'m DynamicMessage<'s>> {
    match msg.get(field) {
        Some(WireValue::Message(child)) => Ok(child),
        _ => Err(Error::Deserialization(format!(
            "missing message field `{}` in `{}`",
            field,
            msg.descriptor().full_name()
        ))),
    }
}

fn wire_message<'m, 's>(wire: &'m WireValue<'s>, field: &str) -> Result<&'m DynamicMessage<'s>> {
    wire.as_message().ok_or_else(|| {
        Error::Deserialization(format!(
            "field `{}` holds {}, expected a message",
            field,
            wire.kind_name()
        ))
    })
}

fn decimal_value(msg: &DynamicMessage<'_>) -> Result<Decimal> {
    let uint = |field: &str| match msg.get(field) {
        Some(WireValue::Uint32(v)) => Ok(*v),
        None => Ok(0),
        Some(other) => Err(Error::Deserialization(format!(
            "decimal `{}` holds {}",
            field,
            other.kind_name()
        ))),
    };
    let scale = uint(naming::SCALE_FIELD)?;
    let precision = uint(naming::PRECISION_FIELD)?;
    match msg.get(naming::UNSCALED_VALUE_FIELD) {
        Some(WireValue::Bytes(bytes)) => Ok(Decimal::from_unscaled_bytes(bytes, scale, precision)?),
        _ => Err(Error::Deserialization(
            "decimal is missing its unscaled value".to_string(),
        )),
    }
}

fn default_primitive(kind: PrimitiveKind) -> Value {
    match kind {
        PrimitiveKind::Int => Value::Int(0),
        PrimitiveKind::Float => Value::Float(0.0),
        PrimitiveKind::Boolean => Value::Bool(false),
        PrimitiveKind::String => Value::String(String::new()),
        PrimitiveKind::Byte => Value::Byte(0),
    }
}

fn primitive_from_wire(kind: PrimitiveKind, wire: &WireValue<'_>, field: &str) -> Result<Value> {
    match (kind, wire) {
        (PrimitiveKind::Int, WireValue::Int64(v)) => Ok(Value::Int(*v)),
        (PrimitiveKind::Float, WireValue::Double(v)) => Ok(Value::Float(*v)),
        (PrimitiveKind::Boolean, WireValue::Bool(v)) => Ok(Value::Bool(*v)),
        (PrimitiveKind::String, WireValue::String(v)) => Ok(Value::String(v.clone())),
        (PrimitiveKind::Byte, WireValue::Bytes(v)) if v.len() == 1 => Ok(Value::Byte(v[0])),
        (PrimitiveKind::Byte, WireValue::Bytes(v)) => Err(Error::Deserialization(format!(
            "byte field `{}` holds {} bytes, expected exactly 1",
            field,
            v.len()
        ))),
        _ => Err(Error::Deserialization(format!(
            "field `{}` holds {}, expected {}",
            field,
            wire.kind_name(),
            kind.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Encoder;
    use crate::schema::SchemaCompiler;
    use crate::types::RecordBuilder;

    fn roundtrip(ty: &TypeDescriptor, value: &Value) -> Value {
        let config = CodecConfig::default();
        let schema = SchemaCompiler::new(&config).compile(ty).expect("compile");
        let bytes = Encoder::new(&schema, &config)
            .encode(ty, value)
            .expect("encode");
        Decoder::new(&schema, &config)
            .decode(ty, &bytes)
            .expect("decode")
    }

    #[test]
    fn test_absent_scalars_decode_as_defaults() {
        let ty = RecordBuilder::new("R")
            .field("flag", TypeDescriptor::boolean())
            .field("count", TypeDescriptor::int())
            .field("tag", TypeDescriptor::byte())
            .build();
        let config = CodecConfig::default();
        let schema = SchemaCompiler::new(&config).compile(&ty).expect("compile");
        let value = Decoder::new(&schema, &config)
            .decode(&ty, &[])
            .expect("decode");
        assert_eq!(
            value,
            Value::record([
                ("count", Value::Int(0)),
                ("flag", Value::Bool(false)),
                ("tag", Value::Byte(0)),
            ])
        );
    }

    #[test]
    fn test_byte_field_must_hold_one_byte() {
        let ty = TypeDescriptor::byte();
        let config = CodecConfig::default();
        let schema = SchemaCompiler::new(&config).compile(&ty).expect("compile");
        let decoder = Decoder::new(&schema, &config);

        // atomicField = 1, bytes, length 2
        let err = decoder.decode(&ty, &[0x0a, 0x02, 0x01, 0x02]).unwrap_err();
        assert!(matches!(err, Error::Deserialization(_)));
        assert_eq!(
            decoder.decode(&ty, &[0x0a, 0x01, 0x7f]).expect("decode"),
            Value::Byte(0x7f)
        );
    }

    #[test]
    fn test_union_requires_exactly_one_member() {
        let ty = TypeDescriptor::union(vec![TypeDescriptor::int(), TypeDescriptor::string()]);
        let config = CodecConfig::default();
        let schema = SchemaCompiler::new(&config).compile(&ty).expect("compile");
        let decoder = Decoder::new(&schema, &config);

        // int__unionField = 1 and string__unionField = 2 both present
        let both = [0x08, 0x05, 0x12, 0x01, b'x'];
        assert!(matches!(
            decoder.decode(&ty, &both),
            Err(Error::Deserialization(_))
        ));
        assert!(matches!(
            decoder.decode(&ty, &[]),
            Err(Error::Deserialization(_))
        ));
    }

    #[test]
    fn test_empty_array_union_member() {
        let ty = TypeDescriptor::union(vec![
            TypeDescriptor::array(TypeDescriptor::int()),
            TypeDescriptor::string(),
        ]);
        let empty = Value::Array(Vec::new());
        assert_eq!(roundtrip(&ty, &empty), empty);

        let bytes_ty = TypeDescriptor::union(vec![
            TypeDescriptor::array(TypeDescriptor::byte()),
            TypeDescriptor::int(),
        ]);
        assert_eq!(roundtrip(&bytes_ty, &empty), empty);
        assert_eq!(roundtrip(&bytes_ty, &Value::bytes(b"ok")), Value::bytes(b"ok"));
    }

    #[test]
    fn test_missing_nested_message_rejected() {
        let inner = RecordBuilder::new("Inner")
            .field("v", TypeDescriptor::int())
            .build();
        let ty = RecordBuilder::new("Outer").field("inner", inner).build();
        let config = CodecConfig::default();
        let schema = SchemaCompiler::new(&config).compile(&ty).expect("compile");
        assert!(matches!(
            Decoder::new(&schema, &config).decode(&ty, &[]),
            Err(Error::Deserialization(_))
        ));
    }

    #[test]
    fn test_decimal_precision_checked() {
        let ty = TypeDescriptor::Decimal;
        let config = CodecConfig::default();
        let schema = SchemaCompiler::new(&config).compile(&ty).expect("compile");
        // scale = 2, precision = 1, unscaled_value = 12345 (0x30 0x39)
        let bytes = [0x08, 0x02, 0x10, 0x01, 0x1a, 0x02, 0x30, 0x39];
        assert!(matches!(
            Decoder::new(&schema, &config).decode(&ty, &bytes),
            Err(Error::Deserialization(_))
        ));
    }
}
