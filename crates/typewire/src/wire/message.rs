// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema-bound dynamic message.

use crate::schema::{FieldDescriptor, FieldType, MessageDescriptor, MessageId, ScalarType, Schema};
use crate::wire::{codec, WireError};
use std::collections::BTreeMap;
use std::fmt;

/// A field value as it travels on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue<'s> {
    Int64(i64),
    Uint32(u32),
    Double(f64),
    Bool(bool),
    String(String),
    Bytes(Vec<u8>),
    Message(DynamicMessage<'s>),
}

impl<'s> WireValue<'s> {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Int64(_) => "int64",
            Self::Uint32(_) => "uint32",
            Self::Double(_) => "double",
            Self::Bool(_) => "bool",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Message(_) => "message",
        }
    }

    /// Whether this is a scalar holding its type's default value.
    pub fn is_default(&self) -> bool {
        match self {
            Self::Int64(v) => *v == 0,
            Self::Uint32(v) => *v == 0,
            Self::Double(v) => v.to_bits() == 0,
            Self::Bool(v) => !*v,
            Self::String(v) => v.is_empty(),
            Self::Bytes(v) => v.is_empty(),
            Self::Message(_) => false,
        }
    }

    fn fits(&self, ty: FieldType) -> bool {
        match (self, ty) {
            (Self::Int64(_), FieldType::Scalar(ScalarType::Int64))
            | (Self::Uint32(_), FieldType::Scalar(ScalarType::Uint32))
            | (Self::Double(_), FieldType::Scalar(ScalarType::Double))
            | (Self::Bool(_), FieldType::Scalar(ScalarType::Bool))
            | (Self::String(_), FieldType::Scalar(ScalarType::String))
            | (Self::Bytes(_), FieldType::Scalar(ScalarType::Bytes)) => true,
            (Self::Message(m), FieldType::Message(id)) => m.id == id,
            _ => false,
        }
    }

    pub fn as_message(&self) -> Option<&DynamicMessage<'s>> {
        match self {
            Self::Message(m) => Some(m),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FieldValue<'s> {
    Single(WireValue<'s>),
    Repeated(Vec<WireValue<'s>>),
}

/// Mutable message instance bound to one message of a [`Schema`].
#[derive(Clone)]
pub struct DynamicMessage<'s> {
    schema: &'s Schema,
    id: MessageId,
    fields: BTreeMap<u32, FieldValue<'s>>,
}

impl<'s> DynamicMessage<'s> {
    /// Create an empty instance of message `id`.
    pub fn new(schema: &'s Schema, id: MessageId) -> Self {
        Self {
            schema,
            id,
            fields: BTreeMap::new(),
        }
    }

    /// Create an empty instance of the schema's root message.
    pub fn root(schema: &'s Schema) -> Self {
        Self::new(schema, schema.root())
    }

    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn descriptor(&self) -> &'s MessageDescriptor {
        self.schema.message(self.id)
    }

    fn lookup(&self, field: &str) -> Result<&'s FieldDescriptor, WireError> {
        let descriptor = self.descriptor();
        descriptor
            .field(field)
            .ok_or_else(|| WireError::UnknownField {
                message: descriptor.full_name().to_string(),
                field: field.to_string(),
            })
    }

    fn check_type(field: &FieldDescriptor, value: &WireValue<'s>) -> Result<(), WireError> {
        if value.fits(field.ty()) {
            return Ok(());
        }
        Err(WireError::TypeMismatch {
            field: field.name().to_string(),
            expected: format!("{:?}", field.ty()),
            found: value.kind_name(),
        })
    }

    /// Empty instance of the message type of `field`.
    pub fn new_child(&self, field: &str) -> Result<DynamicMessage<'s>, WireError> {
        let descriptor = self.lookup(field)?;
        match descriptor.ty() {
            FieldType::Message(id) => Ok(Self::new(self.schema, id)),
            FieldType::Scalar(scalar) => Err(WireError::TypeMismatch {
                field: field.to_string(),
                expected: scalar.keyword().to_string(),
                found: "message",
            }),
        }
    }

    /// Set a singular field, replacing any previous value.
    pub fn set(&mut self, field: &str, value: WireValue<'s>) -> Result<(), WireError> {
        let descriptor = self.lookup(field)?;
        if descriptor.is_repeated() {
            return Err(WireError::Cardinality {
                field: field.to_string(),
                label: "repeated",
            });
        }
        Self::check_type(descriptor, &value)?;
        self.fields
            .insert(descriptor.number(), FieldValue::Single(value));
        Ok(())
    }

    /// Append to a repeated field.
    pub fn push(&mut self, field: &str, value: WireValue<'s>) -> Result<(), WireError> {
        let descriptor = self.lookup(field)?;
        if !descriptor.is_repeated() {
            return Err(WireError::Cardinality {
                field: field.to_string(),
                label: "not repeated",
            });
        }
        Self::check_type(descriptor, &value)?;
        self.insert(descriptor, value);
        Ok(())
    }

    /// Store a decoded value: append if repeated, else last one wins.
    pub(crate) fn insert(&mut self, descriptor: &FieldDescriptor, value: WireValue<'s>) {
        if descriptor.is_repeated() {
            match self.fields.get_mut(&descriptor.number()) {
                Some(FieldValue::Repeated(values)) => values.push(value),
                _ => {
                    self.fields
                        .insert(descriptor.number(), FieldValue::Repeated(vec![value]));
                }
            }
        } else {
            self.fields
                .insert(descriptor.number(), FieldValue::Single(value));
        }
    }

    /// Value of a singular field, `None` if unset or unknown.
    pub fn get(&self, field: &str) -> Option<&WireValue<'s>> {
        let number = self.descriptor().field(field)?.number();
        match self.fields.get(&number)? {
            FieldValue::Single(value) => Some(value),
            FieldValue::Repeated(_) => None,
        }
    }

    /// Values of a repeated field; empty if unset or unknown.
    pub fn get_repeated(&self, field: &str) -> &[WireValue<'s>] {
        let values = self
            .descriptor()
            .field(field)
            .and_then(|d| self.fields.get(&d.number()));
        match values {
            Some(FieldValue::Repeated(values)) => values,
            _ => &[],
        }
    }

    /// Whether `field` holds a value (a repeated field counts once non-empty).
    pub fn is_set(&self, field: &str) -> bool {
        self.descriptor()
            .field(field)
            .and_then(|d| self.fields.get(&d.number()))
            .is_some_and(|v| match v {
                FieldValue::Single(_) => true,
                FieldValue::Repeated(values) => !values.is_empty(),
            })
    }

    /// Descriptors of the fields holding a value, in field-number order.
    pub fn set_fields(&self) -> impl Iterator<Item = &'s FieldDescriptor> + '_ {
        let descriptor = self.descriptor();
        self.fields
            .iter()
            .filter(|(_, value)| !matches!(value, FieldValue::Repeated(v) if v.is_empty()))
            .filter_map(move |(number, _)| descriptor.field_by_number(*number))
    }

    pub(crate) fn raw_fields(&self) -> &BTreeMap<u32, FieldValue<'s>> {
        &self.fields
    }

    /// Serialize to wire bytes, fields in ascending number order.
    pub fn encode_to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        codec::encode_message(self, &mut buf);
        buf
    }

    /// Parse wire bytes as message `id`, nesting at most `max_depth` levels.
    pub fn decode(
        schema: &'s Schema,
        id: MessageId,
        bytes: &[u8],
        max_depth: usize,
    ) -> Result<Self, WireError> {
        codec::decode_message(schema, id, bytes, max_depth, max_depth)
    }
}

impl PartialEq for DynamicMessage<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.schema, other.schema) && self.id == other.id && self.fields == other.fields
    }
}

impl fmt::Debug for DynamicMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicMessage")
            .field("message", &self.descriptor().full_name())
            .field("fields", &self.fields)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldTypeName, Label, SchemaBuilder};
    use crate::types::HashMapRecordRegistry;

    fn sample_schema() -> Schema {
        let mut point = SchemaBuilder::new("Point");
        point.add_field(Label::Optional, FieldTypeName::Scalar(ScalarType::Double), "x", 1);
        point.add_field(Label::Optional, FieldTypeName::Scalar(ScalarType::Double), "y", 2);

        let mut shape = SchemaBuilder::new("Shape");
        shape.add_nested_message(point);
        shape.add_field(Label::Optional, FieldTypeName::Scalar(ScalarType::String), "name", 1);
        shape.add_field(Label::Repeated, FieldTypeName::Message("Point".into()), "points", 2);
        shape.add_field(Label::Repeated, FieldTypeName::Scalar(ScalarType::Int64), "tags", 3);
        shape.add_field(Label::Optional, FieldTypeName::Scalar(ScalarType::Bytes), "blob", 4);
        Schema::freeze(&shape, HashMapRecordRegistry::new(), None).expect("freeze")
    }

    #[test]
    fn test_set_and_get() {
        let schema = sample_schema();
        let mut shape = DynamicMessage::root(&schema);
        shape
            .set("name", WireValue::String("triangle".into()))
            .expect("set name");
        shape.push("tags", WireValue::Int64(7)).expect("push tag");
        shape.push("tags", WireValue::Int64(-3)).expect("push tag");

        assert_eq!(shape.get("name"), Some(&WireValue::String("triangle".into())));
        assert_eq!(shape.get_repeated("tags").len(), 2);
        assert!(shape.is_set("tags"));
        assert!(!shape.is_set("blob"));
        let set: Vec<_> = shape.set_fields().map(FieldDescriptor::name).collect();
        assert_eq!(set, vec!["name", "tags"]);
    }

    #[test]
    fn test_cardinality_and_type_checks() {
        let schema = sample_schema();
        let mut shape = DynamicMessage::root(&schema);
        assert!(matches!(
            shape.set("tags", WireValue::Int64(1)),
            Err(WireError::Cardinality { .. })
        ));
        assert!(matches!(
            shape.push("name", WireValue::String("x".into())),
            Err(WireError::Cardinality { .. })
        ));
        assert!(matches!(
            shape.set("name", WireValue::Int64(1)),
            Err(WireError::TypeMismatch { .. })
        ));
        assert!(matches!(
            shape.set("missing", WireValue::Int64(1)),
            Err(WireError::UnknownField { .. })
        ));
        assert!(shape.new_child("name").is_err());
    }

    #[test]
    fn test_round_trip_bytes() {
        let schema = sample_schema();
        let mut shape = DynamicMessage::root(&schema);
        shape.set("name", WireValue::String("square".into())).expect("set");
        shape.set("blob", WireValue::Bytes(vec![0, 1, 2])).expect("set");
        for (x, y) in [(0.0, 0.0), (1.5, -2.25)] {
            let mut point = shape.new_child("points").expect("child");
            point.set("x", WireValue::Double(x)).expect("set x");
            point.set("y", WireValue::Double(y)).expect("set y");
            shape.push("points", WireValue::Message(point)).expect("push");
        }
        shape.push("tags", WireValue::Int64(i64::MIN)).expect("push");
        shape.push("tags", WireValue::Int64(300)).expect("push");

        let bytes = shape.encode_to_vec();
        let decoded = DynamicMessage::decode(&schema, schema.root(), &bytes, 8).expect("decode");
        assert_eq!(decoded, shape);
    }
}
