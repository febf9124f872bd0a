// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! JSON <-> `Value` mapping guided by the type description.
//!
//! Decimals travel as strings, byte arrays as arrays of numbers, tuples and
//! tables as arrays. A union value is read as the first member, in wire
//! order, that accepts it. Record fields missing from the JSON object read
//! as `null`, so nullable fields may be omitted.

use anyhow::{anyhow, bail, Context, Result};
use serde_json::{Map as JsonMap, Number, Value as Json};
use std::collections::BTreeMap;
use typewire::naming;
use typewire::types::{
    HashMapRecordRegistry, PrimitiveKind, RecordDescriptor, RecordRegistry, TypeDescriptor,
};
use typewire::{Decimal, Value};

/// Converts JSON documents into values of one type.
pub struct JsonReader<'r> {
    records: &'r HashMapRecordRegistry,
}

impl<'r> JsonReader<'r> {
    /// `records` resolves the named record references inside the type.
    pub fn new(records: &'r HashMapRecordRegistry) -> Self {
        Self { records }
    }

    pub fn read(&self, ty: &TypeDescriptor, json: &Json) -> Result<Value> {
        self.read_at(ty, json, "$")
    }

    fn read_at(&self, ty: &TypeDescriptor, json: &Json, path: &str) -> Result<Value> {
        match ty {
            TypeDescriptor::Primitive(kind) => read_primitive(*kind, json, path),
            TypeDescriptor::Decimal => {
                let literal = match json {
                    Json::String(s) => s.clone(),
                    Json::Number(n) => n.to_string(),
                    other => bail!("{}: expected decimal string, found {}", path, other),
                };
                let decimal: Decimal = literal
                    .parse()
                    .with_context(|| format!("{}: invalid decimal `{}`", path, literal))?;
                Ok(Value::Decimal(decimal))
            }
            TypeDescriptor::Null => match json {
                Json::Null => Ok(Value::Null),
                other => bail!("{}: expected null, found {}", path, other),
            },
            TypeDescriptor::Array(array) => {
                let items = expect_array(json, path)?;
                let element = array.element_type();
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.read_at(&element, item, &format!("{}[{}]", path, i)))
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Array)
            }
            TypeDescriptor::Union(union) => {
                let members = naming::union_members(union)?;
                members
                    .iter()
                    .find_map(|member| self.read_at(member.ty, json, path).ok())
                    .ok_or_else(|| anyhow!("{}: {} matches no member of {}", path, json, ty))
            }
            TypeDescriptor::Record(record) => self.read_record(record, json, path),
            TypeDescriptor::Reference(name) => {
                let record = self
                    .records
                    .lookup(name)
                    .ok_or_else(|| anyhow!("{}: unknown record `{}`", path, name))?;
                self.read_record(record, json, path)
            }
            TypeDescriptor::Map(value_ty) => {
                let object = expect_object(json, path)?;
                let mut entries = BTreeMap::new();
                for (key, item) in object {
                    let value = self.read_at(value_ty, item, &format!("{}[{:?}]", path, key))?;
                    entries.insert(key.clone(), value);
                }
                Ok(Value::Map(entries))
            }
            TypeDescriptor::Table(row_ty) => expect_array(json, path)?
                .iter()
                .enumerate()
                .map(|(i, row)| self.read_at(row_ty, row, &format!("{}[{}]", path, i)))
                .collect::<Result<Vec<_>>>()
                .map(Value::Table),
            TypeDescriptor::Tuple(tuple) => {
                let items = expect_array(json, path)?;
                if items.len() != tuple.elements.len() {
                    bail!(
                        "{}: expected {} tuple elements, found {}",
                        path,
                        tuple.elements.len(),
                        items.len()
                    );
                }
                tuple
                    .elements
                    .iter()
                    .zip(items)
                    .enumerate()
                    .map(|(i, (element_ty, item))| {
                        self.read_at(element_ty, item, &format!("{}[{}]", path, i))
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Tuple)
            }
        }
    }

    fn read_record(&self, record: &RecordDescriptor, json: &Json, path: &str) -> Result<Value> {
        let object = expect_object(json, path)?;
        if let Some(extra) = object.keys().find(|k| record.field(k).is_none()) {
            bail!("{}: record {} has no field `{}`", path, record.name, extra);
        }
        let mut fields = BTreeMap::new();
        for (name, field_ty) in &record.fields {
            let item = object.get(name).unwrap_or(&Json::Null);
            let value = self.read_at(field_ty, item, &format!("{}.{}", path, name))?;
            fields.insert(name.clone(), value);
        }
        Ok(Value::Record(fields))
    }
}

fn read_primitive(kind: PrimitiveKind, json: &Json, path: &str) -> Result<Value> {
    let value = match (kind, json) {
        (PrimitiveKind::Int, Json::Number(n)) => n.as_i64().map(Value::Int),
        (PrimitiveKind::Float, Json::Number(n)) => n.as_f64().map(Value::Float),
        (PrimitiveKind::Boolean, Json::Bool(b)) => Some(Value::Bool(*b)),
        (PrimitiveKind::String, Json::String(s)) => Some(Value::String(s.clone())),
        (PrimitiveKind::Byte, Json::Number(n)) => n
            .as_u64()
            .and_then(|v| u8::try_from(v).ok())
            .map(Value::Byte),
        _ => None,
    };
    value.ok_or_else(|| anyhow!("{}: expected {}, found {}", path, kind.type_name(), json))
}

fn expect_array<'j>(json: &'j Json, path: &str) -> Result<&'j Vec<Json>> {
    json.as_array()
        .ok_or_else(|| anyhow!("{}: expected array, found {}", path, json))
}

fn expect_object<'j>(json: &'j Json, path: &str) -> Result<&'j JsonMap<String, Json>> {
    json.as_object()
        .ok_or_else(|| anyhow!("{}: expected object, found {}", path, json))
}

/// Render a decoded value as JSON.
pub fn to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Int(v) => Json::from(*v),
        Value::Float(v) => Number::from_f64(*v).map_or(Json::Null, Json::Number),
        Value::Bool(v) => Json::Bool(*v),
        Value::String(v) => Json::String(v.clone()),
        Value::Byte(v) => Json::from(*v),
        Value::Decimal(v) => Json::String(v.to_string()),
        Value::Array(items) | Value::Table(items) | Value::Tuple(items) => {
            Json::Array(items.iter().map(to_json).collect())
        }
        Value::Record(fields) | Value::Map(fields) => Json::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), to_json(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use typewire::types::RecordBuilder;

    fn reader_for(ty: &TypeDescriptor) -> HashMapRecordRegistry {
        HashMapRecordRegistry::collect(ty).expect("collect records")
    }

    #[test]
    fn test_record_with_omitted_nullable() {
        let ty = RecordBuilder::new("R")
            .field("a", TypeDescriptor::int())
            .optional("b", TypeDescriptor::string())
            .field("c", TypeDescriptor::array(TypeDescriptor::int()))
            .build();
        let records = reader_for(&ty);
        let value = JsonReader::new(&records)
            .read(&ty, &json!({ "a": 5, "c": [1, 2, 3] }))
            .expect("read");
        assert_eq!(
            value,
            Value::record([
                ("a", Value::Int(5)),
                ("b", Value::Null),
                ("c", Value::from(vec![1i64, 2, 3])),
            ])
        );
        assert_eq!(to_json(&value), json!({ "a": 5, "b": null, "c": [1, 2, 3] }));
    }

    #[test]
    fn test_union_members_tried_in_wire_order() {
        let ty = TypeDescriptor::union(vec![
            TypeDescriptor::float(),
            TypeDescriptor::int(),
            TypeDescriptor::Decimal,
        ]);
        let records = reader_for(&ty);
        let reader = JsonReader::new(&records);

        // decimal__unionField sorts first and accepts numbers.
        assert_eq!(
            reader.read(&ty, &json!("1.50")).expect("read"),
            Value::from("1.50".parse::<Decimal>().expect("decimal"))
        );
        assert!(reader.read(&ty, &json!(true)).is_err());
    }

    #[test]
    fn test_recursive_reference() {
        let ty = RecordBuilder::new("Node")
            .field("value", TypeDescriptor::int())
            .optional("next", TypeDescriptor::reference("Node"))
            .build();
        let records = reader_for(&ty);
        let doc = json!({ "value": 1, "next": { "value": 2 } });
        let value = JsonReader::new(&records).read(&ty, &doc).expect("read");
        assert_eq!(value.get("next").and_then(|n| n.get("value")), Some(&Value::Int(2)));
    }

    #[test]
    fn test_rejections_carry_path() {
        let ty = RecordBuilder::new("R")
            .field("pair", TypeDescriptor::tuple(vec![TypeDescriptor::byte(), TypeDescriptor::string()]))
            .build();
        let records = reader_for(&ty);
        let reader = JsonReader::new(&records);

        let err = reader
            .read(&ty, &json!({ "pair": [300, "x"] }))
            .expect_err("byte out of range");
        assert!(err.to_string().starts_with("$.pair[0]"), "{}", err);

        let err = reader
            .read(&ty, &json!({ "pair": [1, "x"], "extra": 0 }))
            .expect_err("unknown field");
        assert!(err.to_string().contains("extra"), "{}", err);
    }

    #[test]
    fn test_wide_decimals_keep_their_digits() {
        let ty = TypeDescriptor::Decimal;
        let records = reader_for(&ty);
        let reader = JsonReader::new(&records);
        for literal in ["1234567890123456789012345678901234567890.5", "7E-4000000000"] {
            let value = reader.read(&ty, &json!(literal)).expect("read");
            assert_eq!(to_json(&value), json!(literal));
        }
    }
}
