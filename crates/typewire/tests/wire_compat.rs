// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test code readability over pedantic
#![allow(clippy::unreadable_literal)] // Golden byte vectors

//! Golden wire vectors.
//!
//! Byte sequences are written out by hand from the protobuf encoding rules
//! so the output stays readable by any conformant protobuf implementation.

use typewire::types::{RecordBuilder, TypeDescriptor};
use typewire::{Decimal, ProtoSerdes, Value};

fn sample_record() -> TypeDescriptor {
    RecordBuilder::new("R")
        .field("a", TypeDescriptor::int())
        .optional("b", TypeDescriptor::string())
        .field("c", TypeDescriptor::array(TypeDescriptor::int()))
        .build()
}

fn sample_value() -> Value {
    Value::record([
        ("a", Value::Int(5)),
        ("b", Value::Null),
        ("c", Value::from(vec![1i64, 2, 3])),
    ])
}

#[test]
fn test_record_golden_bytes() {
    let serdes = ProtoSerdes::new(sample_record()).expect("compile schema");
    let bytes = serdes.serialize(&sample_value()).expect("serialize");
    assert_eq!(
        bytes,
        vec![
            0x08, 0x05, // a = 5
            0x12, 0x02, 0x08, 0x01, // b { nullField = true }
            0x1a, 0x03, 0x01, 0x02, 0x03, // c = [1, 2, 3] packed
        ]
    );
}

#[test]
fn test_unpacked_and_reordered_input_accepted() {
    let serdes = ProtoSerdes::new(sample_record()).expect("compile schema");
    let bytes = [
        0x18, 0x01, 0x18, 0x02, // c unpacked
        0x12, 0x02, 0x08, 0x01, // b
        0x18, 0x03, // c continues
        0x08, 0x05, // a
    ];
    assert_eq!(
        serdes.deserialize(&bytes).expect("deserialize"),
        sample_value()
    );
}

#[test]
fn test_unknown_fields_skipped() {
    let serdes = ProtoSerdes::new(sample_record()).expect("compile schema");
    let mut bytes = serdes.serialize(&sample_value()).expect("serialize");
    bytes.extend_from_slice(&[0x78, 0x2a]); // field 15, varint
    bytes.extend_from_slice(&[0x82, 0x01, 0x02, 0xaa, 0xbb]); // field 16, length-delimited
    bytes.extend_from_slice(&[0x8d, 0x01, 0x01, 0x02, 0x03, 0x04]); // field 17, fixed32
    assert_eq!(
        serdes.deserialize(&bytes).expect("deserialize"),
        sample_value()
    );
}

#[test]
fn test_scalar_golden_bytes() {
    let cases: Vec<(TypeDescriptor, Value, Vec<u8>)> = vec![
        (
            TypeDescriptor::int(),
            Value::Int(-1),
            vec![0x08, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01],
        ),
        (
            TypeDescriptor::float(),
            Value::Float(1.5),
            vec![0x09, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xf8, 0x3f],
        ),
        (TypeDescriptor::boolean(), Value::Bool(true), vec![0x08, 0x01]),
        (
            TypeDescriptor::string(),
            Value::from("hi"),
            vec![0x0a, 0x02, b'h', b'i'],
        ),
        (TypeDescriptor::byte(), Value::Byte(7), vec![0x0a, 0x01, 0x07]),
        (
            TypeDescriptor::array(TypeDescriptor::byte()),
            Value::bytes(b"ok"),
            vec![0x0a, 0x02, b'o', b'k'],
        ),
        (
            TypeDescriptor::Decimal,
            Value::from("-123.45".parse::<Decimal>().expect("decimal")),
            vec![0x08, 0x02, 0x10, 0x05, 0x1a, 0x02, 0xcf, 0xc7],
        ),
        (
            TypeDescriptor::map(TypeDescriptor::int()),
            Value::map([("a", Value::Int(1))]),
            vec![0x0a, 0x05, 0x0a, 0x01, b'a', 0x10, 0x01],
        ),
    ];

    for (ty, value, expected) in cases {
        let serdes = ProtoSerdes::new(ty.clone()).expect("compile schema");
        let bytes = serdes.serialize(&value).expect("serialize");
        assert_eq!(bytes, expected, "encoding of {}", ty);
        assert_eq!(serdes.deserialize(&expected).expect("deserialize"), value);
    }
}

#[test]
fn test_union_member_field_numbers_follow_sorted_keys() {
    // Keys sort as Point__unionField, int__unionField, nullField.
    let point = RecordBuilder::new("Point")
        .field("x", TypeDescriptor::int())
        .build();
    let ty = TypeDescriptor::union(vec![TypeDescriptor::Null, TypeDescriptor::int(), point]);
    let serdes = ProtoSerdes::new(ty).expect("compile schema");

    assert_eq!(
        serdes.serialize(&Value::Int(0)).expect("serialize"),
        vec![0x10, 0x00]
    );
    assert_eq!(
        serdes
            .serialize(&Value::record([("x", Value::Int(3))]))
            .expect("serialize"),
        vec![0x0a, 0x02, 0x08, 0x03]
    );
    assert_eq!(
        serdes.serialize(&Value::Null).expect("serialize"),
        vec![0x18, 0x01]
    );
}

#[test]
fn test_output_is_canonical() {
    let ty = RecordBuilder::new("Doc")
        .field("z", TypeDescriptor::string())
        .field("m", TypeDescriptor::map(TypeDescriptor::int()))
        .field("a", TypeDescriptor::int())
        .build();
    let value = Value::record([
        ("z", Value::from("last")),
        ("m", Value::map([("b", Value::Int(2)), ("a", Value::Int(1))])),
        ("a", Value::Int(1)),
    ]);
    let serdes = ProtoSerdes::new(ty).expect("compile schema");
    let first = serdes.serialize(&value).expect("serialize");
    let again = serdes
        .serialize(&serdes.deserialize(&first).expect("deserialize"))
        .expect("serialize");
    assert_eq!(first, again);
    // a = 1 comes first, then the map, then z.
    assert_eq!(&first[..2], &[0x08, 0x01]);
}

#[test]
fn test_decimal_wider_than_128_bits() {
    let serdes = ProtoSerdes::new(TypeDescriptor::Decimal).expect("compile schema");
    // scale = 0, precision = 40, unscaled_value = 2^128 (17 bytes)
    let mut bytes = vec![0x08, 0x00, 0x10, 0x28, 0x1a, 0x11, 0x01];
    bytes.extend_from_slice(&[0x00; 16]);

    let value = serdes.deserialize(&bytes).expect("deserialize");
    let decimal = value.as_decimal().expect("decimal value");
    assert_eq!(decimal.to_string(), "340282366920938463463374607431768211456");
    assert_eq!(decimal.precision(), 40);
    assert_eq!(serdes.serialize(&value).expect("serialize"), bytes);
}

#[test]
fn test_decimal_scale_overflow_rejected() {
    let serdes = ProtoSerdes::new(TypeDescriptor::Decimal).expect("compile schema");
    // scale = 2^32 does not fit the uint32 field
    let bytes = [
        0x08, 0x80, 0x80, 0x80, 0x80, 0x10, // scale
        0x10, 0x01, // precision
        0x1a, 0x01, 0x01, // unscaled_value
    ];
    let err = serdes.deserialize(&bytes).expect_err("scale out of range");
    assert!(matches!(err, typewire::Error::Deserialization(_)), "{:?}", err);
}
