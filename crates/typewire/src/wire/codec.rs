// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Protobuf byte format for [`DynamicMessage`].

use crate::schema::{FieldDescriptor, FieldType, MessageId, ScalarType, Schema};
use crate::wire::message::{DynamicMessage, FieldValue, WireValue};
use crate::wire::WireError;
use prost::bytes::{Buf, BufMut};
use prost::encoding::{decode_key, decode_varint, encode_key, encode_varint, WireType};

pub(crate) fn encode_message(msg: &DynamicMessage<'_>, buf: &mut Vec<u8>) {
    let descriptor = msg.descriptor();
    for (&number, value) in msg.raw_fields() {
        match value {
            FieldValue::Single(value) => encode_field(number, value, buf),
            FieldValue::Repeated(values) if values.is_empty() => {}
            FieldValue::Repeated(values) => {
                let packed = matches!(
                    descriptor.field_by_number(number).map(FieldDescriptor::ty),
                    Some(FieldType::Scalar(scalar)) if scalar.is_packable()
                );
                if packed {
                    let mut body = Vec::new();
                    for value in values {
                        encode_packed(value, &mut body);
                    }
                    encode_key(number, WireType::LengthDelimited, buf);
                    encode_varint(body.len() as u64, buf);
                    buf.put_slice(&body);
                } else {
                    for value in values {
                        encode_field(number, value, buf);
                    }
                }
            }
        }
    }
}

fn encode_field(number: u32, value: &WireValue<'_>, buf: &mut Vec<u8>) {
    match value {
        WireValue::Int64(_) | WireValue::Uint32(_) | WireValue::Bool(_) => {
            encode_key(number, WireType::Varint, buf);
            encode_packed(value, buf);
        }
        WireValue::Double(_) => {
            encode_key(number, WireType::SixtyFourBit, buf);
            encode_packed(value, buf);
        }
        WireValue::String(s) => encode_length_delimited(number, s.as_bytes(), buf),
        WireValue::Bytes(b) => encode_length_delimited(number, b, buf),
        WireValue::Message(m) => encode_length_delimited(number, &m.encode_to_vec(), buf),
    }
}

/// Payload of a numeric value without its key.
fn encode_packed(value: &WireValue<'_>, buf: &mut Vec<u8>) {
    match value {
        WireValue::Int64(v) => encode_varint(*v as u64, buf),
        WireValue::Uint32(v) => encode_varint(u64::from(*v), buf),
        WireValue::Bool(v) => encode_varint(u64::from(*v), buf),
        WireValue::Double(v) => buf.put_f64_le(*v),
        WireValue::String(_) | WireValue::Bytes(_) | WireValue::Message(_) => {}
    }
}

fn encode_length_delimited(number: u32, payload: &[u8], buf: &mut Vec<u8>) {
    encode_key(number, WireType::LengthDelimited, buf);
    encode_varint(payload.len() as u64, buf);
    buf.put_slice(payload);
}

fn expected_wire_type(scalar: ScalarType) -> WireType {
    match scalar {
        ScalarType::Int64 | ScalarType::Uint32 | ScalarType::Bool => WireType::Varint,
        ScalarType::Double => WireType::SixtyFourBit,
        ScalarType::String | ScalarType::Bytes => WireType::LengthDelimited,
    }
}

pub(crate) fn decode_message<'s>(
    schema: &'s Schema,
    id: MessageId,
    mut buf: &[u8],
    depth_left: usize,
    limit: usize,
) -> Result<DynamicMessage<'s>, WireError> {
    if depth_left == 0 {
        return Err(WireError::DepthExceeded { limit });
    }
    let mut msg = DynamicMessage::new(schema, id);
    let descriptor = msg.descriptor();

    while buf.has_remaining() {
        let (number, wire_type) = decode_key(&mut buf)?;
        let Some(field) = descriptor.field_by_number(number) else {
            log::trace!(
                "[typewire::wire] skipping unknown field {} in `{}`",
                number,
                descriptor.full_name()
            );
            skip_field(wire_type, &mut buf)?;
            continue;
        };

        match field.ty() {
            FieldType::Scalar(scalar)
                if field.is_repeated()
                    && scalar.is_packable()
                    && wire_type == WireType::LengthDelimited =>
            {
                let mut packed = take_length_delimited(&mut buf)?;
                while packed.has_remaining() {
                    let value = read_scalar(scalar, field, &mut packed)?;
                    msg.insert(field, value);
                }
            }
            FieldType::Scalar(scalar) => {
                check_wire_type(
                    descriptor.full_name(),
                    number,
                    wire_type,
                    expected_wire_type(scalar),
                )?;
                let value = read_scalar(scalar, field, &mut buf)?;
                msg.insert(field, value);
            }
            FieldType::Message(child) => {
                check_wire_type(
                    descriptor.full_name(),
                    number,
                    wire_type,
                    WireType::LengthDelimited,
                )?;
                let body = take_length_delimited(&mut buf)?;
                let nested = decode_message(schema, child, body, depth_left - 1, limit)?;
                msg.insert(field, WireValue::Message(nested));
            }
        }
    }
    Ok(msg)
}

fn check_wire_type(
    message: &str,
    number: u32,
    found: WireType,
    expected: WireType,
) -> Result<(), WireError> {
    if found == expected {
        return Ok(());
    }
    Err(WireError::UnexpectedWireType {
        message: message.to_string(),
        number,
        found,
        expected,
    })
}

fn ensure_remaining(buf: &[u8], need: usize) -> Result<(), WireError> {
    if buf.len() < need {
        return Err(WireError::Truncated {
            need,
            have: buf.len(),
        });
    }
    Ok(())
}

/// Split off a length-prefixed payload.
fn take_length_delimited<'b>(buf: &mut &'b [u8]) -> Result<&'b [u8], WireError> {
    let len = decode_varint(buf)?;
    let len = usize::try_from(len).map_err(|_| WireError::Truncated {
        need: usize::MAX,
        have: buf.len(),
    })?;
    ensure_remaining(buf, len)?;
    let bytes: &'b [u8] = *buf;
    let (payload, rest) = bytes.split_at(len);
    *buf = rest;
    Ok(payload)
}

fn read_scalar<'s>(
    scalar: ScalarType,
    field: &FieldDescriptor,
    buf: &mut &[u8],
) -> Result<WireValue<'s>, WireError> {
    let value = match scalar {
        ScalarType::Int64 => WireValue::Int64(decode_varint(buf)? as i64),
        ScalarType::Uint32 => {
            let raw = decode_varint(buf)?;
            let value = u32::try_from(raw).map_err(|_| WireError::OutOfRange {
                field: field.name().to_string(),
                value: raw,
            })?;
            WireValue::Uint32(value)
        }
        ScalarType::Bool => WireValue::Bool(decode_varint(buf)? != 0),
        ScalarType::Double => {
            ensure_remaining(buf, 8)?;
            WireValue::Double(buf.get_f64_le())
        }
        ScalarType::String => {
            let payload = take_length_delimited(buf)?;
            let text = String::from_utf8(payload.to_vec()).map_err(|_| WireError::InvalidUtf8 {
                field: field.name().to_string(),
            })?;
            WireValue::String(text)
        }
        ScalarType::Bytes => WireValue::Bytes(take_length_delimited(buf)?.to_vec()),
    };
    Ok(value)
}

fn skip_field(wire_type: WireType, buf: &mut &[u8]) -> Result<(), WireError> {
    match wire_type {
        WireType::Varint => {
            decode_varint(buf)?;
        }
        WireType::SixtyFourBit => {
            ensure_remaining(buf, 8)?;
            buf.advance(8);
        }
        WireType::ThirtyTwoBit => {
            ensure_remaining(buf, 4)?;
            buf.advance(4);
        }
        WireType::LengthDelimited => {
            take_length_delimited(buf)?;
        }
        WireType::StartGroup | WireType::EndGroup => return Err(WireError::GroupsUnsupported),
    }
    Ok(())
}
