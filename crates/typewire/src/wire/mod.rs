// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic protobuf messages.
//!
//! [`DynamicMessage`] is a schema-bound message addressed by field name and
//! stored by field number. Bytes follow protobuf wire semantics: tag =
//! `(number << 3) | wire_type`, varint scalars, little-endian doubles,
//! length-delimited strings, bytes and nested messages, packed repeated
//! numerics.

mod codec;
mod message;

pub use message::{DynamicMessage, WireValue};

use prost::encoding::WireType;
use thiserror::Error;

/// Errors raised by the wire layer.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("message `{message}` has no field `{field}`")]
    UnknownField { message: String, field: String },

    #[error("field `{field}` is {label}")]
    Cardinality { field: String, label: &'static str },

    #[error("field `{field}` expects {expected}, got {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: &'static str,
    },

    #[error("field {number} of `{message}` has wire type {found:?}, expected {expected:?}")]
    UnexpectedWireType {
        message: String,
        number: u32,
        found: WireType,
        expected: WireType,
    },

    #[error("buffer truncated: need {need} bytes, have {have}")]
    Truncated { need: usize, have: usize },

    #[error("field `{field}` value {value} does not fit in uint32")]
    OutOfRange { field: String, value: u64 },

    #[error("invalid UTF-8 in field `{field}`")]
    InvalidUtf8 { field: String },

    #[error("group wire types are not supported")]
    GroupsUnsupported,

    #[error("message nesting exceeds depth limit of {limit}")]
    DepthExceeded { limit: usize },

    #[error("protobuf decode error: {0}")]
    Decode(#[from] prost::DecodeError),
}
