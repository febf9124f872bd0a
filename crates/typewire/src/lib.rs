// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Typewire - structural types on the protobuf wire
//!
//! Compiles a structural type description (primitives, decimals, records,
//! tagged unions, arrays of any dimension, maps, tables and tuples, possibly
//! self-referential) into a nested protobuf message schema, and encodes or
//! decodes values of that type in the matching wire format.
//!
//! ## Quick Start
//!
//! ```rust
//! use typewire::types::{RecordBuilder, TypeDescriptor};
//! use typewire::{ProtoSerdes, Value};
//!
//! # fn main() -> typewire::Result<()> {
//! let ty = RecordBuilder::new("R")
//!     .field("a", TypeDescriptor::int())
//!     .optional("b", TypeDescriptor::string())
//!     .field("c", TypeDescriptor::array(TypeDescriptor::int()))
//!     .build();
//!
//! let serdes = ProtoSerdes::new(ty)?;
//! let value = Value::record([
//!     ("a", Value::Int(5)),
//!     ("b", Value::Null),
//!     ("c", Value::from(vec![1i64, 2, 3])),
//! ]);
//!
//! let bytes = serdes.serialize(&value)?;
//! assert_eq!(serdes.deserialize(&bytes)?, value);
//! println!("{}", serdes.proto_text());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! TypeDescriptor --SchemaCompiler--> SchemaBuilder tree --freeze--> Schema
//!                                                                     |
//! Value --Encoder--> DynamicMessage --wire--> bytes --wire--> DynamicMessage --Decoder--> Value
//! ```
//!
//! ## Modules Overview
//!
//! - [`types`] - structural type model and record registry
//! - [`value`] - runtime values and exact decimals
//! - [`naming`] - wire names for synthesized messages and fields
//! - [`schema`] - schema builder, compiler and frozen descriptors
//! - [`wire`] - dynamic messages over the protobuf byte format
//! - [`codec`] - structural encoder and decoder
//! - [`serdes`] - type-bound facade

pub mod codec;
pub mod config;
pub mod error;
pub mod naming;
pub mod schema;
pub mod serdes;
pub mod types;
pub mod value;
pub mod wire;

pub use codec::{Decoder, Encoder};
pub use config::{CodecConfig, ConfigError};
pub use error::{Error, Result};
pub use schema::{Schema, SchemaCompiler};
pub use serdes::{generate_schema, ProtoSerdes};
pub use types::{RecordBuilder, TypeDescriptor};
pub use value::{Decimal, Value};
