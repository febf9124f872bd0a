// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire schema generation.
//!
//! # Features
//!
//! - **SchemaBuilder**: mutable message definition with deterministic text rendering
//! - **SchemaCompiler**: cycle-safe, collision-free type to message tree compiler
//! - **Schema**: frozen descriptor arena with per-message field lookup tables
//!
//! # Example
//!
//! ```rust
//! use typewire::schema::SchemaCompiler;
//! use typewire::types::{RecordBuilder, TypeDescriptor};
//! use typewire::CodecConfig;
//!
//! let ty = RecordBuilder::new("R")
//!     .field("a", TypeDescriptor::int())
//!     .optional("b", TypeDescriptor::string())
//!     .field("c", TypeDescriptor::array(TypeDescriptor::int()))
//!     .build();
//!
//! let config = CodecConfig::default();
//! let schema = SchemaCompiler::new(&config).compile(&ty).unwrap();
//! assert!(schema.definition().contains("repeated int64 c = 3;"));
//! ```

mod builder;
mod compiler;
mod descriptor;

pub use builder::{FieldDefinition, FieldTypeName, Label, ScalarType, SchemaBuilder};
pub use compiler::SchemaCompiler;
pub use descriptor::{FieldDescriptor, FieldType, MessageDescriptor, MessageId, Schema};
