// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structural type model.
//!
//! # Features
//!
//! - **TypeDescriptor**: closed set of structural variants (primitives,
//!   decimal, nil, arrays, unions, records, maps, tables, tuples)
//! - **RecordBuilder**: fluent interface for building record descriptors
//! - **RecordRegistry**: resolves named back-edges for self-referential records

mod builder;
mod descriptor;
mod registry;

pub use builder::RecordBuilder;
pub use descriptor::{
    ArrayDescriptor, PrimitiveKind, RecordDescriptor, TupleDescriptor, TypeDescriptor,
    UnionDescriptor,
};
pub use registry::{HashMapRecordRegistry, RecordRegistry};
