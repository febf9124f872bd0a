// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for record descriptors.

use crate::types::{PrimitiveKind, RecordDescriptor, TypeDescriptor};
use std::collections::BTreeMap;

/// Builder for record [`TypeDescriptor`]s.
///
/// Field order is irrelevant: records always number their fields in
/// name order.
#[derive(Debug)]
pub struct RecordBuilder {
    name: String,
    anonymous: bool,
    fields: BTreeMap<String, TypeDescriptor>,
}

impl RecordBuilder {
    /// Create a new builder for a named record.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            anonymous: false,
            fields: BTreeMap::new(),
        }
    }

    /// Create a builder for an anonymous (structurally inferred) record.
    pub fn anonymous() -> Self {
        Self {
            name: String::new(),
            anonymous: true,
            fields: BTreeMap::new(),
        }
    }

    /// Add a primitive field.
    pub fn primitive(self, name: impl Into<String>, kind: PrimitiveKind) -> Self {
        self.field(name, TypeDescriptor::Primitive(kind))
    }

    /// Add a field with a type descriptor. A repeated name replaces the earlier type.
    pub fn field(mut self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.fields.insert(name.into(), ty);
        self
    }

    /// Add an optional (`T?`) field.
    pub fn optional(self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.field(name, TypeDescriptor::optional(ty))
    }

    /// Add a field referring back to a named record (possibly this one).
    pub fn reference(self, name: impl Into<String>, record: impl Into<String>) -> Self {
        self.field(name, TypeDescriptor::reference(record))
    }

    /// Build the record descriptor.
    #[must_use]
    pub fn build_descriptor(self) -> RecordDescriptor {
        RecordDescriptor {
            name: self.name,
            fields: self.fields,
            anonymous: self.anonymous,
        }
    }

    /// Build the type descriptor.
    #[must_use]
    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor::record(self.build_descriptor())
    }
}
