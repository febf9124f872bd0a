// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptor to message tree compiler.
//!
//! Walks a [`TypeDescriptor`] depth-first and emits one [`SchemaBuilder`]
//! per composite. The structural position of every field travels as an
//! immutable [`Slot`] argument; the set of records on the current ancestor
//! chain travels as an explicit `visited` argument, so a record that
//! reappears below itself is emitted as a by-name reference instead of
//! being expanded again.

use crate::config::CodecConfig;
use crate::error::{Error, Result};
use crate::naming::{self, ParentKind};
use crate::schema::builder::{FieldTypeName, Label, ScalarType, SchemaBuilder};
use crate::schema::descriptor::Schema;
use crate::types::{
    ArrayDescriptor, HashMapRecordRegistry, RecordDescriptor, TupleDescriptor, TypeDescriptor,
    UnionDescriptor,
};
use std::collections::HashSet;

/// Record names on the current ancestor chain.
type Visited = HashSet<String>;

/// Where a field goes: its name, number and structural position.
#[derive(Debug, Clone, Copy)]
struct Slot<'n> {
    name: &'n str,
    number: u32,
    parent: ParentKind,
    repeated: bool,
}

impl<'n> Slot<'n> {
    fn new(name: &'n str, number: u32, parent: ParentKind) -> Self {
        Self {
            name,
            number,
            parent,
            repeated: false,
        }
    }

    fn as_repeated(self) -> Self {
        Self {
            repeated: true,
            ..self
        }
    }

    fn label(&self) -> Label {
        if self.repeated {
            Label::Repeated
        } else {
            Label::Optional
        }
    }
}

/// Compiles one type into an immutable [`Schema`].
///
/// A compiler is consumed by [`SchemaCompiler::compile`]; no state survives
/// between top-level compilations.
#[derive(Debug)]
pub struct SchemaCompiler<'c> {
    config: &'c CodecConfig,
    records: HashMapRecordRegistry,
}

impl<'c> SchemaCompiler<'c> {
    /// Create a compiler.
    pub fn new(config: &'c CodecConfig) -> Self {
        Self {
            config,
            records: HashMapRecordRegistry::new(),
        }
    }

    /// Pre-register records that references may point to.
    #[must_use]
    pub fn with_records(mut self, records: HashMapRecordRegistry) -> Self {
        self.records = records;
        self
    }

    /// Compile `ty` into a frozen schema.
    pub fn compile(mut self, ty: &TypeDescriptor) -> Result<Schema> {
        self.records.collect_from(ty)?;
        log::debug!(
            "[typewire::compiler] compiling `{}` ({} named records)",
            ty,
            self.records.len()
        );

        let mut visited = Visited::new();
        let root = self.compile_root(ty, &mut visited)?;
        Schema::freeze(&root, self.records, self.config.package.clone())
    }

    fn descend(&self, depth: usize) -> Result<usize> {
        if depth >= self.config.max_depth {
            return Err(Error::DepthLimitExceeded {
                limit: self.config.max_depth,
            });
        }
        Ok(depth + 1)
    }

    fn compile_root(&self, ty: &TypeDescriptor, visited: &mut Visited) -> Result<SchemaBuilder> {
        let mut root = SchemaBuilder::new(naming::root_message_name(ty)?);
        match ty {
            TypeDescriptor::Primitive(_) => {
                let slot = Slot::new(naming::ATOMIC_FIELD, 1, ParentKind::TopLevel);
                self.compile_field(&mut root, slot, ty, visited, 0)?;
            }
            TypeDescriptor::Decimal => root = decimal_message(),
            TypeDescriptor::Array(array) => {
                let field = naming::array_field_name(array.flatten().1);
                let slot = Slot::new(&field, 1, ParentKind::TopLevel);
                self.compile_field(&mut root, slot, ty, visited, 0)?;
            }
            TypeDescriptor::Union(union) => self.compile_union_body(&mut root, union, visited, 0)?,
            TypeDescriptor::Record(record) => {
                if !record.anonymous {
                    visited.insert(record.name.clone());
                }
                self.compile_record_body(&mut root, record, visited, 0)?;
            }
            TypeDescriptor::Map(value) => self.compile_map_body(&mut root, value, visited, 0)?,
            TypeDescriptor::Table(row) => self.compile_table_body(&mut root, row, visited, 0)?,
            TypeDescriptor::Tuple(tuple) => self.compile_tuple_body(&mut root, tuple, visited, 0)?,
            TypeDescriptor::Null | TypeDescriptor::Reference(_) => {
                return Err(Error::unsupported(ty, "not a valid top-level type"));
            }
        }
        Ok(root)
    }

    /// Emit the field for `ty` at `slot`, nesting message definitions as needed.
    fn compile_field(
        &self,
        builder: &mut SchemaBuilder,
        slot: Slot<'_>,
        ty: &TypeDescriptor,
        visited: &mut Visited,
        depth: usize,
    ) -> Result<()> {
        let depth = self.descend(depth)?;
        match ty {
            TypeDescriptor::Primitive(kind) => {
                let scalar = FieldTypeName::Scalar(ScalarType::from(*kind));
                builder.add_field(slot.label(), scalar, slot.name, slot.number);
            }
            TypeDescriptor::Decimal => {
                attach(builder, decimal_message())?;
                let message = FieldTypeName::Message(naming::DECIMAL_VALUE.to_string());
                builder.add_field(slot.label(), message, slot.name, slot.number);
            }
            TypeDescriptor::Null => {
                if slot.parent != ParentKind::UnionMember || slot.repeated {
                    return Err(Error::unsupported(
                        ty,
                        "nil can only appear as a union member",
                    ));
                }
                let flag = FieldTypeName::Scalar(ScalarType::Bool);
                builder.add_field(Label::Optional, flag, slot.name, slot.number);
            }
            TypeDescriptor::Array(array) => {
                self.compile_array_field(builder, slot, array, visited, depth)?;
            }
            TypeDescriptor::Record(record) => {
                self.compile_record_field(builder, slot, record, visited, depth)?;
            }
            TypeDescriptor::Reference(name) => {
                let record = self.records.resolve(name)?;
                self.compile_record_field(builder, slot, record, visited, depth)?;
            }
            TypeDescriptor::Union(union) => {
                let name = naming::union_message_name(slot.name);
                let mut message = SchemaBuilder::new(&name);
                self.compile_union_body(&mut message, union, visited, depth)?;
                attach(builder, message)?;
                builder.add_field(slot.label(), FieldTypeName::Message(name), slot.name, slot.number);
            }
            TypeDescriptor::Map(value) => {
                if slot.parent == ParentKind::UnionMember {
                    return Err(Error::unsupported(ty, "maps cannot be union members"));
                }
                let name = naming::map_message_name(slot.name);
                let mut message = SchemaBuilder::new(&name);
                self.compile_map_body(&mut message, value, visited, depth)?;
                attach(builder, message)?;
                builder.add_field(slot.label(), FieldTypeName::Message(name), slot.name, slot.number);
            }
            TypeDescriptor::Table(row) => {
                if slot.parent == ParentKind::UnionMember {
                    return Err(Error::unsupported(ty, "tables cannot be union members"));
                }
                let name = naming::table_message_name(slot.name);
                let mut message = SchemaBuilder::new(&name);
                self.compile_table_body(&mut message, row, visited, depth)?;
                attach(builder, message)?;
                builder.add_field(slot.label(), FieldTypeName::Message(name), slot.name, slot.number);
            }
            TypeDescriptor::Tuple(tuple) => {
                if slot.parent == ParentKind::UnionMember && naming::type_key(ty).is_none() {
                    return Err(Error::unsupported(
                        ty,
                        "tuples without a name cannot be union members",
                    ));
                }
                let name = naming::tuple_message_name(tuple, slot.name, slot.parent);
                let mut message = SchemaBuilder::new(&name);
                self.compile_tuple_body(&mut message, tuple, visited, depth)?;
                attach(builder, message)?;
                builder.add_field(slot.label(), FieldTypeName::Message(name), slot.name, slot.number);
            }
        }
        Ok(())
    }

    /// Arrays in a repeated slot get a wrapper message; elsewhere the slot
    /// itself becomes the repeated field.
    fn compile_array_field(
        &self,
        builder: &mut SchemaBuilder,
        slot: Slot<'_>,
        array: &ArrayDescriptor,
        visited: &mut Visited,
        depth: usize,
    ) -> Result<()> {
        let (base, dims) = array.flatten();
        if dims == 0 {
            return Err(Error::unsupported(
                &TypeDescriptor::Array(array.clone()),
                "arrays need at least one dimension",
            ));
        }
        if !slot.repeated {
            return self.compile_array_elements(builder, slot, array, visited, depth);
        }

        let wrapper_name = naming::array_wrapper_name(base, dims, slot.name);
        let inner_field = naming::array_field_name(dims);
        let mut wrapper = SchemaBuilder::new(&wrapper_name);
        let inner_slot = Slot::new(&inner_field, 1, ParentKind::ArrayElement);
        self.compile_array_elements(&mut wrapper, inner_slot, array, visited, depth)?;
        attach(builder, wrapper)?;
        builder.add_field(
            Label::Repeated,
            FieldTypeName::Message(wrapper_name),
            slot.name,
            slot.number,
        );
        Ok(())
    }

    fn compile_array_elements(
        &self,
        builder: &mut SchemaBuilder,
        slot: Slot<'_>,
        array: &ArrayDescriptor,
        visited: &mut Visited,
        depth: usize,
    ) -> Result<()> {
        if array.is_byte_string() {
            let bytes = FieldTypeName::Scalar(ScalarType::Bytes);
            builder.add_field(Label::Optional, bytes, slot.name, slot.number);
            return Ok(());
        }
        let element = array.element_type();
        self.compile_field(builder, slot.as_repeated(), &element, visited, depth)
    }

    fn compile_record_field(
        &self,
        builder: &mut SchemaBuilder,
        slot: Slot<'_>,
        record: &RecordDescriptor,
        visited: &mut Visited,
        depth: usize,
    ) -> Result<()> {
        if record.anonymous && slot.parent == ParentKind::UnionMember {
            return Err(Error::UnsupportedType {
                type_name: "record {..}".to_string(),
                reason: "anonymous records cannot be union members".to_string(),
            });
        }
        let name = naming::record_message_name(record, slot.name);

        if !record.anonymous && visited.contains(&record.name) {
            log::trace!(
                "[typewire::compiler] `{}` is an ancestor, referencing by name",
                record.name
            );
        } else {
            let inserted = !record.anonymous && visited.insert(record.name.clone());
            let mut message = SchemaBuilder::new(&name);
            let result = self.compile_record_body(&mut message, record, visited, depth);
            if inserted {
                visited.remove(&record.name);
            }
            result?;
            attach(builder, message)?;
        }

        builder.add_field(slot.label(), FieldTypeName::Message(name), slot.name, slot.number);
        Ok(())
    }

    fn compile_record_body(
        &self,
        builder: &mut SchemaBuilder,
        record: &RecordDescriptor,
        visited: &mut Visited,
        depth: usize,
    ) -> Result<()> {
        for (number, (name, ty)) in (1..).zip(record.fields.iter()) {
            let slot = Slot::new(name, number, ParentKind::RecordField);
            self.compile_field(builder, slot, ty, visited, depth)?;
        }
        Ok(())
    }

    fn compile_union_body(
        &self,
        builder: &mut SchemaBuilder,
        union: &UnionDescriptor,
        visited: &mut Visited,
        depth: usize,
    ) -> Result<()> {
        let members = naming::union_members(union)?;
        for (number, member) in (1..).zip(members.iter()) {
            let slot = Slot::new(&member.key, number, ParentKind::UnionMember);
            self.compile_field(builder, slot, member.ty, visited, depth)?;
        }
        Ok(())
    }

    fn compile_map_body(
        &self,
        builder: &mut SchemaBuilder,
        value: &TypeDescriptor,
        visited: &mut Visited,
        depth: usize,
    ) -> Result<()> {
        let mut entry = SchemaBuilder::new(naming::MAP_ENTRY);
        entry.add_field(
            Label::Optional,
            FieldTypeName::Scalar(ScalarType::String),
            naming::KEY_FIELD,
            1,
        );
        let slot = Slot::new(naming::VALUE_FIELD, 2, ParentKind::MapValue);
        self.compile_field(&mut entry, slot, value, visited, depth)?;
        attach(builder, entry)?;
        builder.add_field(
            Label::Repeated,
            FieldTypeName::Message(naming::MAP_ENTRY.to_string()),
            naming::MAP_FIELD,
            1,
        );
        Ok(())
    }

    fn compile_table_body(
        &self,
        builder: &mut SchemaBuilder,
        row: &TypeDescriptor,
        visited: &mut Visited,
        depth: usize,
    ) -> Result<()> {
        if !matches!(
            row,
            TypeDescriptor::Record(_) | TypeDescriptor::Reference(_) | TypeDescriptor::Map(_)
        ) {
            return Err(Error::unsupported(row, "table rows must be records or maps"));
        }
        let slot = Slot::new(naming::TABLE_ENTRY, 1, ParentKind::TableRow).as_repeated();
        self.compile_field(builder, slot, row, visited, depth)
    }

    fn compile_tuple_body(
        &self,
        builder: &mut SchemaBuilder,
        tuple: &TupleDescriptor,
        visited: &mut Visited,
        depth: usize,
    ) -> Result<()> {
        for (index, element) in tuple.elements.iter().enumerate() {
            let name = naming::tuple_element_name(index + 1);
            let slot = Slot::new(&name, index as u32 + 1, ParentKind::TupleElement);
            self.compile_field(builder, slot, element, visited, depth)?;
        }
        Ok(())
    }
}

/// `DecimalValue { scale, precision, unscaled_value }`
fn decimal_message() -> SchemaBuilder {
    let mut message = SchemaBuilder::new(naming::DECIMAL_VALUE);
    let uint32 = FieldTypeName::Scalar(ScalarType::Uint32);
    message.add_field(Label::Optional, uint32.clone(), naming::SCALE_FIELD, 1);
    message.add_field(Label::Optional, uint32, naming::PRECISION_FIELD, 2);
    message.add_field(
        Label::Optional,
        FieldTypeName::Scalar(ScalarType::Bytes),
        naming::UNSCALED_VALUE_FIELD,
        3,
    );
    message
}

/// Nest `child`, tolerating an identical definition already in scope.
fn attach(builder: &mut SchemaBuilder, child: SchemaBuilder) -> Result<()> {
    if let Some(existing) = builder.nested_message(child.name()) {
        if *existing != child {
            return Err(Error::SchemaGeneration(format!(
                "conflicting definitions of nested message `{}` in `{}`",
                child.name(),
                builder.name()
            )));
        }
        return Ok(());
    }
    builder.add_nested_message(child);
    Ok(())
}
