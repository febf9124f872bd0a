// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Frozen, immutable message descriptors.
//!
//! A [`Schema`] is built once from a [`SchemaBuilder`] tree. Message type
//! names are resolved to [`MessageId`]s up front, and every message keeps
//! name and number lookup tables, so encode/decode never parses names.

use crate::error::{Error, Result};
use crate::schema::builder::{FieldDefinition, FieldTypeName, Label, ScalarType, SchemaBuilder};
use crate::types::HashMapRecordRegistry;
use std::collections::HashMap;

/// Largest field number the wire format can carry.
const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// Index of a message inside its [`Schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(usize);

/// Resolved field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Scalar(ScalarType),
    Message(MessageId),
}

/// A resolved field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: String,
    number: u32,
    label: Label,
    ty: FieldType,
}

impl FieldDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn label(&self) -> Label {
        self.label
    }

    pub fn ty(&self) -> FieldType {
        self.ty
    }

    pub fn is_repeated(&self) -> bool {
        self.label == Label::Repeated
    }
}

/// A resolved message.
#[derive(Debug, Clone)]
pub struct MessageDescriptor {
    id: MessageId,
    name: String,
    full_name: String,
    parent: Option<MessageId>,
    nested: Vec<MessageId>,
    /// Sorted by field number.
    fields: Vec<FieldDescriptor>,
    by_name: HashMap<String, usize>,
    by_number: HashMap<u32, usize>,
}

impl MessageDescriptor {
    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dotted path from the root message, e.g. `R.b__UnionBuilder`.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn parent(&self) -> Option<MessageId> {
        self.parent
    }

    pub fn nested(&self) -> &[MessageId] {
        &self.nested
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Get field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.by_name.get(name).map(|&i| &self.fields[i])
    }

    /// Get field by number.
    pub fn field_by_number(&self, number: u32) -> Option<&FieldDescriptor> {
        self.by_number.get(&number).map(|&i| &self.fields[i])
    }
}

/// Immutable compiled schema.
///
/// Safe to share across threads; nothing mutates it after compilation.
#[derive(Debug, Clone)]
pub struct Schema {
    messages: Vec<MessageDescriptor>,
    root: MessageId,
    definition: String,
    package: Option<String>,
    records: HashMapRecordRegistry,
}

impl Schema {
    /// Freeze a builder tree into a resolved schema.
    pub fn freeze(
        root: &SchemaBuilder,
        records: HashMapRecordRegistry,
        package: Option<String>,
    ) -> Result<Self> {
        let mut messages = Vec::new();
        let mut pending = Vec::new();
        let root_id = allocate(root, None, &mut messages, &mut pending);

        for (index, definitions) in pending.into_iter().enumerate() {
            let id = MessageId(index);
            let fields = resolve_fields(&messages, root_id, id, definitions)?;
            let message = &mut messages[index];
            message.by_name = fields
                .iter()
                .enumerate()
                .map(|(i, f)| (f.name.clone(), i))
                .collect();
            message.by_number = fields
                .iter()
                .enumerate()
                .map(|(i, f)| (f.number, i))
                .collect();
            message.fields = fields;
        }

        log::debug!(
            "[typewire::schema] froze `{}` with {} messages",
            root.name(),
            messages.len()
        );

        Ok(Self {
            messages,
            root: root_id,
            definition: root.render(),
            package,
            records,
        })
    }

    pub fn root(&self) -> MessageId {
        self.root
    }

    pub fn root_descriptor(&self) -> &MessageDescriptor {
        self.message(self.root)
    }

    /// Message by id.
    ///
    /// Ids are only minted by this schema, so lookup cannot miss.
    pub fn message(&self, id: MessageId) -> &MessageDescriptor {
        &self.messages[id.0]
    }

    /// Find a message by its dotted full name.
    pub fn find_message(&self, full_name: &str) -> Option<&MessageDescriptor> {
        self.messages.iter().find(|m| m.full_name == full_name)
    }

    pub fn messages(&self) -> &[MessageDescriptor] {
        &self.messages
    }

    /// Named records reachable from the compiled type.
    pub fn records(&self) -> &HashMapRecordRegistry {
        &self.records
    }

    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    /// Rendered root message definition.
    pub fn definition(&self) -> &str {
        &self.definition
    }

    /// Full `.proto` file text.
    pub fn to_proto_file(&self) -> String {
        let mut out = String::from("syntax = \"proto3\";\n\n");
        if let Some(package) = &self.package {
            out.push_str(&format!("package {};\n\n", package));
        }
        out.push_str(&self.definition);
        out
    }
}

fn allocate<'b>(
    builder: &'b SchemaBuilder,
    parent: Option<MessageId>,
    messages: &mut Vec<MessageDescriptor>,
    pending: &mut Vec<&'b [FieldDefinition]>,
) -> MessageId {
    let id = MessageId(messages.len());
    let full_name = match parent {
        Some(p) => format!("{}.{}", messages[p.0].full_name, builder.name()),
        None => builder.name().to_string(),
    };
    messages.push(MessageDescriptor {
        id,
        name: builder.name().to_string(),
        full_name,
        parent,
        nested: Vec::new(),
        fields: Vec::new(),
        by_name: HashMap::new(),
        by_number: HashMap::new(),
    });
    pending.push(builder.fields());

    for child in builder.nested_messages() {
        let child_id = allocate(child, Some(id), messages, pending);
        messages[id.0].nested.push(child_id);
    }
    id
}

fn resolve_fields(
    messages: &[MessageDescriptor],
    root: MessageId,
    id: MessageId,
    definitions: &[FieldDefinition],
) -> Result<Vec<FieldDescriptor>> {
    let owner = &messages[id.0].full_name;
    let mut fields: Vec<FieldDescriptor> = Vec::with_capacity(definitions.len());
    for def in definitions {
        if def.number == 0 || def.number > MAX_FIELD_NUMBER {
            return Err(Error::SchemaGeneration(format!(
                "field `{}` in `{}` has invalid number {}",
                def.name, owner, def.number
            )));
        }
        if fields.iter().any(|f| f.number == def.number) {
            return Err(Error::SchemaGeneration(format!(
                "field number {} used twice in `{}`",
                def.number, owner
            )));
        }
        if fields.iter().any(|f| f.name == def.name) {
            return Err(Error::SchemaGeneration(format!(
                "field name `{}` used twice in `{}`",
                def.name, owner
            )));
        }
        let ty = match &def.ty {
            FieldTypeName::Scalar(scalar) => FieldType::Scalar(*scalar),
            FieldTypeName::Message(name) => {
                FieldType::Message(resolve_message(messages, root, id, name).ok_or_else(
                    || {
                        Error::SchemaGeneration(format!(
                            "field `{}` in `{}` refers to unknown message `{}`",
                            def.name, owner, name
                        ))
                    },
                )?)
            }
        };
        fields.push(FieldDescriptor {
            name: def.name.clone(),
            number: def.number,
            label: def.label,
            ty,
        });
    }
    fields.sort_by_key(|f| f.number);
    Ok(fields)
}

/// Resolve `name` from scope `from`, innermost scope first.
fn resolve_message(
    messages: &[MessageDescriptor],
    root: MessageId,
    from: MessageId,
    name: &str,
) -> Option<MessageId> {
    let mut scope = Some(from);
    while let Some(current) = scope {
        let message = &messages[current.0];
        if let Some(&found) = message
            .nested
            .iter()
            .find(|child| messages[child.0].name == name)
        {
            return Some(found);
        }
        scope = message.parent;
    }
    (messages[root.0].name == name).then_some(root)
}
