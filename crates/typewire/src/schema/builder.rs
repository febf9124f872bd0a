// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Incremental builder for one message definition.

use crate::types::PrimitiveKind;
use std::fmt::{self, Write};

/// Field cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Optional,
    Repeated,
}

impl Label {
    fn keyword(self) -> &'static str {
        match self {
            Self::Optional => "optional",
            Self::Repeated => "repeated",
        }
    }
}

/// Scalar wire types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Int64,
    Uint32,
    Double,
    Bool,
    String,
    Bytes,
}

impl ScalarType {
    /// Keyword used in rendered schema text.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Int64 => "int64",
            Self::Uint32 => "uint32",
            Self::Double => "double",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Bytes => "bytes",
        }
    }

    /// Whether repeated values of this type are written packed.
    pub fn is_packable(self) -> bool {
        !matches!(self, Self::String | Self::Bytes)
    }
}

impl From<PrimitiveKind> for ScalarType {
    fn from(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Int => Self::Int64,
            PrimitiveKind::Float => Self::Double,
            PrimitiveKind::Boolean => Self::Bool,
            PrimitiveKind::String => Self::String,
            PrimitiveKind::Byte => Self::Bytes,
        }
    }
}

/// Field type before name resolution: a scalar or a message by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldTypeName {
    Scalar(ScalarType),
    Message(String),
}

impl fmt::Display for FieldTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(scalar) => f.write_str(scalar.keyword()),
            Self::Message(name) => f.write_str(name),
        }
    }
}

/// One declared field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    pub label: Label,
    pub ty: FieldTypeName,
    pub name: String,
    pub number: u32,
}

/// Mutable message definition.
///
/// Nested messages keep insertion order so rendering is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaBuilder {
    name: String,
    fields: Vec<FieldDefinition>,
    nested: Vec<SchemaBuilder>,
}

impl SchemaBuilder {
    /// Create an empty message definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            nested: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn nested_messages(&self) -> &[SchemaBuilder] {
        &self.nested
    }

    /// Next unused field number.
    pub fn next_field_number(&self) -> u32 {
        self.fields.iter().map(|f| f.number).max().unwrap_or(0) + 1
    }

    /// Declare a field.
    ///
    /// # Panics
    ///
    /// Panics if the name or number is already taken; the compiler never
    /// emits such a pair.
    pub fn add_field(
        &mut self,
        label: Label,
        ty: FieldTypeName,
        name: impl Into<String>,
        number: u32,
    ) {
        let name = name.into();
        assert!(
            !self.fields.iter().any(|f| f.number == number),
            "duplicate field number {} in message {}",
            number,
            self.name
        );
        assert!(
            !self.fields.iter().any(|f| f.name == name),
            "duplicate field name {} in message {}",
            name,
            self.name
        );
        self.fields.push(FieldDefinition {
            label,
            ty,
            name,
            number,
        });
    }

    /// Nested message by name.
    pub fn nested_message(&self, name: &str) -> Option<&SchemaBuilder> {
        self.nested.iter().find(|m| m.name == name)
    }

    /// Nest a message definition. No-op if one with that name is already nested.
    ///
    /// Returns whether the message was added.
    pub fn add_nested_message(&mut self, child: SchemaBuilder) -> bool {
        if self.nested_message(&child.name).is_some() {
            return false;
        }
        self.nested.push(child);
        true
    }

    /// Render as schema text, nested messages first, then fields by number.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        let _ = writeln!(out, "{}message {} {{", indent, self.name);
        for (i, nested) in self.nested.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            nested.render_into(out, depth + 1);
        }
        if !self.nested.is_empty() && !self.fields.is_empty() {
            out.push('\n');
        }
        let mut fields: Vec<&FieldDefinition> = self.fields.iter().collect();
        fields.sort_by_key(|f| f.number);
        for field in fields {
            let _ = writeln!(
                out,
                "{}  {} {} {} = {};",
                indent,
                field.label.keyword(),
                field.ty,
                field.name,
                field.number
            );
        }
        let _ = writeln!(out, "{}}}", indent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_nested_message() {
        let mut inner = SchemaBuilder::new("Inner");
        inner.add_field(Label::Optional, FieldTypeName::Scalar(ScalarType::Bool), "flag", 1);

        let mut outer = SchemaBuilder::new("Outer");
        outer.add_field(
            Label::Repeated,
            FieldTypeName::Message("Inner".into()),
            "items",
            2,
        );
        outer.add_field(Label::Optional, FieldTypeName::Scalar(ScalarType::Int64), "id", 1);
        assert!(outer.add_nested_message(inner.clone()));
        assert!(!outer.add_nested_message(inner));

        let expected = "\
message Outer {
  message Inner {
    optional bool flag = 1;
  }

  optional int64 id = 1;
  repeated Inner items = 2;
}
";
        assert_eq!(outer.render(), expected);
        assert_eq!(outer.next_field_number(), 3);
    }

    #[test]
    #[should_panic(expected = "duplicate field number")]
    fn test_duplicate_number_panics() {
        let mut msg = SchemaBuilder::new("M");
        msg.add_field(Label::Optional, FieldTypeName::Scalar(ScalarType::Int64), "a", 1);
        msg.add_field(Label::Optional, FieldTypeName::Scalar(ScalarType::Int64), "b", 1);
    }

    #[test]
    fn test_scalar_mapping() {
        assert_eq!(ScalarType::from(PrimitiveKind::Float), ScalarType::Double);
        assert_eq!(ScalarType::from(PrimitiveKind::Byte), ScalarType::Bytes);
        assert!(ScalarType::Uint32.is_packable());
        assert!(!ScalarType::String.is_packable());
    }
}
