// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structural type descriptors.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Primitive type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    /// 64-bit signed integer.
    Int,
    /// 64-bit IEEE float.
    Float,
    #[serde(alias = "bool")]
    Boolean,
    String,
    /// Single octet. Arrays of bytes travel as one `bytes` field.
    Byte,
}

impl PrimitiveKind {
    /// Type key used in union member names and array wrapper prefixes.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Byte => "byte",
        }
    }
}

/// A structural type.
///
/// Descriptors are immutable once built and shared read-only by the
/// compiler, encoder and decoder. Self-referential records close their
/// cycle through [`TypeDescriptor::Reference`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "type", rename_all = "snake_case")]
pub enum TypeDescriptor {
    Primitive(PrimitiveKind),
    /// Arbitrary-precision decimal.
    Decimal,
    Null,
    Array(ArrayDescriptor),
    Union(UnionDescriptor),
    Record(Arc<RecordDescriptor>),
    /// String-keyed map; the payload is the value type.
    Map(Arc<TypeDescriptor>),
    /// Homogeneous row set; the payload is the row type (record or map).
    Table(Arc<TypeDescriptor>),
    Tuple(TupleDescriptor),
    /// Back-edge to a named record defined elsewhere in the same tree.
    Reference(String),
}

/// Array of `dimensions` nesting levels over `element`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayDescriptor {
    pub element: Arc<TypeDescriptor>,
    #[serde(default = "default_dimensions")]
    pub dimensions: u32,
}

fn default_dimensions() -> u32 {
    1
}

impl ArrayDescriptor {
    /// Create an array descriptor, folding nested arrays into `dimensions`.
    pub fn new(element: TypeDescriptor, dimensions: u32) -> Self {
        match element {
            TypeDescriptor::Array(inner) => Self {
                element: inner.element,
                dimensions: inner.dimensions + dimensions,
            },
            other => Self {
                element: Arc::new(other),
                dimensions,
            },
        }
    }

    /// Non-array base element and total dimension count.
    ///
    /// Descriptors deserialized from files may nest arrays explicitly, so
    /// this walks through any array elements.
    pub fn flatten(&self) -> (&TypeDescriptor, u32) {
        let mut dims = self.dimensions;
        let mut base = self.element.as_ref();
        while let TypeDescriptor::Array(inner) = base {
            dims += inner.dimensions;
            base = inner.element.as_ref();
        }
        (base, dims)
    }

    /// Type of one element: the base type, or an array one dimension lower.
    pub fn element_type(&self) -> TypeDescriptor {
        let (base, dims) = self.flatten();
        if dims <= 1 {
            base.clone()
        } else {
            TypeDescriptor::Array(Self {
                element: Arc::new(base.clone()),
                dimensions: dims - 1,
            })
        }
    }

    /// Whether this is a one-dimensional byte array (`bytes` on the wire).
    pub fn is_byte_string(&self) -> bool {
        matches!(
            self.flatten(),
            (TypeDescriptor::Primitive(PrimitiveKind::Byte), 1)
        )
    }
}

/// Order-insensitive set of member types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnionDescriptor {
    pub members: Vec<TypeDescriptor>,
}

impl UnionDescriptor {
    /// Members with nested unions inlined.
    pub fn flattened_members(&self) -> Vec<&TypeDescriptor> {
        let mut out = Vec::with_capacity(self.members.len());
        for member in &self.members {
            match member {
                TypeDescriptor::Union(inner) => out.extend(inner.flattened_members()),
                other => out.push(other),
            }
        }
        out
    }
}

/// A record type with named fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDescriptor {
    /// Record name; identity for cycle detection and collision checks.
    pub name: String,
    /// Fields, kept sorted by name.
    pub fields: BTreeMap<String, TypeDescriptor>,
    /// Structurally inferred record with no declared name.
    #[serde(default)]
    pub anonymous: bool,
}

impl RecordDescriptor {
    /// Create a named record.
    pub fn new(name: impl Into<String>, fields: BTreeMap<String, TypeDescriptor>) -> Self {
        Self {
            name: name.into(),
            fields,
            anonymous: false,
        }
    }

    /// Create an anonymous record.
    pub fn anonymous(fields: BTreeMap<String, TypeDescriptor>) -> Self {
        Self {
            name: String::new(),
            fields,
            anonymous: true,
        }
    }

    /// Get field type by name.
    pub fn field(&self, name: &str) -> Option<&TypeDescriptor> {
        self.fields.get(name)
    }
}

/// Fixed-arity positional tuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TupleDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    pub elements: Vec<TypeDescriptor>,
}

impl TypeDescriptor {
    pub fn int() -> Self {
        Self::Primitive(PrimitiveKind::Int)
    }

    pub fn float() -> Self {
        Self::Primitive(PrimitiveKind::Float)
    }

    pub fn boolean() -> Self {
        Self::Primitive(PrimitiveKind::Boolean)
    }

    pub fn string() -> Self {
        Self::Primitive(PrimitiveKind::String)
    }

    pub fn byte() -> Self {
        Self::Primitive(PrimitiveKind::Byte)
    }

    /// One-dimensional array of `element`.
    pub fn array(element: TypeDescriptor) -> Self {
        Self::Array(ArrayDescriptor::new(element, 1))
    }

    /// Array of `element` with `dimensions` nesting levels.
    pub fn array_of(element: TypeDescriptor, dimensions: u32) -> Self {
        Self::Array(ArrayDescriptor::new(element, dimensions))
    }

    pub fn union(members: Vec<TypeDescriptor>) -> Self {
        Self::Union(UnionDescriptor { members })
    }

    /// `T?`: union of `inner` and nil.
    pub fn optional(inner: TypeDescriptor) -> Self {
        Self::union(vec![inner, Self::Null])
    }

    pub fn record(record: RecordDescriptor) -> Self {
        Self::Record(Arc::new(record))
    }

    pub fn map(value: TypeDescriptor) -> Self {
        Self::Map(Arc::new(value))
    }

    pub fn table(row: TypeDescriptor) -> Self {
        Self::Table(Arc::new(row))
    }

    pub fn tuple(elements: Vec<TypeDescriptor>) -> Self {
        Self::Tuple(TupleDescriptor {
            name: None,
            elements,
        })
    }

    pub fn named_tuple(name: impl Into<String>, elements: Vec<TypeDescriptor>) -> Self {
        Self::Tuple(TupleDescriptor {
            name: Some(name.into()),
            elements,
        })
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Self::Reference(name.into())
    }

    /// Check if this is a primitive type.
    pub fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(kind) => f.write_str(kind.type_name()),
            Self::Decimal => f.write_str("decimal"),
            Self::Null => f.write_str("()"),
            Self::Array(array) => {
                let (base, dims) = array.flatten();
                write!(f, "{}", base)?;
                for _ in 0..dims {
                    f.write_str("[]")?;
                }
                Ok(())
            }
            Self::Union(union) => {
                let members = union
                    .members
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>();
                write!(f, "({})", members.join("|"))
            }
            Self::Record(record) if record.anonymous => f.write_str("record {..}"),
            Self::Record(record) => write!(f, "record {}", record.name),
            Self::Map(value) => write!(f, "map<{}>", value),
            Self::Table(row) => write!(f, "table<{}>", row),
            Self::Tuple(tuple) => {
                if let Some(name) = &tuple.name {
                    return write!(f, "tuple {}", name);
                }
                let elements = tuple
                    .elements
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>();
                write!(f, "[{}]", elements.join(", "))
            }
            Self::Reference(name) => write!(f, "record {}", name),
        }
    }
}
