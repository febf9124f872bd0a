// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Value encoder and decoder.
//!
//! Both walk the type descriptor in the same order and with the same
//! naming as [`SchemaCompiler`](crate::schema::SchemaCompiler), so every
//! value lands in the field the schema declared for it.

mod decoder;
mod encoder;

pub use decoder::Decoder;
pub use encoder::Encoder;

use crate::error::{Error, Result};
use crate::naming::ParentKind;

/// Field being written or read: name, structural position, cardinality.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FieldSlot<'n> {
    pub name: &'n str,
    pub parent: ParentKind,
    pub repeated: bool,
}

impl<'n> FieldSlot<'n> {
    pub fn new(name: &'n str, parent: ParentKind) -> Self {
        Self {
            name,
            parent,
            repeated: false,
        }
    }

    pub fn as_repeated(self) -> Self {
        Self {
            repeated: true,
            ..self
        }
    }
}

pub(crate) fn descend(depth: usize, limit: usize) -> Result<usize> {
    if depth >= limit {
        return Err(Error::DepthLimitExceeded { limit });
    }
    Ok(depth + 1)
}
