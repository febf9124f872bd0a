// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error taxonomy shared by the compiler, encoder and decoder.

use crate::types::TypeDescriptor;
use crate::value::DecimalError;
use crate::wire::WireError;
use thiserror::Error;

/// Errors raised while compiling a schema or moving values across it.
#[derive(Debug, Error)]
pub enum Error {
    /// The type, or the position it appears in, cannot be expressed on the wire.
    ///
    /// These are permanent restrictions; retrying with the same type fails again.
    #[error("unsupported type `{type_name}`: {reason}")]
    UnsupportedType { type_name: String, reason: String },

    /// A value does not conform to the type declared at `path`.
    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    /// The generated message tree failed validation.
    #[error("schema generation failed: {0}")]
    SchemaGeneration(String),

    /// Input bytes are malformed, truncated, or do not match the schema.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// Recursion went deeper than the configured limit.
    #[error("nesting depth limit of {limit} exceeded")]
    DepthLimitExceeded { limit: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn unsupported(ty: &TypeDescriptor, reason: impl Into<String>) -> Self {
        Self::UnsupportedType {
            type_name: ty.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn mismatch(
        path: &str,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            path: path.to_string(),
            expected: expected.into(),
            found: found.into(),
        }
    }
}

impl From<WireError> for Error {
    fn from(e: WireError) -> Self {
        match e {
            WireError::DepthExceeded { limit } => Self::DepthLimitExceeded { limit },
            other => Self::Deserialization(other.to_string()),
        }
    }
}

impl From<DecimalError> for Error {
    fn from(e: DecimalError) -> Self {
        Self::Deserialization(e.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
