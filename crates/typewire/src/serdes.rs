// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type-bound serializer/deserializer.
//!
//! [`ProtoSerdes`] compiles its type once and reuses the frozen schema for
//! every call. The schema is never mutated afterwards, so one instance can
//! be shared across threads behind an `Arc`.

use crate::codec::{Decoder, Encoder};
use crate::config::CodecConfig;
use crate::error::Result;
use crate::schema::{Schema, SchemaCompiler};
use crate::types::TypeDescriptor;
use crate::value::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Compile `ty` into a frozen wire schema with the default configuration.
pub fn generate_schema(ty: &TypeDescriptor) -> Result<Schema> {
    SchemaCompiler::new(&CodecConfig::default()).compile(ty)
}

/// Serializer and deserializer bound to one type.
#[derive(Debug)]
pub struct ProtoSerdes {
    ty: TypeDescriptor,
    config: CodecConfig,
    schema: Schema,
}

impl ProtoSerdes {
    /// Bind to `ty` with the default configuration.
    pub fn new(ty: TypeDescriptor) -> Result<Self> {
        Self::with_config(ty, CodecConfig::default())
    }

    /// Bind to `ty`; compiles the schema immediately.
    pub fn with_config(ty: TypeDescriptor, config: CodecConfig) -> Result<Self> {
        let schema = SchemaCompiler::new(&config).compile(&ty)?;
        Ok(Self { ty, config, schema })
    }

    pub fn type_descriptor(&self) -> &TypeDescriptor {
        &self.ty
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Encode a value of the bound type.
    pub fn serialize(&self, value: &Value) -> Result<Vec<u8>> {
        Encoder::new(&self.schema, &self.config).encode(&self.ty, value)
    }

    /// Decode bytes produced for the bound type.
    pub fn deserialize(&self, bytes: &[u8]) -> Result<Value> {
        Decoder::new(&self.schema, &self.config).decode(&self.ty, bytes)
    }

    /// Full `.proto` file text for the bound type.
    pub fn proto_text(&self) -> String {
        self.schema.to_proto_file()
    }

    /// Write the `.proto` text to `path`.
    ///
    /// When `path` is an existing directory the file is named after the
    /// root message (`<Root>.proto`). Returns the path written.
    pub fn write_proto_file(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        let target = if path.is_dir() {
            path.join(format!("{}.proto", self.schema.root_descriptor().name()))
        } else {
            path.to_path_buf()
        };
        fs::write(&target, self.proto_text())?;
        log::debug!("[typewire::serdes] wrote schema to {}", target.display());
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::RecordBuilder;

    #[test]
    fn test_generate_schema() {
        let schema = generate_schema(&TypeDescriptor::string()).expect("schema");
        assert_eq!(schema.root_descriptor().name(), "StringValue");
    }

    #[test]
    fn test_serdes_reuses_schema() {
        let ty = RecordBuilder::new("Counter")
            .field("hits", TypeDescriptor::int())
            .build();
        let serdes = ProtoSerdes::new(ty).expect("serdes");
        for hits in [0, 1, -7, i64::MAX] {
            let value = Value::record([("hits", Value::Int(hits))]);
            let bytes = serdes.serialize(&value).expect("serialize");
            assert_eq!(serdes.deserialize(&bytes).expect("deserialize"), value);
        }
    }

    #[test]
    fn test_write_proto_file_into_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = CodecConfig::default().with_package("demo.types");
        let serdes = ProtoSerdes::with_config(TypeDescriptor::int(), config).expect("serdes");

        let written = serdes.write_proto_file(dir.path()).expect("write");
        assert_eq!(written, dir.path().join("IntValue.proto"));
        let text = fs::read_to_string(&written).expect("read back");
        assert!(text.starts_with("syntax = \"proto3\";\n\npackage demo.types;\n\n"));
        assert!(text.contains("message IntValue {"));
    }

    #[test]
    fn test_write_proto_file_missing_dir_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let serdes = ProtoSerdes::new(TypeDescriptor::int()).expect("serdes");
        let err = serdes
            .write_proto_file(dir.path().join("missing").join("x.proto"))
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
