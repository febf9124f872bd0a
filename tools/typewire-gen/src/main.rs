// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! typewire-gen - .proto schemas and wire payloads for structural types.
//!
//! Usage:
//!   typewire-gen schema --type order.yaml --output order.proto
//!   typewire-gen encode --type order.yaml --value order.json --output order.bin
//!   typewire-gen decode --type order.yaml --input order.bin

mod json;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};
use typewire::{CodecConfig, ProtoSerdes, TypeDescriptor};

#[derive(Parser, Debug)]
#[command(name = "typewire-gen")]
#[command(about = "Compile structural types to protobuf schemas and encode/decode values")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Codec configuration file (YAML)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print or write the .proto schema of a type
    Schema {
        /// Type description (YAML, or JSON with a .json extension)
        #[arg(short = 't', long = "type", value_name = "FILE")]
        type_file: PathBuf,

        /// Output .proto file, or a directory to write <Root>.proto into
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Encode a JSON value to wire bytes
    Encode {
        /// Type description (YAML, or JSON with a .json extension)
        #[arg(short = 't', long = "type", value_name = "FILE")]
        type_file: PathBuf,

        /// JSON value conforming to the type
        #[arg(long, value_name = "FILE")]
        value: PathBuf,

        /// Output file for the encoded bytes
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Decode wire bytes and print the value as JSON
    Decode {
        /// Type description (YAML, or JSON with a .json extension)
        #[arg(short = 't', long = "type", value_name = "FILE")]
        type_file: PathBuf,

        /// Encoded input file
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("typewire_gen=debug,typewire=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("typewire_gen=info"))
    };
    fmt().with_env_filter(filter).with_target(false).init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Schema { type_file, output } => {
            let serdes = load_serdes(&type_file, config)?;
            match output {
                Some(path) => {
                    let written = serdes
                        .write_proto_file(&path)
                        .with_context(|| format!("Failed to write schema to {}", path.display()))?;
                    info!("Schema written to {}", written.display());
                }
                None => print!("{}", serdes.proto_text()),
            }
        }
        Commands::Encode {
            type_file,
            value,
            output,
        } => {
            let serdes = load_serdes(&type_file, config)?;
            let size = cmd_encode(&serdes, &value, &output)?;
            info!("Encoded {} bytes to {}", size, output.display());
        }
        Commands::Decode { type_file, input } => {
            let serdes = load_serdes(&type_file, config)?;
            let decoded = cmd_decode(&serdes, &input)?;
            println!("{}", serde_json::to_string_pretty(&decoded)?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<CodecConfig> {
    let Some(path) = path else {
        return Ok(CodecConfig::default());
    };
    let config = CodecConfig::from_file(path)
        .with_context(|| format!("Failed to load config {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config {}", path.display()))?;
    debug!(max_depth = config.max_depth, package = ?config.package, "Loaded codec config");
    Ok(config)
}

fn load_type(path: &Path) -> Result<TypeDescriptor> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read type description {}", path.display()))?;
    let is_json = path.extension().is_some_and(|ext| ext == "json");
    let ty = if is_json {
        serde_json::from_str(&content).context("Failed to parse JSON type description")?
    } else {
        serde_yaml::from_str(&content).context("Failed to parse YAML type description")?
    };
    Ok(ty)
}

fn load_serdes(type_file: &Path, config: CodecConfig) -> Result<ProtoSerdes> {
    let ty = load_type(type_file)?;
    debug!(type_name = %ty, "Compiling schema");
    ProtoSerdes::with_config(ty, config).context("Failed to compile schema")
}

fn cmd_encode(serdes: &ProtoSerdes, value_file: &Path, output: &Path) -> Result<usize> {
    let content = fs::read_to_string(value_file)
        .with_context(|| format!("Failed to read value {}", value_file.display()))?;
    let document: serde_json::Value =
        serde_json::from_str(&content).context("Failed to parse JSON value")?;
    let value = json::JsonReader::new(serdes.schema().records())
        .read(serdes.type_descriptor(), &document)
        .context("Value does not match the type")?;
    let bytes = serdes.serialize(&value).context("Failed to encode value")?;
    fs::write(output, &bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(bytes.len())
}

fn cmd_decode(serdes: &ProtoSerdes, input: &Path) -> Result<serde_json::Value> {
    let bytes =
        fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let value = serdes
        .deserialize(&bytes)
        .with_context(|| format!("Failed to decode {}", input.display()))?;
    Ok(json::to_json(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ORDER_TYPE: &str = r#"
kind: record
type:
  name: Order
  fields:
    id: { kind: primitive, type: int }
    total: { kind: decimal }
    note:
      kind: union
      type:
        members:
          - { kind: primitive, type: string }
          - { kind: "null" }
    lines:
      kind: table
      type:
        kind: record
        type:
          name: Line
          fields:
            sku: { kind: primitive, type: string }
            qty: { kind: primitive, type: int }
"#;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).expect("write fixture");
        path
    }

    #[test]
    fn test_encode_then_decode_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let type_file = write(dir.path(), "order.yaml", ORDER_TYPE);
        let doc = json!({
            "id": 7,
            "total": "12.50",
            "lines": [{ "sku": "A-1", "qty": 2 }, { "sku": "B-2", "qty": 0 }]
        });
        let value_file = write(dir.path(), "order.json", &doc.to_string());
        let output = dir.path().join("order.bin");

        let serdes = load_serdes(&type_file, CodecConfig::default()).expect("serdes");
        let size = cmd_encode(&serdes, &value_file, &output).expect("encode");
        assert_eq!(fs::metadata(&output).expect("output").len() as usize, size);

        let decoded = cmd_decode(&serdes, &output).expect("decode");
        assert_eq!(
            decoded,
            json!({
                "id": 7,
                "total": "12.50",
                "note": null,
                "lines": [{ "sku": "A-1", "qty": 2 }, { "sku": "B-2", "qty": 0 }]
            })
        );
    }

    #[test]
    fn test_schema_with_config_package() {
        let dir = tempfile::tempdir().expect("tempdir");
        let type_file = write(dir.path(), "order.yaml", ORDER_TYPE);
        let config_file = write(dir.path(), "codec.yaml", "package: shop.v1\nmax_depth: 16\n");

        let config = load_config(Some(&config_file)).expect("config");
        assert_eq!(config.max_depth, 16);
        let serdes = load_serdes(&type_file, config).expect("serdes");
        let written = serdes.write_proto_file(dir.path()).expect("write schema");
        assert_eq!(written, dir.path().join("Order.proto"));

        let text = fs::read_to_string(written).expect("read schema");
        assert!(text.contains("package shop.v1;"));
        assert!(text.contains("repeated Line table_entry = 1;"));
    }

    #[test]
    fn test_json_type_description() {
        let dir = tempfile::tempdir().expect("tempdir");
        let type_file = write(
            dir.path(),
            "grid.json",
            r#"{ "kind": "array", "type": { "element": { "kind": "primitive", "type": "int" }, "dimensions": 2 } }"#,
        );
        let serdes = load_serdes(&type_file, CodecConfig::default()).expect("serdes");
        assert!(serdes.proto_text().contains("message ArrayBuilder_2 {"));
    }

    #[test]
    fn test_invalid_inputs_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bad_config = write(dir.path(), "codec.yaml", "max_depth: 0\n");
        assert!(load_config(Some(&bad_config)).is_err());

        let type_file = write(dir.path(), "order.yaml", ORDER_TYPE);
        let serdes = load_serdes(&type_file, CodecConfig::default()).expect("serdes");
        let garbage = write(dir.path(), "bad.bin", "\u{7f}\u{7f}\u{7f}");
        assert!(cmd_decode(&serdes, &garbage).is_err());

        let wrong = write(dir.path(), "wrong.json", r#"{ "id": "seven" }"#);
        let err = cmd_encode(&serdes, &wrong, &dir.path().join("out.bin")).expect_err("mismatch");
        assert!(format!("{:#}", err).contains("$.id"));
    }
}
