//! protoc-gen-ts-contract - A protoc plugin for generating TypeScript input contracts
//!
//! This binary reads a CodeGeneratorRequest from stdin and writes a
//! CodeGeneratorResponse to stdout, following the protoc plugin protocol.

use prost::Message;
use prost_types::compiler::CodeGeneratorResponse;
use std::io::{self, Read, Write};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (EnvFilter syntax)
const LOG_ENV: &str = "PROTOC_GEN_TS_CONTRACT_LOG";

fn main() {
    // stdout carries the response, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    if let Err(e) = run() {
        eprintln!("protoc-gen-ts-contract: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut buf = Vec::new();
    io::stdin().read_to_end(&mut buf)?;

    // Generation errors are reported to protoc through the response
    let response =
        protoc_gen_ts_contract::generate_from_bytes(&buf).unwrap_or_else(|e| {
            tracing::error!("{}", e);
            CodeGeneratorResponse {
                error: Some(e.to_string()),
                ..Default::default()
            }
        });

    for f in &response.file {
        tracing::debug!("wrote {}", f.name.as_deref().unwrap_or("<unnamed>"));
    }

    let mut out = Vec::new();
    response.encode(&mut out)?;
    io::stdout().write_all(&out)?;

    Ok(())
}
