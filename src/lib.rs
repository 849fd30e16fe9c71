//! protoc-gen-ts-contract library
//!
//! This crate provides the code generation logic for converting Protocol Buffer
//! definitions into TypeScript input contract interfaces. Each generated
//! `*.contract.ts` file mirrors the messages of one `.proto` file as plain
//! `export interface` declarations, with field optionality taken from
//! `(buf.validate.field).required`.

#![deny(missing_docs)]
#![deny(warnings)]

pub mod codegen;
pub mod config;
pub mod filter;
pub mod generator;
pub mod options;
pub mod types;

use prost::Message;
use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse};
use thiserror::Error;

/// Errors that can occur during code generation
///
/// Every variant is fatal for the whole run.
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// Invalid plugin configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A computed output path would escape the output root
    #[error("refusing to generate contract outside package boundary: {0}")]
    BoundaryViolation(String),

    /// The validation extension could not be located
    #[error("missing required extension {0}; ensure buf.build/bufbuild/protovalidate is available")]
    MissingExtension(String),

    /// Encountered a field kind the generator does not handle
    #[error("unsupported field kind {0}")]
    UnsupportedFieldKind(String),

    /// Failed to decode the request or build the descriptor pool
    #[error("Decode error: {0}")]
    DecodeError(String),
}

/// Generate contract files from a decoded protobuf CodeGeneratorRequest
///
/// prost-types drops custom options while decoding, so any
/// `(buf.validate.field)` annotations are already gone by the time the request
/// reaches this function. Prefer [`generate_from_bytes`] when the raw request
/// is available.
pub fn generate(request: CodeGeneratorRequest) -> Result<CodeGeneratorResponse, GeneratorError> {
    generator::generate_from_bytes(&request.encode_to_vec())
}

/// Generate contract files from raw CodeGeneratorRequest bytes
///
/// This entry point preserves extension data by using prost-reflect for decoding.
pub fn generate_from_bytes(bytes: &[u8]) -> Result<CodeGeneratorResponse, GeneratorError> {
    generator::generate_from_bytes(bytes)
}
