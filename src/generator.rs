//! Request handling
//!
//! Decodes a CodeGeneratorRequest into a prost-reflect descriptor pool and
//! emits one contract file per requested `.proto` file that is not skipped.

use crate::codegen;
use crate::config::PluginOptions;
use crate::filter::PackageFilter;
use crate::options::RuleTable;
use crate::GeneratorError;
use prost::Message;
use prost_reflect::DescriptorPool;
use prost_types::compiler::code_generator_response::Feature;
use prost_types::compiler::CodeGeneratorResponse;

/// CodeGeneratorRequest with `proto_file` left as raw bytes
///
/// Decoding through prost-types would drop the extension fields stored in
/// descriptor options.
#[derive(Clone, PartialEq, ::prost::Message)]
struct RawCodeGeneratorRequest {
    #[prost(string, repeated, tag = "1")]
    pub file_to_generate: ::prost::alloc::vec::Vec<String>,
    #[prost(string, optional, tag = "2")]
    pub parameter: Option<String>,
    #[prost(bytes, repeated, tag = "15")]
    pub proto_file: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
struct RawFileDescriptorSet {
    #[prost(bytes, repeated, tag = "1")]
    pub file: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
}

/// Generate contracts from raw CodeGeneratorRequest bytes
pub fn generate_from_bytes(bytes: &[u8]) -> Result<CodeGeneratorResponse, GeneratorError> {
    let request = RawCodeGeneratorRequest::decode(bytes).map_err(|e| {
        GeneratorError::DecodeError(format!("Failed to decode CodeGeneratorRequest: {}", e))
    })?;

    // Options are validated before any file is looked at
    let options = PluginOptions::from_parameter(request.parameter.as_deref())?;
    let mut pool = build_descriptor_pool(&request)?;

    generate_with_pool(&mut pool, &request.file_to_generate, &options)
}

/// Generate contracts for `files_to_generate` from an already built pool
///
/// `pool` must hold the full closure of the requested files. The validation
/// extension definition is added to it when missing.
pub fn generate_with_pool(
    pool: &mut DescriptorPool,
    files_to_generate: &[String],
    options: &PluginOptions,
) -> Result<CodeGeneratorResponse, GeneratorError> {
    let filter = PackageFilter::compile(&options.skip_packages)?;
    let rules = RuleTable::load(pool)?;

    let mut files = Vec::new();
    for name in files_to_generate {
        let file = pool.get_file_by_name(name).ok_or_else(|| {
            GeneratorError::DecodeError(format!("file {} not found in request", name))
        })?;

        if filter.should_skip(&file) {
            tracing::debug!(
                file = file.name(),
                package = file.package_name(),
                "skipping file"
            );
            continue;
        }

        files.push(codegen::generate_contract(&file, options, &rules)?);
    }

    tracing::info!(
        requested = files_to_generate.len(),
        generated = files.len(),
        "generated contracts"
    );

    Ok(CodeGeneratorResponse {
        file: files,
        supported_features: Some(Feature::Proto3Optional as u64),
        ..Default::default()
    })
}

fn build_descriptor_pool(request: &RawCodeGeneratorRequest) -> Result<DescriptorPool, GeneratorError> {
    let set = RawFileDescriptorSet {
        file: request.proto_file.clone(),
    };
    DescriptorPool::decode(set.encode_to_vec().as_slice()).map_err(|e| {
        GeneratorError::DecodeError(format!("Failed to build descriptor pool: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost_types::{FileDescriptorProto, FileDescriptorSet};

    #[test]
    fn test_invalid_bytes_are_a_decode_error() {
        let err = generate_from_bytes(&[0xff, 0xff, 0xff]).unwrap_err();
        assert!(matches!(err, GeneratorError::DecodeError(_)));
    }

    #[test]
    fn test_unknown_file_to_generate() {
        let file = FileDescriptorProto {
            name: Some("present.proto".to_string()),
            syntax: Some("proto3".to_string()),
            ..Default::default()
        };
        let mut pool =
            DescriptorPool::from_file_descriptor_set(FileDescriptorSet { file: vec![file] })
                .unwrap();
        let err = generate_with_pool(
            &mut pool,
            &["missing.proto".to_string()],
            &PluginOptions::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("missing.proto"));
    }

    #[test]
    fn test_empty_request() {
        let response = generate_from_bytes(&[]).unwrap();
        assert!(response.file.is_empty());
        assert_eq!(
            response.supported_features,
            Some(Feature::Proto3Optional as u64)
        );
    }
}
