//! Plugin parameter parsing
//!
//! protoc passes plugin options as a single comma separated parameter string,
//! e.g. `--ts-contract_opt=skip_pkg=google.*,pb_out=../gen`. This module splits
//! that string into key/value pairs and validates them into [`PluginOptions`].

use crate::GeneratorError;
use std::path::Path;

/// Packages skipped when no `skip_pkg` option is given
pub const DEFAULT_SKIP_PACKAGES: &[&str] = &["google.*", "buf.*"];

/// Default location of the protobuf-es runtime shapes, relative to the output root
pub const DEFAULT_PB_OUT: &str = ".";

const SKIP_PACKAGE_OPTION: &str = "skip_pkg";
const PB_OUT_OPTION: &str = "pb_out";

/// A single `key=value` pair from the parameter string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOption {
    /// Option name
    pub key: String,
    /// Option value, empty when the pair had no `=`
    pub value: String,
}

/// Validated plugin options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginOptions {
    /// Package globs whose files produce no output
    pub skip_packages: Vec<String>,
    /// Base path of the `*_pb` runtime shapes, relative to the output root
    pub pb_out: String,
    /// The parameter string as received, echoed in the generated preamble
    pub parameter: Option<String>,
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            skip_packages: DEFAULT_SKIP_PACKAGES.iter().map(|s| s.to_string()).collect(),
            pb_out: DEFAULT_PB_OUT.to_string(),
            parameter: None,
        }
    }
}

impl PluginOptions {
    /// Parse options from the raw protoc parameter string
    pub fn from_parameter(parameter: Option<&str>) -> Result<Self, GeneratorError> {
        let raw = parameter.map(split_parameter).unwrap_or_default();
        let mut options = parse_options(&raw)?;
        options.parameter = parameter.filter(|p| !p.is_empty()).map(|p| p.to_string());
        Ok(options)
    }
}

/// Split a parameter string into key/value pairs
///
/// Pairs are separated by `,` and split on the first `=`.
pub fn split_parameter(parameter: &str) -> Vec<RawOption> {
    parameter
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| match part.split_once('=') {
            Some((key, value)) => RawOption {
                key: key.trim().to_string(),
                value: value.to_string(),
            },
            None => RawOption {
                key: part.trim().to_string(),
                value: String::new(),
            },
        })
        .collect()
}

/// Validate raw key/value pairs into [`PluginOptions`]
///
/// Supported options:
/// - `skip_pkg=<glob>`: skip files whose package matches. Repeatable; if
///   omitted, defaults to [`DEFAULT_SKIP_PACKAGES`].
/// - `pb_out=<path>`: relative location of the protobuf-es `*_pb` files.
///
/// Unknown options are collected and reported together.
pub fn parse_options(raw: &[RawOption]) -> Result<PluginOptions, GeneratorError> {
    let mut skip_packages: Vec<String> = Vec::new();
    let mut pb_out: Option<String> = None;
    let mut unknown: Vec<String> = Vec::new();

    for RawOption { key, value } in raw {
        match key.as_str() {
            SKIP_PACKAGE_OPTION => {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(GeneratorError::InvalidConfig(format!(
                        "{} requires a non-empty value",
                        SKIP_PACKAGE_OPTION
                    )));
                }
                if !skip_packages.iter().any(|p| p == trimmed) {
                    skip_packages.push(trimmed.to_string());
                }
            }
            PB_OUT_OPTION => {
                if pb_out.is_some() {
                    return Err(GeneratorError::InvalidConfig(format!(
                        "{} may only be given once",
                        PB_OUT_OPTION
                    )));
                }
                pb_out = Some(validate_pb_out(value)?);
            }
            _ => unknown.push(if value.is_empty() {
                key.clone()
            } else {
                format!("{}={}", key, value)
            }),
        }
    }

    if !unknown.is_empty() {
        return Err(GeneratorError::InvalidConfig(format!(
            "unknown option(s): {}",
            unknown.join(", ")
        )));
    }

    let defaults = PluginOptions::default();
    Ok(PluginOptions {
        skip_packages: if skip_packages.is_empty() {
            defaults.skip_packages
        } else {
            skip_packages
        },
        pb_out: pb_out.unwrap_or(defaults.pb_out),
        parameter: None,
    })
}

fn validate_pb_out(value: &str) -> Result<String, GeneratorError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(GeneratorError::InvalidConfig(format!(
            "{} requires a non-empty value",
            PB_OUT_OPTION
        )));
    }
    if trimmed.starts_with('/') || Path::new(trimmed).is_absolute() {
        return Err(GeneratorError::InvalidConfig(format!(
            "{} must be a relative path, got {}",
            PB_OUT_OPTION, trimmed
        )));
    }
    Ok(trimmed.to_string())
}
