//! Code generation modules for TypeScript contracts
//!
//! This module contains the code generation logic for creating
//! `*.contract.ts` files from Protocol Buffer files.

pub mod imports;
pub mod interface;
pub mod naming;
pub mod unit;

use crate::config::PluginOptions;
use crate::filter::select_messages;
use crate::options::RuleTable;
use crate::types::TypeContext;
use crate::GeneratorError;
use prost_reflect::FileDescriptor;
use prost_types::compiler::code_generator_response::File;

/// Generate the contract file for one `.proto` file
pub fn generate_contract(
    file: &FileDescriptor,
    options: &PluginOptions,
    rules: &RuleTable,
) -> Result<File, GeneratorError> {
    let mut unit = unit::GenerationUnit::new(file, options)?;
    let ctx = TypeContext {
        file,
        pb_out: &options.pb_out,
    };

    for message in select_messages(file) {
        unit.push(interface::build_interface(&message, &ctx, rules)?);
    }

    tracing::debug!(file = file.name(), output = unit.name(), "generated contract");
    Ok(unit.finish())
}
