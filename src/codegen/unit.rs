//! Generation units
//!
//! A [`GenerationUnit`] is the contract file for one `.proto` file. Interfaces
//! are pushed in output order; imports are only resolved in [`GenerationUnit::finish`],
//! once every locally declared name is known.

use crate::codegen::imports::ImportTable;
use crate::codegen::interface::Interface;
use crate::codegen::naming;
use crate::config::PluginOptions;
use crate::types::ImportRequest;
use crate::GeneratorError;
use prost_reflect::FileDescriptor;
use prost_types::compiler::code_generator_response::File;

/// Name printed in the `@generated by` header
pub const PLUGIN_NAME: &str = "protoc-gen-ts-contract";

/// Version printed in the `@generated by` header
pub const PLUGIN_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Contract file under construction
#[derive(Debug)]
pub struct GenerationUnit {
    name: String,
    preamble: Vec<String>,
    declarations: Vec<Interface>,
}

impl GenerationUnit {
    /// Open the unit for `file`
    pub fn new(file: &FileDescriptor, options: &PluginOptions) -> Result<Self, GeneratorError> {
        Ok(Self {
            name: naming::contract_file_name(file.name())?,
            preamble: preamble(file, options),
            declarations: Vec::new(),
        })
    }

    /// Output file name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append an interface declaration
    pub fn push(&mut self, interface: Interface) {
        self.declarations.push(interface);
    }

    /// Resolve imports and render the file
    pub fn finish(self) -> File {
        let mut imports = ImportTable::new(self.declarations.iter().map(|d| d.name.clone()));
        for declaration in &self.declarations {
            for field in &declaration.fields {
                for request in field.ty.imports() {
                    imports.request(request);
                }
            }
        }

        let mut lines = self.preamble;
        if !imports.is_empty() {
            lines.push(String::new());
            lines.extend(imports.render());
        }

        let name_of = |request: &ImportRequest| imports.local_name(request);
        for declaration in &self.declarations {
            // Separator goes before each block so the file never ends with one
            lines.push(String::new());
            lines.extend(declaration.render(&name_of));
        }

        let mut content = lines.join("\n");
        content.push('\n');

        File {
            name: Some(self.name),
            content: Some(content),
            ..Default::default()
        }
    }
}

fn preamble(file: &FileDescriptor, options: &PluginOptions) -> Vec<String> {
    let generated_by = match &options.parameter {
        Some(parameter) => format!(
            "// @generated by {} v{} with parameter \"{}\"",
            PLUGIN_NAME, PLUGIN_VERSION, parameter
        ),
        None => format!("// @generated by {} v{}", PLUGIN_NAME, PLUGIN_VERSION),
    };

    let syntax = match file.file_descriptor_proto().syntax.as_deref() {
        None | Some("") => "proto2",
        Some(syntax) => syntax,
    };
    let source = if file.package_name().is_empty() {
        format!("// @generated from file {} (syntax {})", file.name(), syntax)
    } else {
        format!(
            "// @generated from file {} (package {}, syntax {})",
            file.name(),
            file.package_name(),
            syntax
        )
    };

    vec![generated_by, source, "/* eslint-disable */".to_string()]
}
