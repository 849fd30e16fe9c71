//! Field validation options
//!
//! This module reads the protovalidate `(buf.validate.field)` extension from
//! field descriptors. Only the `required` rule matters here: it decides whether
//! a contract property is emitted with or without the `?` marker.
//!
//! Custom protobuf extensions are stored as extension fields in the options
//! messages. We use prost-reflect to decode them against the request's
//! descriptor pool. When the request does not include
//! `buf/validate/validate.proto`, a minimal definition of the extension is
//! added to the pool so that the lookup still resolves.

use crate::GeneratorError;
use once_cell::sync::Lazy;
use prost_reflect::{DescriptorPool, ExtensionDescriptor, FieldDescriptor, Value};
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{DescriptorProto, FieldDescriptorProto, FileDescriptorProto};
use std::collections::HashMap;

/// Fully qualified name of the protovalidate field extension
pub const FIELD_EXTENSION_NAME: &str = "buf.validate.field";

/// File that declares the protovalidate extensions
const VALIDATE_FILE_NAME: &str = "buf/validate/validate.proto";

/// Dependency of the validate file that declares `google.protobuf.FieldOptions`
const DESCRIPTOR_FILE_NAME: &str = "google/protobuf/descriptor.proto";

/// Extension field number of `(buf.validate.field)`
const FIELD_EXTENSION_NUMBER: i32 = 1159;

/// Field number of `FieldRules.required`
const REQUIRED_FIELD_NUMBER: i32 = 25;

/// Minimal `buf/validate/validate.proto`: `FieldRules.required` and the
/// `field` extension on `google.protobuf.FieldOptions`
static VALIDATE_FILE: Lazy<FileDescriptorProto> = Lazy::new(|| FileDescriptorProto {
    name: Some(VALIDATE_FILE_NAME.to_string()),
    package: Some("buf.validate".to_string()),
    dependency: vec![DESCRIPTOR_FILE_NAME.to_string()],
    message_type: vec![DescriptorProto {
        name: Some("FieldRules".to_string()),
        field: vec![FieldDescriptorProto {
            name: Some("required".to_string()),
            number: Some(REQUIRED_FIELD_NUMBER),
            label: Some(Label::Optional.into()),
            r#type: Some(Type::Bool.into()),
            json_name: Some("required".to_string()),
            ..Default::default()
        }],
        ..Default::default()
    }],
    extension: vec![FieldDescriptorProto {
        name: Some("field".to_string()),
        number: Some(FIELD_EXTENSION_NUMBER),
        label: Some(Label::Optional.into()),
        r#type: Some(Type::Message.into()),
        type_name: Some(".buf.validate.FieldRules".to_string()),
        extendee: Some(".google.protobuf.FieldOptions".to_string()),
        json_name: Some("field".to_string()),
        ..Default::default()
    }],
    syntax: Some("proto2".to_string()),
    ..Default::default()
});

/// Required flags for every field in the pool that carries `(buf.validate.field)`
///
/// Keyed by fully qualified message name and field number. Built once per run
/// and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    required: HashMap<String, HashMap<u32, bool>>,
}

impl RuleTable {
    /// Scan every field in `pool` for the validation extension
    ///
    /// Adds the bundled extension definition to `pool` when the request did
    /// not carry one.
    pub fn load(pool: &mut DescriptorPool) -> Result<Self, GeneratorError> {
        let extension = resolve_field_extension(pool)?;

        let mut table = RuleTable::default();
        for message in pool.all_messages() {
            for field in message.fields() {
                let options = field.options();
                if !options.has_extension(&extension) {
                    continue;
                }
                let required = convert_to_required(&options.get_extension(&extension));
                table.insert(message.full_name(), field.number(), required);
            }
        }

        tracing::debug!(
            messages = table.required.len(),
            "loaded {} rules",
            FIELD_EXTENSION_NAME
        );
        Ok(table)
    }

    /// Record the `required` rule of a field
    pub fn insert(&mut self, message: &str, field_number: u32, required: bool) {
        self.required
            .entry(message.to_string())
            .or_default()
            .insert(field_number, required);
    }

    /// Whether the field is marked `(buf.validate.field).required = true`
    ///
    /// Fields without the extension are not required.
    pub fn is_required(&self, field: &FieldDescriptor) -> bool {
        self.required
            .get(field.parent_message().full_name())
            .and_then(|fields| fields.get(&field.number()))
            .copied()
            .unwrap_or(false)
    }
}

/// Locate `(buf.validate.field)` in the pool, adding the bundled definition if needed
fn resolve_field_extension(pool: &mut DescriptorPool) -> Result<ExtensionDescriptor, GeneratorError> {
    if let Some(extension) = pool.get_extension_by_name(FIELD_EXTENSION_NAME) {
        return Ok(extension);
    }

    add_bundled_validate_file(pool).map_err(|e| {
        tracing::warn!("could not add bundled {}: {}", VALIDATE_FILE_NAME, e);
        GeneratorError::MissingExtension(FIELD_EXTENSION_NAME.to_string())
    })?;

    pool.get_extension_by_name(FIELD_EXTENSION_NAME)
        .ok_or_else(|| GeneratorError::MissingExtension(FIELD_EXTENSION_NAME.to_string()))
}

fn add_bundled_validate_file(pool: &mut DescriptorPool) -> Result<(), String> {
    if pool.get_file_by_name(DESCRIPTOR_FILE_NAME).is_none() {
        let descriptor_file = DescriptorPool::global()
            .get_file_by_name(DESCRIPTOR_FILE_NAME)
            .ok_or_else(|| format!("{} not available", DESCRIPTOR_FILE_NAME))?;
        pool.add_file_descriptor_proto(descriptor_file.file_descriptor_proto().clone())
            .map_err(|e| e.to_string())?;
    }

    tracing::debug!("request has no {}, using bundled definition", VALIDATE_FILE_NAME);
    pool.add_file_descriptor_proto(VALIDATE_FILE.clone())
        .map_err(|e| e.to_string())
}

/// Read `required` from a decoded `FieldRules` value
///
/// A missing or false value both mean "not required".
fn convert_to_required(value: &Value) -> bool {
    let Some(rules) = value.as_message() else {
        return false;
    };

    if let Some(cow) = rules.get_field_by_name("required") {
        if let Value::Bool(b) = cow.as_ref() {
            return *b;
        }
    }

    false
}
