//! Interface generation for contract files
//!
//! One `export interface <Name>Input { ... }` per message. Fields are ordered
//! by field number; members of real oneofs are left out.

use crate::codegen::naming;
use crate::options::RuleTable;
use crate::types::{map_field_type, ImportRequest, TypeContext, TypeExpr};
use crate::GeneratorError;
use prost_reflect::{FieldDescriptor, MessageDescriptor};

/// A generated interface declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    /// Interface name, e.g. `UserInput`
    pub name: String,
    /// Properties in field number order
    pub fields: Vec<InterfaceField>,
}

/// One property of an interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceField {
    /// Property name
    pub name: String,
    /// Printed with a `?` marker
    pub optional: bool,
    /// Property type
    pub ty: TypeExpr,
}

/// Check if a field belongs to a oneof that is not a proto3 `optional`
pub fn is_oneof_field(field: &FieldDescriptor) -> bool {
    // Proto3 optional fields sit in a synthetic single-field oneof
    field.containing_oneof().is_some() && !field.field_descriptor_proto().proto3_optional()
}

/// Build the interface for a message
pub fn build_interface(
    message: &MessageDescriptor,
    ctx: &TypeContext<'_>,
    rules: &RuleTable,
) -> Result<Interface, GeneratorError> {
    let mut fields: Vec<FieldDescriptor> = message.fields().collect();
    fields.sort_by_key(|f| f.number());

    let mut out = Vec::with_capacity(fields.len());
    for field in fields {
        if is_oneof_field(&field) {
            tracing::trace!(field = field.full_name(), "skipping oneof member");
            continue;
        }

        // `required` has no meaning for collections
        let required = if field.is_list() || field.is_map() {
            false
        } else {
            rules.is_required(&field)
        };

        out.push(InterfaceField {
            name: naming::field_property_name(field.name()),
            optional: !required,
            ty: map_field_type(&field, ctx)?,
        });
    }

    Ok(Interface {
        name: naming::input_type_name(message),
        fields: out,
    })
}

impl Interface {
    /// Print the declaration, one line per entry, without a trailing newline
    pub fn render<F>(&self, name_of: &F) -> Vec<String>
    where
        F: Fn(&ImportRequest) -> String,
    {
        let mut lines = Vec::with_capacity(self.fields.len() + 2);
        lines.push(format!("export interface {} {{", self.name));
        for field in &self.fields {
            lines.push(format!(
                "  {}{}: {};",
                field.name,
                if field.optional { "?" } else { "" },
                field.ty.render(name_of)
            ));
        }
        lines.push("}".to_string());
        lines
    }
}
