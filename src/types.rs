//! Type mapping from protobuf to TypeScript
//!
//! Maps field descriptors to [`TypeExpr`] values. A `TypeExpr` describes the
//! printed type and carries the imports it needs; the generation unit collects
//! those imports afterwards, so mapping a field never mutates shared state.

use crate::codegen::naming;
use crate::GeneratorError;
use prost_reflect::{EnumDescriptor, FieldDescriptor, FileDescriptor, Kind, MessageDescriptor};

/// Module that exports the protobuf-es well-known types
pub const WKT_MODULE: &str = "@bufbuild/protobuf/wkt";

/// Package of the protobuf well-known types
const WKT_PACKAGE: &str = "google.protobuf";

/// Well-known messages exported by [`WKT_MODULE`] under their own name
const WELL_KNOWN_MESSAGES: &[&str] = &[
    "Any",
    "Duration",
    "Empty",
    "FieldMask",
    "Struct",
    "Value",
    "ListValue",
    "Timestamp",
    "DoubleValue",
    "FloatValue",
    "Int64Value",
    "UInt64Value",
    "Int32Value",
    "UInt32Value",
    "BoolValue",
    "StringValue",
    "BytesValue",
];

/// A symbol that has to be imported for a type expression to resolve
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportRequest {
    /// Exported name in the target module
    pub symbol: String,
    /// Module specifier, e.g. `./user_pb` or `@bufbuild/protobuf/wkt`
    pub module: String,
}

/// A printable TypeScript type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// A primitive such as `string` or `bigint`
    Scalar(&'static str),
    /// A type declared in the same contract file
    Local(String),
    /// A type imported from another module
    Import(ImportRequest),
    /// `T[]`
    List(Box<TypeExpr>),
    /// `Record<string, T>`
    Record(Box<TypeExpr>),
}

impl TypeExpr {
    /// All imports this expression depends on, outermost first
    pub fn imports(&self) -> Vec<&ImportRequest> {
        match self {
            TypeExpr::Scalar(_) | TypeExpr::Local(_) => Vec::new(),
            TypeExpr::Import(request) => vec![request],
            TypeExpr::List(inner) | TypeExpr::Record(inner) => inner.imports(),
        }
    }

    /// Print the expression, asking `name_of` for the local name of each import
    pub fn render<F>(&self, name_of: &F) -> String
    where
        F: Fn(&ImportRequest) -> String,
    {
        match self {
            TypeExpr::Scalar(name) => name.to_string(),
            TypeExpr::Local(name) => name.clone(),
            TypeExpr::Import(request) => name_of(request),
            TypeExpr::List(inner) => format!("{}[]", inner.render(name_of)),
            TypeExpr::Record(inner) => format!("Record<string, {}>", inner.render(name_of)),
        }
    }
}

/// Shape of a field as far as type mapping is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Singular scalar
    Scalar,
    /// Singular enum
    Enum,
    /// Singular message
    Message,
    /// Repeated, non-map
    List,
    /// `map<K, V>`
    Map,
}

impl FieldKind {
    /// Classify a field
    ///
    /// Unknown raw type tags never get this far: the descriptor pool rejects
    /// them while it is being built.
    pub fn of(field: &FieldDescriptor) -> Self {
        if field.is_map() {
            return FieldKind::Map;
        }
        if field.is_list() {
            return FieldKind::List;
        }
        match field.kind() {
            Kind::Message(_) => FieldKind::Message,
            Kind::Enum(_) => FieldKind::Enum,
            _ => FieldKind::Scalar,
        }
    }
}

/// Where the generated file lives and where the runtime shapes live
#[derive(Debug, Clone, Copy)]
pub struct TypeContext<'a> {
    /// The `.proto` file whose contract is being generated
    pub file: &'a FileDescriptor,
    /// Base path of the `*_pb` runtime shapes, relative to the output root
    pub pb_out: &'a str,
}

/// Map a field to its TypeScript type
pub fn map_field_type(
    field: &FieldDescriptor,
    ctx: &TypeContext<'_>,
) -> Result<TypeExpr, GeneratorError> {
    match FieldKind::of(field) {
        FieldKind::Scalar | FieldKind::Enum | FieldKind::Message => {
            map_value_type(&field.kind(), ctx)
        }
        FieldKind::List => Ok(TypeExpr::List(Box::new(map_value_type(&field.kind(), ctx)?))),
        FieldKind::Map => {
            let kind = field.kind();
            let entry = kind.as_message().ok_or_else(|| {
                GeneratorError::UnsupportedFieldKind(format!(
                    "map field {} without entry message",
                    field.full_name()
                ))
            })?;
            // Keys are always printed as strings, whatever their declared scalar.
            let value = entry.map_entry_value_field();
            Ok(TypeExpr::Record(Box::new(map_value_type(&value.kind(), ctx)?)))
        }
    }
}

/// Map a single (non-collection) value kind
fn map_value_type(kind: &Kind, ctx: &TypeContext<'_>) -> Result<TypeExpr, GeneratorError> {
    match kind {
        Kind::Message(message) => message_input_reference(message, ctx),
        Kind::Enum(enum_desc) => Ok(enum_reference(enum_desc, ctx)),
        scalar => scalar_type(scalar)
            .map(TypeExpr::Scalar)
            .ok_or_else(|| GeneratorError::UnsupportedFieldKind(format!("{:?}", scalar))),
    }
}

/// TypeScript type of a protobuf scalar, as protobuf-es prints it
pub fn scalar_type(kind: &Kind) -> Option<&'static str> {
    match kind {
        Kind::Double
        | Kind::Float
        | Kind::Int32
        | Kind::Uint32
        | Kind::Sint32
        | Kind::Fixed32
        | Kind::Sfixed32 => Some("number"),
        Kind::Int64 | Kind::Uint64 | Kind::Sint64 | Kind::Fixed64 | Kind::Sfixed64 => {
            Some("bigint")
        }
        Kind::Bool => Some("boolean"),
        Kind::String => Some("string"),
        Kind::Bytes => Some("Uint8Array"),
        Kind::Message(_) | Kind::Enum(_) => None,
    }
}

/// Enums are not redeclared in contracts; they come from the `*_pb` module
fn enum_reference(enum_desc: &EnumDescriptor, ctx: &TypeContext<'_>) -> TypeExpr {
    TypeExpr::Import(ImportRequest {
        symbol: naming::enum_type_name(enum_desc),
        module: naming::runtime_import_path(
            ctx.file.name(),
            enum_desc.parent_file().name(),
            ctx.pb_out,
        ),
    })
}

/// Reference the contract interface of a message
pub fn message_input_reference(
    message: &MessageDescriptor,
    ctx: &TypeContext<'_>,
) -> Result<TypeExpr, GeneratorError> {
    if let Some(wkt) = well_known_reference(message) {
        return Ok(wkt);
    }

    let symbol = naming::input_type_name(message);
    let target = message.parent_file();
    if target.name() == ctx.file.name() {
        return Ok(TypeExpr::Local(symbol));
    }

    Ok(TypeExpr::Import(ImportRequest {
        symbol,
        module: naming::contract_import_path(ctx.file.name(), target.name())?,
    }))
}

fn well_known_reference(message: &MessageDescriptor) -> Option<TypeExpr> {
    if message.package_name() != WKT_PACKAGE {
        return None;
    }
    let name = message.name();
    WELL_KNOWN_MESSAGES.contains(&name).then(|| {
        TypeExpr::Import(ImportRequest {
            symbol: name.to_string(),
            module: WKT_MODULE.to_string(),
        })
    })
}
