//! Output names for files, interfaces, enums and properties
//!
//! Type names follow the protobuf-es identifier strategy: the package prefix is
//! dropped and nesting dots become underscores, so `acme.Order.Line` is
//! emitted as `Order_LineInput`.

use crate::GeneratorError;
use prost_reflect::{EnumDescriptor, MessageDescriptor};

/// Suffix of the source schema files
const PROTO_SUFFIX: &str = ".proto";

/// Suffix of generated contract files
const CONTRACT_SUFFIX: &str = ".contract.ts";

/// Suffix protobuf-es appends to its runtime modules
const RUNTIME_SUFFIX: &str = "_pb";

/// Suffix of every generated interface
const INPUT_SUFFIX: &str = "Input";

/// Properties protobuf-es escapes with a trailing `$`
const RESERVED_PROPERTIES: &[&str] = &["constructor", "toString", "toJSON", "valueOf"];

/// Output file name for a `.proto` file, e.g. `acme/user.contract.ts`
///
/// Fails when the name contains `..`, which would place the output outside
/// the plugin's output directory.
pub fn contract_file_name(proto_name: &str) -> Result<String, GeneratorError> {
    let name = match proto_name.strip_suffix(PROTO_SUFFIX) {
        Some(stem) => format!("{}{}", stem, CONTRACT_SUFFIX),
        None => proto_name.to_string(),
    };
    if name.contains("..") {
        return Err(GeneratorError::BoundaryViolation(name));
    }
    Ok(name)
}

/// Interface name for a message, e.g. `Order_LineInput`
pub fn input_type_name(message: &MessageDescriptor) -> String {
    format!(
        "{}{}",
        local_identifier(message.full_name(), message.package_name()),
        INPUT_SUFFIX
    )
}

/// Name protobuf-es gives an enum in its `*_pb` module
pub fn enum_type_name(enum_desc: &EnumDescriptor) -> String {
    local_identifier(enum_desc.full_name(), enum_desc.package_name())
}

/// Strip `package.` from a fully qualified name and flatten nesting with `_`
pub fn local_identifier(full_name: &str, package: &str) -> String {
    let name = if package.is_empty() {
        full_name
    } else {
        full_name
            .strip_prefix(package)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(full_name)
    };
    name.replace('.', "_")
}

/// Import specifier for the protobuf-es runtime module of `target`
///
/// `pb_out` locates the runtime modules relative to the output root; the
/// result is relative to the directory of the contract generated for `from`.
pub fn runtime_import_path(from: &str, target: &str, pb_out: &str) -> String {
    let stem = target.strip_suffix(PROTO_SUFFIX).unwrap_or(target);
    let runtime = normalize(&format!("{}/{}{}", pb_out, stem, RUNTIME_SUFFIX));
    explicit_relative(&relative_to(parent_dir(from), &runtime))
}

/// Import specifier for the contract generated for `target`
pub fn contract_import_path(from: &str, target: &str) -> Result<String, GeneratorError> {
    let contract = contract_file_name(target)?;
    let module = match contract.strip_suffix(".ts") {
        Some(stem) => format!("{}.js", stem),
        None => contract,
    };
    Ok(explicit_relative(&relative_to(
        parent_dir(from),
        &normalize(&module),
    )))
}

/// Property name of a field: protobuf camel case, reserved names escaped
pub fn field_property_name(field_name: &str) -> String {
    let name = proto_camel_case(field_name);
    if RESERVED_PROPERTIES.contains(&name.as_str()) {
        format!("{}$", name)
    } else {
        name
    }
}

/// protoc's camel case: drop `_` and upper-case the following letter
fn proto_camel_case(snake_case: &str) -> String {
    let mut out = String::with_capacity(snake_case.len());
    let mut cap_next = false;
    for c in snake_case.chars() {
        match c {
            '_' => cap_next = true,
            '0'..='9' => {
                out.push(c);
                cap_next = false;
            }
            _ if cap_next => {
                out.extend(c.to_uppercase());
                cap_next = false;
            }
            _ => out.push(c),
        }
    }
    out
}

fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Posix-style normalization of a relative path
fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().map_or(false, |last| *last != "..") {
                    segments.pop();
                } else {
                    segments.push("..");
                }
            }
            s => segments.push(s),
        }
    }
    if segments.is_empty() {
        ".".to_string()
    } else {
        segments.join("/")
    }
}

/// Path of `to` as seen from directory `from_dir`; both relative to the same root
fn relative_to(from_dir: &str, to: &str) -> String {
    let from = normalize(from_dir);
    let from: Vec<&str> = from.split('/').filter(|s| *s != ".").collect();
    let to: Vec<&str> = to.split('/').filter(|s| *s != ".").collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = vec![".."; from.len() - common];
    parts.extend(&to[common..]);
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

fn explicit_relative(path: &str) -> String {
    if path.starts_with("./") || path.starts_with("../") {
        path.to_string()
    } else {
        format!("./{}", path)
    }
}
