//! File and message selection
//!
//! Decides which `.proto` files produce a contract (package globs from
//! `skip_pkg`) and which messages of a file are emitted.

use crate::GeneratorError;
use prost_reflect::{FileDescriptor, MessageDescriptor};
use regex::Regex;

/// Compiled package globs
///
/// `*` matches any sequence of characters; everything else is literal. A
/// pattern is anchored at both ends unless it already starts with `^` or ends
/// with `$`, so `google.*` never matches `my.google.api`.
///
/// Patterns are globs, not regular expressions: `google\..*` looks for a
/// literal backslash and matches no real package.
#[derive(Debug, Clone)]
pub struct PackageFilter {
    matchers: Vec<Regex>,
}

impl PackageFilter {
    /// Compile a list of package globs
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self, GeneratorError> {
        let matchers = patterns
            .iter()
            .map(|pattern| compile_pattern(pattern.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { matchers })
    }

    /// Returns true when `package` matches any pattern
    pub fn matches(&self, package: &str) -> bool {
        self.matchers.iter().any(|m| m.is_match(package))
    }

    /// Returns true when the file's package matches any pattern
    pub fn should_skip(&self, file: &FileDescriptor) -> bool {
        self.matches(file.package_name())
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex, GeneratorError> {
    // User anchors are dropped and re-added so both spellings compile the same.
    let body = pattern.strip_prefix('^').unwrap_or(pattern);
    let body = body.strip_suffix('$').unwrap_or(body);

    let source = body
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");

    Regex::new(&format!("^{}$", source)).map_err(|e| {
        GeneratorError::InvalidConfig(format!("invalid package pattern {:?}: {}", pattern, e))
    })
}

/// Collect the messages of a file that get a contract interface
///
/// Nested messages are flattened into the result. Map entry messages are
/// protobuf's synthetic `map<K, V>` carriers and are represented as `Record`
/// types on the owning field instead. The result is sorted by fully qualified
/// name so output does not depend on declaration order.
pub fn select_messages(file: &FileDescriptor) -> Vec<MessageDescriptor> {
    let mut messages = Vec::new();
    for message in file.messages() {
        collect_nested(message, &mut messages);
    }
    messages.sort_by(|a, b| a.full_name().cmp(b.full_name()));
    messages
}

fn collect_nested(message: MessageDescriptor, out: &mut Vec<MessageDescriptor>) {
    for child in message.child_messages() {
        collect_nested(child, out);
    }
    if !message.is_map_entry() {
        out.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost_reflect::DescriptorPool;
    use prost_types::field_descriptor_proto::{Label, Type};
    use prost_types::{
        DescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet,
        MessageOptions,
    };
    use test_case::test_case;

    #[test_case("google.*", "google.protobuf", true; "wildcard suffix")]
    #[test_case("google.*", "google", false; "wildcard requires separator")]
    #[test_case("google.*", "googleXprotobuf", false; "dot is literal")]
    #[test_case("google.*", "my.google.api", false; "implicit start anchor")]
    #[test_case("buf", "buf.validate", false; "implicit end anchor")]
    #[test_case("^buf.*$", "buf.validate", true; "explicit anchors kept")]
    #[test_case("*", "", true; "star matches empty package")]
    #[test_case("acme.*.v1", "acme.billing.v1", true; "inner wildcard")]
    #[test_case("acme.*.v1", "acme.billing.v2", false; "inner wildcard mismatch")]
    #[test_case(r"google\..*", "google.protobuf", false; "regex escapes are literal")]
    #[test_case(r"a\.*", r"a\.b", true; "backslash matches itself")]
    fn test_package_glob(pattern: &str, package: &str, expected: bool) {
        let filter = PackageFilter::compile(&[pattern]).unwrap();
        assert_eq!(filter.matches(package), expected);
    }

    #[test]
    fn test_any_pattern_matches() {
        let filter = PackageFilter::compile(&["google.*", "buf.*"]).unwrap();
        assert!(filter.matches("buf.validate"));
        assert!(filter.matches("google.type"));
        assert!(!filter.matches("acme.v1"));
    }

    #[test]
    fn test_empty_filter_matches_nothing() {
        let filter = PackageFilter::compile::<&str>(&[]).unwrap();
        assert!(!filter.matches(""));
        assert!(!filter.matches("google.protobuf"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let filter = PackageFilter::compile(&["a(b"]).unwrap();
        assert!(filter.matches("a(b"));
        assert!(!filter.matches("ab"));
    }

    fn message(name: &str, nested: Vec<DescriptorProto>) -> DescriptorProto {
        DescriptorProto {
            name: Some(name.to_string()),
            nested_type: nested,
            ..Default::default()
        }
    }

    #[test]
    fn test_select_messages_sorted_and_flattened() {
        let entry = DescriptorProto {
            name: Some("TagsEntry".to_string()),
            field: vec![
                FieldDescriptorProto {
                    name: Some("key".to_string()),
                    number: Some(1),
                    label: Some(Label::Optional.into()),
                    r#type: Some(Type::String.into()),
                    ..Default::default()
                },
                FieldDescriptorProto {
                    name: Some("value".to_string()),
                    number: Some(2),
                    label: Some(Label::Optional.into()),
                    r#type: Some(Type::String.into()),
                    ..Default::default()
                },
            ],
            options: Some(MessageOptions {
                map_entry: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };
        let mut outer = message("Outer", vec![message("Inner", vec![]), entry]);
        outer.field.push(FieldDescriptorProto {
            name: Some("tags".to_string()),
            number: Some(1),
            label: Some(Label::Repeated.into()),
            r#type: Some(Type::Message.into()),
            type_name: Some(".pkg.Outer.TagsEntry".to_string()),
            ..Default::default()
        });

        let file = FileDescriptorProto {
            name: Some("pkg/select.proto".to_string()),
            package: Some("pkg".to_string()),
            message_type: vec![message("Zeta", vec![]), outer, message("Alpha", vec![])],
            syntax: Some("proto3".to_string()),
            ..Default::default()
        };
        let pool = DescriptorPool::from_file_descriptor_set(FileDescriptorSet { file: vec![file] })
            .unwrap();
        let file = pool.get_file_by_name("pkg/select.proto").unwrap();

        let names: Vec<String> = select_messages(&file)
            .iter()
            .map(|m| m.full_name().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["pkg.Alpha", "pkg.Outer", "pkg.Outer.Inner", "pkg.Zeta"]
        );
    }
}
