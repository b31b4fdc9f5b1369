// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Canonical text rendering of a manifest tree.
//!
//! Mapping entries are written `key: value` or `key:` followed by the nested
//! block one indentation level deeper. Sequence items are written `- item`,
//! with nested blocks aligned to the item's content column. Keys and scalars
//! are double-quoted only when their plain form would read back differently.
//!
//! Comments and the input's own layout are not preserved, but the output is
//! a fixed point: parsing and serializing it again yields the same text.

use std::fmt::Write as _;

use crate::preprocessor::has_comment;
use crate::tree::{Manifest, NodeKind, NodeRef};

/// Whether `text` must be quoted wherever it appears.
fn needs_quotes(text: &str) -> bool {
    text.is_empty()
        || text.starts_with(char::is_whitespace)
        || text.ends_with(char::is_whitespace)
        || text.starts_with('"')
        || text.ends_with('\\')
        || has_comment(text)
}

/// Keys and bare list items must also not read as a marker or a pair.
fn needs_quotes_standalone(text: &str) -> bool {
    needs_quotes(text)
        || text == "-"
        || text.starts_with("- ")
        || text.contains(": ")
        || text.ends_with(':')
}

fn quote(text: &str) -> String {
    format!("\"{text}\"")
}

/// Render a key or a bare list item.
///
/// Parsed text that needs quoting here never contains `"`. Text set later
/// that does is written quoted as is.
fn render(text: &str) -> String {
    if needs_quotes_standalone(text) {
        quote(text)
    } else {
        text.to_owned()
    }
}

/// Render the value of a mapping entry. Everything after `key: ` is read
/// back verbatim, so `: ` and quoted `#` stay plain.
fn render_value(text: &str) -> String {
    if needs_quotes(text) {
        quote(text)
    } else {
        text.to_owned()
    }
}

struct Serializer {
    width: usize,
    out: String,
}

impl Serializer {
    fn pad(&mut self, indent: usize) {
        self.out.extend(std::iter::repeat_n(' ', indent));
    }

    fn write_block(&mut self, node: NodeRef<'_>, indent: usize) {
        match node.kind() {
            NodeKind::Scalar(text) => {
                self.pad(indent);
                let _ = writeln!(self.out, "{}", render(text));
            }
            NodeKind::Mapping(_) => self.write_mapping(node, indent),
            NodeKind::Sequence(_) => self.write_sequence(node, indent),
        }
    }

    fn write_mapping(&mut self, node: NodeRef<'_>, indent: usize) {
        for (key, child) in node.entries().unwrap_or_default() {
            self.pad(indent);
            match child.kind() {
                NodeKind::Scalar(text) => {
                    let _ = writeln!(self.out, "{}: {}", render(key), render_value(text));
                }
                NodeKind::Mapping(_) | NodeKind::Sequence(_) => {
                    let _ = writeln!(self.out, "{}:", render(key));
                    self.write_block(child, indent + self.width);
                }
            }
        }
    }

    #[allow(
        clippy::string_slice,
        reason = "start is a char boundary recorded after pushing ASCII text"
    )]
    fn write_sequence(&mut self, node: NodeRef<'_>, indent: usize) {
        for item in node.children() {
            self.pad(indent);
            if let NodeKind::Scalar(text) = item.kind() {
                let _ = writeln!(self.out, "- {}", render(text));
                continue;
            }
            // The item's first line shares the marker's line
            self.out.push_str("- ");
            let start = self.out.len();
            self.write_block(item, indent + 2);
            let first_line_pad = self.out[start..].len() - self.out[start..].trim_start().len();
            self.out.replace_range(start..start + first_line_pad, "");
        }
    }
}

/// Serialize `manifest` with `width` spaces per nesting level (at least 1).
#[must_use]
pub fn serialize(manifest: &Manifest, width: usize) -> String {
    let mut serializer = Serializer {
        width: width.max(1),
        out: String::new(),
    };
    serializer.write_block(manifest.root(), 0);
    serializer.out
}

#[cfg(test)]
#[allow(
    clippy::indexing_slicing,
    reason = "Tests benefit from direct indexing for readability"
)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::parse;

    #[test]
    fn test_canonical_layout() {
        let input = "\
# comment
memory:   512M
applications:
    -   name: web
        env:
           FOO: bar
        services:
        - mysql
        - redis
";
        let manifest = parse(input).unwrap();
        assert_eq!(
            manifest.to_string(),
            "\
memory: 512M
applications:
  - name: web
    env:
      FOO: bar
    services:
      - mysql
      - redis
"
        );
    }

    #[test]
    fn test_quoting() {
        let cases = [
            ("plain", "plain"),
            ("", "\"\""),
            (" padded", "\" padded\""),
            ("a: b", "\"a: b\""),
            ("ends:", "\"ends:\""),
            ("run # now", "\"run # now\""),
            ("#tag", "\"#tag\""),
            ("-", "\"-\""),
            ("- item", "\"- item\""),
            ("line\\", "\"line\\\"\""),
            ("http://example.org:8080", "http://example.org:8080"),
            ("app#1", "app#1"),
            (".", "."),
        ];
        for (text, expected) in cases {
            assert_eq!(render(text), expected, "rendering {text:?}");
        }
    }

    #[test]
    fn test_value_quoting() {
        let cases = [
            ("a: b", "a: b"),
            ("ends:", "ends:"),
            ("- item", "- item"),
            ("echo \"b: c\"", "echo \"b: c\""),
            ("echo \"x #y\"", "echo \"x #y\""),
            ("run # now", "\"run # now\""),
            ("#tag", "\"#tag\""),
            ("", "\"\""),
            ("padded ", "\"padded \""),
            ("line\\", "\"line\\\""),
        ];
        for (text, expected) in cases {
            assert_eq!(render_value(text), expected, "rendering {text:?}");
        }
        assert_eq!(render("echo \"x #y\""), "echo \"x #y\"");
    }

    #[test]
    fn test_values_with_inner_quotes_round_trip() {
        let input = "\
applications:
- name: a
  command: echo \"b: c\"
  check: echo \"x #y\"
  services:
  - echo \"x #y\"
";
        let first = parse(input).unwrap().to_string();
        assert_eq!(
            first,
            "\
applications:
  - name: a
    command: echo \"b: c\"
    check: echo \"x #y\"
    services:
      - echo \"x #y\"
"
        );
        let reparsed = parse(&first).unwrap();
        let app = reparsed.applications().unwrap()[0];
        assert_eq!(app.get("command").unwrap().value().unwrap(), "echo \"b: c\"");
        assert_eq!(app.get("check").unwrap().value().unwrap(), "echo \"x #y\"");
        assert_eq!(reparsed.to_string(), first);
    }

    #[test]
    fn test_nested_sequences() {
        let manifest = parse("applications:\n- name: a\n  matrix:\n  - - 1\n    - 2\n  - - 3\n").unwrap();
        assert_eq!(
            manifest.to_string(),
            "\
applications:
  - name: a
    matrix:
      - - 1
        - 2
      - - 3
"
        );
    }

    #[test]
    fn test_custom_width() {
        let manifest = parse("applications:\n- name: a\n  env:\n    K: v\n").unwrap();
        let config = Configuration {
            indent_width: 4,
            ..Configuration::default()
        };
        assert_eq!(
            manifest.serialize_with(&config),
            "applications:\n    - name: a\n      env:\n          K: v\n"
        );
        let config = Configuration {
            indent_width: 0,
            ..Configuration::default()
        };
        assert_eq!(
            manifest.serialize_with(&config),
            "applications:\n - name: a\n   env:\n    K: v\n"
        );
    }

    #[test]
    fn test_quoted_values_round_trip() {
        let input = "applications:\n- name: \"a: b\"\n  path: \".\"\n  command: \"echo # hi\"\n";
        let first = parse(input).unwrap().to_string();
        assert_eq!(
            first,
            "applications:\n  - name: a: b\n    path: .\n    command: \"echo # hi\"\n"
        );
        assert_eq!(parse(&first).unwrap().to_string(), first);
    }
}
