// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

use serde::Deserialize;

/// Indentation width of the canonical serialization.
pub const CANONICAL_INDENT: usize = 2;

/// Configuration to use while reading, transforming and writing manifests.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Configuration {
    /// Spaces per nesting level when serializing. Values below 1 are treated as 1.
    pub indent_width: usize,
    /// How many levels of nested mappings global inheritance merges into.
    /// Deeper levels keep the application's local value.
    pub max_inheritance_depth: usize,
    /// Reject inputs larger than this many bytes before preprocessing.
    pub max_input_bytes: Option<usize>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            indent_width: CANONICAL_INDENT,
            max_inheritance_depth: 16,
            max_input_bytes: None,
        }
    }
}

impl Configuration {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = Configuration::from_json(r#"{"max_input_bytes": 4096}"#).unwrap();
        assert_eq!(config.max_input_bytes, Some(4096));
        assert_eq!(config.indent_width, CANONICAL_INDENT);
        assert_eq!(config.max_inheritance_depth, 16);
    }

    #[test]
    fn invalid_json_is_rejected() {
        assert!(Configuration::from_json(r#"{"indent_width": "wide"}"#).is_err());
    }
}
