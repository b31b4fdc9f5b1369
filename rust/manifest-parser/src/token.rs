// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Token types produced by the tokenizer.

/// A manifest token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A mapping key (text before `: `), quotes removed.
    Key(String),
    /// A scalar value, quotes removed.
    ScalarValue(String),
    /// `-` sequence item marker.
    ListItemMarker,
    /// Indentation increased to a new level.
    Indent,
    /// Indentation decreased by one level.
    Dedent,
    /// End of the token stream.
    EndOfInput,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Key(key) => write!(f, "key '{key}'"),
            Self::ScalarValue(value) => write!(f, "scalar '{value}'"),
            Self::ListItemMarker => write!(f, "'-'"),
            Self::Indent => write!(f, "INDENT"),
            Self::Dedent => write!(f, "DEDENT"),
            Self::EndOfInput => write!(f, "end of input"),
        }
    }
}
