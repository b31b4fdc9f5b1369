// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Error types for manifest parsing.
//!
//! Each pipeline stage reports its own error type carrying a kind, the
//! 1-based source line and, where it is known, the column span on that
//! line. [`ManifestError`] unifies them for callers that run the whole
//! pipeline. Line `0` means the error is not tied to a particular line.

use crate::span::Span;

/// The pipeline stage an error originated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Stage {
    #[display("preprocessor")]
    Preprocessor,
    #[display("tokenizer")]
    Tokenizer,
    #[display("parser")]
    Parser,
    #[display("lookup")]
    Lookup,
}

/// The kind of preprocessing error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputErrorKind {
    /// The text source could not be read or is not valid UTF-8.
    Unreadable(String),
    /// The input exceeds the configured size limit.
    InputTooLarge { limit: usize, found: usize },
    /// A double-quoted scalar is never closed.
    UnterminatedQuote,
    /// Tab character in leading whitespace.
    TabInIndentation,
    /// A line ends with a continuation marker but no line follows.
    DanglingContinuation,
    /// A character that cannot appear in a logical line.
    InvalidCharacter(char),
}

impl InputErrorKind {
    /// Get a suggestion for how to fix this error.
    #[must_use]
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::TabInIndentation => Some("Replace tabs with spaces in indentation"),
            Self::UnterminatedQuote => Some("Add the matching closing quote character"),
            Self::DanglingContinuation => {
                Some("Remove the trailing '\\' or add the continued line")
            }
            Self::InputTooLarge { .. } => Some("Split the manifest or raise max_input_bytes"),
            Self::Unreadable(_) | Self::InvalidCharacter(_) => None,
        }
    }
}

impl std::fmt::Display for InputErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreadable(reason) => write!(f, "unreadable manifest source: {reason}"),
            Self::InputTooLarge { limit, found } => {
                write!(f, "manifest is {found} bytes, limit is {limit} bytes")
            }
            Self::UnterminatedQuote => write!(f, "unterminated quoted scalar, missing closing \""),
            Self::TabInIndentation => write!(f, "tab character in indentation (use spaces)"),
            Self::DanglingContinuation => write!(f, "line continuation at end of input"),
            Self::InvalidCharacter(ch) => write!(f, "invalid character {ch:?}"),
        }
    }
}

/// An error raised while turning raw text into logical input lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedInputError {
    pub kind: InputErrorKind,
    pub line: usize,
    pub span: Option<Span>,
}

impl MalformedInputError {
    #[must_use]
    pub const fn new(kind: InputErrorKind, line: usize) -> Self {
        Self {
            kind,
            line,
            span: None,
        }
    }

    /// Attach the column span of the offending text.
    #[must_use]
    pub const fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

impl std::fmt::Display for MalformedInputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

impl std::error::Error for MalformedInputError {}

/// The kind of tokenizer error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenizerErrorKind {
    /// Dedent to a depth that no enclosing block uses.
    InconsistentDedent { expected: usize, found: usize },
    /// A line that is neither a `key: value` entry nor a list item.
    UnrecognizedLine { found: Option<String> },
    /// A key (or bare list item) announces a nested block that never follows.
    UnmaterializedBlock(String),
}

impl TokenizerErrorKind {
    /// Get a suggestion for how to fix this error.
    #[must_use]
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::InconsistentDedent { .. } => {
                Some("Align the line with one of the enclosing indentation levels")
            }
            Self::UnrecognizedLine { .. } => {
                Some("Write entries as 'key: value' or list items as '- value'")
            }
            Self::UnmaterializedBlock(_) => {
                Some("Give the key an inline value or indent a nested block below it")
            }
        }
    }
}

impl std::fmt::Display for TokenizerErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InconsistentDedent { expected, found } => write!(
                f,
                "invalid indentation: dedent to {found} spaces, nearest enclosing level is {expected}"
            ),
            Self::UnrecognizedLine { found: Some(found) } => {
                write!(f, "unrecognized line, unexpected {found}")
            }
            Self::UnrecognizedLine { found: None } => {
                write!(f, "unrecognized line, expected 'key: value' or '- item'")
            }
            Self::UnmaterializedBlock(label) => {
                write!(f, "'{label}' declares a nested block but none follows")
            }
        }
    }
}

/// An error raised while tokenizing input lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizerError {
    pub kind: TokenizerErrorKind,
    pub line: usize,
    pub span: Span,
}

impl TokenizerError {
    #[must_use]
    pub const fn new(kind: TokenizerErrorKind, line: usize, span: Span) -> Self {
        Self { kind, line, span }
    }
}

impl std::fmt::Display for TokenizerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

impl std::error::Error for TokenizerError {}

/// The kind of parser error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParserErrorKind {
    /// The document holds no entries at all.
    EmptyDocument,
    /// Two sibling entries share a key.
    DuplicateKey(String),
    /// A token appeared where the grammar does not allow it.
    UnexpectedToken { found: String, expected: String },
    /// A list item appeared inside a mapping block.
    ExpectedMappingEntry { found: String },
    /// A mapping entry appeared inside a sequence block.
    ExpectedListItem { found: String },
    /// The document root is a sequence.
    RootNotMapping,
    /// The top-level `applications` key is absent.
    MissingApplications,
    /// The top-level `applications` key is not a sequence.
    ApplicationsNotSequence,
    /// An element of `applications` is not a mapping.
    ApplicationNotMapping(usize),
}

impl ParserErrorKind {
    /// Get a suggestion for how to fix this error.
    #[must_use]
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::DuplicateKey(_) => Some("Remove or rename one of the duplicate keys"),
            Self::MissingApplications | Self::ApplicationsNotSequence => {
                Some("Declare the applications as a list under a top-level 'applications:' key")
            }
            Self::ApplicationNotMapping(_) => {
                Some("Every application must be a block of 'key: value' entries")
            }
            Self::ExpectedMappingEntry { .. } | Self::ExpectedListItem { .. } => {
                Some("Do not mix list items and 'key: value' entries in one block")
            }
            Self::EmptyDocument | Self::UnexpectedToken { .. } | Self::RootNotMapping => None,
        }
    }
}

impl std::fmt::Display for ParserErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDocument => write!(f, "empty manifest"),
            Self::DuplicateKey(key) => write!(f, "duplicate key '{key}' in mapping"),
            Self::UnexpectedToken { found, expected } => {
                write!(f, "unexpected {found}, expected {expected}")
            }
            Self::ExpectedMappingEntry { found } => {
                write!(f, "unexpected {found} in a mapping block, expected 'key: value'")
            }
            Self::ExpectedListItem { found } => {
                write!(f, "unexpected {found} in a sequence block, expected '- item'")
            }
            Self::RootNotMapping => write!(f, "manifest root must be a mapping"),
            Self::MissingApplications => write!(f, "missing top-level 'applications' key"),
            Self::ApplicationsNotSequence => write!(f, "'applications' must be a sequence"),
            Self::ApplicationNotMapping(index) => {
                write!(f, "application #{index} must be a mapping")
            }
        }
    }
}

/// An error raised while building the manifest tree from tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserError {
    pub kind: ParserErrorKind,
    pub line: usize,
}

impl ParserError {
    #[must_use]
    pub const fn new(kind: ParserErrorKind, line: usize) -> Self {
        Self { kind, line }
    }
}

impl std::fmt::Display for ParserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

impl std::error::Error for ParserError {}

/// The kind of tree lookup error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupErrorKind {
    MissingKey(String),
    IndexOutOfRange { index: usize, len: usize },
    NotAMapping,
    NotASequence,
    NotAScalar,
    /// The node id was handed out by another manifest.
    UnknownNode,
}

impl std::fmt::Display for LookupErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingKey(key) => write!(f, "no entry '{key}'"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for sequence of {len}")
            }
            Self::NotAMapping => write!(f, "node is not a mapping"),
            Self::NotASequence => write!(f, "node is not a sequence"),
            Self::NotAScalar => write!(f, "node is not a scalar"),
            Self::UnknownNode => write!(f, "node does not belong to this manifest"),
        }
    }
}

/// Misuse of the tree query surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupError {
    pub kind: LookupErrorKind,
    /// Diagnostic path of the node the lookup was made on.
    pub path: String,
    pub line: usize,
}

impl std::fmt::Display for LookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "<root>: {}", self.kind)
        } else {
            write!(f, "{}: {}", self.path, self.kind)
        }
    }
}

impl std::error::Error for LookupError {}

/// Any error produced while reading a manifest.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::From)]
pub enum ManifestError {
    MalformedInput(MalformedInputError),
    Tokenizer(TokenizerError),
    Parser(ParserError),
    Lookup(LookupError),
}

impl ManifestError {
    /// The stage that rejected the manifest.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        match self {
            Self::MalformedInput(_) => Stage::Preprocessor,
            Self::Tokenizer(_) => Stage::Tokenizer,
            Self::Parser(_) => Stage::Parser,
            Self::Lookup(_) => Stage::Lookup,
        }
    }

    /// The source line the error points at.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::MalformedInput(err) => err.line,
            Self::Tokenizer(err) => err.line,
            Self::Parser(err) => err.line,
            Self::Lookup(err) => err.line,
        }
    }

    /// Get a suggestion for how to fix this error.
    #[must_use]
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::MalformedInput(err) => err.kind.suggestion(),
            Self::Tokenizer(err) => err.kind.suggestion(),
            Self::Parser(err) => err.kind.suggestion(),
            Self::Lookup(_) => None,
        }
    }
}

impl std::error::Error for ManifestError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::span;

    #[test]
    fn test_error_display() {
        let test_cases = [
            (
                ManifestError::from(MalformedInputError::new(
                    InputErrorKind::UnterminatedQuote,
                    3,
                )),
                "line 3: unterminated quoted scalar, missing closing \"",
            ),
            (
                ManifestError::from(TokenizerError::new(
                    TokenizerErrorKind::InconsistentDedent {
                        expected: 2,
                        found: 1,
                    },
                    7,
                    span(0, 1),
                )),
                "line 7: invalid indentation: dedent to 1 spaces, nearest enclosing level is 2",
            ),
            (
                ManifestError::from(ParserError::new(
                    ParserErrorKind::DuplicateKey("host".to_owned()),
                    4,
                )),
                "line 4: duplicate key 'host' in mapping",
            ),
            (
                ManifestError::from(LookupError {
                    kind: LookupErrorKind::MissingKey("url".to_owned()),
                    path: "applications[0]".to_owned(),
                    line: 2,
                }),
                "applications[0]: no entry 'url'",
            ),
        ];

        for (err, expected_msg) in test_cases {
            assert_eq!(err.to_string(), expected_msg);
        }
    }

    #[test]
    fn test_stage_and_line() {
        let err = ManifestError::from(ParserError::new(ParserErrorKind::MissingApplications, 0));
        assert_eq!(err.stage(), Stage::Parser);
        assert_eq!(err.line(), 0);
        assert_eq!(err.stage().to_string(), "parser");

        let err = ManifestError::from(MalformedInputError::new(
            InputErrorKind::TabInIndentation,
            5,
        ));
        assert_eq!(err.stage(), Stage::Preprocessor);
        assert_eq!(err.line(), 5);
    }

    #[test]
    fn test_error_suggestions() {
        let with_suggestions = [
            ManifestError::from(MalformedInputError::new(InputErrorKind::TabInIndentation, 1)),
            ManifestError::from(TokenizerError::new(
                TokenizerErrorKind::UnmaterializedBlock("env".to_owned()),
                1,
                span(0, 4),
            )),
            ManifestError::from(ParserError::new(
                ParserErrorKind::DuplicateKey("name".to_owned()),
                1,
            )),
        ];
        for err in with_suggestions {
            assert!(err.suggestion().is_some(), "{err:?} should have a suggestion");
        }

        let without = ManifestError::from(ParserError::new(ParserErrorKind::EmptyDocument, 0));
        assert!(without.suggestion().is_none());
    }
}
