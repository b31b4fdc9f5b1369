// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Recursive-descent parser.
//!
//! Builds the manifest tree from the token stream. Blocks are delimited by
//! `Indent`/`Dedent`; a run of `Key` tokens at one level is a mapping and a
//! run of `ListItemMarker` tokens is a sequence. A key without an inline
//! value owns either the indented block after it or a list at its own level:
//!
//! ```text
//! applications:      Key
//! - name: web        ListItemMarker Indent Key ScalarValue
//!   host: web-host   Key ScalarValue
//!                    Dedent EndOfInput
//! ```
//!
//! Parsing stops at the first error. After the tree is built the document
//! shape is checked: a root mapping with an `applications` sequence of
//! mappings.

use log::debug;
use ordermap::OrderMap;

use crate::error::{ParserError, ParserErrorKind};
use crate::rich_token::RichToken;
use crate::token::Token;
use crate::tree::{APPLICATIONS_KEY, Manifest, NodeId, NodeKind};

/// Parser state.
struct Parser<'t> {
    tokens: &'t [RichToken],
    pos: usize,
    manifest: Manifest,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [RichToken]) -> Self {
        Self {
            tokens,
            pos: 0,
            manifest: Manifest::empty(),
        }
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos).map(|rt| &rt.token)
    }

    /// Line of the current token, or of the last one at the end of the stream.
    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(0, |rt| rt.line)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn describe(token: Option<&Token>) -> String {
        token.map_or_else(|| Token::EndOfInput.to_string(), Token::to_string)
    }

    fn unexpected(&self, expected: &str) -> ParserError {
        ParserError::new(
            ParserErrorKind::UnexpectedToken {
                found: Self::describe(self.peek()),
                expected: expected.to_owned(),
            },
            self.line(),
        )
    }

    fn expect(&mut self, token: &Token, expected: &str) -> Result<(), ParserError> {
        if self.peek() == Some(token) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// Close a nested block. A key where a sequence block should end means
    /// a mapping entry was mixed into the list.
    fn expect_block_end(&mut self, block: NodeId) -> Result<(), ParserError> {
        let is_sequence = self
            .manifest
            .node(block)
            .is_some_and(|node| node.is_sequence());
        match self.peek() {
            Some(Token::Dedent) => {
                self.advance();
                Ok(())
            }
            Some(token @ Token::Key(_)) if is_sequence => Err(ParserError::new(
                ParserErrorKind::ExpectedListItem {
                    found: token.to_string(),
                },
                self.line(),
            )),
            _ => Err(self.unexpected("end of block")),
        }
    }

    fn parse_document(&mut self) -> Result<NodeId, ParserError> {
        match self.peek() {
            None | Some(Token::EndOfInput) => {
                return Err(ParserError::new(ParserErrorKind::EmptyDocument, self.line()));
            }
            Some(Token::ListItemMarker) => {
                return Err(ParserError::new(ParserErrorKind::RootNotMapping, self.line()));
            }
            _ => {}
        }

        let root = self.parse_block(None)?;
        self.expect(&Token::EndOfInput, "end of input")?;
        Ok(root)
    }

    /// Parse a mapping or a sequence, depending on the first token.
    fn parse_block(&mut self, parent: Option<NodeId>) -> Result<NodeId, ParserError> {
        match self.peek() {
            Some(Token::Key(_)) => self.parse_mapping(parent),
            Some(Token::ListItemMarker) => self.parse_sequence(parent),
            _ => Err(self.unexpected("a key or a list item")),
        }
    }

    fn parse_mapping(&mut self, parent: Option<NodeId>) -> Result<NodeId, ParserError> {
        let id = self
            .manifest
            .alloc(NodeKind::Mapping(OrderMap::new()), parent, self.line());

        loop {
            let key = match self.peek() {
                Some(Token::Key(key)) => key,
                Some(token @ (Token::ListItemMarker | Token::ScalarValue(_))) => {
                    return Err(ParserError::new(
                        ParserErrorKind::ExpectedMappingEntry {
                            found: token.to_string(),
                        },
                        self.line(),
                    ));
                }
                Some(Token::Indent) => return Err(self.unexpected("'key: value'")),
                Some(Token::Dedent | Token::EndOfInput) | None => return Ok(id),
            };
            let key_line = self.line();
            if self
                .manifest
                .node(id)
                .is_some_and(|mapping| mapping.has(key))
            {
                return Err(ParserError::new(
                    ParserErrorKind::DuplicateKey(key.clone()),
                    key_line,
                ));
            }
            self.advance();

            let child = match self.peek() {
                Some(Token::ScalarValue(value)) => {
                    self.advance();
                    if self.peek() == Some(&Token::Indent) {
                        return Err(self.unexpected("next entry after an inline value"));
                    }
                    self.manifest
                        .alloc(NodeKind::Scalar(value.clone()), Some(id), key_line)
                }
                Some(Token::Indent) => {
                    self.advance();
                    let block = self.parse_block(Some(id))?;
                    self.expect_block_end(block)?;
                    block
                }
                Some(Token::ListItemMarker) => self.parse_sequence(Some(id))?,
                _ => return Err(self.unexpected("a value or a nested block")),
            };
            self.manifest.insert_entry(id, key, child);
        }
    }

    fn parse_sequence(&mut self, parent: Option<NodeId>) -> Result<NodeId, ParserError> {
        let id = self
            .manifest
            .alloc(NodeKind::Sequence(Vec::new()), parent, self.line());

        while self.peek() == Some(&Token::ListItemMarker) {
            self.advance();
            self.expect(&Token::Indent, "list item content")?;

            let item = match self.peek() {
                Some(Token::ScalarValue(value)) => {
                    let item_line = self.line();
                    self.advance();
                    let item = self
                        .manifest
                        .alloc(NodeKind::Scalar(value.clone()), Some(id), item_line);
                    if self.peek() != Some(&Token::Dedent) {
                        return Err(self.unexpected("end of list item after a scalar"));
                    }
                    item
                }
                _ => self.parse_block(Some(id))?,
            };
            self.expect_block_end(item)?;
            self.manifest.push_item(id, item);
        }
        Ok(id)
    }
}

/// Check the document shape: `applications` must be a sequence of mappings.
fn check_document(manifest: &Manifest) -> Result<(), ParserError> {
    let root = manifest.root();
    if !root.is_mapping() {
        return Err(ParserError::new(ParserErrorKind::RootNotMapping, root.line()));
    }
    let Some(applications) = root.get_opt(APPLICATIONS_KEY) else {
        return Err(ParserError::new(ParserErrorKind::MissingApplications, 0));
    };
    if !applications.is_sequence() {
        return Err(ParserError::new(
            ParserErrorKind::ApplicationsNotSequence,
            applications.line(),
        ));
    }
    for (index, application) in applications.children().into_iter().enumerate() {
        if !application.is_mapping() {
            return Err(ParserError::new(
                ParserErrorKind::ApplicationNotMapping(index),
                application.line(),
            ));
        }
    }
    Ok(())
}

/// Parse a token stream into a manifest tree.
pub fn parse_tokens(tokens: &[RichToken]) -> Result<Manifest, ParserError> {
    let mut parser = Parser::new(tokens);
    let root = parser.parse_document()?;
    let mut manifest = parser.manifest;
    manifest.set_root(root);
    check_document(&manifest)?;

    debug!("Parsed manifest with {} nodes", manifest.node_count());
    Ok(manifest)
}

#[cfg(test)]
#[allow(
    clippy::indexing_slicing,
    reason = "Tests benefit from direct indexing for readability"
)]
mod tests {
    use super::*;
    use crate::preprocessor::preprocess;
    use crate::tokenizer::tokenize;

    fn parse_err(input: &str) -> ParserError {
        let lines = preprocess(input).unwrap();
        let tokens = tokenize(&lines).unwrap();
        parse_tokens(&tokens).unwrap_err()
    }

    #[test]
    fn test_parse_applications() {
        let lines = preprocess("memory: 1G\napplications:\n- name: a\n  host: h\n").unwrap();
        let manifest = parse_tokens(&tokenize(&lines).unwrap()).unwrap();
        let applications = manifest.applications().unwrap();
        assert_eq!(applications.len(), 1);
        assert_eq!(
            applications[0].get("host").and_then(|n| n.value().map(str::to_owned)),
            Ok("h".to_owned())
        );
    }

    #[test]
    fn test_empty_document() {
        let err = parse_err("# only a comment\n");
        assert_eq!(err.kind, ParserErrorKind::EmptyDocument);
    }

    #[test]
    fn test_duplicate_key() {
        let err = parse_err("applications:\n- name: a\n  host: h1\n  host: h2\n");
        assert_eq!(err.kind, ParserErrorKind::DuplicateKey("host".to_owned()));
        assert_eq!(err.line, 4);
    }

    #[test]
    fn test_duplicate_top_level_key() {
        let err = parse_err("memory: 1G\napplications:\n- name: a\nmemory: 2G\n");
        assert_eq!(err.kind, ParserErrorKind::DuplicateKey("memory".to_owned()));
        assert_eq!(err.line, 4);
    }

    #[test]
    fn test_same_key_in_different_mappings_is_fine() {
        let lines = preprocess("applications:\n- name: a\n- name: b\n").unwrap();
        assert!(parse_tokens(&tokenize(&lines).unwrap()).is_ok());
    }

    #[test]
    fn test_missing_applications() {
        let err = parse_err("memory: 1G\n");
        assert_eq!(err.kind, ParserErrorKind::MissingApplications);
    }

    #[test]
    fn test_applications_shape() {
        let err = parse_err("applications: none\n");
        assert_eq!(err.kind, ParserErrorKind::ApplicationsNotSequence);
        assert_eq!(err.line, 1);

        let err = parse_err("applications:\n  name: a\n");
        assert_eq!(err.kind, ParserErrorKind::ApplicationsNotSequence);

        let err = parse_err("applications:\n- name: a\n- just-a-name\n");
        assert_eq!(err.kind, ParserErrorKind::ApplicationNotMapping(1));
        assert_eq!(err.line, 3);
    }

    #[test]
    fn test_root_sequence() {
        let err = parse_err("- name: a\n");
        assert_eq!(err.kind, ParserErrorKind::RootNotMapping);
    }

    #[test]
    fn test_list_item_inside_mapping() {
        let err = parse_err("applications:\n- name: a\n  - b\n");
        assert!(matches!(err.kind, ParserErrorKind::ExpectedMappingEntry { .. }));
        assert_eq!(err.line, 3);
    }

    #[test]
    fn test_entry_inside_sequence() {
        let err = parse_err("applications:\n- name: a\n  services:\n    - mysql\n    plan: free\n");
        assert!(matches!(err.kind, ParserErrorKind::ExpectedListItem { .. }));
        assert_eq!(err.line, 5);
    }

    #[test]
    fn test_block_after_inline_value() {
        let err = parse_err("applications:\n- name: a\n  env: x\n    K: v\n");
        assert!(matches!(err.kind, ParserErrorKind::UnexpectedToken { .. }));
        assert_eq!(err.line, 4);
    }

    #[test]
    fn test_entry_after_scalar_item() {
        let err = parse_err("applications:\n- name: a\n  services:\n  - mysql\n    plan: free\n");
        assert!(matches!(err.kind, ParserErrorKind::UnexpectedToken { .. }));
    }
}
