// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Indentation-aware tokenizer.
//!
//! Turns logical input lines into a token stream with Python-style
//! `Indent`/`Dedent` tokens. An indentation stack starting at `[0]` tracks
//! the active block levels.
//!
//! A list item marker opens a virtual level at the column of the item's
//! content, so in
//!
//! ```text
//! - name: app
//!   host: app-host
//! ```
//!
//! both entries sit at column 2 and form one mapping inside the item.

use log::{debug, trace};

use crate::error::{TokenizerError, TokenizerErrorKind};
use crate::lexer::{Entry, LexError, lex_entry};
use crate::preprocessor::InputLine;
use crate::rich_token::RichToken;
use crate::span::{Span, span};
use crate::token::Token;

/// A key or bare list item still waiting for its nested block.
#[derive(Debug)]
struct PendingBlock {
    label: String,
    line: usize,
    span: Span,
    /// Column of the key (or marker) that opened the block.
    depth: usize,
    /// Keys accept a list at their own column as their block; bare `-` does not.
    accepts_sibling_list: bool,
}

/// If `text` starts with a list item marker, return what follows the `-`.
fn strip_marker(text: &str) -> Option<&str> {
    text.strip_prefix('-')
        .filter(|rest| rest.is_empty() || rest.starts_with(' '))
}

/// Tokenizer state.
pub struct Tokenizer<'a> {
    lines: &'a [InputLine],
    /// Indentation stack for INDENT/DEDENT tokens.
    /// Starts with [0] representing the root level.
    indent_stack: Vec<usize>,
    tokens: Vec<RichToken>,
    pending_block: Option<PendingBlock>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(lines: &'a [InputLine]) -> Self {
        Self {
            lines,
            indent_stack: vec![0],
            tokens: Vec::new(),
            pending_block: None,
        }
    }

    /// Tokenize all lines, ending the stream with `EndOfInput`.
    pub fn tokenize(mut self) -> Result<Vec<RichToken>, TokenizerError> {
        for line in self.lines {
            self.check_pending_block(line)?;
            self.align(line)?;
            self.tokenize_line(line)?;
        }

        if let Some(pending) = self.pending_block.take() {
            return Err(TokenizerError::new(
                TokenizerErrorKind::UnmaterializedBlock(pending.label),
                pending.line,
                pending.span,
            ));
        }

        // Unwind to the root level
        let last_line = self.lines.last().map_or(0, |line| line.line);
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.emit(Token::Dedent, last_line, span(0, 0));
        }
        self.emit(Token::EndOfInput, last_line, span(0, 0));

        debug!(
            "Tokenized {} lines into {} tokens",
            self.lines.len(),
            self.tokens.len()
        );
        Ok(self.tokens)
    }

    fn top(&self) -> usize {
        self.indent_stack.last().copied().unwrap_or(0)
    }

    fn emit(&mut self, token: Token, line: usize, span: Span) {
        trace!("line {line}: {token}");
        self.tokens.push(RichToken::new(token, line, span));
    }

    /// A pending block must be opened by a deeper line, or for keys by a
    /// list item at the key's own column.
    fn check_pending_block(&mut self, line: &InputLine) -> Result<(), TokenizerError> {
        let Some(pending) = self.pending_block.take() else {
            return Ok(());
        };
        let deeper = line.indent > pending.depth;
        let sibling_list = pending.accepts_sibling_list
            && line.indent == pending.depth
            && strip_marker(&line.text).is_some();
        if deeper || sibling_list {
            Ok(())
        } else {
            Err(TokenizerError::new(
                TokenizerErrorKind::UnmaterializedBlock(pending.label),
                pending.line,
                pending.span,
            ))
        }
    }

    /// Emit INDENT/DEDENT tokens for the line's indentation.
    fn align(&mut self, line: &InputLine) -> Result<(), TokenizerError> {
        let depth = line.indent;
        let indent_span = span(0, depth);
        let current = self.top();

        if depth > current {
            self.indent_stack.push(depth);
            self.emit(Token::Indent, line.line, indent_span);
        } else if depth < current {
            while self.top() > depth {
                self.indent_stack.pop();
                self.emit(Token::Dedent, line.line, indent_span);
            }
            let level = self.top();
            if level != depth {
                return Err(TokenizerError::new(
                    TokenizerErrorKind::InconsistentDedent {
                        expected: level,
                        found: depth,
                    },
                    line.line,
                    indent_span,
                ));
            }
        }
        Ok(())
    }

    fn tokenize_line(&mut self, line: &InputLine) -> Result<(), TokenizerError> {
        let mut rest = line.text.as_str();
        let mut column = line.indent;
        let mut in_item = false;

        while let Some(after) = strip_marker(rest) {
            self.emit(Token::ListItemMarker, line.line, span(column, column + 1));
            in_item = true;

            let content = after.trim_start_matches(' ');
            if content.is_empty() {
                self.pending_block = Some(PendingBlock {
                    label: "-".to_owned(),
                    line: line.line,
                    span: span(column, column + 1),
                    depth: column,
                    accepts_sibling_list: false,
                });
                return Ok(());
            }

            // The item's content column becomes a virtual indentation level
            column += 1 + after.len() - content.len();
            self.indent_stack.push(column);
            self.emit(Token::Indent, line.line, span(column, column));
            rest = content;
        }

        let shift = |span: Span| Span::from(column + span.start..column + span.end);
        match lex_entry(rest) {
            Ok(Entry::Pair { key, value }) => {
                self.emit(Token::Key(key.0.clone()), line.line, shift(key.1));
                match value {
                    Some((value, value_span)) => {
                        self.emit(Token::ScalarValue(value), line.line, shift(value_span));
                    }
                    None => {
                        self.pending_block = Some(PendingBlock {
                            label: key.0,
                            line: line.line,
                            span: shift(key.1),
                            depth: column,
                            accepts_sibling_list: true,
                        });
                    }
                }
                Ok(())
            }
            Ok(Entry::Scalar((value, value_span))) if in_item => {
                self.emit(Token::ScalarValue(value), line.line, shift(value_span));
                Ok(())
            }
            Ok(Entry::Scalar((_, value_span))) => Err(TokenizerError::new(
                TokenizerErrorKind::UnrecognizedLine {
                    found: Some("value without a key".to_owned()),
                },
                line.line,
                shift(value_span),
            )),
            Err(LexError { found, span }) => Err(TokenizerError::new(
                TokenizerErrorKind::UnrecognizedLine {
                    found: found.map(|found| format!("'{found}'")),
                },
                line.line,
                shift(span),
            )),
        }
    }
}

/// Tokenize preprocessed input lines.
pub fn tokenize(lines: &[InputLine]) -> Result<Vec<RichToken>, TokenizerError> {
    Tokenizer::new(lines).tokenize()
}

#[cfg(test)]
#[allow(
    clippy::indexing_slicing,
    reason = "Tests benefit from direct indexing"
)]
mod tests {
    use super::*;
    use crate::preprocessor::preprocess;

    fn get_tokens(input: &str) -> Vec<Token> {
        let lines = preprocess(input).unwrap();
        tokenize(&lines)
            .unwrap()
            .into_iter()
            .map(|rt| rt.token)
            .collect()
    }

    fn get_error(input: &str) -> TokenizerError {
        let lines = preprocess(input).unwrap();
        tokenize(&lines).unwrap_err()
    }

    fn key(text: &str) -> Token {
        Token::Key(text.to_owned())
    }

    fn value(text: &str) -> Token {
        Token::ScalarValue(text.to_owned())
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(get_tokens(""), vec![Token::EndOfInput]);
    }

    #[test]
    fn test_nested_mapping() {
        let tokens = get_tokens("env:\n  A: 1\n  B: 2\nname: x\n");
        assert_eq!(
            tokens,
            vec![
                key("env"),
                Token::Indent,
                key("A"),
                value("1"),
                key("B"),
                value("2"),
                Token::Dedent,
                key("name"),
                value("x"),
                Token::EndOfInput,
            ]
        );
    }

    #[test]
    fn test_list_at_key_column() {
        let tokens = get_tokens("applications:\n- name: a\n  host: h\n- name: b\n");
        assert_eq!(
            tokens,
            vec![
                key("applications"),
                Token::ListItemMarker,
                Token::Indent,
                key("name"),
                value("a"),
                key("host"),
                value("h"),
                Token::Dedent,
                Token::ListItemMarker,
                Token::Indent,
                key("name"),
                value("b"),
                Token::Dedent,
                Token::EndOfInput,
            ]
        );
    }

    #[test]
    fn test_indented_scalar_list() {
        let tokens = get_tokens("services:\n  - mysql\n  - redis\n");
        assert_eq!(
            tokens,
            vec![
                key("services"),
                Token::Indent,
                Token::ListItemMarker,
                Token::Indent,
                value("mysql"),
                Token::Dedent,
                Token::ListItemMarker,
                Token::Indent,
                value("redis"),
                Token::Dedent,
                Token::Dedent,
                Token::EndOfInput,
            ]
        );
    }

    #[test]
    fn test_nested_markers_on_one_line() {
        let tokens = get_tokens("k:\n- - a\n  - b\n");
        assert_eq!(
            tokens,
            vec![
                key("k"),
                Token::ListItemMarker,
                Token::Indent,
                Token::ListItemMarker,
                Token::Indent,
                value("a"),
                Token::Dedent,
                Token::ListItemMarker,
                Token::Indent,
                value("b"),
                Token::Dedent,
                Token::Dedent,
                Token::EndOfInput,
            ]
        );
    }

    #[test]
    fn test_bare_marker_opens_block() {
        let tokens = get_tokens("k:\n-\n  name: a\n");
        assert_eq!(
            tokens,
            vec![
                key("k"),
                Token::ListItemMarker,
                Token::Indent,
                key("name"),
                value("a"),
                Token::Dedent,
                Token::EndOfInput,
            ]
        );
    }

    #[test]
    fn test_token_lines_and_spans() {
        let lines = preprocess("applications:\n  - host: h\n").unwrap();
        let tokens = tokenize(&lines).unwrap();
        let host = tokens
            .iter()
            .find(|rt| rt.token == key("host"))
            .unwrap();
        assert_eq!(host.line, 2);
        assert_eq!((host.span.start, host.span.end), (4, 8));
        let marker = &tokens[2];
        assert_eq!(marker.token, Token::ListItemMarker);
        assert_eq!((marker.span.start, marker.span.end), (2, 3));
    }

    #[test]
    fn test_dedent_to_unseen_depth() {
        let err = get_error("a:\n    b: 1\n  c: 2\n");
        assert_eq!(
            err.kind,
            TokenizerErrorKind::InconsistentDedent {
                expected: 0,
                found: 2
            }
        );
        assert_eq!(err.line, 3);
    }

    #[test]
    fn test_unrecognized_line() {
        let err = get_error("applications:\n- name: a\n  just some words\n");
        assert!(matches!(err.kind, TokenizerErrorKind::UnrecognizedLine { .. }));
        assert_eq!(err.line, 3);
    }

    #[test]
    fn test_trailing_garbage_after_quote() {
        let err = get_error("host: \"h\" tail\n");
        assert!(matches!(err.kind, TokenizerErrorKind::UnrecognizedLine { .. }));
    }

    #[test]
    fn test_block_never_materialized_at_end() {
        let err = get_error("applications:\n- name: a\n  env:\n");
        assert_eq!(
            err.kind,
            TokenizerErrorKind::UnmaterializedBlock("env".to_owned())
        );
        assert_eq!(err.line, 3);
    }

    #[test]
    fn test_block_never_materialized_before_sibling() {
        let err = get_error("memory:\nhost: h\n");
        assert_eq!(
            err.kind,
            TokenizerErrorKind::UnmaterializedBlock("memory".to_owned())
        );
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_empty_list_item() {
        let err = get_error("k:\n-\n- a\n");
        assert_eq!(
            err.kind,
            TokenizerErrorKind::UnmaterializedBlock("-".to_owned())
        );
        assert_eq!(err.line, 2);
    }
}
