// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Line preprocessor.
//!
//! This is the first stage of the pipeline: it turns the raw manifest text
//! into logical [`InputLine`]s. It drops blank lines and comments, measures
//! indentation, folds double-quoted scalars that span several physical
//! lines and joins explicit `\` continuations. The tokenizer never sees
//! a physical line.

use std::io::Read;

use log::debug;

use crate::config::Configuration;
use crate::error::{InputErrorKind, MalformedInputError};
use crate::span::span;

/// Document start marker. Dropped when it stands alone at column 0.
const DOCUMENT_START: &str = "---";

/// One logical line of the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputLine {
    /// Content after indentation, with comments removed and continuations joined.
    pub text: String,
    /// 1-based number of the first physical line.
    pub line: usize,
    /// Indentation depth in spaces.
    pub indent: usize,
    /// Whether two or more physical lines were joined into this one.
    pub continued: bool,
}

/// Result of scanning one physical segment for quotes and comments.
struct Scan<'a> {
    /// The segment up to (not including) any comment.
    content: &'a str,
    /// Whether a double-quoted region is still open at the end of the segment.
    in_quote: bool,
}

/// Split a segment at its comment, tracking double-quoted regions.
///
/// A `#` opens a comment only outside quotes, at the start of the segment
/// or right after whitespace.
#[allow(
    clippy::string_slice,
    reason = "Indices come from char_indices and are on UTF-8 boundaries"
)]
fn scan(segment: &str, mut in_quote: bool) -> Scan<'_> {
    let mut prev_is_space = true;
    for (pos, ch) in segment.char_indices() {
        match ch {
            '"' => in_quote = !in_quote,
            '#' if !in_quote && prev_is_space => {
                return Scan {
                    content: &segment[..pos],
                    in_quote,
                };
            }
            _ => {}
        }
        prev_is_space = ch == ' ' || ch == '\t';
    }
    Scan {
        content: segment,
        in_quote,
    }
}

/// Whether the comment rule would cut `text` short if it started a line's content.
pub(crate) fn has_comment(text: &str) -> bool {
    scan(text, false).content.len() < text.len()
}

/// A logical line still waiting for its continuation.
struct Pending {
    text: String,
    line: usize,
    last_line: usize,
    indent: usize,
    continued: bool,
    /// Line on which the currently open quote started.
    open_quote: Option<usize>,
}

impl Pending {
    /// Append a scanned segment and report whether the logical line is complete.
    fn absorb(&mut self, scan: &Scan<'_>, number: usize) -> bool {
        let content = scan.content.trim_end();
        if !content.is_empty() {
            if !self.text.is_empty() {
                self.text.push(' ');
            }
            self.text.push_str(content);
        }
        if number != self.line {
            self.continued = true;
        }
        self.last_line = number;

        if scan.in_quote {
            self.open_quote.get_or_insert(number);
            return false;
        }
        self.open_quote = None;

        if let Some(stripped) = self.text.strip_suffix('\\') {
            let len = stripped.trim_end().len();
            self.text.truncate(len);
            return false;
        }
        true
    }

    fn into_line(self) -> InputLine {
        InputLine {
            text: self.text,
            line: self.line,
            indent: self.indent,
            continued: self.continued,
        }
    }
}

fn check_characters(raw: &str, number: usize) -> Result<(), MalformedInputError> {
    for (pos, ch) in raw.char_indices() {
        if ch.is_control() && ch != '\t' {
            return Err(
                MalformedInputError::new(InputErrorKind::InvalidCharacter(ch), number)
                    .with_span(span(pos, pos + ch.len_utf8())),
            );
        }
    }
    Ok(())
}

/// Split off leading whitespace, rejecting tabs in it.
#[allow(
    clippy::string_slice,
    reason = "Leading whitespace is ASCII, so the split is on a char boundary"
)]
fn split_indent(raw: &str, number: usize) -> Result<(usize, &str), MalformedInputError> {
    let body = raw.trim_start_matches([' ', '\t']);
    let width = raw.len() - body.len();
    if let Some(column) = raw[..width].find('\t') {
        return Err(
            MalformedInputError::new(InputErrorKind::TabInIndentation, number)
                .with_span(span(column, column + 1)),
        );
    }
    Ok((width, body))
}

/// Turn manifest text into logical input lines.
pub fn preprocess(input: &str) -> Result<Vec<InputLine>, MalformedInputError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut lines = Vec::new();
    let mut pending: Option<Pending> = None;

    for (index, raw) in input.lines().enumerate() {
        let number = index + 1;
        check_characters(raw, number)?;
        if raw.trim().is_empty() {
            continue;
        }

        let (mut current, segment, in_quote) = match pending.take() {
            Some(current) if current.open_quote.is_some() => (current, raw.trim_start(), true),
            Some(current) => {
                let body = split_indent(raw, number)?.1;
                if body.starts_with('#') {
                    pending = Some(current);
                    continue;
                }
                (current, body, false)
            }
            None => {
                let (indent, body) = split_indent(raw, number)?;
                if body.starts_with('#') || (indent == 0 && body.trim_end() == DOCUMENT_START) {
                    continue;
                }
                let fresh = Pending {
                    text: String::new(),
                    line: number,
                    last_line: number,
                    indent,
                    continued: false,
                    open_quote: None,
                };
                (fresh, body, false)
            }
        };

        if current.absorb(&scan(segment, in_quote), number) {
            lines.push(current.into_line());
        } else {
            pending = Some(current);
        }
    }

    if let Some(current) = pending {
        return Err(match current.open_quote {
            Some(line) => MalformedInputError::new(InputErrorKind::UnterminatedQuote, line),
            None => MalformedInputError::new(
                InputErrorKind::DanglingContinuation,
                current.last_line,
            ),
        });
    }

    debug!("Preprocessed manifest into {} logical lines", lines.len());
    Ok(lines)
}

/// Preprocess with the size limit from `config` applied first.
pub fn preprocess_with(
    input: &str,
    config: &Configuration,
) -> Result<Vec<InputLine>, MalformedInputError> {
    if let Some(limit) = config.max_input_bytes
        && input.len() > limit
    {
        return Err(MalformedInputError::new(
            InputErrorKind::InputTooLarge {
                limit,
                found: input.len(),
            },
            0,
        ));
    }
    preprocess(input)
}

/// Read a text source to the end and preprocess it.
pub fn preprocess_reader<R: Read>(
    mut reader: R,
    config: &Configuration,
) -> Result<Vec<InputLine>, MalformedInputError> {
    let mut input = String::new();
    reader
        .read_to_string(&mut input)
        .map_err(|err| MalformedInputError::new(InputErrorKind::Unreadable(err.to_string()), 0))?;
    preprocess_with(&input, config)
}

#[cfg(test)]
#[allow(
    clippy::indexing_slicing,
    reason = "Tests benefit from direct indexing for readability"
)]
mod tests {
    use super::*;

    fn texts(lines: &[InputLine]) -> Vec<(&str, usize)> {
        lines
            .iter()
            .map(|line| (line.text.as_str(), line.indent))
            .collect()
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let input = "# header\n\napplications: # trailing\n  - name: app#1\n    # indented comment\n";
        let lines = preprocess(input).unwrap();
        assert_eq!(
            texts(&lines),
            vec![("applications:", 0), ("- name: app#1", 2)]
        );
        assert_eq!(lines[0].line, 3);
        assert_eq!(lines[1].line, 4);
    }

    #[test]
    fn test_document_start_marker() {
        let lines = preprocess("---\napplications:\n- name: a\n").unwrap();
        assert_eq!(texts(&lines), vec![("applications:", 0), ("- name: a", 0)]);
        assert_eq!(lines[0].line, 2);
    }

    #[test]
    fn test_hash_inside_quotes_is_kept() {
        let lines = preprocess("command: \"run # not a comment\" # comment\n").unwrap();
        assert_eq!(lines[0].text, "command: \"run # not a comment\"");
    }

    #[test]
    fn test_tab_in_indentation() {
        let err = preprocess("applications:\n\t- name: a\n").unwrap_err();
        assert_eq!(err.kind, InputErrorKind::TabInIndentation);
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_tab_inside_value_is_allowed() {
        let lines = preprocess("command: a\tb\n").unwrap();
        assert_eq!(lines[0].text, "command: a\tb");
    }

    #[test]
    fn test_quoted_scalar_folds_across_lines() {
        let input = "command: \"start the\n    application now\"\nhost: h\n";
        let lines = preprocess(input).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "command: \"start the application now\"");
        assert!(lines[0].continued);
        assert_eq!(lines[1].line, 3);
        assert!(!lines[1].continued);
    }

    #[test]
    fn test_unterminated_quote() {
        let err = preprocess("host: h\ncommand: \"never closed\nother: x\n").unwrap_err();
        assert_eq!(err.kind, InputErrorKind::UnterminatedQuote);
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_explicit_continuation() {
        let input = "command: node server.js \\\n  --port 8080\nhost: h\n";
        let lines = preprocess(input).unwrap();
        assert_eq!(lines[0].text, "command: node server.js --port 8080");
        assert!(lines[0].continued);
        assert_eq!(lines[1].text, "host: h");
    }

    #[test]
    fn test_continuation_skips_comment_lines() {
        let input = "command: run \\\n  # the flag below\n\n  --fast\nhost: h\n";
        let lines = preprocess(input).unwrap();
        assert_eq!(texts(&lines), vec![("command: run --fast", 0), ("host: h", 0)]);
        assert!(lines[0].continued);
        assert_eq!(lines[1].line, 5);
    }

    #[test]
    fn test_continuation_into_trailing_comment() {
        let err = preprocess("command: run \\\n# nothing follows\n").unwrap_err();
        assert_eq!(err.kind, InputErrorKind::DanglingContinuation);
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_dangling_continuation() {
        let err = preprocess("command: node \\\n").unwrap_err();
        assert_eq!(err.kind, InputErrorKind::DanglingContinuation);
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_control_character() {
        let err = preprocess("host: a\u{0007}b\n").unwrap_err();
        assert_eq!(err.kind, InputErrorKind::InvalidCharacter('\u{0007}'));
        assert_eq!(err.span, Some(span(7, 8)));
    }

    #[test]
    fn test_crlf_and_bom() {
        let lines = preprocess("\u{feff}applications:\r\n- name: a\r\n").unwrap();
        assert_eq!(texts(&lines), vec![("applications:", 0), ("- name: a", 0)]);
    }

    #[test]
    fn test_input_size_limit() {
        let config = Configuration {
            max_input_bytes: Some(8),
            ..Configuration::default()
        };
        let err = preprocess_with("applications:\n", &config).unwrap_err();
        assert_eq!(
            err.kind,
            InputErrorKind::InputTooLarge {
                limit: 8,
                found: 14
            }
        );
    }

    #[test]
    fn test_unreadable_source() {
        let bytes: &[u8] = &[0x68, 0x6f, 0xff, 0xfe];
        let err = preprocess_reader(bytes, &Configuration::default()).unwrap_err();
        assert!(matches!(err.kind, InputErrorKind::Unreadable(_)));
    }
}
