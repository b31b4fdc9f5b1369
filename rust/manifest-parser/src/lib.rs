// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! A parser for YAML-like application deployment manifests.
//!
//! This crate reads a manifest in stages:
//! - The preprocessor turns raw text into logical lines (comments,
//!   quoting and continuations resolved)
//! - The tokenizer turns lines into `Key`/`ScalarValue`/`ListItemMarker`
//!   tokens with `Indent`/`Dedent` structure
//! - The parser builds an arena [`Manifest`] tree and checks that the
//!   document has an `applications` list
//!
//! The tree can be queried, exported as JSON and written back in a
//! canonical form. Any stage error aborts the parse; there is no partial
//! tree.
//!
//! # Example
//!
//! ```
//! use manifest_parser::parse;
//!
//! let input = r#"
//! memory: 256M
//! applications:
//! - name: web
//!   host: "web-host"
//! "#;
//!
//! let manifest = parse(input).unwrap();
//! let web = manifest.root().get("applications").and_then(|apps| apps.get(0)).unwrap();
//! assert_eq!(web.get("host").and_then(|host| host.value()).unwrap(), "web-host");
//! print!("{manifest}");
//! ```

use std::io::Read;

mod config;
mod error;
mod lexer;
mod parser;
mod preprocessor;
mod rich_token;
mod serializer;
mod span;
mod token;
mod tokenizer;
mod tree;

pub use config::{CANONICAL_INDENT, Configuration};
pub use error::{
    InputErrorKind, LookupError, LookupErrorKind, MalformedInputError, ManifestError,
    ParserError, ParserErrorKind, Stage, TokenizerError, TokenizerErrorKind,
};
pub use parser::parse_tokens;
pub use preprocessor::{InputLine, preprocess, preprocess_reader, preprocess_with};
pub use rich_token::RichToken;
pub use serializer::serialize;
pub use span::{Span, Spanned};
pub use token::Token;
pub use tokenizer::tokenize;
pub use tree::{APPLICATIONS_KEY, Manifest, NodeId, NodeKind, NodeRef, Selector};

/// Parse manifest text with the default configuration.
pub fn parse(input: &str) -> Result<Manifest, ManifestError> {
    parse_with(input, &Configuration::default())
}

/// Parse manifest text.
pub fn parse_with(input: &str, config: &Configuration) -> Result<Manifest, ManifestError> {
    let lines = preprocess_with(input, config)?;
    parse_lines(&lines)
}

/// Read a text source to the end and parse it.
pub fn parse_reader<R: Read>(reader: R, config: &Configuration) -> Result<Manifest, ManifestError> {
    let lines = preprocess_reader(reader, config)?;
    parse_lines(&lines)
}

fn parse_lines(lines: &[InputLine]) -> Result<Manifest, ManifestError> {
    let tokens = tokenize(lines)?;
    Ok(parse_tokens(&tokens)?)
}

#[cfg(test)]
mod tests;
