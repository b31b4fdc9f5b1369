// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Entry lexer for a single logical line.
//!
//! The tokenizer strips indentation and list item markers, then hands the
//! remainder of the line to this chumsky grammar, which splits it into a
//! key and an optional value, or a bare scalar.
//!
//! - A plain key runs up to the first `:` that is followed by a space or
//!   the end of the line. A `:` followed by anything else belongs to the key.
//! - A value runs to the end of the line.
//! - Keys and values may be double-quoted; the quotes are removed and the
//!   content is kept verbatim.

use chumsky::prelude::*;

use crate::span::{Span, Spanned};

/// One entry as written on a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// `key: value`, or `key:` introducing a nested block.
    Pair {
        key: Spanned<String>,
        value: Option<Spanned<String>>,
    },
    /// A scalar without a key (only valid as a list item).
    Scalar(Spanned<String>),
}

/// Why a line could not be lexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    /// The offending character, if any (`None` at end of line).
    pub found: Option<String>,
    pub span: Span,
}

/// A double-quoted scalar. No escapes: the content is kept verbatim.
fn quoted<'src>() -> impl Parser<'src, &'src str, String, extra::Err<Rich<'src, char, Span>>> {
    none_of("\"")
        .repeated()
        .to_slice()
        .delimited_by(just('"'), just('"'))
        .map(|s: &str| s.to_owned())
}

/// Unquoted text up to the end of the line.
fn plain<'src>() -> impl Parser<'src, &'src str, String, extra::Err<Rich<'src, char, Span>>> {
    none_of("\"")
        .then(any().repeated())
        .to_slice()
        .map(|s: &str| s.to_owned())
}

/// A value: quoted, or plain text up to the end of the line.
fn scalar<'src>()
-> impl Parser<'src, &'src str, Spanned<String>, extra::Err<Rich<'src, char, Span>>> {
    quoted().or(plain()).map_with(|value, e| (value, e.span()))
}

/// A scalar standing alone on a line. Plain text shaped like a broken
/// `key: value` pair is not accepted.
fn bare_scalar<'src>()
-> impl Parser<'src, &'src str, Spanned<String>, extra::Err<Rich<'src, char, Span>>> {
    let plain = plain().try_map(|text, span| {
        if text.contains(": ") || text.ends_with(':') {
            Err(Rich::custom(span, "malformed key-value pair"))
        } else {
            Ok(text)
        }
    });

    quoted().or(plain).map_with(|value, e| (value, e.span()))
}

/// Create the entry grammar.
fn entry<'src>() -> impl Parser<'src, &'src str, Entry, extra::Err<Rich<'src, char, Span>>> {
    // A colon is part of a plain key unless a space follows it
    let key_colon = just(':').then(none_of(" ").rewind()).to(':');
    let key_char = none_of(":\"").or(key_colon);

    let plain_key = key_char
        .repeated()
        .at_least(1)
        .to_slice()
        .map(|s: &str| s.trim_end().to_owned());

    let key = quoted()
        .or(plain_key)
        .map_with(|key, e| (key, e.span()));

    let pair = key
        .then_ignore(just(':'))
        .then(
            just(' ')
                .repeated()
                .at_least(1)
                .ignore_then(scalar())
                .or_not(),
        )
        .then_ignore(end())
        .map(|(key, value)| Entry::Pair { key, value });

    let bare = bare_scalar().then_ignore(end()).map(Entry::Scalar);

    choice((pair, bare))
}

/// Lex the content of a logical line (indentation and list markers removed).
///
/// Spans in the result are byte offsets into `text`.
pub fn lex_entry(text: &str) -> Result<Entry, LexError> {
    entry().parse(text).into_result().map_err(|errs| {
        errs.first().map_or(
            LexError {
                found: None,
                span: Span::from(0..text.len()),
            },
            |err| LexError {
                found: err.found().map(|c| c.to_string()),
                span: *err.span(),
            },
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(text: &str) -> (String, Option<String>) {
        match lex_entry(text).unwrap() {
            Entry::Pair { key, value } => (key.0, value.map(|value| value.0)),
            Entry::Scalar(scalar) => panic!("expected a pair, got scalar {scalar:?}"),
        }
    }

    #[test]
    fn test_key_value() {
        assert_eq!(pair("name: app"), ("name".to_owned(), Some("app".to_owned())));
    }

    #[test]
    fn test_key_without_value() {
        assert_eq!(pair("applications:"), ("applications".to_owned(), None));
    }

    #[test]
    fn test_colon_inside_value_and_key() {
        assert_eq!(
            pair("url: http://example.org:8080/path"),
            ("url".to_owned(), Some("http://example.org:8080/path".to_owned()))
        );
        assert_eq!(
            pair("a:b: c: d"),
            ("a:b".to_owned(), Some("c: d".to_owned()))
        );
    }

    #[test]
    fn test_quoted_value_is_verbatim() {
        assert_eq!(
            pair("host: \"quoted-path-application\""),
            ("host".to_owned(), Some("quoted-path-application".to_owned()))
        );
        assert_eq!(
            pair("command: \"echo 'a: b' # here\""),
            ("command".to_owned(), Some("echo 'a: b' # here".to_owned()))
        );
        assert_eq!(pair("path: \"\""), ("path".to_owned(), Some(String::new())));
    }

    #[test]
    fn test_quoted_key() {
        assert_eq!(
            pair("\"odd: key\": v"),
            ("odd: key".to_owned(), Some("v".to_owned()))
        );
    }

    #[test]
    fn test_value_span() {
        let Entry::Pair { key, value } = lex_entry("host: h1").unwrap() else {
            panic!("expected a pair");
        };
        assert_eq!((key.1.start, key.1.end), (0, 4));
        let value = value.unwrap();
        assert_eq!((value.1.start, value.1.end), (6, 8));
    }

    #[test]
    fn test_bare_scalar() {
        assert_eq!(
            lex_entry("mysql").unwrap(),
            Entry::Scalar(("mysql".to_owned(), Span::from(0..5)))
        );
        assert!(matches!(
            lex_entry("\"a: b\"").unwrap(),
            Entry::Scalar((ref text, _)) if text == "a: b"
        ));
    }

    #[test]
    fn test_trailing_text_after_quote_is_rejected() {
        assert!(lex_entry("host: \"h\" extra").is_err());
        assert!(lex_entry("\"h\" extra").is_err());
    }

    #[test]
    fn test_missing_key_is_rejected() {
        assert!(lex_entry(": value").is_err());
    }
}
