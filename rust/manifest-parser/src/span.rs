// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Span types for tracking source locations.

use chumsky::span::SimpleSpan;

/// A column range within a single logical line.
///
/// This is an alias for chumsky's `SimpleSpan`, which tracks offsets.
/// The span is a half-open range `[start, end)` of byte offsets
/// from the start of the line, indentation included.
pub type Span = SimpleSpan<usize>;

/// A value with an associated source span.
pub type Spanned<T> = (T, Span);

/// Build a span covering `start..end`.
#[must_use]
pub fn span(start: usize, end: usize) -> Span {
    Span::from(start..end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_bounds() {
        let spanned: Spanned<&str> = ("host", span(2, 6));
        assert_eq!(spanned.1.start, 2);
        assert_eq!(spanned.1.end, 6);
        assert_eq!(spanned.1, Span::from(2..6));
    }
}
