// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Token wrapper.
//!
//! This module provides [`RichToken`] which wraps tokens with their source location.

use crate::span::Span;
use crate::token::Token;

/// A token with the line it came from and its column span on that line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichToken {
    /// The actual token.
    pub token: Token,
    /// 1-based source line.
    pub line: usize,
    /// Column range on the line.
    pub span: Span,
}

impl RichToken {
    /// Create a new rich token.
    #[must_use]
    pub const fn new(token: Token, line: usize, span: Span) -> Self {
        Self { token, line, span }
    }
}

impl std::fmt::Display for RichToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.token.fmt(f)
    }
}
