//! Token and span types.

use crate::kind::TokenKind;

/// A half-open byte range into the scanned source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// A classified slice of the scanned source.
///
/// Tokens borrow the source text and are immutable once emitted. Consumers
/// receive them in strictly increasing, contiguous span order covering the
/// whole input exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub text: &'src str,
    pub span: Span,
}

impl<'src> Token<'src> {
    pub fn new(kind: TokenKind, text: &'src str, span: Span) -> Self {
        Self { kind, text, span }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_len_and_range() {
        let span = Span::new(3, 7);
        assert_eq!(span.len(), 4);
        assert!(!span.is_empty());
        assert_eq!(span.range(), 3..7);
    }

    #[test]
    fn test_token_borrows_source() {
        let source = "let x = 1";
        let token = Token::new(TokenKind::KeywordDeclaration, &source[0..3], Span::new(0, 3));
        assert_eq!(token.text, "let");
        assert_eq!(token.span, Span::new(0, 3));
    }
}
