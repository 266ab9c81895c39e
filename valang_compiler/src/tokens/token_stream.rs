//! Token stream with whitespace filtering and backtracking
//!
//! The parser only ever sees significant tokens, but spans always refer to the
//! original source so errors point at the right column.

use crate::grammar::keywords::Keyword;
use crate::tokens::token::Token;
use crate::utils::{Span, Spanned};
use std::fmt;

pub type SpannedToken = Spanned<Token>;

#[derive(Debug, Clone)]
pub struct TokenStream {
    all_tokens: Vec<SpannedToken>,
    significant_indices: Vec<usize>,
    position: usize,
}

impl TokenStream {
    /// Build a stream; whitespace stays in `all_tokens` but is skipped by navigation
    pub fn new(tokens: Vec<SpannedToken>) -> Self {
        let significant_indices = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.value.is_significant())
            .map(|(i, _)| i)
            .collect();

        Self {
            all_tokens: tokens,
            significant_indices,
            position: 0,
        }
    }

    // === NAVIGATION ===

    pub fn current(&self) -> Option<&SpannedToken> {
        self.peek_ahead(0)
    }

    pub fn current_token(&self) -> Option<&Token> {
        self.current().map(|spanned| &spanned.value)
    }

    pub fn current_span(&self) -> Option<Span> {
        self.current().map(|spanned| spanned.span)
    }

    pub fn peek(&self) -> Option<&SpannedToken> {
        self.peek_ahead(1)
    }

    pub fn peek_ahead(&self, n: usize) -> Option<&SpannedToken> {
        self.significant_indices
            .get(self.position + n)
            .and_then(|&index| self.all_tokens.get(index))
    }

    pub fn peek_token(&self, n: usize) -> Option<&Token> {
        self.peek_ahead(n).map(|spanned| &spanned.value)
    }

    pub fn advance(&mut self) -> Option<&SpannedToken> {
        if self.position < self.significant_indices.len() {
            self.position += 1;
        }
        self.current()
    }

    /// True at EOF or past the last token
    pub fn is_at_end(&self) -> bool {
        matches!(self.current_token(), None | Some(Token::Eof))
    }

    /// Number of significant tokens
    pub fn len(&self) -> usize {
        self.significant_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.significant_indices.is_empty()
    }

    /// Span of the most recently consumed token
    pub fn previous_span(&self) -> Option<Span> {
        self.position
            .checked_sub(1)
            .and_then(|prev| self.significant_indices.get(prev))
            .and_then(|&index| self.all_tokens.get(index))
            .map(|spanned| spanned.span)
    }

    /// Span from the token at `start_position` up to the last consumed token
    pub fn span_from(&self, start_position: usize) -> Span {
        let start = self
            .significant_indices
            .get(start_position)
            .and_then(|&index| self.all_tokens.get(index))
            .map(|spanned| spanned.span);

        match (start, self.previous_span()) {
            (Some(start), Some(end)) if end.end.offset >= start.start.offset => start.merge(end),
            (Some(start), _) => start,
            _ => self.current_span().unwrap_or_else(Span::dummy),
        }
    }

    // === MATCHING ===

    /// Same variant as `expected`, payload ignored
    pub fn check_token(&self, expected: &Token) -> bool {
        self.current_token()
            .map(|token| std::mem::discriminant(token) == std::mem::discriminant(expected))
            .unwrap_or(false)
    }

    pub fn check_keyword(&self, keyword: Keyword) -> bool {
        self.current_token()
            .map(|token| token.is_keyword(keyword))
            .unwrap_or(false)
    }

    pub fn consume_if(&mut self, predicate: impl FnOnce(&Token) -> bool) -> Option<SpannedToken> {
        let matched = self.current().filter(|t| predicate(&t.value)).cloned();
        if matched.is_some() {
            self.advance();
        }
        matched
    }

    pub fn advance_if_matches(&mut self, expected: &Token) -> bool {
        let matched = self.check_token(expected);
        if matched {
            self.advance();
        }
        matched
    }

    pub fn advance_if_keyword(&mut self, keyword: Keyword) -> bool {
        let matched = self.check_keyword(keyword);
        if matched {
            self.advance();
        }
        matched
    }

    /// Consume a token of the same variant as `expected` or report what was found
    pub fn expect_token(&mut self, expected: Token) -> Result<SpannedToken, TokenStreamError> {
        match self.current() {
            Some(current) if !matches!(current.value, Token::Eof) || expected == Token::Eof => {
                if std::mem::discriminant(&current.value) == std::mem::discriminant(&expected) {
                    let result = current.clone();
                    self.advance();
                    Ok(result)
                } else {
                    Err(TokenStreamError::UnexpectedToken {
                        expected: expected.text(),
                        found: current.value.text(),
                        span: current.span,
                    })
                }
            }
            Some(current) => Err(TokenStreamError::UnexpectedEndOfStream {
                expected: expected.text(),
                span: current.span,
            }),
            None => Err(TokenStreamError::UnexpectedEndOfStream {
                expected: expected.text(),
                span: self.previous_span().unwrap_or_else(Span::dummy),
            }),
        }
    }

    // === BACKTRACKING ===

    pub fn save_position(&self) -> usize {
        self.position
    }

    pub fn restore_position(&mut self, saved_position: usize) {
        self.position = saved_position.min(self.significant_indices.len());
    }

    // === INSPECTION ===

    pub fn all_tokens(&self) -> &[SpannedToken] {
        &self.all_tokens
    }

    pub fn iter_significant(&self) -> impl Iterator<Item = &SpannedToken> {
        self.significant_indices
            .iter()
            .filter_map(|&i| self.all_tokens.get(i))
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn has_eof(&self) -> bool {
        self.all_tokens
            .last()
            .map(|t| matches!(t.value, Token::Eof))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenStreamError {
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },
    UnexpectedEndOfStream {
        expected: String,
        span: Span,
    },
}

impl TokenStreamError {
    pub fn span(&self) -> Span {
        match self {
            TokenStreamError::UnexpectedToken { span, .. }
            | TokenStreamError::UnexpectedEndOfStream { span, .. } => *span,
        }
    }
}

impl fmt::Display for TokenStreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenStreamError::UnexpectedToken {
                expected,
                found,
                span,
            } => write!(
                f,
                "Expected '{}', found '{}' at {}",
                expected, found, span.start
            ),
            TokenStreamError::UnexpectedEndOfStream { expected, .. } => {
                write!(f, "Unexpected end of input, expected '{}'", expected)
            }
        }
    }
}

impl std::error::Error for TokenStreamError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Position;

    fn spanned(token: Token, offset: usize) -> SpannedToken {
        Spanned::new(token, Span::single(Position::new(offset, 1, offset as u32 + 1)))
    }

    fn stream() -> TokenStream {
        TokenStream::new(vec![
            spanned(Token::LeftBrace, 0),
            spanned(Token::Whitespace(" ".to_string()), 1),
            spanned(Token::Identifier("age".to_string()), 2),
            spanned(Token::Whitespace(" ".to_string()), 5),
            spanned(Token::Colon, 6),
            spanned(Token::Eof, 7),
        ])
    }

    #[test]
    fn test_whitespace_is_skipped() {
        let mut tokens = stream();
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens.current_token(), Some(&Token::LeftBrace));
        tokens.advance();
        assert_eq!(
            tokens.current_token(),
            Some(&Token::Identifier("age".to_string()))
        );
        assert_eq!(tokens.all_tokens().len(), 6);
    }

    #[test]
    fn test_expect_token_reports_found() {
        let mut tokens = stream();
        let err = tokens.expect_token(Token::Colon).unwrap_err();
        assert_eq!(err.to_string(), "Expected ':', found '{' at 1:1");
        assert!(tokens.expect_token(Token::LeftBrace).is_ok());
    }

    #[test]
    fn test_expect_at_eof_is_end_of_stream() {
        let mut tokens = stream();
        tokens.restore_position(3);
        let err = tokens.expect_token(Token::RightBrace).unwrap_err();
        assert!(matches!(err, TokenStreamError::UnexpectedEndOfStream { .. }));
        assert!(tokens.is_at_end());
    }

    #[test]
    fn test_backtracking() {
        let mut tokens = stream();
        let saved = tokens.save_position();
        tokens.advance();
        tokens.advance();
        assert!(tokens.check_token(&Token::Colon));
        tokens.restore_position(saved);
        assert!(tokens.check_token(&Token::LeftBrace));
    }

    #[test]
    fn test_span_from_covers_consumed_tokens() {
        let mut tokens = stream();
        let start = tokens.save_position();
        tokens.advance();
        tokens.advance();
        let span = tokens.span_from(start);
        assert_eq!(span.start.offset, 0);
        assert_eq!(span.end.offset, 3);
    }
}
