//! Core lexical analyzer for rule text
//!
//! Tokenization is a single left-to-right pass. Property paths are recognised
//! here (a name immediately followed by `.name` or `[...]`), bracketed date and
//! enum literals are captured raw, and whitespace is kept as a token so that
//! the stream can report accurate spans.

use crate::config::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::grammar::keywords::Keyword;
use crate::logging::codes;
use crate::tokens::{classify_symbol, classify_word, Token, TokenClass, TokenStream};
use crate::utils::{Position, Span, Spanned};
use crate::{log_debug, log_error, log_success};
use std::collections::BTreeMap;
use std::iter::Peekable;
use std::str::CharIndices;

/// Lexical analysis errors with compile-time security boundaries
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexerError {
    #[error("Invalid character '{character}' at {}", .span.start)]
    InvalidCharacter { character: char, span: Span },

    #[error("Unterminated string literal starting at {}", .span.start)]
    UnterminatedString { span: Span },

    #[error("Unterminated {kind} starting at {}", .span.start)]
    UnterminatedBracket { kind: &'static str, span: Span },

    #[error("Invalid number format '{text}' at {}", .span.start)]
    InvalidNumber { text: String, span: Span },

    #[error("Identifier too long: {length} characters (max {MAX_IDENTIFIER_LENGTH})")]
    IdentifierTooLong { length: usize, span: Span },

    #[error("String too large: {size} bytes (max {MAX_STRING_SIZE})")]
    StringTooLarge { size: usize, span: Span },

    #[error("Too many tokens: {count} (max {MAX_TOKEN_COUNT})")]
    TooManyTokens { count: usize, span: Span },

    #[error("Rule source too large: {size} bytes (max {MAX_SOURCE_SIZE})")]
    SourceTooLarge { size: usize },
}

pub type LexerResult<T> = Result<T, LexerError>;

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::InvalidCharacter { .. } => codes::lexical::INVALID_CHARACTER,
            LexerError::UnterminatedString { .. } => codes::lexical::UNTERMINATED_STRING,
            LexerError::UnterminatedBracket { .. } => codes::lexical::UNTERMINATED_BRACKET,
            LexerError::InvalidNumber { .. } => codes::lexical::INVALID_NUMBER,
            LexerError::IdentifierTooLong { .. } => codes::lexical::IDENTIFIER_TOO_LONG,
            LexerError::StringTooLarge { .. } => codes::lexical::STRING_TOO_LARGE,
            LexerError::TooManyTokens { .. } => codes::lexical::TOKEN_LIMIT_EXCEEDED,
            LexerError::SourceTooLarge { .. } => codes::lexical::SOURCE_TOO_LARGE,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            LexerError::InvalidCharacter { span, .. }
            | LexerError::UnterminatedString { span }
            | LexerError::UnterminatedBracket { span, .. }
            | LexerError::InvalidNumber { span, .. }
            | LexerError::IdentifierTooLong { span, .. }
            | LexerError::StringTooLarge { span, .. }
            | LexerError::TooManyTokens { span, .. } => Some(*span),
            LexerError::SourceTooLarge { .. } => None,
        }
    }
}

/// Token counts collected during one tokenization
#[derive(Debug, Default, Clone)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub keyword_tokens: usize,
    pub name_tokens: usize,
    pub literal_tokens: usize,
    pub operator_tokens: usize,
    pub max_string_length: usize,

    // Only filled when detailed metrics are enabled
    pub whitespace_tokens: usize,
    pub class_counts: BTreeMap<TokenClass, usize>,
}

impl LexicalMetrics {
    pub(crate) fn record_token(&mut self, token: &Token, preferences: &LexicalPreferences) {
        self.total_tokens += 1;
        let class = token.token_class();
        match class {
            TokenClass::Keyword => self.keyword_tokens += 1,
            TokenClass::Name => self.name_tokens += 1,
            TokenClass::Literal => self.literal_tokens += 1,
            TokenClass::Operator => self.operator_tokens += 1,
            _ => {}
        }

        if preferences.collect_detailed_metrics {
            if class == TokenClass::Whitespace {
                self.whitespace_tokens += 1;
            }
            *self.class_counts.entry(class).or_insert(0) += 1;
        }
    }

    pub(crate) fn record_string_length(&mut self, length: usize) {
        self.max_string_length = self.max_string_length.max(length);
    }
}

/// Character cursor that keeps line and column in step with the byte offset
struct Cursor<'a> {
    chars: Peekable<CharIndices<'a>>,
    position: Position,
}

impl<'a> Cursor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.char_indices().peekable(),
            position: Position::start(),
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_second(&self) -> Option<char> {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next().map(|(_, c)| c)
    }

    fn bump(&mut self) -> Option<char> {
        let (_, ch) = self.chars.next()?;
        self.position = self.position.advance(ch);
        Some(ch)
    }

    fn bump_while(&mut self, buffer: &mut String, predicate: impl Fn(char) -> bool) {
        while let Some(ch) = self.peek() {
            if !predicate(ch) {
                break;
            }
            buffer.push(ch);
            self.bump();
        }
    }
}

fn is_name_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_name_part(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

/// Core lexical analyzer with global logging integration and compile-time security boundaries
pub struct LexicalAnalyzer {
    metrics: LexicalMetrics,
    preferences: LexicalPreferences,
}

impl LexicalAnalyzer {
    pub fn new() -> Self {
        Self {
            metrics: LexicalMetrics::default(),
            preferences: LexicalPreferences::default(),
        }
    }

    pub fn with_preferences(preferences: LexicalPreferences) -> Self {
        Self {
            metrics: LexicalMetrics::default(),
            preferences,
        }
    }

    /// Tokenize rule source into a stream terminated by `Eof`
    pub fn tokenize(&mut self, source: &str) -> LexerResult<TokenStream> {
        self.metrics = LexicalMetrics::default();

        if source.len() > MAX_SOURCE_SIZE {
            let error = LexerError::SourceTooLarge { size: source.len() };
            log_error!(error.error_code(), &error.to_string(),
                "size" => source.len(),
                "limit" => MAX_SOURCE_SIZE
            );
            return Err(error);
        }

        log_debug!("Starting lexical analysis",
            "char_count" => source.chars().count(),
            "max_tokens_allowed" => MAX_TOKEN_COUNT
        );

        let mut cursor = Cursor::new(source);
        let mut tokens: Vec<Spanned<Token>> = Vec::new();
        // Open `[` of an `@map[...]` key expression
        let mut bracket_depth = 0usize;

        loop {
            let start = cursor.position;

            if tokens.len() >= MAX_TOKEN_COUNT {
                let error = LexerError::TooManyTokens {
                    count: tokens.len(),
                    span: Span::new(start, start),
                };
                self.log_failure(&error);
                return Err(error);
            }

            let Some(ch) = cursor.peek() else {
                break;
            };

            let after_at = matches!(tokens.last().map(|t| &t.value), Some(Token::At));
            let result = match ch {
                c if c.is_whitespace() => {
                    let mut text = String::new();
                    cursor.bump_while(&mut text, char::is_whitespace);
                    Ok(Token::Whitespace(text))
                }
                '{' | '}' | '(' | ')' | ',' | ':' | '?' | '@' => {
                    cursor.bump();
                    Ok(match ch {
                        '{' => Token::LeftBrace,
                        '}' => Token::RightBrace,
                        '(' => Token::LeftParen,
                        ')' => Token::RightParen,
                        ',' => Token::Comma,
                        ':' => Token::Colon,
                        '?' => Token::Question,
                        _ => Token::At,
                    })
                }
                '\'' => self.scan_string(&mut cursor),
                '[' if after_at_name(&tokens) => {
                    cursor.bump();
                    bracket_depth += 1;
                    Ok(Token::LeftBracket)
                }
                '[' => self.scan_bracket_literal(&mut cursor),
                ']' if bracket_depth > 0 => {
                    cursor.bump();
                    bracket_depth -= 1;
                    Ok(Token::RightBracket)
                }
                '0'..='9' => self.scan_number(&mut cursor),
                c if is_name_start(c) => self.scan_name(&mut cursor, after_at),
                '=' | '!' | '<' | '>' | '+' | '-' | '*' | '/' | '%' => {
                    Ok(self.scan_symbol(&mut cursor, ch))
                }
                other => Err(LexerError::InvalidCharacter {
                    character: other,
                    span: Span::single(start),
                }),
            };

            match result {
                Ok(token) => {
                    self.metrics.record_token(&token, &self.preferences);
                    tokens.push(Spanned::new(token, Span::new(start, cursor.position)));
                }
                Err(error) => {
                    self.log_failure(&error);
                    return Err(error);
                }
            }
        }

        let end = cursor.position;
        tokens.push(Spanned::new(Token::Eof, Span::new(end, end)));

        let stream = TokenStream::new(tokens);

        log_success!(codes::success::TOKENIZATION_COMPLETE,
            "Lexical analysis completed successfully",
            "token_count" => stream.len(),
            "keywords" => self.metrics.keyword_tokens,
            "names" => self.metrics.name_tokens,
            "literals" => self.metrics.literal_tokens,
            "operators" => self.metrics.operator_tokens,
            "max_string_length" => self.metrics.max_string_length
        );

        Ok(stream)
    }

    /// Get current metrics
    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    pub fn preferences(&self) -> &LexicalPreferences {
        &self.preferences
    }

    pub fn set_preferences(&mut self, preferences: LexicalPreferences) {
        self.preferences = preferences;
    }

    fn log_failure(&self, error: &LexerError) {
        let message = error.to_string();
        match (error.span(), self.preferences.include_position_in_errors) {
            (Some(span), true) => log_error!(error.error_code(), &message,
                span = span,
                "line" => span.line(),
                "column" => span.column(),
                "tokens_processed" => self.metrics.total_tokens
            ),
            _ => log_error!(error.error_code(), &message,
                "tokens_processed" => self.metrics.total_tokens
            ),
        }
    }

    /// `'...'` with `\'` and `\\` escapes; other backslash pairs are kept verbatim
    fn scan_string(&mut self, cursor: &mut Cursor<'_>) -> LexerResult<Token> {
        let start = cursor.position;
        cursor.bump();
        let mut content = String::new();

        loop {
            match cursor.bump() {
                None => {
                    return Err(LexerError::UnterminatedString {
                        span: Span::new(start, cursor.position),
                    })
                }
                Some('\'') => break,
                Some('\\') => match cursor.peek() {
                    Some(escaped @ ('\'' | '\\')) => {
                        cursor.bump();
                        content.push(escaped);
                    }
                    _ => content.push('\\'),
                },
                Some(ch) => content.push(ch),
            }

            if content.len() > MAX_STRING_SIZE {
                return Err(LexerError::StringTooLarge {
                    size: content.len(),
                    span: Span::new(start, cursor.position),
                });
            }
        }

        self.metrics.record_string_length(content.len());
        Ok(Token::StringLiteral(content))
    }

    /// `[...]` date literal or `['...']` enum literal
    fn scan_bracket_literal(&mut self, cursor: &mut Cursor<'_>) -> LexerResult<Token> {
        let start = cursor.position;
        cursor.bump();

        if cursor.peek() == Some('\'') {
            cursor.bump();
            let mut content = String::new();
            loop {
                match cursor.bump() {
                    Some('\'') if cursor.peek() == Some(']') => {
                        cursor.bump();
                        return Ok(Token::EnumLiteral(content));
                    }
                    Some(ch) => content.push(ch),
                    None => {
                        return Err(LexerError::UnterminatedBracket {
                            kind: "enum literal",
                            span: Span::new(start, cursor.position),
                        })
                    }
                }
            }
        }

        let mut content = String::new();
        cursor.bump_while(&mut content, |c| c != ']');
        if cursor.bump().is_none() {
            return Err(LexerError::UnterminatedBracket {
                kind: "date literal",
                span: Span::new(start, cursor.position),
            });
        }
        Ok(Token::DateLiteral(content))
    }

    /// Decimal (`12`, `19.95`) or hexadecimal (`0x1F`) literal
    fn scan_number(&mut self, cursor: &mut Cursor<'_>) -> LexerResult<Token> {
        let start = cursor.position;
        let mut text = String::new();

        let is_hex = cursor.peek() == Some('0')
            && matches!(cursor.peek_second(), Some('x') | Some('X'));

        let token = if is_hex {
            text.push('0');
            cursor.bump();
            if let Some(x) = cursor.bump() {
                text.push(x);
            }
            let digits_start = text.len();
            cursor.bump_while(&mut text, |c| c.is_ascii_hexdigit());
            if text.len() == digits_start {
                return Err(LexerError::InvalidNumber {
                    text,
                    span: Span::new(start, cursor.position),
                });
            }
            Token::HexLiteral(text.clone())
        } else {
            cursor.bump_while(&mut text, |c| c.is_ascii_digit());
            if cursor.peek() == Some('.')
                && cursor.peek_second().is_some_and(|c| c.is_ascii_digit())
            {
                text.push('.');
                cursor.bump();
                cursor.bump_while(&mut text, |c| c.is_ascii_digit());
            }
            Token::DecimalLiteral(text.clone())
        };

        // `12abc` is neither a number nor a name
        if let Some(next) = cursor.peek() {
            if is_name_part(next) || next == '.' {
                text.push(next);
                cursor.bump();
                return Err(LexerError::InvalidNumber {
                    text,
                    span: Span::new(start, cursor.position),
                });
            }
        }

        Ok(token)
    }

    /// Keyword, identifier or compound property path
    fn scan_name(&mut self, cursor: &mut Cursor<'_>, after_at: bool) -> LexerResult<Token> {
        let start = cursor.position;
        let mut text = String::new();
        self.scan_word(cursor, &mut text, start)?;

        let first_word = classify_word(&text);
        let can_extend = match &first_word {
            Token::Identifier(_) => true,
            Token::Keyword(kw) => *kw == Keyword::This,
            _ => false,
        };
        if !can_extend {
            return Ok(first_word);
        }

        let mut extended = false;
        loop {
            match cursor.peek() {
                Some('.') if cursor.peek_second().is_some_and(is_name_start) => {
                    text.push('.');
                    cursor.bump();
                    self.scan_word(cursor, &mut text, start)?;
                    extended = true;
                }
                Some('[') if !after_at => {
                    let bracket_start = cursor.position;
                    text.push('[');
                    cursor.bump();
                    let mut depth = 1usize;
                    while depth > 0 {
                        match cursor.bump() {
                            Some(ch) => {
                                match ch {
                                    '[' => depth += 1,
                                    ']' => depth -= 1,
                                    _ => {}
                                }
                                text.push(ch);
                            }
                            None => {
                                return Err(LexerError::UnterminatedBracket {
                                    kind: "property index",
                                    span: Span::new(bracket_start, cursor.position),
                                })
                            }
                        }
                    }
                    extended = true;
                }
                _ => break,
            }
        }

        if extended {
            Ok(Token::Path(text))
        } else {
            Ok(first_word)
        }
    }

    fn scan_word(
        &mut self,
        cursor: &mut Cursor<'_>,
        text: &mut String,
        start: Position,
    ) -> LexerResult<()> {
        let before = text.chars().count();
        cursor.bump_while(text, is_name_part);
        let length = text.chars().count() - before;
        if length > MAX_IDENTIFIER_LENGTH {
            return Err(LexerError::IdentifierTooLong {
                length,
                span: Span::new(start, cursor.position),
            });
        }
        Ok(())
    }

    fn scan_symbol(&mut self, cursor: &mut Cursor<'_>, first: char) -> Token {
        cursor.bump();
        if let Some(second) = cursor.peek() {
            let pair: String = [first, second].iter().collect();
            if let Some(token) = classify_symbol(&pair) {
                cursor.bump();
                return token;
            }
        }
        let single = first.to_string();
        // Every character routed here has a one-character meaning
        classify_symbol(&single).unwrap_or(Token::Bang)
    }
}

/// `@name[` opens a map-entry key expression rather than a date literal
fn after_at_name(tokens: &[Spanned<Token>]) -> bool {
    let mut significant = tokens.iter().rev();
    matches!(
        (
            significant.next().map(|t| &t.value),
            significant.next().map(|t| &t.value)
        ),
        (
            Some(Token::Identifier(_) | Token::Path(_) | Token::Keyword(Keyword::This)),
            Some(Token::At)
        )
    )
}

impl Default for LexicalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
