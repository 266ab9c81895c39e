//! Tokens of the rule language
//!
//! Literal tokens keep their source text; interpretation (decimal parsing,
//! date expressions, enum names, path segments) is left to the parser so that
//! failures surface as construction errors with a precise span.
use crate::grammar::keywords::Keyword;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    Keyword(Keyword),

    /// Bare name: `age`, `length`, `inRole`
    Identifier(String),
    /// Compound property path: `customer.name`, `tags[1]`, `map[Test Key]`, `rows[]`
    Path(String),

    // === LITERALS ===
    /// Decimal digits with optional fraction, unsigned
    DecimalLiteral(String),
    /// `0x`-prefixed digits, prefix included
    HexLiteral(String),
    /// Single-quoted string with escapes already resolved
    StringLiteral(String),
    /// Text between `[` and `]`
    DateLiteral(String),
    /// Text between `['` and `']`
    EnumLiteral(String),

    // === PUNCTUATION ===
    LeftBrace,
    RightBrace,
    LeftParen,
    RightParen,
    /// Opens the key expression of `@map[...]`
    LeftBracket,
    RightBracket,
    Colon,
    Comma,
    Question,
    At,
    Bang,

    // === COMPARISON SYMBOLS ===
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,

    // === ARITHMETIC SYMBOLS ===
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    Whitespace(String),
    Eof,
}

/// Coarse token categories, used for metrics and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TokenClass {
    Keyword,
    Name,
    Literal,
    Punctuation,
    Operator,
    Whitespace,
    Special,
}

impl TokenClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenClass::Keyword => "keyword",
            TokenClass::Name => "name",
            TokenClass::Literal => "literal",
            TokenClass::Punctuation => "punctuation",
            TokenClass::Operator => "operator",
            TokenClass::Whitespace => "whitespace",
            TokenClass::Special => "special",
        }
    }
}

impl Token {
    pub fn is_significant(&self) -> bool {
        !matches!(self, Token::Whitespace(_))
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        matches!(self, Token::Keyword(kw) if *kw == keyword)
    }

    pub fn as_keyword(&self) -> Option<Keyword> {
        match self {
            Token::Keyword(kw) => Some(*kw),
            _ => None,
        }
    }

    /// Identifier text, compared case-insensitively against `word`
    pub fn is_word(&self, word: &str) -> bool {
        matches!(self, Token::Identifier(name) if name.eq_ignore_ascii_case(word))
    }

    pub fn is_comparison_symbol(&self) -> bool {
        matches!(
            self,
            Token::Equals
                | Token::NotEquals
                | Token::LessThan
                | Token::LessThanOrEqual
                | Token::GreaterThan
                | Token::GreaterThanOrEqual
        )
    }

    pub fn token_class(&self) -> TokenClass {
        match self {
            Token::Keyword(_) => TokenClass::Keyword,
            Token::Identifier(_) | Token::Path(_) => TokenClass::Name,
            Token::DecimalLiteral(_)
            | Token::HexLiteral(_)
            | Token::StringLiteral(_)
            | Token::DateLiteral(_)
            | Token::EnumLiteral(_) => TokenClass::Literal,
            Token::LeftBrace
            | Token::RightBrace
            | Token::LeftParen
            | Token::RightParen
            | Token::LeftBracket
            | Token::RightBracket
            | Token::Colon
            | Token::Comma
            | Token::Question
            | Token::At => TokenClass::Punctuation,
            Token::Bang
            | Token::Equals
            | Token::NotEquals
            | Token::LessThan
            | Token::LessThanOrEqual
            | Token::GreaterThan
            | Token::GreaterThanOrEqual
            | Token::Plus
            | Token::Minus
            | Token::Star
            | Token::Slash
            | Token::Percent => TokenClass::Operator,
            Token::Whitespace(_) => TokenClass::Whitespace,
            Token::Eof => TokenClass::Special,
        }
    }

    /// Source-like rendering used in error messages
    pub fn text(&self) -> String {
        match self {
            Token::Keyword(kw) => kw.as_str().to_string(),
            Token::Identifier(name) | Token::Path(name) => name.clone(),
            Token::DecimalLiteral(digits) | Token::HexLiteral(digits) => digits.clone(),
            Token::StringLiteral(text) => {
                format!("'{}'", text.replace('\\', "\\\\").replace('\'', "\\'"))
            }
            Token::DateLiteral(text) => format!("[{}]", text),
            Token::EnumLiteral(text) => format!("['{}']", text),
            Token::LeftBrace => "{".to_string(),
            Token::RightBrace => "}".to_string(),
            Token::LeftParen => "(".to_string(),
            Token::RightParen => ")".to_string(),
            Token::LeftBracket => "[".to_string(),
            Token::RightBracket => "]".to_string(),
            Token::Colon => ":".to_string(),
            Token::Comma => ",".to_string(),
            Token::Question => "?".to_string(),
            Token::At => "@".to_string(),
            Token::Bang => "!".to_string(),
            Token::Equals => "=".to_string(),
            Token::NotEquals => "!=".to_string(),
            Token::LessThan => "<".to_string(),
            Token::LessThanOrEqual => "<=".to_string(),
            Token::GreaterThan => ">".to_string(),
            Token::GreaterThanOrEqual => ">=".to_string(),
            Token::Plus => "+".to_string(),
            Token::Minus => "-".to_string(),
            Token::Star => "*".to_string(),
            Token::Slash => "/".to_string(),
            Token::Percent => "%".to_string(),
            Token::Whitespace(ws) => ws.clone(),
            Token::Eof => "<EOF>".to_string(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Keyword or identifier for a bare word
pub fn classify_word(word: &str) -> Token {
    match Keyword::from_word(word) {
        Some(keyword) => Token::Keyword(keyword),
        None => Token::Identifier(word.to_string()),
    }
}

/// Symbol token for one- or two-character operator text
pub fn classify_symbol(symbol: &str) -> Option<Token> {
    let token = match symbol {
        "=" | "==" => Token::Equals,
        "!=" | "<>" => Token::NotEquals,
        "<" => Token::LessThan,
        "<=" => Token::LessThanOrEqual,
        ">" => Token::GreaterThan,
        ">=" => Token::GreaterThanOrEqual,
        "!" => Token::Bang,
        "+" => Token::Plus,
        "-" => Token::Minus,
        "*" => Token::Star,
        "/" => Token::Slash,
        "%" => Token::Percent,
        _ => return None,
    };
    Some(token)
}
