//! Atomic builders: the parser interface, literals, names and operator phrases
//!
//! Builders are free functions over `&mut dyn Parser` so the grammar stays
//! independent of how tokens are stored or how errors are recorded.

use crate::dates::DateParser;
use crate::functions::FunctionRegistry;
use crate::grammar::ast::nodes::*;
use crate::grammar::error::ConstructionError;
use crate::grammar::keywords::Keyword;
use crate::syntax::{SyntaxError, SyntaxResult};
use crate::tokens::Token;
use crate::utils::Span;
use bigdecimal::num_bigint::BigInt;
use bigdecimal::BigDecimal;
use std::str::FromStr;

/// Interface the grammar builders drive
pub trait Parser {
    // === NAVIGATION ===
    fn current_token(&self) -> Option<&Token>;
    /// Significant token `n` places ahead of the current one
    fn peek_token(&self, n: usize) -> Option<&Token>;
    fn advance(&mut self);
    fn position(&self) -> usize;
    fn restore(&mut self, position: usize);

    // === EXPECTATIONS ===
    fn expect_token(&mut self, expected: Token) -> SyntaxResult<Span>;
    fn expect_string_literal(&mut self) -> SyntaxResult<String>;

    // === SPANS ===
    fn current_span(&self) -> Span;
    /// Span from the token at `start` to the last consumed token
    fn span_from(&self, start: usize) -> Span;

    // === NESTING ===
    fn enter_nesting(&mut self) -> SyntaxResult<()>;
    fn exit_nesting(&mut self);

    // === RULE CONTEXT ===
    fn functions(&self) -> &FunctionRegistry;
    fn dates(&self) -> &DateParser;
    /// Key of the rule being parsed; `?` refers to it
    fn rule_key(&self) -> Option<&str>;
    fn set_rule_key(&mut self, key: Option<String>);
}

/// Error for the current token when `expected` was needed
pub fn unexpected(parser: &dyn Parser, expected: &str) -> SyntaxError {
    match parser.current_token() {
        None | Some(Token::Eof) => {
            SyntaxError::unexpected_end_of_input(expected, parser.current_span())
        }
        Some(token) => SyntaxError::unexpected_token(expected, &token.text(), parser.current_span()),
    }
}

// === LITERALS ===

/// Decimal, hex, string, boolean or null literal at the current token
pub fn parse_literal(parser: &mut dyn Parser) -> SyntaxResult<Literal> {
    let span = parser.current_span();
    let literal = match parser.current_token() {
        Some(Token::DecimalLiteral(text)) => Literal::Number(parse_decimal(text, span)?),
        Some(Token::HexLiteral(text)) => Literal::Number(parse_hex(text, span)?),
        Some(Token::StringLiteral(text)) => Literal::String(text.clone()),
        Some(Token::Keyword(Keyword::True)) => Literal::Boolean(true),
        Some(Token::Keyword(Keyword::False)) => Literal::Boolean(false),
        Some(Token::Keyword(Keyword::Null)) => Literal::Null,
        _ => return Err(unexpected(parser, "literal")),
    };
    parser.advance();
    Ok(literal)
}

/// Digits after a `-` sign become one negative literal
pub fn parse_negative_number(parser: &mut dyn Parser) -> SyntaxResult<Literal> {
    match parse_literal(parser)? {
        Literal::Number(value) => Ok(Literal::Number(-value)),
        _ => Err(unexpected(parser, "number")),
    }
}

pub fn is_number_token(token: Option<&Token>) -> bool {
    matches!(token, Some(Token::DecimalLiteral(_) | Token::HexLiteral(_)))
}

fn parse_decimal(text: &str, span: Span) -> SyntaxResult<BigDecimal> {
    BigDecimal::from_str(text).map_err(|_| invalid_number(text, span))
}

fn parse_hex(text: &str, span: Span) -> SyntaxResult<BigDecimal> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    BigInt::parse_bytes(digits.as_bytes(), 16)
        .map(|value| BigDecimal::new(value, 0))
        .ok_or_else(|| invalid_number(text, span))
}

fn invalid_number(text: &str, span: Span) -> SyntaxError {
    SyntaxError::Construction(ConstructionError::InvalidNumber {
        text: text.to_string(),
        span,
    })
}

// === NAMES ===

/// Property path from a name token
pub fn parse_property_path(parser: &mut dyn Parser) -> SyntaxResult<PropertyPath> {
    let span = parser.current_span();
    let text = match parser.current_token() {
        Some(Token::Identifier(name)) | Some(Token::Path(name)) => name.clone(),
        _ => return Err(unexpected(parser, "property name")),
    };
    parser.advance();
    path_from_text(&text, span)
}

pub fn path_from_text(text: &str, span: Span) -> SyntaxResult<PropertyPath> {
    PropertyPath::parse(text).ok_or_else(|| {
        SyntaxError::Construction(ConstructionError::InvalidPath {
            text: text.to_string(),
            span,
        })
    })
}

/// `[expr]` date literal, checked against the date parser now and resolved
/// again at evaluation time
pub fn parse_date_literal(parser: &mut dyn Parser) -> SyntaxResult<DateLiteral> {
    let span = parser.current_span();
    let raw = match parser.current_token() {
        Some(Token::DateLiteral(raw)) => raw.clone(),
        _ => return Err(unexpected(parser, "date literal")),
    };
    if let Err(error) = parser.dates().parse(&raw) {
        return Err(SyntaxError::Construction(
            ConstructionError::InvalidDateLiteral {
                text: raw,
                reason: error.to_string(),
                span,
            },
        ));
    }
    parser.advance();
    Ok(DateLiteral::new(raw))
}

pub fn parse_enum_literal(parser: &mut dyn Parser) -> SyntaxResult<EnumLiteral> {
    let span = parser.current_span();
    let raw = match parser.current_token() {
        Some(Token::EnumLiteral(raw)) => raw.clone(),
        _ => return Err(unexpected(parser, "enum literal")),
    };
    let literal = EnumLiteral::parse(&raw).ok_or_else(|| {
        SyntaxError::Construction(ConstructionError::InvalidEnumLiteral {
            text: raw.clone(),
            span,
        })
    })?;
    parser.advance();
    Ok(literal)
}

// === OPERATORS ===

/// `+` or `-`
pub fn parse_additive_operator(parser: &mut dyn Parser) -> Option<MathOperator> {
    let op = match parser.current_token() {
        Some(Token::Plus) => MathOperator::Add,
        Some(Token::Minus) => MathOperator::Subtract,
        _ => return None,
    };
    parser.advance();
    Some(op)
}

/// `*`, `/`, `%`, `div` or `mod`
pub fn parse_multiplicative_operator(parser: &mut dyn Parser) -> Option<MathOperator> {
    let op = match parser.current_token() {
        Some(Token::Star) => MathOperator::Multiply,
        Some(Token::Slash) | Some(Token::Keyword(Keyword::Div)) => MathOperator::Divide,
        Some(Token::Percent) | Some(Token::Keyword(Keyword::Mod)) => MathOperator::Modulo,
        _ => return None,
    };
    parser.advance();
    Some(op)
}

/// Comparison operator in any of its symbol or word spellings
///
/// ```text
/// = == equals is            != <> not equals is not
/// < less than               <= less than or equals
/// > greater than            >= greater than or equals
/// is null / is not null     has text / has no text
/// has length / has no length
/// is blank / is word / is uppercase / is upper case / is lowercase / is lower case
/// between / not between / in / not in
/// ```
///
/// Every `is` phrase also accepts `is not`; `is less than ..` and
/// `is greater than ..` read the same as their short forms.
pub fn parse_comparison_operator(parser: &mut dyn Parser) -> SyntaxResult<Operator> {
    let span = parser.current_span();
    let symbol = match parser.current_token() {
        Some(Token::Equals) => Some(Operator::Equal),
        Some(Token::NotEquals) => Some(Operator::NotEqual),
        Some(Token::LessThan) => Some(Operator::LessThan),
        Some(Token::LessThanOrEqual) => Some(Operator::LessThanOrEqual),
        Some(Token::GreaterThan) => Some(Operator::GreaterThan),
        Some(Token::GreaterThanOrEqual) => Some(Operator::GreaterThanOrEqual),
        Some(Token::Keyword(Keyword::Equals)) => Some(Operator::Equal),
        Some(Token::Keyword(Keyword::Between)) => Some(Operator::Between),
        Some(Token::Keyword(Keyword::In)) => Some(Operator::In),
        _ => None,
    };
    if let Some(operator) = symbol {
        parser.advance();
        return Ok(operator);
    }

    match parser.current_token() {
        Some(Token::Keyword(Keyword::Less)) => parse_ordering_phrase(parser, Keyword::Less),
        Some(Token::Keyword(Keyword::Greater)) => parse_ordering_phrase(parser, Keyword::Greater),
        Some(Token::Keyword(Keyword::Not)) => {
            parser.advance();
            let operator = match parser.current_token() {
                Some(Token::Keyword(Keyword::Equals)) => Operator::NotEqual,
                Some(Token::Keyword(Keyword::Between)) => Operator::NotBetween,
                Some(Token::Keyword(Keyword::In)) => Operator::NotIn,
                _ => return Err(invalid_phrase(parser, "not", span)),
            };
            parser.advance();
            Ok(operator)
        }
        Some(Token::Keyword(Keyword::Is)) => {
            parser.advance();
            parse_is_phrase(parser, span)
        }
        Some(Token::Keyword(Keyword::Has)) => {
            parser.advance();
            parse_has_phrase(parser, span)
        }
        _ => Err(unexpected(parser, "comparison operator")),
    }
}

/// `less than [or equals]` / `greater than [or equals]`
fn parse_ordering_phrase(parser: &mut dyn Parser, direction: Keyword) -> SyntaxResult<Operator> {
    parser.advance();
    parser.expect_token(Token::Keyword(Keyword::Than))?;

    let or_equals = parser.current_token().is_some_and(|t| t.is_keyword(Keyword::Or))
        && parser
            .peek_token(1)
            .is_some_and(|t| t.is_keyword(Keyword::Equals));
    if or_equals {
        parser.advance();
        parser.advance();
    }

    Ok(match (direction, or_equals) {
        (Keyword::Less, false) => Operator::LessThan,
        (Keyword::Less, true) => Operator::LessThanOrEqual,
        (_, false) => Operator::GreaterThan,
        (_, true) => Operator::GreaterThanOrEqual,
    })
}

/// Everything after `is`
fn parse_is_phrase(parser: &mut dyn Parser, span: Span) -> SyntaxResult<Operator> {
    let negated = parser
        .current_token()
        .is_some_and(|t| t.is_keyword(Keyword::Not));
    if negated {
        parser.advance();
    }

    if let Some((operator, width)) = word_test(parser.current_token(), parser.peek_token(1)) {
        for _ in 0..width {
            parser.advance();
        }
        return Ok(if negated { operator.negate() } else { operator });
    }

    let positive = match parser.current_token() {
        Some(Token::Keyword(Keyword::Null)) => {
            parser.advance();
            Operator::Null
        }
        Some(Token::Keyword(Keyword::Between)) => {
            parser.advance();
            Operator::Between
        }
        Some(Token::Keyword(direction @ (Keyword::Less | Keyword::Greater))) => {
            let direction = *direction;
            if negated {
                return Err(invalid_phrase(parser, "is not", span));
            }
            return parse_ordering_phrase(parser, direction);
        }
        // `is <value>` and `is not <value>`
        _ => Operator::Equal,
    };

    Ok(if negated { positive.negate() } else { positive })
}

/// `blank`, `word`, `uppercase`, `lowercase`, `upper case`, `lower case`
/// with the number of tokens they span. A word followed by `(` is a call.
fn word_test(token: Option<&Token>, next: Option<&Token>) -> Option<(Operator, usize)> {
    let Some(Token::Identifier(word)) = token else {
        return None;
    };
    if matches!(next, Some(Token::LeftParen)) {
        return None;
    }
    let case_follows = next.is_some_and(|t| t.is_word("case"));
    match word.to_ascii_lowercase().as_str() {
        "blank" => Some((Operator::IsBlank, 1)),
        "word" => Some((Operator::IsWord, 1)),
        "uppercase" => Some((Operator::IsUppercase, 1)),
        "lowercase" => Some((Operator::IsLowercase, 1)),
        "upper" if case_follows => Some((Operator::IsUppercase, 2)),
        "lower" if case_follows => Some((Operator::IsLowercase, 2)),
        _ => None,
    }
}

/// Everything after `has`
fn parse_has_phrase(parser: &mut dyn Parser, span: Span) -> SyntaxResult<Operator> {
    let negated = parser
        .current_token()
        .is_some_and(|t| t.is_keyword(Keyword::No));
    if negated {
        parser.advance();
    }

    let operator = match parser.current_token() {
        Some(token) if token.is_word("text") => {
            if negated {
                Operator::HasNoText
            } else {
                Operator::HasText
            }
        }
        Some(token) if token.is_word("length") => {
            if negated {
                Operator::HasNoLength
            } else {
                Operator::HasLength
            }
        }
        _ => {
            let prefix = if negated { "has no" } else { "has" };
            return Err(invalid_phrase(parser, prefix, span));
        }
    };
    parser.advance();
    Ok(operator)
}

fn invalid_phrase(parser: &dyn Parser, prefix: &str, span: Span) -> SyntaxError {
    let text = match parser.current_token() {
        Some(Token::Eof) | None => prefix.to_string(),
        Some(token) => format!("{} {}", prefix, token.text()),
    };
    SyntaxError::invalid_operator(&text, span.merge(parser.current_span()))
}
