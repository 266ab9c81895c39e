//! Value expressions
//!
//! ```text
//! value          ::= multiplicative (("+" | "-") multiplicative)*
//! multiplicative ::= unary (("*" | "/" | "%" | "div" | "mod") unary)*
//! unary          ::= "-" unary | "!" unary | primary
//! primary        ::= literal | date | enum | "this" | "?" | path
//!                  | name "(" [value ("," value)*] ")"
//!                  | "@" path ["[" value "]"]
//!                  | "(" value ")"
//! ```

use crate::config::compile_time::syntax::MAX_FUNCTION_ARGUMENTS;
use crate::grammar::ast::nodes::*;
use crate::grammar::builders::atomic::{
    is_number_token, parse_additive_operator, parse_date_literal, parse_enum_literal,
    parse_literal, parse_multiplicative_operator, parse_negative_number, parse_property_path,
    path_from_text, unexpected, Parser,
};
use crate::grammar::builders::helpers::{nested, parse_comma_separated};
use crate::grammar::keywords::Keyword;
use crate::syntax::{SyntaxError, SyntaxResult};
use crate::tokens::Token;
use bigdecimal::BigDecimal;

pub fn parse_value(parser: &mut dyn Parser) -> SyntaxResult<Function> {
    nested(parser, parse_additive)
}

fn parse_additive(parser: &mut dyn Parser) -> SyntaxResult<Function> {
    let mut left = parse_multiplicative(parser)?;
    while let Some(op) = parse_additive_operator(parser) {
        let right = parse_multiplicative(parser)?;
        left = Function::math(op, left, right);
    }
    Ok(left)
}

fn parse_multiplicative(parser: &mut dyn Parser) -> SyntaxResult<Function> {
    let mut left = parse_unary_value(parser)?;
    while let Some(op) = parse_multiplicative_operator(parser) {
        let right = parse_unary_value(parser)?;
        left = Function::math(op, left, right);
    }
    Ok(left)
}

fn parse_unary_value(parser: &mut dyn Parser) -> SyntaxResult<Function> {
    match parser.current_token() {
        Some(Token::Minus) => {
            parser.advance();
            if is_number_token(parser.current_token()) {
                return Ok(Function::Literal(parse_negative_number(parser)?));
            }
            let operand = nested(parser, parse_unary_value)?;
            Ok(Function::math(
                MathOperator::Subtract,
                Function::number(BigDecimal::from(0)),
                operand,
            ))
        }
        Some(Token::Bang) => {
            parser.advance();
            let operand = nested(parser, parse_unary_value)?;
            Ok(Function::Not(Box::new(operand)))
        }
        _ => parse_primary_value(parser),
    }
}

fn parse_primary_value(parser: &mut dyn Parser) -> SyntaxResult<Function> {
    let calls_function = matches!(
        parser.current_token(),
        Some(Token::Identifier(_) | Token::Keyword(Keyword::Not))
    ) && matches!(parser.peek_token(1), Some(Token::LeftParen));
    if calls_function {
        return parse_function_call(parser);
    }

    match parser.current_token() {
        Some(
            Token::DecimalLiteral(_)
            | Token::HexLiteral(_)
            | Token::StringLiteral(_)
            | Token::Keyword(Keyword::True | Keyword::False | Keyword::Null),
        ) => Ok(Function::Literal(parse_literal(parser)?)),
        Some(Token::DateLiteral(_)) => Ok(Function::DateLiteral(parse_date_literal(parser)?)),
        Some(Token::EnumLiteral(_)) => Ok(Function::EnumLiteral(parse_enum_literal(parser)?)),
        Some(Token::Keyword(Keyword::This)) => {
            parser.advance();
            Ok(Function::Target)
        }
        Some(Token::Question) => parse_rule_key_reference(parser),
        Some(Token::Identifier(_) | Token::Path(_)) => {
            Ok(Function::Property(parse_property_path(parser)?))
        }
        Some(Token::At) => parse_collection_reference(parser),
        Some(Token::LeftParen) => {
            parser.advance();
            let value = parse_value(parser)?;
            parser.expect_token(Token::RightParen)?;
            Ok(value)
        }
        _ => Err(unexpected(parser, "value")),
    }
}

/// `?`: the property named by the enclosing rule's key
fn parse_rule_key_reference(parser: &mut dyn Parser) -> SyntaxResult<Function> {
    let span = parser.current_span();
    let key = match parser.rule_key() {
        Some(key) => key.to_string(),
        None => return Err(unexpected(parser, "value outside a rule")),
    };
    parser.advance();

    if key == GLOBAL_RULE_KEY {
        Ok(Function::Target)
    } else {
        Ok(Function::Property(path_from_text(&key, span)?))
    }
}

/// `@path` (a whole collection) or `@map[key]` (one map entry)
fn parse_collection_reference(parser: &mut dyn Parser) -> SyntaxResult<Function> {
    parser.expect_token(Token::At)?;
    let path = parse_property_path(parser)?;

    if !matches!(parser.current_token(), Some(Token::LeftBracket)) {
        return Ok(Function::Collection(path));
    }
    parser.advance();
    let key = parse_value(parser)?;
    parser.expect_token(Token::RightBracket)?;
    Ok(Function::MapEntry {
        map: path,
        key: Box::new(key),
    })
}

/// `name(args)` resolved through the function registry
pub fn parse_function_call(parser: &mut dyn Parser) -> SyntaxResult<Function> {
    let start = parser.position();
    let name = match parser.current_token() {
        Some(Token::Identifier(name)) => name.clone(),
        Some(Token::Keyword(Keyword::Not)) => Keyword::Not.as_str().to_string(),
        _ => return Err(unexpected(parser, "function name")),
    };
    parser.advance();
    parser.expect_token(Token::LeftParen)?;

    let args = if matches!(parser.current_token(), Some(Token::RightParen)) {
        Vec::new()
    } else {
        parse_comma_separated(parser, parse_value)?
    };
    parser.expect_token(Token::RightParen)?;

    let span = parser.span_from(start);
    if args.len() > MAX_FUNCTION_ARGUMENTS {
        return Err(SyntaxError::TooManyArguments {
            count: args.len(),
            span,
        });
    }
    parser
        .functions()
        .build_call(&name, args, span)
        .map_err(SyntaxError::from)
}

/// Right-hand side of `in` / `not in`
///
/// A single `@path` stays a collection reference; anything else becomes a list.
pub fn parse_value_list(parser: &mut dyn Parser) -> SyntaxResult<Function> {
    let mut items = parse_comma_separated(parser, parse_value)?;
    if items.len() == 1 && matches!(items[0], Function::Collection(_)) {
        return Ok(items.remove(0));
    }
    Ok(Function::List(items))
}

/// Right-hand side of `between`: `low and high`
pub fn parse_value_range(parser: &mut dyn Parser) -> SyntaxResult<Function> {
    let low = parse_value(parser)?;
    parser.expect_token(Token::Keyword(Keyword::And))?;
    let high = parse_value(parser)?;
    Ok(Function::List(vec![low, high]))
}
