//! Predicate expressions
//!
//! ```text
//! predicate  ::= negation (("and" | "or") negation)*
//! negation   ::= "not" negation | "!" "(" predicate ")" | primary
//! primary    ::= "(" predicate ")" | comparison
//! comparison ::= value operator [operand]
//! ```
//!
//! `and` and `or` share one precedence level and associate to the left:
//! `a or b and c` reads as `(a or b) and c`. Parentheses group explicitly.
//!
//! A leading `(` may open either a grouped predicate or a grouped value such
//! as `(2 + 3) - 4 = 1`. The predicate reading is tried first and kept only
//! when what follows the closing parenthesis can end a predicate.

use crate::grammar::ast::nodes::*;
use crate::grammar::builders::atomic::{parse_comparison_operator, unexpected, Parser};
use crate::grammar::builders::expressions::{parse_value, parse_value_list, parse_value_range};
use crate::grammar::builders::helpers::{at_predicate_boundary, current_is_keyword, nested};
use crate::grammar::keywords::Keyword;
use crate::syntax::SyntaxResult;
use crate::tokens::Token;

pub fn parse_predicate(parser: &mut dyn Parser) -> SyntaxResult<Predicate> {
    nested(parser, parse_logical_chain)
}

fn parse_logical_chain(parser: &mut dyn Parser) -> SyntaxResult<Predicate> {
    let mut left = parse_negation(parser)?;
    loop {
        let combine: fn(Predicate, Predicate) -> Predicate =
            if current_is_keyword(parser, Keyword::And) {
                Predicate::and
            } else if current_is_keyword(parser, Keyword::Or) {
                Predicate::or
            } else {
                return Ok(left);
            };
        parser.advance();
        let right = parse_negation(parser)?;
        left = combine(left, right);
    }
}

fn parse_negation(parser: &mut dyn Parser) -> SyntaxResult<Predicate> {
    match parser.current_token() {
        Some(Token::Keyword(Keyword::Not)) => {
            parser.advance();
            let inner = nested(parser, parse_negation)?;
            Ok(Predicate::negate(inner))
        }
        Some(Token::Bang) if matches!(parser.peek_token(1), Some(Token::LeftParen)) => {
            let start = parser.position();
            parser.advance();
            match parse_grouped_predicate(parser) {
                Ok(inner) => Ok(Predicate::negate(inner)),
                Err(error) if error.requires_halt() => Err(error),
                Err(error) => {
                    // `!(value) = x`: a negated value on the left of a comparison
                    parser.restore(start);
                    parse_comparison(parser).map_err(|other| error.furthest(other))
                }
            }
        }
        _ => parse_primary_predicate(parser),
    }
}

fn parse_primary_predicate(parser: &mut dyn Parser) -> SyntaxResult<Predicate> {
    if !matches!(parser.current_token(), Some(Token::LeftParen)) {
        return parse_comparison(parser);
    }

    let start = parser.position();
    match parse_grouped_predicate(parser) {
        Ok(predicate) => Ok(predicate),
        Err(error) if error.requires_halt() => Err(error),
        Err(error) => {
            parser.restore(start);
            parse_comparison(parser).map_err(|other| error.furthest(other))
        }
    }
}

/// `( predicate )` followed by something that can end a predicate
fn parse_grouped_predicate(parser: &mut dyn Parser) -> SyntaxResult<Predicate> {
    parser.expect_token(Token::LeftParen)?;
    let inner = parse_predicate(parser)?;
    parser.expect_token(Token::RightParen)?;
    if !at_predicate_boundary(parser) {
        return Err(unexpected(parser, "'and', 'or', 'where', ':' or ')'"));
    }
    Ok(inner)
}

/// `value operator [operand]`
pub fn parse_comparison(parser: &mut dyn Parser) -> SyntaxResult<Predicate> {
    let start = parser.position();
    let left = parse_value(parser)?;
    let operator = parse_comparison_operator(parser)?;

    let right = match operator {
        op if op.is_unary() => None,
        Operator::Between | Operator::NotBetween => Some(parse_value_range(parser)?),
        Operator::In | Operator::NotIn => Some(parse_value_list(parser)?),
        _ => Some(parse_value(parser)?),
    };

    let span = parser.span_from(start);
    Ok(Predicate::Test(TestPredicate::new(left, operator, right, span)))
}
