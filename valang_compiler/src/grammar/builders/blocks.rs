//! Rule block builders
//!
//! ```text
//! source ::= rule*
//! rule   ::= "{" key ":" predicate ["where" predicate] ":" message
//!            [":" error_key [":" value ("," value)*]] "}"
//! key    ::= name | path | "this"
//! ```

use crate::config::compile_time::syntax::MAX_RULES_PER_SOURCE;
use crate::grammar::ast::nodes::*;
use crate::grammar::builders::atomic::{path_from_text, unexpected, Parser};
use crate::grammar::builders::expressions::parse_value;
use crate::grammar::builders::helpers::{at_end, current_is_keyword, parse_comma_separated};
use crate::grammar::builders::predicates::parse_predicate;
use crate::grammar::keywords::Keyword;
use crate::syntax::{SyntaxError, SyntaxResult};
use crate::tokens::Token;

/// Every rule block up to the end of input
pub fn parse_rule_source(parser: &mut dyn Parser) -> SyntaxResult<Vec<ValidationRule>> {
    let mut rules = Vec::new();
    while !at_end(parser) {
        if rules.len() >= MAX_RULES_PER_SOURCE {
            return Err(SyntaxError::TooManyRules {
                count: MAX_RULES_PER_SOURCE,
            });
        }
        rules.push(parse_rule(parser)?);
    }
    Ok(rules)
}

pub fn parse_rule(parser: &mut dyn Parser) -> SyntaxResult<ValidationRule> {
    let start = parser.position();
    parser.expect_token(Token::LeftBrace)?;

    let key = parse_rule_key(parser)?;
    parser.set_rule_key(Some(key.clone()));
    let body = parse_rule_body(parser);
    parser.set_rule_key(None);
    let (predicate, where_clause, message, error_key, error_args) = body?;

    parser.expect_token(Token::RightBrace)?;

    Ok(ValidationRule {
        key,
        predicate,
        where_clause,
        message,
        error_key,
        error_args,
        span: parser.span_from(start),
    })
}

type RuleBody = (
    Predicate,
    Option<Predicate>,
    String,
    Option<String>,
    Vec<Function>,
);

/// Everything between the key and the closing brace
fn parse_rule_body(parser: &mut dyn Parser) -> SyntaxResult<RuleBody> {
    parser.expect_token(Token::Colon)?;
    let predicate = parse_predicate(parser)?;

    let where_clause = if current_is_keyword(parser, Keyword::Where) {
        parser.advance();
        Some(parse_predicate(parser)?)
    } else {
        None
    };

    parser.expect_token(Token::Colon)?;
    let message = parser.expect_string_literal()?;

    let mut error_key = None;
    let mut error_args = Vec::new();
    if matches!(parser.current_token(), Some(Token::Colon)) {
        parser.advance();
        error_key = Some(parser.expect_string_literal()?);

        if matches!(parser.current_token(), Some(Token::Colon)) {
            parser.advance();
            error_args = parse_comma_separated(parser, parse_value)?;
        }
    }

    Ok((predicate, where_clause, message, error_key, error_args))
}

/// Rule key: a property path or `this`
pub fn parse_rule_key(parser: &mut dyn Parser) -> SyntaxResult<String> {
    let span = parser.current_span();
    let key = match parser.current_token() {
        Some(Token::Keyword(Keyword::This)) => GLOBAL_RULE_KEY.to_string(),
        Some(Token::Identifier(name)) | Some(Token::Path(name)) => name.clone(),
        _ => return Err(unexpected(parser, "rule key")),
    };
    if key != GLOBAL_RULE_KEY {
        path_from_text(&key, span)?;
    }
    parser.advance();
    Ok(key)
}
