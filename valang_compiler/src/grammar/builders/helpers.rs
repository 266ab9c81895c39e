//! Parsing utilities shared by the value, predicate and rule builders

use crate::config::compile_time::syntax::MAX_FUNCTION_ARGUMENTS;
use crate::grammar::builders::atomic::Parser;
use crate::grammar::keywords::Keyword;
use crate::syntax::{SyntaxError, SyntaxResult};
use crate::tokens::Token;

/// Run `build` one nesting level deeper
pub fn nested<T>(
    parser: &mut dyn Parser,
    build: fn(&mut dyn Parser) -> SyntaxResult<T>,
) -> SyntaxResult<T> {
    parser.enter_nesting()?;
    let result = build(parser);
    parser.exit_nesting();
    result
}

/// Comma-separated items, at least one, bounded by the argument limit
pub fn parse_comma_separated<T>(
    parser: &mut dyn Parser,
    item: fn(&mut dyn Parser) -> SyntaxResult<T>,
) -> SyntaxResult<Vec<T>> {
    let start_span = parser.current_span();
    let mut items = vec![item(parser)?];

    while matches!(parser.current_token(), Some(Token::Comma)) {
        parser.advance();
        items.push(item(parser)?);
    }

    if items.len() > MAX_FUNCTION_ARGUMENTS {
        return Err(SyntaxError::TooManyArguments {
            count: items.len(),
            span: start_span.merge(parser.current_span()),
        });
    }
    Ok(items)
}

/// Tokens that may follow a complete predicate
pub fn at_predicate_boundary(parser: &dyn Parser) -> bool {
    matches!(
        parser.current_token(),
        None | Some(
            Token::Eof
                | Token::Colon
                | Token::RightParen
                | Token::RightBrace
                | Token::Keyword(Keyword::And | Keyword::Or | Keyword::Where)
        )
    )
}

pub fn at_end(parser: &dyn Parser) -> bool {
    matches!(parser.current_token(), None | Some(Token::Eof))
}

pub fn current_is_keyword(parser: &dyn Parser, keyword: Keyword) -> bool {
    parser
        .current_token()
        .is_some_and(|token| token.is_keyword(keyword))
}
