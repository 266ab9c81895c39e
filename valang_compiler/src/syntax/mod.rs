//! Syntax analysis: token stream to validation rules
//!
//! The grammar itself lives in [`crate::grammar::builders`]; this module owns
//! the parser state and the public entry points.

pub mod error;
mod parser;

pub use error::{ContextualSyntaxError, ErrorContext, SyntaxError, SyntaxResult};
pub use parser::{parse_token_stream, ValangParser};

use crate::functions::FunctionRegistry;
use crate::grammar::ast::nodes::ValidationRule;
use crate::logging::codes;
use crate::tokens::TokenStream;
use crate::{log_debug, log_info};

/// Parse rules using only the built-in functions
pub fn parse_rules(token_stream: TokenStream) -> SyntaxResult<Vec<ValidationRule>> {
    parse_rules_with(token_stream, &FunctionRegistry::new())
}

/// Parse rules, resolving calls against `functions`
pub fn parse_rules_with(
    token_stream: TokenStream,
    functions: &FunctionRegistry,
) -> SyntaxResult<Vec<ValidationRule>> {
    log_debug!("Starting syntax analysis", "tokens" => token_stream.len());
    parse_token_stream(token_stream, functions)
}

/// Check that every syntax error code is registered with metadata
pub fn init_syntax_logging() -> Result<(), String> {
    let syntax_codes = [
        codes::syntax::UNEXPECTED_TOKEN,
        codes::syntax::UNEXPECTED_END,
        codes::syntax::MAX_DEPTH_EXCEEDED,
        codes::syntax::INVALID_OPERATOR,
        codes::syntax::TOO_MANY_RULES,
        codes::syntax::EMPTY_SOURCE,
        codes::construction::UNKNOWN_FUNCTION,
        codes::construction::WRONG_ARITY,
        codes::construction::INVALID_ENUM_LITERAL,
        codes::construction::INVALID_DATE_LITERAL,
        codes::construction::INVALID_PATH,
        codes::construction::INVALID_REGEX,
    ];

    for code in &syntax_codes {
        if codes::get_description(code.as_str()) == "Unknown error" {
            return Err(format!(
                "Syntax error code {} has no description",
                code.as_str()
            ));
        }
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Syntax error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    log_info!("Syntax module logging validation completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::{Arity, FunctionDefinition};
    use crate::grammar::ast::nodes::*;
    use crate::grammar::error::ConstructionError;
    use crate::lexical::tokenize;
    use assert_matches::assert_matches;
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    fn parse(source: &str) -> SyntaxResult<Vec<ValidationRule>> {
        parse_rules(tokenize(source).expect("source should tokenize"))
    }

    fn single(source: &str) -> ValidationRule {
        let mut rules = parse(source).unwrap_or_else(|e| panic!("{}: {}", source, e));
        assert_eq!(rules.len(), 1, "{}", source);
        rules.remove(0)
    }

    fn test_of(rule: &ValidationRule) -> &TestPredicate {
        match &rule.predicate {
            Predicate::Test(test) => test,
            other => panic!("expected a test predicate, got {}", other),
        }
    }

    fn prop(name: &str) -> Function {
        Function::property(PropertyPath::parse(name).unwrap())
    }

    fn num(text: &str) -> Function {
        Function::number(BigDecimal::from_str(text).unwrap())
    }

    #[test]
    fn test_module_initialization() {
        assert!(init_syntax_logging().is_ok());
    }

    #[test]
    fn test_simple_rule() {
        let rule = single("{ age : age >= 18 : 'Too young' }");
        assert_eq!(rule.key, "age");
        assert_eq!(rule.message, "Too young");
        assert!(rule.error_key.is_none());
        assert!(rule.error_args.is_empty());

        let test = test_of(&rule);
        assert_eq!(test.left, prop("age"));
        assert_eq!(test.operator, Operator::GreaterThanOrEqual);
        assert_eq!(test.right, Some(num("18")));
    }

    #[test]
    fn test_error_key_and_arguments() {
        let rule = single("{ age : ? between 18 and 65 : 'Out of range' : 'age.range' : 18, 65 }");
        assert_eq!(rule.error_key.as_deref(), Some("age.range"));
        assert_eq!(rule.error_args, vec![num("18"), num("65")]);

        let test = test_of(&rule);
        assert_eq!(test.left, prop("age"));
        assert_eq!(test.operator, Operator::Between);
        assert_eq!(test.right, Some(Function::List(vec![num("18"), num("65")])));
    }

    #[test]
    fn test_multiple_rules() {
        let rules = parse(
            "{ firstName : length(?) < 30 : 'Too long' }
             { lastName : ? has text : 'Required' }
             { this : firstName != lastName : 'Names must differ' }",
        )
        .unwrap();
        assert_eq!(rules.len(), 3);
        assert!(rules[2].is_global());
        assert_eq!(rules[1].key, "lastName");
    }

    #[test]
    fn test_comparison_spellings() {
        let cases = [
            ("a = 1", Operator::Equal),
            ("a == 1", Operator::Equal),
            ("a is 1", Operator::Equal),
            ("a equals 1", Operator::Equal),
            ("a != 1", Operator::NotEqual),
            ("a <> 1", Operator::NotEqual),
            ("a is not 1", Operator::NotEqual),
            ("a not equals 1", Operator::NotEqual),
            ("a < 1", Operator::LessThan),
            ("a less than 1", Operator::LessThan),
            ("a is less than 1", Operator::LessThan),
            ("a <= 1", Operator::LessThanOrEqual),
            ("a less than or equals 1", Operator::LessThanOrEqual),
            ("a > 1", Operator::GreaterThan),
            ("a greater than 1", Operator::GreaterThan),
            ("a >= 1", Operator::GreaterThanOrEqual),
            ("a is greater than or equals 1", Operator::GreaterThanOrEqual),
        ];

        for (predicate, expected) in cases {
            let rule = single(&format!("{{ a : {} : 'x' }}", predicate));
            assert_eq!(test_of(&rule).operator, expected, "{}", predicate);
        }
    }

    #[test]
    fn test_unary_operators() {
        let cases = [
            ("a is null", Operator::Null),
            ("a is not null", Operator::NotNull),
            ("a has text", Operator::HasText),
            ("a has no text", Operator::HasNoText),
            ("a has length", Operator::HasLength),
            ("a has no length", Operator::HasNoLength),
            ("a is blank", Operator::IsBlank),
            ("a is not blank", Operator::IsNotBlank),
            ("a is word", Operator::IsWord),
            ("a is not word", Operator::IsNotWord),
            ("a is uppercase", Operator::IsUppercase),
            ("a is upper case", Operator::IsUppercase),
            ("a is not lowercase", Operator::IsNotLowercase),
            ("a is lower case", Operator::IsLowercase),
        ];

        for (predicate, expected) in cases {
            let rule = single(&format!("{{ a : {} : 'x' }}", predicate));
            let test = test_of(&rule);
            assert_eq!(test.operator, expected, "{}", predicate);
            assert!(test.right.is_none(), "{}", predicate);
        }
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let rule = single("{ a : a IS NOT NULL AND b Has Text : 'x' }");
        assert_matches!(rule.predicate, Predicate::And(_, _));
    }

    #[test]
    fn test_in_lists_and_collections() {
        let rule = single("{ size : upper(?) in 'S', 'M', upper(lower('XL')) : 'x' }");
        let test = test_of(&rule);
        assert_eq!(test.operator, Operator::In);
        assert_matches!(&test.right, Some(Function::List(items)) if items.len() == 3);
        assert_matches!(&test.left, Function::UpperCase(_));

        let rule = single("{ size : ? not in @sizes and ? in @map[sizes] : 'x' }");
        match &rule.predicate {
            Predicate::And(left, right) => {
                assert_matches!(
                    left.as_ref(),
                    Predicate::Test(TestPredicate { operator: Operator::NotIn, right: Some(Function::Collection(_)), .. })
                );
                assert_matches!(
                    right.as_ref(),
                    Predicate::Test(TestPredicate { right: Some(Function::List(items)), .. })
                        if matches!(items.as_slice(), [Function::MapEntry { .. }])
                );
            }
            other => panic!("unexpected predicate {}", other),
        }
    }

    #[test]
    fn test_and_or_share_one_level() {
        let rule = single("{ a : a = 1 or b = 2 and c = 3 : 'x' }");
        match &rule.predicate {
            Predicate::And(left, _) => assert_matches!(left.as_ref(), Predicate::Or(_, _)),
            other => panic!("expected left-associated and, got {}", other),
        }
    }

    #[test]
    fn test_grouped_predicates() {
        let rule = single(
            "{ firstName : (length (firstName) > 5 and age <= 30) or (firstName has length and age > 20) : 'x' }",
        );
        match &rule.predicate {
            Predicate::Or(left, right) => {
                assert_matches!(left.as_ref(), Predicate::And(_, _));
                assert_matches!(right.as_ref(), Predicate::And(_, _));
            }
            other => panic!("unexpected predicate {}", other),
        }
    }

    #[test]
    fn test_parenthesised_values() {
        let rule = single("{ a : (2 + 3) - 4 = 1 : 'x' }");
        let test = test_of(&rule);
        assert_matches!(&test.left, Function::Math { op: MathOperator::Subtract, .. });

        let rule = single("{ name : (length(?) - 2) + 1 = 5 : 'x' }");
        assert_matches!(&test_of(&rule).left, Function::Math { op: MathOperator::Add, .. });
    }

    #[test]
    fn test_arithmetic_precedence() {
        let rule = single("{ a : 1 + 2 * 3 div 4 mod 5 = a : 'x' }");
        match &test_of(&rule).left {
            Function::Math { op: MathOperator::Add, right, .. } => {
                assert_matches!(right.as_ref(), Function::Math { op: MathOperator::Modulo, .. });
            }
            other => panic!("unexpected value {}", other),
        }
    }

    #[test]
    fn test_negative_numbers_and_hex() {
        let rule = single("{ a : a between -10 and 0x1F : 'x' }");
        assert_eq!(
            test_of(&rule).right,
            Some(Function::List(vec![num("-10"), num("31")]))
        );

        let rule = single("{ a : -a < 0 : 'x' }");
        assert_matches!(&test_of(&rule).left, Function::Math { op: MathOperator::Subtract, .. });

        let rule = single("{ a : a < 0x100000000000000000000000000000000 : 'x' }");
        assert_eq!(
            test_of(&rule).right,
            Some(num("340282366920938463463374607431768211456"))
        );
    }

    #[test]
    fn test_negation_forms() {
        let rule = single("{ a : not (a = 1 and b = 2) : 'x' }");
        match &rule.predicate {
            Predicate::Not(inner) => assert_matches!(inner.as_ref(), Predicate::And(_, _)),
            other => panic!("unexpected predicate {}", other),
        }

        let rule = single("{ a : !(a is null) : 'x' }");
        assert_matches!(rule.predicate, Predicate::Not(_));

        let rule = single("{ a : !(false) = true : 'x' }");
        let test = test_of(&rule);
        assert_matches!(&test.left, Function::Not(_));
        assert_eq!(test.operator, Operator::Equal);

        // a leading `not` negates the whole comparison
        let rule = single("{ a : not(a) = true : 'x' }");
        match &rule.predicate {
            Predicate::Not(inner) => assert_matches!(
                inner.as_ref(),
                Predicate::Test(TestPredicate { operator: Operator::Equal, .. })
            ),
            other => panic!("unexpected predicate {}", other),
        }

        let rule = single("{ a : b = not(a) : 'x' }");
        assert_matches!(&test_of(&rule).right, Some(Function::Not(_)));
    }

    #[test]
    fn test_where_clause() {
        let rule = single("{ discount : ? <= 50 where customer.type = ['Type.GOLD'] : 'Too much' }");
        assert!(rule.has_where_clause());
        match &rule.where_clause {
            Some(Predicate::Test(test)) => {
                assert_eq!(test.left, prop("customer.type"));
                assert_matches!(&test.right, Some(Function::EnumLiteral(e)) if e.member == "GOLD");
            }
            other => panic!("unexpected guard {:?}", other),
        }
    }

    #[test]
    fn test_dates_and_targets() {
        let rule = single("{ dateOfBirth : [T>d] > ? and ? > [2000-01-01] : 'x' }");
        let tests = rule.predicate.tests();
        assert_matches!(&tests[0].left, Function::DateLiteral(d) if d.raw == "T>d");
        assert_matches!(&tests[1].right, Some(Function::DateLiteral(d)) if d.raw == "2000-01-01");

        let rule = single("{ this : this is not null and ? is not null : 'x' }");
        for test in rule.predicate.tests() {
            assert_eq!(test.left, Function::Target);
        }
    }

    #[test]
    fn test_paths_with_keys_and_indexes() {
        let rule = single("{ map[Test Key] : ? has text and tags[1] = 'a' : 'x' }");
        let tests = rule.predicate.tests();
        assert_eq!(tests[0].left, prop("map[Test Key]"));
        assert_eq!(tests[1].left, prop("tags[1]"));
    }

    #[test]
    fn test_function_aliases_and_regex() {
        let rule = single("{ name : size(?) > 2 and matches('^[A-Z]', ?) = true : 'x' }");
        let tests = rule.predicate.tests();
        assert_matches!(&tests[0].left, Function::Length(_));
        assert_matches!(&tests[1].left, Function::RegEx { .. });
    }

    #[test]
    fn test_custom_functions_need_registration() {
        let source = "{ lastName : validLastName(?) = true : 'x' }";
        assert_matches!(
            parse(source),
            Err(SyntaxError::Construction(ConstructionError::UnknownFunction { name, .. })) if name == "validLastName"
        );

        let functions = FunctionRegistry::new()
            .with(FunctionDefinition::new("validLastName", Arity::Exactly(1)))
            .unwrap();
        let rules = parse_rules_with(tokenize(source).unwrap(), &functions).unwrap();
        assert_matches!(
            &rules[0].predicate,
            Predicate::Test(TestPredicate { left: Function::Custom { name, .. }, .. }) if name == "validLastName"
        );
    }

    #[test]
    fn test_construction_errors() {
        assert_matches!(
            parse("{ a : email(a, b) = true : 'x' }"),
            Err(SyntaxError::Construction(ConstructionError::WrongArity { .. }))
        );
        assert_matches!(
            parse("{ a : a > [not a date] : 'x' }"),
            Err(SyntaxError::Construction(ConstructionError::InvalidDateLiteral { .. }))
        );
        assert_matches!(
            parse("{ a : matches('(open', a) = true : 'x' }"),
            Err(SyntaxError::Construction(ConstructionError::InvalidRegex { .. }))
        );
    }

    #[test]
    fn test_syntax_errors() {
        assert_matches!(
            parse("{ a : a = 1 'x' }"),
            Err(SyntaxError::UnexpectedToken { .. })
        );
        assert_matches!(
            parse("{ a : a = 1 : 'x'"),
            Err(SyntaxError::UnexpectedEndOfInput { .. })
        );
        assert_matches!(
            parse("{ a : a has 3 : 'x' }"),
            Err(SyntaxError::InvalidOperator { .. })
        );
        assert_matches!(
            parse("{ a : a = 1 : missing quotes }"),
            Err(SyntaxError::UnexpectedToken { .. })
        );
    }

    #[test]
    fn test_error_positions() {
        let error = parse("{ a : a = 1 :\n  42 }").unwrap_err();
        assert_eq!(error.line(), 2);
        assert_eq!(error.column(), 3);
    }

    #[test]
    fn test_deep_nesting_is_bounded() {
        let depth = crate::config::compile_time::syntax::MAX_PARSE_DEPTH + 5;
        let source = format!("{{ a : {}a = 1{} : 'x' }}", "(".repeat(depth), ")".repeat(depth));
        let error = parse(&source).unwrap_err();
        assert_matches!(error, SyntaxError::MaxDepthExceeded { .. });
        assert!(error.requires_halt());
    }

    #[test]
    fn test_question_mark_needs_a_rule() {
        let rule = single("{ customer.name : ? has text : 'x' }");
        assert_eq!(test_of(&rule).left, prop("customer.name"));
    }

    #[test]
    fn test_rendered_rule_parses_back() {
        let rule = single(
            "{ age : ? between 0 and 120 and not (age = 7) where name has text : 'it\\'s {0}' : 'age' : age }",
        );
        let reparsed = single(&rule.to_string());
        assert_eq!(reparsed.predicate, rule.predicate);
        assert_eq!(reparsed.where_clause, rule.where_clause);
        assert_eq!(reparsed.message, rule.message);
        assert_eq!(reparsed.error_args, rule.error_args);
    }
}
