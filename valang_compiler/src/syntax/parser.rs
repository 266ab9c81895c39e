//! Rule parser over a token stream
//!
//! Implements the builder [`Parser`] interface on top of [`TokenStream`],
//! tracking nesting depth, the rule being parsed and a bounded history of the
//! errors it reported.

use crate::config::compile_time::syntax::*;
use crate::config::runtime::ParserPreferences;
use crate::dates::{self, DateParser};
use crate::functions::FunctionRegistry;
use crate::grammar::ast::nodes::ValidationRule;
use crate::grammar::builders::{atomic::unexpected, parse_rule_source, Parser};
use crate::logging::codes;
use crate::syntax::error::{ContextualSyntaxError, ErrorContext, SyntaxError, SyntaxResult};
use crate::tokens::{Token, TokenStream};
use crate::utils::Span;
use crate::{log_debug, log_error, log_info, log_success, log_warning};
use std::collections::VecDeque;

pub struct ValangParser<'r> {
    tokens: TokenStream,
    functions: &'r FunctionRegistry,
    dates: &'r DateParser,
    preferences: ParserPreferences,
    context_stack: Vec<String>,
    error_history: VecDeque<SyntaxError>,
    parse_depth: usize,
    max_depth_reached: usize,
    rule_key: Option<String>,
    last_rule_key: Option<String>,
}

impl<'r> ValangParser<'r> {
    pub fn new(tokens: TokenStream, functions: &'r FunctionRegistry) -> Self {
        log_debug!("Creating rule parser", "tokens" => tokens.len());

        Self {
            tokens,
            functions,
            dates: dates::shared(),
            preferences: ParserPreferences::default(),
            context_stack: Vec::new(),
            error_history: VecDeque::new(),
            parse_depth: 0,
            max_depth_reached: 0,
            rule_key: None,
            last_rule_key: None,
        }
    }

    /// Use a date parser with extra registered patterns
    pub fn with_dates(mut self, dates: &'r DateParser) -> Self {
        self.dates = dates;
        self
    }

    pub fn with_preferences(mut self, preferences: ParserPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// Parse every rule block in the stream
    pub fn parse_rules(&mut self) -> SyntaxResult<Vec<ValidationRule>> {
        self.push_context("rule source");

        log_info!("Starting rule parsing",
            "tokens" => self.tokens.len(),
            "functions" => self.functions.definitions().count()
        );

        if self.is_blank_source() {
            self.pop_context();
            if self.preferences.allow_empty_source {
                log_warning!(codes::syntax::EMPTY_SOURCE, "Rule source contains no rules");
                return Ok(Vec::new());
            }
            let error = SyntaxError::EmptySource;
            log_error!(error.error_code(), "Cannot parse an empty rule source");
            self.record_error(error.clone());
            return Err(error);
        }

        let result = parse_rule_source(self);

        match result {
            Ok(rules) => {
                log_success!(codes::success::RULES_CONSTRUCTED,
                    "Rule parsing completed successfully",
                    "rules" => rules.len(),
                    "max_depth" => self.max_depth_reached
                );
                if self.preferences.log_rule_details {
                    for rule in &rules {
                        log_debug!("Constructed rule",
                            "key" => rule.key.as_str(),
                            "span" => rule.span,
                            "rule" => rule
                        );
                    }
                }
                self.pop_context();
                Ok(rules)
            }
            Err(error) => {
                self.record_error(error.clone());

                log_error!(error.error_code(), "Rule parsing failed",
                    span = error.span().unwrap_or_else(|| self.current_span()),
                    "context" => self.current_context(),
                    "rule" => self.last_rule_key.as_deref().unwrap_or("-"),
                    "error_message" => error
                );

                self.pop_context();
                Err(error)
            }
        }
    }

    fn is_blank_source(&self) -> bool {
        matches!(self.tokens.current_token(), None | Some(Token::Eof))
    }

    fn record_error(&mut self, error: SyntaxError) {
        if self.error_history.len() >= MAX_ERROR_HISTORY {
            self.error_history.pop_front();
        }
        self.error_history.push_back(error);
    }

    pub fn error_history(&self) -> Vec<&SyntaxError> {
        self.error_history.iter().collect()
    }

    /// Deepest nesting seen so far
    pub fn max_depth_reached(&self) -> usize {
        self.max_depth_reached
    }

    // === CONTEXT TRACKING ===

    pub fn push_context(&mut self, context: &str) {
        if self.context_stack.len() >= MAX_CONTEXT_STACK_DEPTH {
            log_warning!(codes::syntax::MAX_DEPTH_EXCEEDED,
                "Context stack depth limit reached, dropping oldest context");
            self.context_stack.remove(0);
        }
        self.context_stack.push(context.to_string());
    }

    pub fn pop_context(&mut self) {
        self.context_stack.pop();
    }

    pub fn current_context(&self) -> String {
        if self.context_stack.is_empty() {
            "root".to_string()
        } else {
            self.context_stack.join(" -> ")
        }
    }

    /// Attach parser context to an error for display
    pub fn create_contextual_error(&self, error: SyntaxError) -> ContextualSyntaxError {
        let span = error.span().unwrap_or_else(|| self.current_span());
        let mut context = ErrorContext::new()
            .with_tokens(self.surrounding_tokens(span))
            .with_position(span.line(), span.column());

        for frame in &self.context_stack {
            context = context.with_context(frame.clone());
        }
        if let Some(key) = &self.last_rule_key {
            context = context.with_context(format!("rule '{}'", key));
        }

        ContextualSyntaxError::new(error).with_context(context)
    }

    /// Up to three significant tokens either side of `span`
    fn surrounding_tokens(&self, span: Span) -> Vec<String> {
        let tokens: Vec<_> = self.tokens.iter_significant().collect();
        let index = tokens
            .iter()
            .position(|t| t.span.start.offset >= span.start.offset)
            .unwrap_or(tokens.len());
        let from = index.saturating_sub(3);
        let to = (index + 3).min(tokens.len());

        tokens[from..to]
            .iter()
            .filter(|t| !matches!(t.value, Token::Eof))
            .map(|t| t.value.text())
            .collect()
    }

    pub fn diagnostic_info(&self) -> String {
        format!(
            "Parser State:\n  Position: {}/{}\n  Context: {}\n  Depth: {} (max seen {})\n  Errors: {}",
            self.tokens.position(),
            self.tokens.len(),
            self.current_context(),
            self.parse_depth,
            self.max_depth_reached,
            self.error_history.len()
        )
    }
}

impl Parser for ValangParser<'_> {
    fn current_token(&self) -> Option<&Token> {
        self.tokens.current_token()
    }

    fn peek_token(&self, n: usize) -> Option<&Token> {
        self.tokens.peek_token(n)
    }

    fn advance(&mut self) {
        self.tokens.advance();
    }

    fn position(&self) -> usize {
        self.tokens.position()
    }

    fn restore(&mut self, position: usize) {
        log_debug!("Backtracking",
            "from" => self.tokens.position(),
            "to" => position,
            "context" => self.current_context()
        );
        self.tokens.restore_position(position);
    }

    /// Keywords must match exactly; other tokens match by kind
    fn expect_token(&mut self, expected: Token) -> SyntaxResult<Span> {
        let span = self.current_span();
        let matched = match (&expected, self.tokens.current_token()) {
            (Token::Keyword(keyword), Some(found)) => found.is_keyword(*keyword),
            (_, Some(Token::Eof)) | (_, None) => false,
            (_, Some(found)) => {
                std::mem::discriminant(found) == std::mem::discriminant(&expected)
            }
        };

        if matched {
            self.tokens.advance();
            Ok(span)
        } else {
            Err(unexpected(&*self, &format!("'{}'", expected.text())))
        }
    }

    fn expect_string_literal(&mut self) -> SyntaxResult<String> {
        match self.tokens.current_token() {
            Some(Token::StringLiteral(text)) => {
                let text = text.clone();
                self.tokens.advance();
                Ok(text)
            }
            _ => Err(unexpected(&*self, "string literal")),
        }
    }

    fn current_span(&self) -> Span {
        self.tokens
            .current_span()
            .or_else(|| self.tokens.previous_span())
            .unwrap_or_else(Span::dummy)
    }

    fn span_from(&self, start: usize) -> Span {
        self.tokens.span_from(start)
    }

    fn enter_nesting(&mut self) -> SyntaxResult<()> {
        if self.parse_depth >= MAX_PARSE_DEPTH {
            return Err(SyntaxError::max_depth_exceeded(
                MAX_PARSE_DEPTH,
                self.current_span(),
            ));
        }
        self.parse_depth += 1;
        self.max_depth_reached = self.max_depth_reached.max(self.parse_depth);
        Ok(())
    }

    fn exit_nesting(&mut self) {
        self.parse_depth = self.parse_depth.saturating_sub(1);
    }

    fn functions(&self) -> &FunctionRegistry {
        self.functions
    }

    fn dates(&self) -> &DateParser {
        self.dates
    }

    fn rule_key(&self) -> Option<&str> {
        self.rule_key.as_deref()
    }

    fn set_rule_key(&mut self, key: Option<String>) {
        if let Some(key) = &key {
            self.last_rule_key = Some(key.clone());
        }
        self.rule_key = key;
    }
}

/// Parse a token stream with the given function registry
pub fn parse_token_stream(
    tokens: TokenStream,
    functions: &FunctionRegistry,
) -> SyntaxResult<Vec<ValidationRule>> {
    ValangParser::new(tokens, functions).parse_rules()
}
