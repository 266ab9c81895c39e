//! Syntax errors for the token-to-rule transformation
//!
//! Every error carries a span whose start gives the line and column reported
//! to the user. Construction failures raised while building nodes travel
//! through the same type so the parser has a single error channel.

use crate::grammar::error::ConstructionError;
use crate::logging::{codes, Code};
use crate::utils::Span;

pub type SyntaxResult<T> = Result<T, SyntaxError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyntaxError {
    #[error("Expected {expected}, found '{found}' at {}", .span.start)]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Unexpected end of input: expected {expected} at {}", .span.start)]
    UnexpectedEndOfInput { expected: String, span: Span },

    #[error("Maximum nesting depth {depth} exceeded at {}", .span.start)]
    MaxDepthExceeded { depth: usize, span: Span },

    #[error("Unknown comparison operator '{text}' at {}", .span.start)]
    InvalidOperator { text: String, span: Span },

    #[error("Rule source defines more than {count} rules")]
    TooManyRules { count: usize },

    #[error("Too many arguments ({count}) at {}", .span.start)]
    TooManyArguments { count: usize, span: Span },

    #[error("Rule source is empty")]
    EmptySource,

    #[error(transparent)]
    Construction(#[from] ConstructionError),
}

impl SyntaxError {
    pub fn unexpected_token(expected: &str, found: &str, span: Span) -> Self {
        Self::UnexpectedToken {
            expected: expected.to_string(),
            found: found.to_string(),
            span,
        }
    }

    pub fn unexpected_end_of_input(expected: &str, span: Span) -> Self {
        Self::UnexpectedEndOfInput {
            expected: expected.to_string(),
            span,
        }
    }

    pub fn invalid_operator(text: &str, span: Span) -> Self {
        Self::InvalidOperator {
            text: text.to_string(),
            span,
        }
    }

    pub fn max_depth_exceeded(depth: usize, span: Span) -> Self {
        Self::MaxDepthExceeded { depth, span }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::UnexpectedToken { .. } => codes::syntax::UNEXPECTED_TOKEN,
            Self::UnexpectedEndOfInput { .. } => codes::syntax::UNEXPECTED_END,
            Self::MaxDepthExceeded { .. } => codes::syntax::MAX_DEPTH_EXCEEDED,
            Self::InvalidOperator { .. } => codes::syntax::INVALID_OPERATOR,
            Self::TooManyRules { .. } => codes::syntax::TOO_MANY_RULES,
            Self::TooManyArguments { .. } => codes::construction::WRONG_ARITY,
            Self::EmptySource => codes::syntax::EMPTY_SOURCE,
            Self::Construction(error) => error.error_code(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::UnexpectedToken { span, .. }
            | Self::UnexpectedEndOfInput { span, .. }
            | Self::MaxDepthExceeded { span, .. }
            | Self::InvalidOperator { span, .. }
            | Self::TooManyArguments { span, .. } => Some(*span),
            Self::TooManyRules { .. } | Self::EmptySource => None,
            Self::Construction(error) => error.span(),
        }
    }

    /// 1-based line of the error, 0 when the error has no position
    pub fn line(&self) -> u32 {
        self.span().map(|s| s.line()).unwrap_or(0)
    }

    /// 1-based column of the error, 0 when the error has no position
    pub fn column(&self) -> u32 {
        self.span().map(|s| s.column()).unwrap_or(0)
    }

    /// Errors that abort speculative parsing instead of letting it backtrack
    pub fn requires_halt(&self) -> bool {
        matches!(self, Self::MaxDepthExceeded { .. } | Self::TooManyRules { .. })
    }

    pub fn is_recoverable(&self) -> bool {
        !self.requires_halt()
    }

    /// Of two failed alternatives, the one that got further into the source
    pub fn furthest(self, other: SyntaxError) -> SyntaxError {
        let offset = |e: &SyntaxError| e.span().map(|s| s.start.offset).unwrap_or(0);
        if offset(&other) > offset(&self) {
            other
        } else {
            self
        }
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    pub fn description(&self) -> &'static str {
        codes::get_description(self.error_code().as_str())
    }

    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.error_code().as_str())
    }

    pub fn enhanced_message(&self) -> String {
        match self {
            Self::UnexpectedToken {
                expected, found, ..
            } => format!(
                "Expected {} but found '{}'. {}",
                expected,
                found,
                self.recommended_action()
            ),
            Self::UnexpectedEndOfInput { expected, .. } => format!(
                "Unexpected end of input while expecting {}. {}",
                expected,
                self.recommended_action()
            ),
            Self::InvalidOperator { text, .. } => format!(
                "'{}' is not a comparison operator. {}",
                text,
                self.recommended_action()
            ),
            _ => format!("{} ({})", self, self.recommended_action()),
        }
    }
}

/// Where in the rule source an error happened
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    pub parsing_context: Vec<String>,
    pub surrounding_tokens: Vec<String>,
    /// line, column
    pub file_position: Option<(u32, u32)>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(mut self, context: String) -> Self {
        self.parsing_context.push(context);
        self
    }

    pub fn with_tokens(mut self, tokens: Vec<String>) -> Self {
        self.surrounding_tokens = tokens;
        self
    }

    pub fn with_position(mut self, line: u32, column: u32) -> Self {
        self.file_position = Some((line, column));
        self
    }

    pub fn format_context(&self) -> String {
        let mut context = String::new();

        if !self.parsing_context.is_empty() {
            context.push_str(&format!("Context: {}\n", self.parsing_context.join(" -> ")));
        }
        if !self.surrounding_tokens.is_empty() {
            context.push_str(&format!("Near: {}\n", self.surrounding_tokens.join(" ")));
        }
        if let Some((line, column)) = self.file_position {
            context.push_str(&format!("Position: line {}, column {}\n", line, column));
        }

        context
    }
}

/// Syntax error plus the parser context it was raised in
#[derive(Debug, Clone)]
pub struct ContextualSyntaxError {
    pub error: SyntaxError,
    pub context: ErrorContext,
}

impl ContextualSyntaxError {
    pub fn new(error: SyntaxError) -> Self {
        Self {
            error,
            context: ErrorContext::new(),
        }
    }

    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = context;
        self
    }

    pub fn format_full_error(&self) -> String {
        format!(
            "{}\n{}Help: {} (Severity: {})",
            self.error.enhanced_message(),
            self.context.format_context(),
            self.error.recommended_action(),
            self.error.severity()
        )
    }
}

impl std::fmt::Display for ContextualSyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format_full_error())
    }
}

impl std::error::Error for ContextualSyntaxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Position;

    fn span_at(offset: usize, line: u32, column: u32) -> Span {
        Span::single(Position::new(offset, line, column))
    }

    #[test]
    fn test_error_code_mapping() {
        let span = span_at(0, 1, 1);
        assert_eq!(
            SyntaxError::unexpected_token("':'", "{", span).error_code().as_str(),
            "E040"
        );
        assert_eq!(
            SyntaxError::unexpected_end_of_input("value", span).error_code().as_str(),
            "E041"
        );
        assert_eq!(
            SyntaxError::invalid_operator("is sort of", span).error_code().as_str(),
            "E043"
        );
        assert_eq!(SyntaxError::EmptySource.error_code().as_str(), "E045");

        let construction = SyntaxError::from(ConstructionError::UnknownFunction {
            name: "tupper".to_string(),
            span,
        });
        assert_eq!(construction.error_code().as_str(), "E060");
    }

    #[test]
    fn test_line_and_column() {
        let error = SyntaxError::unexpected_token("value", ":", span_at(14, 2, 5));
        assert_eq!(error.line(), 2);
        assert_eq!(error.column(), 5);
        assert_eq!(SyntaxError::EmptySource.line(), 0);
        assert!(error.to_string().contains("2:5"));
    }

    #[test]
    fn test_halting_errors() {
        let depth = SyntaxError::max_depth_exceeded(128, span_at(0, 1, 1));
        assert!(depth.requires_halt());
        assert!(!depth.is_recoverable());
        assert!(SyntaxError::unexpected_token("x", "y", span_at(0, 1, 1)).is_recoverable());
    }

    #[test]
    fn test_furthest_prefers_later_offset() {
        let early = SyntaxError::unexpected_token("')'", "=", span_at(3, 1, 4));
        let late = SyntaxError::unexpected_end_of_input("value", span_at(12, 1, 13));
        assert_eq!(early.clone().furthest(late.clone()), late);
        assert_eq!(late.clone().furthest(early), late);
    }

    #[test]
    fn test_contextual_error() {
        let error = SyntaxError::invalid_operator("has words", span_at(10, 2, 5));
        let context = ErrorContext::new()
            .with_context("rule 'firstName'".to_string())
            .with_tokens(vec!["has".to_string(), "words".to_string()])
            .with_position(2, 5);

        let formatted = ContextualSyntaxError::new(error)
            .with_context(context)
            .format_full_error();

        assert!(formatted.contains("'has words' is not a comparison operator"));
        assert!(formatted.contains("Context: rule 'firstName'"));
        assert!(formatted.contains("Near: has words"));
        assert!(formatted.contains("line 2, column 5"));
        assert!(formatted.contains("Severity:"));
    }
}
