use crate::grammar::error::ConstructionError;
use crate::lexical::LexerError;
use crate::logging::{codes, Code};
use crate::syntax::SyntaxError;
use crate::utils::{SourceMap, Span};

/// Any failure turning rule source into validation rules
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error("Lexical analysis failed: {0}")]
    Lexer(#[from] LexerError),

    #[error("Syntax analysis failed: {0}")]
    Syntax(SyntaxError),

    #[error("Rule construction failed: {0}")]
    Construction(#[from] ConstructionError),

    #[error("Cannot read rule source '{path}': {reason}")]
    Io { path: String, reason: String },
}

/// Construction failures raised while parsing surface as `Construction`
impl From<SyntaxError> for CompileError {
    fn from(error: SyntaxError) -> Self {
        match error {
            SyntaxError::Construction(inner) => CompileError::Construction(inner),
            other => CompileError::Syntax(other),
        }
    }
}

impl CompileError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::Lexer(error) => error.error_code(),
            Self::Syntax(error) => error.error_code(),
            Self::Construction(error) => error.error_code(),
            Self::Io { .. } => codes::system::IO_ERROR,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lexer(error) => error.span(),
            Self::Syntax(error) => error.span(),
            Self::Construction(error) => error.span(),
            Self::Io { .. } => None,
        }
    }

    /// Render as a diagnostic, quoting the offending line when the error has a span
    pub fn render(&self, source: &SourceMap) -> String {
        let message = format!("[{}] {}", self.error_code(), self);
        match self.span() {
            Some(span) => source.format_error(&span, &message),
            None => format!("error: {}\n", message),
        }
    }
}
