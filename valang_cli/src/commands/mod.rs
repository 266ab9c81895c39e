//! Command implementations
//!
//! Each command returns its printable report; `main` decides what goes to
//! stdout and which exit code to use.

pub mod check;
pub mod translate;
pub mod validate;

pub use check::{check, RuleSummary};
pub use translate::{translate, TranslateOptions};
pub use validate::{validate, ValidateOptions};

use std::fmt;
use std::path::Path;
use valang_compiler::utils::SourceMap;
use valang_compiler::{compile_source, CompileError, CompileOutput, FunctionRegistry};
use valang_runtime::EvaluationError;

pub type CommandResult<T> = Result<T, CommandError>;

/// Failures surfaced to the command line
#[derive(Debug)]
pub enum CommandError {
    /// Compile failure with its diagnostic already rendered against the source
    Compile { error: CompileError, rendered: String },
    Evaluation(EvaluationError),
    Translation(valang_compiler::codegen::TranslationError),
    Input { path: String, reason: String },
    Output(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compile { rendered, .. } => f.write_str(rendered.trim_end()),
            Self::Evaluation(error) => write!(f, "error: [{}] {}", error.error_code(), error),
            Self::Translation(error) => write!(f, "error: [{}] {}", error.error_code(), error),
            Self::Input { path, reason } => write!(f, "error: cannot read '{}': {}", path, reason),
            Self::Output(reason) => write!(f, "error: cannot write report: {}", reason),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<EvaluationError> for CommandError {
    fn from(error: EvaluationError) -> Self {
        Self::Evaluation(error)
    }
}

impl From<valang_compiler::codegen::TranslationError> for CommandError {
    fn from(error: valang_compiler::codegen::TranslationError) -> Self {
        Self::Translation(error)
    }
}

/// Compile a rules file with the built-in functions
pub(crate) fn load_rules(path: &Path) -> CommandResult<CompileOutput> {
    log::debug!("compiling {}", path.display());
    let name = path.display().to_string();
    let source = std::fs::read_to_string(path).map_err(|e| CommandError::Input {
        path: name.clone(),
        reason: e.to_string(),
    })?;

    let output = compile_source(&name, &source, &FunctionRegistry::new()).map_err(|error| {
        let rendered = error.render(&SourceMap::new(source.as_str()));
        CommandError::Compile { error, rendered }
    })?;
    log::info!(
        "compiled {} rule(s) from {}",
        output.rules.len(),
        output.source_name
    );
    Ok(output)
}
