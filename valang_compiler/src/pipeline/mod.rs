mod error;
mod result;
mod validation;

pub use error::CompileError;
pub use result::CompileOutput;
pub use validation::validate_pipeline;

use crate::functions::FunctionRegistry;
use crate::grammar::ast::nodes::ValidationRule;
use crate::logging;
use std::path::Path;
use std::time::Instant;

/// Compile rule source using only the built-in functions
pub fn compile(source: &str) -> Result<Vec<ValidationRule>, CompileError> {
    compile_with(source, &FunctionRegistry::new())
}

/// Compile rule source, resolving calls against `functions`
pub fn compile_with(
    source: &str,
    functions: &FunctionRegistry,
) -> Result<Vec<ValidationRule>, CompileError> {
    compile_source("<inline>", source, functions).map(|output| output.rules)
}

/// Compile a named source (file name, config key) with timing and logging
pub fn compile_source(
    name: &str,
    source: &str,
    functions: &FunctionRegistry,
) -> Result<CompileOutput, CompileError> {
    let start_time = Instant::now();

    logging::with_source_context(name, || {
        crate::log_info!("Compiling rule source",
            "source" => name,
            "bytes" => source.len()
        );

        let tokens = crate::lexical::tokenize(source)?;
        let token_count = tokens.len();
        let rules = crate::syntax::parse_rules_with(tokens, functions)?;

        let output = CompileOutput {
            source_name: name.to_string(),
            rules,
            token_count,
            duration: start_time.elapsed(),
        };
        output.log_success();
        Ok(output)
    })
}

/// Read and compile a rule file
pub fn compile_file(
    path: &Path,
    functions: &FunctionRegistry,
) -> Result<CompileOutput, CompileError> {
    let name = path.display().to_string();
    let source = std::fs::read_to_string(path).map_err(|e| CompileError::Io {
        path: name.clone(),
        reason: e.to_string(),
    })?;
    compile_source(&name, &source, functions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::error::ConstructionError;
    use crate::lexical::LexerError;
    use crate::logging::codes;
    use crate::syntax::SyntaxError;
    use crate::utils::SourceMap;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_validate_pipeline() {
        assert!(validate_pipeline().is_ok());
    }

    #[test]
    fn test_compile_rules() {
        let rules = compile(
            "{ age : age <= 120 : 'too old' }
             { firstName : length(firstName) between 0 and 6 : 'too long' }",
        )
        .unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1].key, "firstName");
    }

    #[test]
    fn test_errors_keep_their_stage() {
        assert_matches!(
            compile("{ age : age ~ 1 : 'x' }"),
            Err(CompileError::Lexer(LexerError::InvalidCharacter { .. }))
        );
        assert_matches!(
            compile("{ age : age 1 : 'x' }"),
            Err(CompileError::Syntax(SyntaxError::UnexpectedToken { .. }))
        );

        let construction = compile("{ age : tupper(age) = 1 : 'x' }").unwrap_err();
        assert_matches!(
            &construction,
            CompileError::Construction(ConstructionError::UnknownFunction { .. })
        );
        assert_eq!(construction.error_code(), codes::construction::UNKNOWN_FUNCTION);
        assert!(construction.span().is_some());
    }

    #[test]
    fn test_compile_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{ age : age >= 18 : 'adults only' }}").unwrap();

        let output = compile_file(file.path(), &FunctionRegistry::new()).unwrap();
        assert_eq!(output.rule_keys(), vec!["age"]);
        assert!(output.token_count > 0);
        assert_eq!(output.source_name, file.path().display().to_string());
    }

    #[test]
    fn test_missing_file() {
        let error = compile_file(Path::new("/nonexistent/rules.valang"), &FunctionRegistry::new())
            .unwrap_err();
        assert_matches!(error, CompileError::Io { .. });
        assert_eq!(error.error_code(), codes::system::IO_ERROR);
    }

    #[test]
    fn test_render_quotes_the_offending_line() {
        let source = "{ age : age >= 18 : 'adults only' }\n{ age : age ~ 1 : 'x' }";
        let error = compile(source).unwrap_err();
        let rendered = error.render(&SourceMap::new(source));

        assert!(rendered.starts_with("error: [E020]"));
        assert!(rendered.contains("--> 2:13"));
        assert!(rendered.contains("2 | { age : age ~ 1 : 'x' }"));
        assert!(rendered.ends_with("  |             ^\n"));

        let missing = CompileError::Io {
            path: "rules.valang".to_string(),
            reason: "not found".to_string(),
        };
        assert_eq!(
            missing.render(&SourceMap::new("")),
            format!("error: [{}] {}\n", codes::system::IO_ERROR, missing)
        );
    }
}
