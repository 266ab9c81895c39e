use super::{load_rules, CommandError, CommandResult};
use std::path::{Path, PathBuf};
use valang_compiler::codegen::{translate_with_preferences, NoMessages, StaticMessageSource};
use valang_compiler::config::runtime::TranslationPreferences;
use valang_compiler::FunctionRegistry;

#[derive(Debug, Clone, Default)]
pub struct TranslateOptions {
    /// Overrides the configured validator name
    pub name: Option<String>,
    pub install: bool,
    /// TOML table of error keys to messages
    pub messages: Option<PathBuf>,
}

/// Translate a rules file to a client-side validator expression
pub fn translate(rules: &Path, options: &TranslateOptions) -> CommandResult<String> {
    let output = load_rules(rules)?;

    let mut preferences = TranslationPreferences::default();
    if let Some(name) = &options.name {
        preferences.validator_name = name.clone();
    }
    preferences.install_self_with_form |= options.install;

    let functions = FunctionRegistry::new();
    let script = match &options.messages {
        Some(path) => {
            let messages = StaticMessageSource::from_file(path).map_err(|e| CommandError::Input {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            log::info!("loaded {} message(s) from {}", messages.len(), path.display());
            translate_with_preferences(&output.rules, &functions, &messages, preferences)?
        }
        None => translate_with_preferences(&output.rules, &functions, &NoMessages, preferences)?,
    };
    Ok(script)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file_with(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    #[test]
    fn test_translates_with_name_and_install_flag() {
        let rules = file_with("{ firstName : firstName has text : 'required' }");
        let options = TranslateOptions {
            name: Some("customerForm".to_string()),
            install: true,
            messages: None,
        };

        let script = translate(rules.path(), &options).unwrap();
        assert!(script.starts_with("new ValangValidator('customerForm',true,"), "{}", script);
        assert!(script.contains("this.hasText("));
    }

    #[test]
    fn test_resolves_messages_from_toml() {
        let rules = file_with("{ age : age <= 120 : 'too old' : 'age.max' }");
        let messages = file_with("\"age.max\" = \"Age must be at most 120\"\n");
        let options = TranslateOptions {
            messages: Some(messages.path().to_path_buf()),
            ..TranslateOptions::default()
        };

        let script = translate(rules.path(), &options).unwrap();
        assert!(script.contains("Age must be at most 120"), "{}", script);
        assert!(!script.contains("too old"));
    }

    #[test]
    fn test_missing_message_file() {
        let rules = file_with("{ age : age <= 120 : 'too old' }");
        let options = TranslateOptions {
            messages: Some(PathBuf::from("/nonexistent/messages.toml")),
            ..TranslateOptions::default()
        };
        assert!(matches!(
            translate(rules.path(), &options),
            Err(CommandError::Input { .. })
        ));
    }
}
