// build.rs - TOML-driven compile-time limit generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    lexical: LexicalLimits,
    syntax: SyntaxLimits,
    dates: DateLimits,
    evaluation: EvaluationLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct LexicalLimits {
    max_source_size: usize,
    max_string_size: usize,
    max_identifier_length: usize,
    max_token_count: usize,
}

#[derive(serde::Deserialize)]
struct SyntaxLimits {
    max_parse_depth: usize,
    max_error_history: usize,
    max_context_stack_depth: usize,
    max_rules_per_source: usize,
    max_function_arguments: usize,
}

#[derive(serde::Deserialize)]
struct DateLimits {
    max_expression_length: usize,
    max_modifier_steps: usize,
}

#[derive(serde::Deserialize)]
struct EvaluationLimits {
    max_property_depth: usize,
    max_collection_size: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_message_length: usize,
    security_min_log_level: u8,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=VALANG_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=VALANG_CONFIG_DIR");

    let profile = env::var("VALANG_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("VALANG_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Find workspace root (parent of valang_compiler directory)
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_SOURCE_SIZE: usize = 64 * 1024 * 1024;
    const ABSOLUTE_MAX_PARSE_DEPTH: usize = 1024;

    if config.lexical.max_source_size > ABSOLUTE_MAX_SOURCE_SIZE {
        panic!("LIMITS: max_source_size exceeds absolute maximum");
    }

    if config.lexical.max_string_size > config.lexical.max_source_size {
        panic!("LIMITS: max_string_size cannot exceed max_source_size");
    }

    if config.syntax.max_parse_depth == 0 || config.syntax.max_parse_depth > ABSOLUTE_MAX_PARSE_DEPTH
    {
        panic!("LIMITS: max_parse_depth must be between 1 and {ABSOLUTE_MAX_PARSE_DEPTH}");
    }

    if config.dates.max_modifier_steps == 0 {
        panic!("LIMITS: max_modifier_steps must be at least 1");
    }

    if config.logging.security_min_log_level > 2 {
        panic!("LIMITS: security_min_log_level too high (max: 2)");
    }

    if profile == "production" && config.lexical.max_source_size > 4 * 1024 * 1024 {
        panic!("PRODUCTION: max_source_size too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod lexical {{
        pub const MAX_SOURCE_SIZE: usize = {};
        pub const MAX_STRING_SIZE: usize = {};
        pub const MAX_IDENTIFIER_LENGTH: usize = {};
        pub const MAX_TOKEN_COUNT: usize = {};
    }}

    pub mod syntax {{
        pub const MAX_PARSE_DEPTH: usize = {};
        pub const MAX_ERROR_HISTORY: usize = {};
        pub const MAX_CONTEXT_STACK_DEPTH: usize = {};
        pub const MAX_RULES_PER_SOURCE: usize = {};
        pub const MAX_FUNCTION_ARGUMENTS: usize = {};
    }}

    pub mod dates {{
        pub const MAX_EXPRESSION_LENGTH: usize = {};
        pub const MAX_MODIFIER_STEPS: usize = {};
    }}

    pub mod evaluation {{
        pub const MAX_PROPERTY_DEPTH: usize = {};
        pub const MAX_COLLECTION_SIZE: usize = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const SECURITY_MIN_LOG_LEVEL: u8 = {};
    }}
}}
"#,
        profile,
        // Lexical
        config.lexical.max_source_size,
        config.lexical.max_string_size,
        config.lexical.max_identifier_length,
        config.lexical.max_token_count,
        // Syntax
        config.syntax.max_parse_depth,
        config.syntax.max_error_history,
        config.syntax.max_context_stack_depth,
        config.syntax.max_rules_per_source,
        config.syntax.max_function_arguments,
        // Dates
        config.dates.max_expression_length,
        config.dates.max_modifier_steps,
        // Evaluation
        config.evaluation.max_property_depth,
        config.evaluation.max_collection_size,
        // Logging
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
        config.logging.security_min_log_level,
    );

    fs::write(output_path, constants_code).unwrap();
}
