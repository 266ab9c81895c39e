//! Error, warning and success codes with their classification metadata
//!
//! Single source of truth for every code the compiler and runtime log or attach
//! to their error types.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for error, warning and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

// ============================================================================
// CLASSIFICATION TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
    pub const IO_ERROR: Code = Code::new("ERR003");
}

/// Tokenization of rule text
pub mod lexical {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("E020");
    pub const UNTERMINATED_STRING: Code = Code::new("E021");
    pub const INVALID_NUMBER: Code = Code::new("E022");
    pub const IDENTIFIER_TOO_LONG: Code = Code::new("E023");
    pub const STRING_TOO_LARGE: Code = Code::new("E024");
    pub const UNTERMINATED_BRACKET: Code = Code::new("E025");
    pub const TOKEN_LIMIT_EXCEEDED: Code = Code::new("E026");
    pub const SOURCE_TOO_LARGE: Code = Code::new("E027");
}

/// Grammar mismatches
pub mod syntax {
    use super::Code;

    pub const UNEXPECTED_TOKEN: Code = Code::new("E040");
    pub const UNEXPECTED_END: Code = Code::new("E041");
    pub const MAX_DEPTH_EXCEEDED: Code = Code::new("E042");
    pub const INVALID_OPERATOR: Code = Code::new("E043");
    pub const TOO_MANY_RULES: Code = Code::new("E044");
    pub const EMPTY_SOURCE: Code = Code::new("E045");
}

/// AST node construction
pub mod construction {
    use super::Code;

    pub const UNKNOWN_FUNCTION: Code = Code::new("E060");
    pub const WRONG_ARITY: Code = Code::new("E061");
    pub const INVALID_ENUM_LITERAL: Code = Code::new("E062");
    pub const INVALID_DATE_LITERAL: Code = Code::new("E063");
    pub const INVALID_PATH: Code = Code::new("E064");
    pub const INVALID_REGEX: Code = Code::new("E065");
    pub const DUPLICATE_FUNCTION: Code = Code::new("E066");
}

/// Date expressions
pub mod dates {
    use super::Code;

    pub const EMPTY_EXPRESSION: Code = Code::new("E080");
    pub const NO_PATTERN_MATCHED: Code = Code::new("E081");
    pub const UNCONSUMED_INPUT: Code = Code::new("E082");
    pub const OUT_OF_RANGE: Code = Code::new("E083");
    pub const DUPLICATE_PATTERN: Code = Code::new("E084");
    pub const EXPRESSION_TOO_LONG: Code = Code::new("E085");
}

/// Rule evaluation against a target
pub mod evaluation {
    use super::Code;

    pub const DIVISION_BY_ZERO: Code = Code::new("E100");
    pub const PROPERTY_NOT_FOUND: Code = Code::new("E101");
    pub const NULL_INTERMEDIATE: Code = Code::new("E102");
    pub const INDEX_OUT_OF_RANGE: Code = Code::new("E103");
    pub const UNKNOWN_ENUM_TYPE: Code = Code::new("E104");
    pub const UNKNOWN_ENUM_MEMBER: Code = Code::new("E105");
    pub const INCOMPARABLE_OPERANDS: Code = Code::new("E106");
    pub const INVALID_OPERAND: Code = Code::new("E107");
    pub const CUSTOM_FUNCTION_FAILED: Code = Code::new("E108");
    pub const NO_DEFAULT_INDEX: Code = Code::new("E109");
    pub const LIMIT_EXCEEDED: Code = Code::new("E110");
}

/// JavaScript translation
pub mod translation {
    use super::Code;

    pub const WRITE_FAILED: Code = Code::new("E120");
    pub const UNSUPPORTED_FUNCTION: Code = Code::new("W120");
    pub const UNTRANSLATED_ARGUMENTS: Code = Code::new("W121");
}

pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I001");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I010");
    pub const RULES_CONSTRUCTED: Code = Code::new("I011");
    pub const COMPILATION_COMPLETE: Code = Code::new("I012");
    pub const TRANSLATION_COMPLETE: Code = Code::new("I020");
    pub const VALIDATION_COMPLETE: Code = Code::new("I030");
}

// ============================================================================
// METADATA REGISTRY
// ============================================================================

use Severity::{Critical, High, Low, Medium};

#[rustfmt::skip]
const METADATA: &[(&str, &str, Severity, bool, bool, &str, &str)] = &[
    // code, category, severity, recoverable, requires_halt, description, action
    ("ERR001", "System", Critical, false, true, "Critical internal error", "File a bug report with the rule source"),
    ("ERR002", "System", Critical, false, true, "Initialization failure", "Check VALANG_* environment configuration"),
    ("ERR003", "System", High, false, true, "I/O failure reading or writing rule data", "Check file paths and permissions"),

    ("E020", "Lexical", High, false, true, "Unrecognized character in rule source", "Remove or quote the character"),
    ("E021", "Lexical", High, false, true, "Unterminated string literal", "Close the literal with a single quote"),
    ("E022", "Lexical", High, false, true, "Malformed numeric literal", "Use decimal digits or a 0x hex literal"),
    ("E023", "Lexical", Medium, false, true, "Identifier exceeds the configured length limit", "Shorten the property name"),
    ("E024", "Lexical", Medium, false, true, "String literal exceeds the configured size limit", "Shorten the literal"),
    ("E025", "Lexical", High, false, true, "Unterminated date or enum literal", "Close the literal with ']'"),
    ("E026", "Lexical", Medium, false, true, "Token count limit exceeded", "Split the rule source"),
    ("E027", "Lexical", Medium, false, true, "Rule source exceeds the configured size limit", "Split the rule source"),

    ("E040", "Syntax", High, false, true, "Unexpected token", "Check the rule against the grammar"),
    ("E041", "Syntax", High, false, true, "Unexpected end of rule source", "Complete the rule block"),
    ("E042", "Syntax", High, false, true, "Expression nesting too deep", "Simplify the expression"),
    ("E043", "Syntax", High, false, true, "Unknown operator phrase", "Use a documented operator alias"),
    ("E044", "Syntax", Medium, false, true, "Too many rules in one source", "Split the rule source"),
    ("E045", "Syntax", Low, true, false, "Rule source contains no rules", "Add at least one rule block"),

    ("E060", "Construction", High, false, true, "Unknown function name", "Register the function or fix its name"),
    ("E061", "Construction", High, false, true, "Wrong number of function arguments", "Match the function's arity"),
    ("E062", "Construction", High, false, true, "Malformed enum literal", "Use ['VALUE'] or ['Type.VALUE']"),
    ("E063", "Construction", High, false, true, "Malformed date literal", "Use a supported date format or modifier"),
    ("E064", "Construction", High, false, true, "Malformed property path", "Check dots and brackets in the path"),
    ("E065", "Construction", High, false, true, "Invalid regular expression", "Fix the pattern passed to match()"),
    ("E066", "Construction", Medium, false, true, "Function name registered twice", "Use a distinct function name"),

    ("E080", "Dates", High, false, true, "Empty date expression", "Provide a date or T modifier"),
    ("E081", "Dates", High, false, true, "No date pattern matched", "Use a supported date format or modifier"),
    ("E082", "Dates", High, false, true, "Date expression not fully consumed", "Remove trailing characters"),
    ("E083", "Dates", High, false, true, "Date arithmetic out of range", "Use a smaller offset"),
    ("E084", "Dates", Medium, false, true, "Date pattern registered twice", "Register each pattern once"),
    ("E085", "Dates", Medium, false, true, "Date expression too long", "Shorten the modifier chain"),

    ("E100", "Evaluation", High, false, true, "Division or modulo by zero", "Guard the divisor with a WHERE clause"),
    ("E101", "Evaluation", High, false, true, "Property not found on target", "Fix the rule path or the target"),
    ("E102", "Evaluation", High, false, true, "Null value in the middle of a property path", "Guard the path with a null check"),
    ("E103", "Evaluation", High, false, true, "Index out of range", "Check the index against the collection size"),
    ("E104", "Evaluation", High, false, true, "Enum type not registered", "Register the enum type with the evaluator"),
    ("E105", "Evaluation", High, false, true, "Enum member not found", "Use an existing member name"),
    ("E106", "Evaluation", High, false, true, "Operands cannot be compared", "Compare numbers, dates or strings of like kind"),
    ("E107", "Evaluation", High, false, true, "Operand has the wrong shape for the operator", "Check between/in operands"),
    ("E108", "Evaluation", High, false, true, "Custom function failed", "Inspect the custom function"),
    ("E109", "Evaluation", High, false, true, "Empty index used without a default index", "Supply a default index"),
    ("E110", "Evaluation", Medium, false, true, "Evaluation limit exceeded", "Reduce path depth or collection size"),

    ("E120", "Translation", High, false, true, "Failed to write generated JavaScript", "Check the output sink"),
    ("W120", "Translation", Low, true, false, "Custom function has no client-side counterpart", "Register a client name for the function"),
    ("W121", "Translation", Low, true, false, "Message arguments are not translated", "Default message used on the client"),

    ("I001", "Success", Low, true, false, "Logging system initialized", "No action required"),
    ("I010", "Success", Low, true, false, "Tokenization complete", "No action required"),
    ("I011", "Success", Low, true, false, "Validation rules constructed", "No action required"),
    ("I012", "Success", Low, true, false, "Rule source compiled", "No action required"),
    ("I020", "Success", Low, true, false, "JavaScript translation complete", "No action required"),
    ("I030", "Success", Low, true, false, "Target validated", "No action required"),
];

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        METADATA
            .iter()
            .map(
                |&(code, category, severity, recoverable, requires_halt, description, action)| {
                    (
                        code,
                        ErrorMetadata {
                            code,
                            category,
                            severity,
                            recoverable,
                            requires_halt,
                            description,
                            recommended_action: action,
                        },
                    )
                },
            )
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_error_metadata(code)
        .map(|m| m.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_metadata(code)
        .map(|m| m.recoverable)
        .unwrap_or(true)
}

pub fn requires_halt(code: &str) -> bool {
    get_error_metadata(code)
        .map(|m| m.requires_halt)
        .unwrap_or(false)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|m| m.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|m| m.recommended_action)
        .unwrap_or("No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|m| m.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_constant_has_metadata() {
        let codes = [
            system::INTERNAL_ERROR,
            lexical::INVALID_CHARACTER,
            lexical::SOURCE_TOO_LARGE,
            syntax::UNEXPECTED_TOKEN,
            syntax::EMPTY_SOURCE,
            construction::UNKNOWN_FUNCTION,
            construction::DUPLICATE_FUNCTION,
            dates::NO_PATTERN_MATCHED,
            evaluation::UNKNOWN_ENUM_MEMBER,
            evaluation::LIMIT_EXCEEDED,
            translation::UNTRANSLATED_ARGUMENTS,
            success::VALIDATION_COMPLETE,
        ];
        for code in codes {
            assert!(
                get_error_metadata(code.as_str()).is_some(),
                "missing metadata for {}",
                code
            );
        }
    }

    #[test]
    fn test_classification() {
        assert_eq!(get_category("E020"), "Lexical");
        assert_eq!(get_category("E105"), "Evaluation");
        assert_eq!(get_severity("ERR001"), Severity::Critical);
        assert!(requires_halt("E040"));
        assert!(is_recoverable("W120"));
        assert_eq!(get_description("X999"), "Unknown error");
    }

    #[test]
    fn test_registry_has_no_duplicate_codes() {
        assert_eq!(get_error_registry().len(), METADATA.len());
    }
}
