//! # Valang compiler
//!
//! Turns Valang rule source into validation rules and, optionally, into a
//! client-side JavaScript validator.

// Internal modules
pub mod codegen;
pub mod config;
pub mod dates;
pub mod functions;
pub mod grammar;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod syntax;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use functions::{Arity, Builtin, FunctionDefinition, FunctionRegistry};
pub use grammar::ast::nodes::{
    DateLiteral, EnumLiteral, Function, Literal, MathOperator, Operator, PathSegment, Predicate,
    PropertyPath, TestPredicate, ValidationRule,
};
pub use pipeline::{compile, compile_file, compile_source, compile_with, CompileError, CompileOutput};
