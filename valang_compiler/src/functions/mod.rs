//! Built-in and custom function resolution

pub mod registry;

pub use registry::{Arity, Builtin, FunctionDefinition, FunctionRegistry};
