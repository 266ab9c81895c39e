//! Grammar of the Valang rule language: keywords, AST and node builders

pub mod ast;
pub mod builders;
pub mod error;
pub mod keywords;

pub use ast::nodes::*;
pub use error::{ConstructionError, ConstructionResult};
pub use keywords::{is_reserved_keyword, Keyword};
