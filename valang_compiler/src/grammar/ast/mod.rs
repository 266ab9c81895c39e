//! Abstract syntax tree for compiled rules

pub mod nodes;

pub use nodes::{
    quote, DateLiteral, EnumLiteral, Function, Literal, MathOperator, Operator, PathSegment,
    Predicate, PropertyPath, TestPredicate, ValidationRule, ALL_OPERATORS, GLOBAL_RULE_KEY,
};
