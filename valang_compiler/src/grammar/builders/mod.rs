//! Builder functions for the rule grammar
//!
//! Dependency order: atomic -> helpers -> expressions -> predicates -> blocks.

pub mod atomic;
pub mod blocks;
pub mod expressions;
pub mod helpers;
pub mod predicates;

pub use atomic::{
    parse_additive_operator, parse_comparison_operator, parse_date_literal, parse_enum_literal,
    parse_literal, parse_multiplicative_operator, parse_property_path, Parser,
};
pub use blocks::{parse_rule, parse_rule_key, parse_rule_source};
pub use expressions::{parse_function_call, parse_value, parse_value_list, parse_value_range};
pub use helpers::{at_end, at_predicate_boundary, nested, parse_comma_separated};
pub use predicates::{parse_comparison, parse_predicate};
