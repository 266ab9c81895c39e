pub mod comparisons;
pub mod context;
pub mod error;
pub mod functions;
pub mod predicates;

pub use comparisons::{values_equal, Operand};
pub use context::{CustomFunction, EvaluationContext};
pub use error::{EvaluationError, EvaluationResult};
pub use functions::evaluate;
pub use predicates::{evaluate_predicate, evaluate_test};
