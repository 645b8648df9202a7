//! Expression evaluation engine
//!
//! Evaluates the AST produced by the expression parser: operators, the
//! allow-listed functions and the tree walker that ties them together.

pub mod evaluator;
mod functions;
mod operators;

pub use evaluator::Evaluator;
pub use functions::{is_allowed_function, ALLOWED_FUNCTIONS};
