//! Abstract Syntax Tree of the restricted expression language
//!
//! Triplet expressions and condition strings are reduced to this tree before
//! they are evaluated. The tree has literals, operators and calls of
//! allow-listed functions; it has no variables.

pub mod expression;
pub mod operator;

pub use expression::{Expression, UnaryOperator};
pub use operator::Operator;
