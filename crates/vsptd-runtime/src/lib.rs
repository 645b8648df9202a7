//! VSPTD runtime
//!
//! Evaluation on top of the triplet model: computing triplet expressions
//! against fact collections, evaluating condition strings, and the
//! restricted expression evaluator both rely on.

pub mod compute;
pub mod condition;
pub mod engine;
pub mod error;

pub use compute::Compute;
pub use condition::{evaluate_condition, ConditionEvaluator};
pub use engine::{is_allowed_function, Evaluator, ALLOWED_FUNCTIONS};
pub use error::{Result, RuntimeError};
