//! VSPTD Core - Core types of the VSPTD triplet notation
//!
//! This crate provides the value-object model shared by the other VSPTD crates:
//! - Settings (delimiters and field validation rules)
//! - Triplets, triplet strings and triplet expressions
//! - Runtime values and the AST of the restricted expression language
//! - Error types

pub mod ast;
pub mod error;
pub mod settings;
pub mod triplet;
pub mod triplet_expr;
pub mod triplet_string;
pub mod types;

// Re-export commonly used types
pub use error::{CoreError, ErrorKind, Result};
pub use settings::{Field, FieldRules, Settings, ValueKind};
pub use triplet::{Triplet, TripletBuilder, TripletKey, TripletValue};
pub use triplet_expr::{ExprItem, TripletExpression};
pub use triplet_string::{BidMatch, TripletString};
pub use types::Value;
