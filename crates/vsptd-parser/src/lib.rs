//! VSPTD Parser - text to triplet and expression structures
//!
//! This crate provides:
//! - the regex family of the notation, built from the settings delimiters
//! - the triplet string parser
//! - the tokenizer and parser of the restricted expression language

pub mod error;
pub mod expression_parser;
pub mod patterns;
pub mod tokenizer;
pub mod triplet_parser;

// Re-export main parser types
pub use error::{ParseError, Result};
pub use expression_parser::ExpressionParser;
pub use patterns::TripletPatterns;
pub use triplet_parser::{parse_triplet_string, FactSource, TripletParser};
