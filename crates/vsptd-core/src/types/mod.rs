//! Runtime value types of the restricted expression language

pub mod value;

pub use value::Value;
