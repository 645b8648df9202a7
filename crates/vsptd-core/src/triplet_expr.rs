//! Triplet expression (frame formula)
//!
//! An ordered list of literals, operator text and triplet references, e.g.
//! `$A.B*$C.D`. Evaluation lives in the runtime crate.

use crate::error::{CoreError, Result};
use crate::settings::Settings;
use crate::triplet::Triplet;
use crate::types::value::format_float;
use std::fmt;
use std::sync::Arc;

/// Item of a triplet expression
#[derive(Debug, Clone, PartialEq)]
pub enum ExprItem {
    /// Operator or any other text, inserted verbatim
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Reference to a fact, resolved at compute time
    Reference(Triplet),
    /// Nested expression, computed before the enclosing one
    Expression(TripletExpression),
}

impl fmt::Display for ExprItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprItem::Text(s) => f.write_str(s),
            ExprItem::Int(i) => write!(f, "{}", i),
            ExprItem::Float(x) => f.write_str(&format_float(*x)),
            ExprItem::Bool(true) => f.write_str("True"),
            ExprItem::Bool(false) => f.write_str("False"),
            ExprItem::Reference(t) => write!(f, "{}", t),
            ExprItem::Expression(e) => write!(f, "{}", e),
        }
    }
}

impl From<&str> for ExprItem {
    fn from(s: &str) -> Self {
        ExprItem::Text(s.to_string())
    }
}

impl From<String> for ExprItem {
    fn from(s: String) -> Self {
        ExprItem::Text(s)
    }
}

impl From<i64> for ExprItem {
    fn from(i: i64) -> Self {
        ExprItem::Int(i)
    }
}

impl From<i32> for ExprItem {
    fn from(i: i32) -> Self {
        ExprItem::Int(i64::from(i))
    }
}

impl From<f64> for ExprItem {
    fn from(f: f64) -> Self {
        ExprItem::Float(f)
    }
}

impl From<bool> for ExprItem {
    fn from(b: bool) -> Self {
        ExprItem::Bool(b)
    }
}

impl From<Triplet> for ExprItem {
    fn from(t: Triplet) -> Self {
        ExprItem::Reference(t)
    }
}

impl From<TripletExpression> for ExprItem {
    fn from(e: TripletExpression) -> Self {
        ExprItem::Expression(e)
    }
}

/// Ordered operands and operators over triplet references
#[derive(Clone)]
pub struct TripletExpression {
    items: Vec<ExprItem>,
    settings: Arc<Settings>,
}

impl TripletExpression {
    pub fn new(items: Vec<ExprItem>) -> Result<Self> {
        Self::with_settings(items, Settings::shared())
    }

    /// Every reference item must be a valueless reference triplet and every
    /// float finite
    pub fn with_settings(items: Vec<ExprItem>, settings: Arc<Settings>) -> Result<Self> {
        for item in &items {
            match item {
                ExprItem::Reference(trp) if trp.value().is_some() => {
                    return Err(CoreError::InvalidValue(format!(
                        "expression items must be reference triplets, not {}",
                        trp
                    )));
                }
                ExprItem::Float(f) if !f.is_finite() => {
                    return Err(CoreError::InvalidValue(format!(
                        "expression items must be finite numbers, not {}",
                        f
                    )));
                }
                _ => {}
            }
        }
        Ok(Self { items, settings })
    }

    pub fn items(&self) -> &[ExprItem] {
        &self.items
    }

    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }
}

impl PartialEq for TripletExpression {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl fmt::Display for TripletExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self
            .items
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(&self.settings.expression_items_separator);
        f.write_str(&text)
    }
}

impl fmt::Debug for TripletExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TripletExpression").field(&self.items).finish()
    }
}
