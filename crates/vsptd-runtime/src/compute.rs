//! Computation of triplet expressions against a fact collection

use crate::engine::Evaluator;
use crate::error::{Result, RuntimeError};
use vsptd_core::{ExprItem, Triplet, TripletExpression, TripletString, Value};

/// Something that evaluates to a [`Value`] over facts
pub trait Compute {
    /// Resolve references in `source` (special references in
    /// `special_source`) and evaluate.
    fn compute(&self, source: &TripletString, special_source: Option<&TripletString>)
        -> Result<Value>;
}

impl Compute for TripletExpression {
    fn compute(
        &self,
        source: &TripletString,
        special_source: Option<&TripletString>,
    ) -> Result<Value> {
        let mut text = String::new();

        for item in self.items() {
            match item {
                ExprItem::Text(s) => text.push_str(s),
                ExprItem::Int(i) => text.push_str(&literal(&Value::Int(*i))),
                ExprItem::Float(f) => text.push_str(&literal(&Value::Float(*f))),
                ExprItem::Bool(b) => text.push_str(&literal(&Value::Bool(*b))),
                ExprItem::Reference(target) => {
                    let value = resolve(target, source, special_source)?;
                    text.push_str(&literal(&value));
                }
                ExprItem::Expression(nested) => {
                    let value = nested.compute(source, special_source)?;
                    text.push_str(&literal(&value));
                }
            }
        }

        tracing::debug!("computing {} as {:?}", self, text);
        Evaluator::evaluate_str(&text)
    }
}

/// Expression text of a substituted value; negative numbers are
/// parenthesized.
pub(crate) fn literal(value: &Value) -> String {
    let text = value.to_literal();
    match value {
        Value::Int(_) | Value::Float(_) if text.starts_with('-') => format!("({})", text),
        _ => text,
    }
}

fn resolve(
    target: &Triplet,
    source: &TripletString,
    special_source: Option<&TripletString>,
) -> Result<Value> {
    let facts = if target.is_special() {
        special_source.ok_or_else(|| {
            RuntimeError::InvalidValue(format!(
                "special reference {} needs a special source",
                target
            ))
        })?
    } else {
        source
    };

    let found = facts.get(target.prefix(), target.name())?;
    match found.value() {
        None => Err(RuntimeError::TypeError(format!("{} has no value", found))),
        Some(value) => value.to_value().ok_or_else(|| {
            RuntimeError::TypeError(format!("{} is not a literal value", found))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsptd_core::ErrorKind;

    fn facts() -> TripletString {
        let mut facts = TripletString::new();
        facts.add(Triplet::new("A", "B", 21).unwrap());
        facts.add(Triplet::new("C", "D", 2).unwrap());
        facts.add(Triplet::new("S", "T", "ab").unwrap());
        facts
    }

    fn reference(prefix: &str, name: &str) -> ExprItem {
        Triplet::reference(prefix, name).unwrap().into()
    }

    #[test]
    fn test_compute_product() {
        let expr =
            TripletExpression::new(vec![reference("A", "B"), "*".into(), reference("C", "D")])
                .unwrap();
        assert_eq!(expr.compute(&facts(), None).unwrap(), Value::Int(42));
    }

    #[test]
    fn test_strings_are_quoted() {
        let expr = TripletExpression::new(vec![reference("S", "T"), "+'c'".into()]).unwrap();
        assert_eq!(expr.compute(&facts(), None).unwrap(), Value::from("abc"));
    }

    #[test]
    fn test_negative_values_keep_precedence() {
        let mut source = facts();
        source.add(Triplet::new("N", "M", -2).unwrap());
        let expr = TripletExpression::new(vec![reference("N", "M"), "**2".into()]).unwrap();
        assert_eq!(expr.compute(&source, None).unwrap(), Value::Int(4));
    }

    #[test]
    fn test_missing_reference() {
        let expr = TripletExpression::new(vec![reference("X", "Y")]).unwrap();
        let err = expr.compute(&facts(), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_special_reference_without_special_source() {
        let mut special = Triplet::reference("E", "F").unwrap();
        special.set_special(true);
        let expr = TripletExpression::new(vec![special.into()]).unwrap();
        let err = expr.compute(&facts(), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
    }

    #[test]
    fn test_reference_valued_fact_is_type_error() {
        let mut source = facts();
        source.add(Triplet::new("R", "S", Triplet::reference("A", "B").unwrap()).unwrap());
        let expr = TripletExpression::new(vec![reference("R", "S")]).unwrap();
        let err = expr.compute(&source, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
    }
}
