//! Triplet: a single `$PREFIX.NAME=VALUE"COMMENT";` fact
//!
//! Prefix and name are validated on construction and fixed afterwards.
//! Value and comment can be replaced through setters, which re-run the
//! validation of the settings the triplet was built with.

use crate::error::{CoreError, Result};
use crate::settings::{Candidate, Field, Settings};
use crate::triplet_expr::TripletExpression;
use crate::triplet_string::TripletString;
use crate::types::value::format_float;
use crate::types::Value;
use std::fmt;
use std::sync::Arc;

/// Key of a triplet inside a triplet string
pub type TripletKey = (String, Option<String>);

/// Value carried by a triplet
#[derive(Debug, Clone)]
pub enum TripletValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Pointer to another fact; the referenced triplet has no value
    Reference(Box<Triplet>),
    Expression(TripletExpression),
}

impl TripletValue {
    pub(crate) fn candidate(&self) -> Candidate<'_> {
        match self {
            TripletValue::Str(s) => Candidate::Str(s),
            TripletValue::Int(i) => Candidate::Int(*i),
            TripletValue::Float(f) => Candidate::Float(*f),
            TripletValue::Bool(b) => Candidate::Bool(*b),
            TripletValue::Reference(_) => Candidate::Triplet,
            TripletValue::Expression(_) => Candidate::Expression,
        }
    }

    /// Plain runtime value, if this is a literal
    pub fn to_value(&self) -> Option<Value> {
        match self {
            TripletValue::Str(s) => Some(Value::Str(s.clone())),
            TripletValue::Int(i) => Some(Value::Int(*i)),
            TripletValue::Float(f) => Some(Value::Float(*f)),
            TripletValue::Bool(b) => Some(Value::Bool(*b)),
            TripletValue::Reference(_) | TripletValue::Expression(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TripletValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&Triplet> {
        match self {
            TripletValue::Reference(t) => Some(t),
            _ => None,
        }
    }

    /// Text of the value inside a rendered triplet
    fn render(&self, settings: &Settings) -> String {
        match self {
            TripletValue::Str(s) => format!("{0}{1}{0}", settings.value_quote, s),
            other => other.to_string(),
        }
    }
}

impl PartialEq for TripletValue {
    fn eq(&self, other: &Self) -> bool {
        use TripletValue::*;
        match (self, other) {
            (Str(a), Str(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Int(a), Float(b)) | (Float(b), Int(a)) => (*a as f64) == *b,
            (Float(a), Float(b)) => a == b,
            (Bool(a), Bool(b)) => a == b,
            (Reference(a), Reference(b)) => a == b,
            (Expression(a), Expression(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for TripletValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripletValue::Str(s) => f.write_str(s),
            TripletValue::Int(i) => write!(f, "{}", i),
            TripletValue::Float(x) => f.write_str(&format_float(*x)),
            TripletValue::Bool(true) => f.write_str("True"),
            TripletValue::Bool(false) => f.write_str("False"),
            TripletValue::Reference(t) => write!(f, "{}", t),
            TripletValue::Expression(e) => write!(f, "{}", e),
        }
    }
}

impl From<&str> for TripletValue {
    fn from(s: &str) -> Self {
        TripletValue::Str(s.to_string())
    }
}

impl From<String> for TripletValue {
    fn from(s: String) -> Self {
        TripletValue::Str(s)
    }
}

impl From<i64> for TripletValue {
    fn from(i: i64) -> Self {
        TripletValue::Int(i)
    }
}

impl From<i32> for TripletValue {
    fn from(i: i32) -> Self {
        TripletValue::Int(i64::from(i))
    }
}

impl From<f64> for TripletValue {
    fn from(f: f64) -> Self {
        TripletValue::Float(f)
    }
}

impl From<bool> for TripletValue {
    fn from(b: bool) -> Self {
        TripletValue::Bool(b)
    }
}

impl From<Triplet> for TripletValue {
    fn from(t: Triplet) -> Self {
        TripletValue::Reference(Box::new(t))
    }
}

impl From<TripletExpression> for TripletValue {
    fn from(e: TripletExpression) -> Self {
        TripletValue::Expression(e)
    }
}

/// A single fact
#[derive(Clone)]
pub struct Triplet {
    prefix: String,
    name: Option<String>,
    value: Option<TripletValue>,
    comment: Option<String>,
    bid: bool,
    special: bool,
    settings: Arc<Settings>,
}

impl Triplet {
    /// Triplet with a name and a value, validated with the shared settings
    pub fn new(prefix: &str, name: &str, value: impl Into<TripletValue>) -> Result<Self> {
        Self::builder(prefix).name(name).value(value).build()
    }

    /// Valueless triplet pointing at the fact `prefix.name`
    pub fn reference(prefix: &str, name: &str) -> Result<Self> {
        Self::builder(prefix).name(name).build()
    }

    pub fn builder(prefix: &str) -> TripletBuilder {
        TripletBuilder::new(prefix)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn value(&self) -> Option<&TripletValue> {
        self.value.as_ref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn is_bid(&self) -> bool {
        self.bid
    }

    pub fn is_special(&self) -> bool {
        self.special
    }

    /// A triplet without value (and not a bid) is a reference
    pub fn is_reference(&self) -> bool {
        self.value.is_none()
    }

    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    pub fn key(&self) -> TripletKey {
        (self.prefix.clone(), self.name.clone())
    }

    /// Replace the value; the new value is validated first
    pub fn set_value(&mut self, value: Option<TripletValue>) -> Result<()> {
        if let Some(value) = &value {
            validate_value(&self.settings, value)?;
        }
        self.value = value;
        Ok(())
    }

    /// Replace the comment; an empty comment removes it
    pub fn set_comment(&mut self, comment: Option<&str>) -> Result<()> {
        self.comment = normalize_comment(&self.settings, comment)?;
        Ok(())
    }

    pub fn set_bid(&mut self, bid: bool) {
        self.bid = bid;
    }

    pub fn set_special(&mut self, special: bool) {
        self.special = special;
    }

    /// Render in the notation of the triplet's settings
    pub fn to_text(&self) -> String {
        let s = &self.settings;
        let mut out = String::new();

        if !self.special {
            out.push_str(&s.start);
        }
        out.push_str(&self.prefix);
        out.push_str(&s.prefix_name_separator);
        if let Some(name) = &self.name {
            out.push_str(name);
        }

        if self.value.is_none() && !self.bid {
            return out;
        }

        out.push_str(&s.name_value_separator);
        if self.bid {
            out.push_str(&s.bid);
        }
        if let Some(value) = &self.value {
            out.push_str(&value.render(s));
        }
        if let Some(comment) = &self.comment {
            out.push_str(&s.comment_quote);
            out.push_str(comment);
            out.push_str(&s.comment_quote);
        }
        out.push_str(&s.end);
        out
    }
}

fn validate_value(settings: &Settings, value: &TripletValue) -> Result<()> {
    settings.validate(Field::Value, value.candidate())?;
    if let TripletValue::Str(text) = value {
        let vq = &settings.value_quote;
        let closers = [
            format!("{}{}", vq, settings.end),
            format!("{}{}", vq, settings.comment_quote),
        ];
        reject_closing(Field::Value, text, &closers)?;
    }
    if let TripletValue::Reference(target) = value {
        if target.value.is_some() {
            return Err(CoreError::InvalidValue(format!(
                "only a reference triplet can be used as a value, not {}",
                target
            )));
        }
    }
    Ok(())
}

fn normalize_comment(settings: &Settings, comment: Option<&str>) -> Result<Option<String>> {
    match comment {
        None | Some("") => Ok(None),
        Some(c) => {
            settings.validate(Field::Comment, c)?;
            let closer = format!("{}{}", settings.comment_quote, settings.end);
            reject_closing(Field::Comment, c, &[closer])?;
            Ok(Some(c.to_string()))
        }
    }
}

/// Text must not contain a sequence that closes its quotes in rendered form
fn reject_closing(field: Field, text: &str, closers: &[String]) -> Result<()> {
    if closers.iter().any(|closer| text.contains(closer.as_str())) {
        return Err(CoreError::Format {
            field: field.to_string(),
            value: text.to_string(),
        });
    }
    Ok(())
}

impl PartialEq for Triplet {
    fn eq(&self, other: &Self) -> bool {
        self.prefix == other.prefix && self.name == other.name && self.value == other.value
    }
}

impl fmt::Display for Triplet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl fmt::Debug for Triplet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Triplet");
        d.field("prefix", &self.prefix);
        if let Some(name) = &self.name {
            d.field("name", name);
        }
        if let Some(value) = &self.value {
            d.field("value", value);
        }
        if let Some(comment) = &self.comment {
            d.field("comment", comment);
        }
        if self.special {
            d.field("special", &self.special);
        }
        if self.bid {
            d.field("bid", &self.bid);
        }
        d.finish()
    }
}

impl std::ops::Add for Triplet {
    type Output = TripletString;

    fn add(self, rhs: Triplet) -> TripletString {
        let mut result = TripletString::with_settings(Arc::clone(&self.settings));
        TripletString::add(&mut result, self);
        TripletString::add(&mut result, rhs);
        result
    }
}

impl std::ops::Add<TripletString> for Triplet {
    type Output = TripletString;

    fn add(self, rhs: TripletString) -> TripletString {
        let mut result = TripletString::with_settings(Arc::clone(&self.settings));
        TripletString::add(&mut result, self);
        result.extend(rhs);
        result
    }
}

/// Builder for [`Triplet`]
#[derive(Debug, Clone)]
pub struct TripletBuilder {
    prefix: String,
    name: Option<String>,
    value: Option<TripletValue>,
    comment: Option<String>,
    bid: bool,
    special: bool,
    settings: Option<Arc<Settings>>,
}

impl TripletBuilder {
    fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            name: None,
            value: None,
            comment: None,
            bid: false,
            special: false,
            settings: None,
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn value(mut self, value: impl Into<TripletValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_string());
        self
    }

    pub fn bid(mut self, bid: bool) -> Self {
        self.bid = bid;
        self
    }

    pub fn special(mut self, special: bool) -> Self {
        self.special = special;
        self
    }

    pub fn settings(mut self, settings: Arc<Settings>) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Validate every field and build the triplet
    pub fn build(self) -> Result<Triplet> {
        let settings = self.settings.unwrap_or_else(Settings::shared);

        settings.validate(Field::Prefix, self.prefix.as_str())?;
        let prefix = self.prefix.to_uppercase();

        let name = match self.name.as_deref() {
            None | Some("") => None,
            Some(name) => {
                settings.validate(Field::Name, name)?;
                Some(name.to_uppercase())
            }
        };

        if let Some(value) = &self.value {
            validate_value(&settings, value)?;
        }
        let comment = normalize_comment(&settings, self.comment.as_deref())?;

        Ok(Triplet {
            prefix,
            name,
            value: self.value,
            comment,
            bid: self.bid,
            special: self.special,
            settings,
        })
    }
}
