//! Lexical settings of the triplet notation
//!
//! [`Settings`] holds every delimiter of the notation together with the
//! validation rules (length bounds, format pattern, accepted kinds) of the
//! four triplet fields. Triplets, triplet strings and parsers carry an
//! `Arc<Settings>`; [`Settings::shared`] is the immutable default used when
//! no settings are supplied.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use vsptd_core::settings::Settings;
//!
//! let mut custom = Settings::default();
//! custom.prefix.min = 5;
//! custom.prefix.max = 100;
//! custom.prefix.pattern = Some(".*".to_string());
//! custom.start = "~".to_string();
//! let custom = Arc::new(custom);
//! # let _ = custom;
//! ```

use crate::error::{CoreError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

static SHARED: Lazy<Arc<Settings>> = Lazy::new(|| Arc::new(Settings::default()));

// Compiled full-match patterns, keyed by the configured pattern text.
static PATTERNS: Lazy<RwLock<HashMap<String, Regex>>> = Lazy::new(|| RwLock::new(HashMap::new()));

/// Kind of a value as seen by validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Str,
    Int,
    Float,
    Bool,
    Triplet,
    Expression,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Str => "str",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Bool => "bool",
            ValueKind::Triplet => "triplet",
            ValueKind::Expression => "expression",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Triplet field a validation call applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Prefix,
    Name,
    Value,
    Comment,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Prefix => "prefix",
            Field::Name => "name",
            Field::Value => "value",
            Field::Comment => "comment",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime shape of a value submitted for validation.
///
/// Only text carries its content: length and pattern checks apply to text
/// alone, every other kind is checked for type membership only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Candidate<'a> {
    Str(&'a str),
    Int(i64),
    Float(f64),
    Bool(bool),
    Triplet,
    Expression,
}

impl Candidate<'_> {
    pub fn kind(&self) -> ValueKind {
        match self {
            Candidate::Str(_) => ValueKind::Str,
            Candidate::Int(_) => ValueKind::Int,
            Candidate::Float(_) => ValueKind::Float,
            Candidate::Bool(_) => ValueKind::Bool,
            Candidate::Triplet => ValueKind::Triplet,
            Candidate::Expression => ValueKind::Expression,
        }
    }
}

impl<'a> From<&'a str> for Candidate<'a> {
    fn from(s: &'a str) -> Self {
        Candidate::Str(s)
    }
}

/// Validation rules of a single triplet field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRules {
    /// Minimum text length, in characters
    pub min: usize,
    /// Maximum text length, in characters
    pub max: usize,
    /// Pattern the whole text must match
    pub pattern: Option<String>,
    /// Accepted value kinds
    pub types: Vec<ValueKind>,
}

impl FieldRules {
    fn new(min: usize, max: usize, pattern: Option<&str>, types: &[ValueKind]) -> Self {
        Self {
            min,
            max,
            pattern: pattern.map(str::to_string),
            types: types.to_vec(),
        }
    }

    pub fn accepts(&self, kind: ValueKind) -> bool {
        self.types.contains(&kind)
    }
}

/// Delimiters and validation rules of the notation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Bid (request) marker
    pub bid: String,
    /// Start of a triplet
    pub start: String,
    /// Separator between prefix and name
    pub prefix_name_separator: String,
    /// Separator between name and value
    pub name_value_separator: String,
    /// End of a triplet
    pub end: String,
    /// Quote around string values
    pub value_quote: String,
    /// Quote around comments
    pub comment_quote: String,
    /// Separator between triplets of a triplet string
    pub triplets_separator: String,
    /// Separator between items of a triplet expression
    pub expression_items_separator: String,

    pub prefix: FieldRules,
    pub name: FieldRules,
    pub value: FieldRules,
    pub comment: FieldRules,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bid: ":".to_string(),
            start: "$".to_string(),
            prefix_name_separator: ".".to_string(),
            name_value_separator: "=".to_string(),
            end: ";".to_string(),
            value_quote: "'".to_string(),
            comment_quote: "\"".to_string(),
            triplets_separator: " ".to_string(),
            expression_items_separator: String::new(),
            prefix: FieldRules::new(1, 25, Some(r"[A-Z]+\d*"), &[ValueKind::Str]),
            name: FieldRules::new(1, 25, Some(r"[A-Z]+"), &[ValueKind::Str]),
            value: FieldRules::new(
                0,
                256,
                None,
                &[
                    ValueKind::Str,
                    ValueKind::Int,
                    ValueKind::Float,
                    ValueKind::Triplet,
                    ValueKind::Expression,
                ],
            ),
            comment: FieldRules::new(0, 256, None, &[ValueKind::Str]),
        }
    }
}

impl Settings {
    /// The process-wide default settings
    pub fn shared() -> Arc<Settings> {
        Arc::clone(&SHARED)
    }

    /// Rules applied to `field`
    pub fn rules(&self, field: Field) -> &FieldRules {
        match field {
            Field::Prefix => &self.prefix,
            Field::Name => &self.name,
            Field::Value => &self.value,
            Field::Comment => &self.comment,
        }
    }

    /// Check `candidate` against the rules of `field`.
    ///
    /// Kind membership is checked first; text is then checked for length and
    /// for a full match of the configured pattern. Floats must be finite.
    pub fn validate<'a>(&self, field: Field, candidate: impl Into<Candidate<'a>>) -> Result<()> {
        let candidate = candidate.into();
        let rules = self.rules(field);

        if !rules.accepts(candidate.kind()) {
            return Err(CoreError::Type {
                field: field.to_string(),
                expected: rules
                    .types
                    .iter()
                    .map(ValueKind::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
                actual: candidate.kind().to_string(),
            });
        }

        let text = match candidate {
            Candidate::Str(text) => text,
            Candidate::Float(f) if !f.is_finite() => {
                return Err(CoreError::InvalidValue(format!(
                    "{} must be a finite number, not {}",
                    field, f
                )));
            }
            _ => return Ok(()),
        };

        let len = text.chars().count();
        if len < rules.min || len > rules.max {
            return Err(CoreError::Length {
                field: field.to_string(),
                min: rules.min,
                max: rules.max,
                actual: len,
            });
        }

        if let Some(pattern) = &rules.pattern {
            if !full_match(pattern, text)? {
                return Err(CoreError::Format {
                    field: field.to_string(),
                    value: text.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Like [`Settings::validate`], but an absent value is accepted as is
    pub fn validate_opt<'a>(&self, field: Field, candidate: Option<Candidate<'a>>) -> Result<()> {
        match candidate {
            Some(candidate) => self.validate(field, candidate),
            None => Ok(()),
        }
    }

    /// Snapshot of all settings as a JSON object
    pub fn to_dict(&self) -> Result<serde_json::Map<String, serde_json::Value>> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => Ok(map),
            other => Err(CoreError::Settings(format!(
                "settings serialized to {} instead of an object",
                other
            ))),
        }
    }

    /// Overwrite the settings named in `dict`, leaving the others untouched.
    ///
    /// Values are taken as they are: a pattern is not compiled and bounds are
    /// not cross-checked. Nested field rules may be given partially. On error
    /// the settings are left unchanged.
    pub fn from_dict(&mut self, dict: &serde_json::Map<String, serde_json::Value>) -> Result<()> {
        let mut current = serde_json::Value::Object(self.to_dict()?);
        merge(&mut current, dict);
        *self = serde_json::from_value(current)?;
        log::debug!("settings updated: {:?}", dict.keys().collect::<Vec<_>>());
        Ok(())
    }

    /// Load settings from a YAML document; missing keys keep their defaults
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Dump the settings as a YAML document
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

fn merge(target: &mut serde_json::Value, patch: &serde_json::Map<String, serde_json::Value>) {
    let serde_json::Value::Object(target) = target else {
        return;
    };
    for (key, value) in patch {
        match (target.get_mut(key), value) {
            (Some(existing @ serde_json::Value::Object(_)), serde_json::Value::Object(inner)) => {
                merge(existing, inner);
            }
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

fn poisoned<T>(_: T) -> CoreError {
    CoreError::Settings("pattern cache lock poisoned".to_string())
}

fn full_match(pattern: &str, text: &str) -> Result<bool> {
    if let Some(re) = PATTERNS.read().map_err(poisoned)?.get(pattern) {
        return Ok(re.is_match(text));
    }

    let re = Regex::new(&format!("^(?:{})$", pattern))
        .map_err(|e| CoreError::Settings(format!("invalid pattern '{}': {}", pattern, e)))?;
    let matched = re.is_match(text);
    PATTERNS
        .write()
        .map_err(poisoned)?
        .insert(pattern.to_string(), re);
    Ok(matched)
}
