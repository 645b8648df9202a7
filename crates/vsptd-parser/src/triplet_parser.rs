//! Triplet string parser
//!
//! Scans text for triplets and builds a [`TripletString`] from them.
//!
//! Limitations: special triplets (without the start marker) are not
//! recognized, and text between triplets is skipped, so malformed input is
//! not guaranteed to be reported.

use crate::error::Result;
use crate::patterns::TripletPatterns;
use std::sync::Arc;
use vsptd_core::{CoreError, Settings, Triplet, TripletString, TripletValue};

/// Input of [`TripletParser::parse`]
#[derive(Debug, Clone)]
pub enum FactSource<'a> {
    Text(&'a str),
    /// Already parsed facts, returned as they are
    Parsed(TripletString),
}

impl<'a> From<&'a str> for FactSource<'a> {
    fn from(text: &'a str) -> Self {
        FactSource::Text(text)
    }
}

impl<'a> From<&'a String> for FactSource<'a> {
    fn from(text: &'a String) -> Self {
        FactSource::Text(text)
    }
}

impl From<TripletString> for FactSource<'_> {
    fn from(parsed: TripletString) -> Self {
        FactSource::Parsed(parsed)
    }
}

impl From<&TripletString> for FactSource<'_> {
    fn from(parsed: &TripletString) -> Self {
        FactSource::Parsed(parsed.clone())
    }
}

/// Text to [`TripletString`] parser
#[derive(Debug)]
pub struct TripletParser {
    patterns: TripletPatterns,
}

impl TripletParser {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self {
            patterns: TripletPatterns::new(settings),
        }
    }

    pub fn settings(&self) -> &Arc<Settings> {
        self.patterns.settings()
    }

    pub fn patterns(&self) -> &TripletPatterns {
        &self.patterns
    }

    /// Parse text into a triplet string; parsed input is returned unchanged
    pub fn parse<'a>(&self, input: impl Into<FactSource<'a>>) -> Result<TripletString> {
        match input.into() {
            FactSource::Parsed(parsed) => Ok(parsed),
            FactSource::Text(text) => self.parse_str(text),
        }
    }

    pub fn parse_str(&self, text: &str) -> Result<TripletString> {
        let re = self.patterns.triplet()?;
        let mut result = TripletString::with_settings(Arc::clone(self.settings()));

        for caps in re.captures_iter(text) {
            let prefix = caps.get(1).map_or("", |m| m.as_str());
            let raw_value = caps.get(3).map_or("", |m| m.as_str());
            let (value, bid) = self.parse_value(raw_value)?;

            let mut builder = Triplet::builder(prefix)
                .bid(bid)
                .settings(Arc::clone(self.settings()));
            if let Some(name) = caps.get(2) {
                builder = builder.name(name.as_str());
            }
            if let Some(value) = value {
                builder = builder.value(value);
            }
            if let Some(comment) = caps.get(4) {
                builder = builder.comment(comment.as_str());
            }
            result.add(builder.build()?);
        }

        log::debug!("parsed {} triplets from {} bytes", result.len(), text.len());
        Ok(result)
    }

    /// Whether `text` consists of triplets only
    pub fn is_triplet_string(&self, text: &str) -> Result<bool> {
        Ok(self.patterns.triplets()?.is_match(text))
    }

    /// Classify the raw text of a value; also reports a leading bid marker
    pub fn parse_value(&self, raw: &str) -> Result<(Option<TripletValue>, bool)> {
        let settings = self.settings();

        let (raw, bid) = match raw.strip_prefix(settings.bid.as_str()) {
            Some(rest) if !settings.bid.is_empty() => (rest, true),
            _ => (raw, false),
        };

        if raw.is_empty() {
            return Ok((None, bid));
        }

        let value = match raw {
            "True" => TripletValue::Bool(true),
            "False" => TripletValue::Bool(false),
            _ => self.classify(raw)?,
        };
        Ok((Some(value), bid))
    }

    fn classify(&self, raw: &str) -> Result<TripletValue> {
        let quote = self.settings().value_quote.as_str();
        if !quote.is_empty()
            && raw.len() >= 2 * quote.len()
            && raw.starts_with(quote)
            && raw.ends_with(quote)
        {
            return Ok(TripletValue::Str(
                raw[quote.len()..raw.len() - quote.len()].to_string(),
            ));
        }

        if is_integer(raw) {
            return Ok(match raw.parse::<i64>() {
                Ok(i) => TripletValue::Int(i),
                Err(_) => TripletValue::Float(raw.parse::<f64>().map_err(|_| unrecognized(raw))?),
            });
        }

        let float_chars = raw
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
        if float_chars {
            if let Ok(f) = raw.parse::<f64>() {
                return Ok(TripletValue::Float(f));
            }
        }

        if let Some((prefix, name)) = self.patterns.reference_exact(raw)? {
            let target = Triplet::builder(&prefix)
                .name(&name)
                .settings(Arc::clone(self.settings()))
                .build()?;
            return Ok(TripletValue::Reference(Box::new(target)));
        }

        Err(unrecognized(raw).into())
    }
}

impl Default for TripletParser {
    fn default() -> Self {
        Self::new(Settings::shared())
    }
}

/// Parse text with the shared default settings
pub fn parse_triplet_string(text: &str) -> Result<TripletString> {
    TripletParser::default().parse_str(text)
}

fn is_integer(raw: &str) -> bool {
    let digits = raw.strip_prefix(|c: char| c == '-' || c == '+').unwrap_or(raw);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn unrecognized(raw: &str) -> CoreError {
    CoreError::Format {
        field: "value".to_string(),
        value: raw.to_string(),
    }
}
