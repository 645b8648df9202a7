//! Condition evaluator
//!
//! Evaluates a condition string written over triplet references against
//! two fact collections: the primary facts, addressed with sentinel
//! references (`$A.B`), and the facts from the database, addressed with
//! bare references (`A.B`).
//!
//! The condition is rewritten into the restricted expression language:
//!
//! - connectives: ` и `/` И `/` AND ` become `and`, ` или `/` ИЛИ `/` OR `
//!   become `or`
//! - `=` becomes `==`, `<>` becomes `!=`, `^` becomes `**`
//! - upper-case names of allowed functions (`MAX(`) are lower-cased
//! - `ЕСТЬ(ref)`/`PRESENT(ref)` and `НЕТ(ref)`/`ABSENT(ref)` become `True`
//!   or `False`
//! - references are replaced with the literal value of the fact
//!
//! Rewriting never touches the inside of string literals.

use crate::compute::literal;
use crate::engine::{is_allowed_function, Evaluator};
use crate::error::{Result, RuntimeError};
use regex::{Captures, Regex};
use std::sync::Arc;
use vsptd_core::{Settings, TripletString, Value};
use vsptd_parser::{FactSource, TripletParser};

const CONNECTIVES: &[(&str, &str)] = &[
    (" или ", " or "),
    (" ИЛИ ", " or "),
    (" OR ", " or "),
    (" и ", " and "),
    (" И ", " and "),
    (" AND ", " and "),
];

/// Evaluator of condition strings
#[derive(Debug, Default)]
pub struct ConditionEvaluator {
    parser: TripletParser,
}

impl ConditionEvaluator {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self {
            parser: TripletParser::new(settings),
        }
    }

    pub fn settings(&self) -> &Arc<Settings> {
        self.parser.settings()
    }

    /// Evaluate `condition` against `facts` and `facts_from_db`.
    ///
    /// Each facts argument is either triplet text or an already parsed
    /// [`TripletString`].
    pub fn evaluate<'a, 'b>(
        &self,
        condition: &str,
        facts: impl Into<FactSource<'a>>,
        facts_from_db: impl Into<FactSource<'b>>,
    ) -> Result<Value> {
        if condition.trim().is_empty() {
            return Err(RuntimeError::InvalidValue("empty condition".to_string()));
        }
        let facts = facts.into();
        if matches!(facts, FactSource::Text(text) if text.trim().is_empty()) {
            return Err(RuntimeError::InvalidValue("no facts given".to_string()));
        }
        check_parentheses(condition)?;

        let text = map_code(condition, |code| Ok(rewrite(code)))?;
        tracing::debug!("rewritten condition: {}", text);

        let facts = self.parser.parse(facts)?;
        let facts_from_db = self.parser.parse(facts_from_db)?;

        let text = map_code(&text, |code| self.resolve_presence(code, &facts, &facts_from_db))?;
        let text = map_code(&text, |code| self.substitute_sentinel(code, &facts))?;
        let text = map_code(&text, |code| self.substitute_bare(code, &facts_from_db))?;
        tracing::debug!("substituted condition: {}", text);

        let value = Evaluator::evaluate_str(&text)?;
        tracing::debug!("condition {:?} evaluated to {:?}", condition, value);
        Ok(value)
    }

    fn resolve_presence(
        &self,
        code: &str,
        facts: &TripletString,
        facts_from_db: &TripletString,
    ) -> Result<String> {
        let patterns = self.parser.patterns();

        let mut code = replace_matches(code, patterns.present()?, |caps| {
            presence(facts, caps, true)
        })?;
        code = replace_matches(&code, patterns.absent()?, |caps| {
            presence(facts, caps, false)
        })?;

        if !facts_from_db.is_empty() {
            code = replace_matches(&code, patterns.present_bare()?, |caps| {
                presence(facts_from_db, caps, true)
            })?;
            code = replace_matches(&code, patterns.absent_bare()?, |caps| {
                presence(facts_from_db, caps, false)
            })?;
        }
        Ok(code)
    }

    fn substitute_sentinel(&self, code: &str, facts: &TripletString) -> Result<String> {
        replace_matches(code, self.parser.patterns().reference()?, |caps| {
            value_literal(facts, &caps[1], &caps[2], &caps[0])
        })
    }

    fn substitute_bare(&self, code: &str, facts_from_db: &TripletString) -> Result<String> {
        replace_matches(code, self.parser.patterns().bare_reference()?, |caps| {
            let written = format!(
                "{}{}{}",
                &caps[2],
                self.settings().prefix_name_separator,
                &caps[3]
            );
            let literal = value_literal(facts_from_db, &caps[2], &caps[3], &written)?;
            Ok(format!("{}{}", &caps[1], literal))
        })
    }
}

/// Evaluate a condition with the shared default settings
pub fn evaluate_condition<'a, 'b>(
    condition: &str,
    facts: impl Into<FactSource<'a>>,
    facts_from_db: impl Into<FactSource<'b>>,
) -> Result<Value> {
    ConditionEvaluator::default().evaluate(condition, facts, facts_from_db)
}

/// Split text into code and string literal segments; `true` marks code.
/// An unterminated literal runs to the end of the text.
fn segments(text: &str) -> Vec<(bool, &str)> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        match quote {
            None if c == '\'' || c == '"' => {
                if i > start {
                    out.push((true, &text[start..i]));
                }
                start = i;
                quote = Some(c);
            }
            None => {}
            Some(_) if escaped => escaped = false,
            Some(_) if c == '\\' => escaped = true,
            Some(q) if c == q => {
                out.push((false, &text[start..i + c.len_utf8()]));
                start = i + c.len_utf8();
                quote = None;
            }
            Some(_) => {}
        }
    }
    if start < text.len() {
        out.push((quote.is_none(), &text[start..]));
    }
    out
}

/// Apply `f` to the code segments of `text`, keeping literals as they are
fn map_code(text: &str, mut f: impl FnMut(&str) -> Result<String>) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    for (is_code, segment) in segments(text) {
        if is_code {
            out.push_str(&f(segment)?);
        } else {
            out.push_str(segment);
        }
    }
    Ok(out)
}

fn check_parentheses(condition: &str) -> Result<()> {
    let mut depth: i64 = 0;
    for (is_code, segment) in segments(condition) {
        if !is_code {
            continue;
        }
        for c in segment.chars() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth < 0 {
                        return Err(unbalanced(condition));
                    }
                }
                _ => {}
            }
        }
    }
    if depth != 0 {
        return Err(unbalanced(condition));
    }
    Ok(())
}

fn unbalanced(condition: &str) -> RuntimeError {
    RuntimeError::InvalidValue(format!("unbalanced parentheses in {:?}", condition))
}

fn rewrite(code: &str) -> String {
    let mut code = code.to_string();
    for (from, to) in CONNECTIVES {
        code = code.replace(from, to);
    }
    let code = code.replace("<>", "!=");
    let code = double_lone_equals(&code);
    let code = code.replace('^', "**");
    lowercase_calls(&code)
}

/// `=` that is not part of `==`, `!=`, `<=` or `>=` becomes `==`
fn double_lone_equals(code: &str) -> String {
    let chars: Vec<char> = code.chars().collect();
    let mut out = String::with_capacity(code.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        let lone = c == '='
            && !matches!(i.checked_sub(1).map(|j| chars[j]), Some('=' | '!' | '<' | '>'))
            && chars.get(i + 1) != Some(&'=');
        if lone {
            out.push_str("==");
        } else {
            out.push(c);
        }
    }
    out
}

fn lowercase_calls(code: &str) -> String {
    let chars: Vec<char> = code.chars().collect();
    let mut out = String::with_capacity(code.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if !(c.is_alphabetic() || c == '_') {
            out.push(c);
            i += 1;
            continue;
        }

        let start = i;
        while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
            i += 1;
        }
        let word: String = chars[start..i].iter().collect();
        let lower = word.to_lowercase();
        if chars.get(i) == Some(&'(') && lower != word && is_allowed_function(&lower) {
            out.push_str(&lower);
        } else {
            out.push_str(&word);
        }
    }
    out
}

/// Like [`Regex::replace_all`], with a fallible replacement
fn replace_matches(
    text: &str,
    re: &Regex,
    mut f: impl FnMut(&Captures<'_>) -> Result<String>,
) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in re.captures_iter(text) {
        let Some(m) = caps.get(0) else { continue };
        out.push_str(&text[last..m.start()]);
        out.push_str(&f(&caps)?);
        last = m.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}

fn presence(facts: &TripletString, caps: &Captures<'_>, present: bool) -> Result<String> {
    let prefix = caps[1].to_uppercase();
    let name = caps[2].to_uppercase();
    let found = facts.contains_key(&prefix, Some(name.as_str()))?;
    Ok(Value::Bool(found == present).to_string())
}

fn value_literal(facts: &TripletString, prefix: &str, name: &str, written: &str) -> Result<String> {
    let prefix = prefix.to_uppercase();
    let name = name.to_uppercase();
    if !facts.contains_key(&prefix, Some(name.as_str()))? {
        return Err(RuntimeError::NotFound(written.to_string()));
    }

    let triplet = facts.get(&prefix, Some(name.as_str()))?;
    match triplet.value() {
        None => Err(RuntimeError::NotFound(format!("{} has no value", written))),
        Some(value) => value.to_value().map(|v| literal(&v)).ok_or_else(|| {
            RuntimeError::TypeError(format!("{} is not a literal value", written))
        }),
    }
}
