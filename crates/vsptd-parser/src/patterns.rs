//! Regular expressions of the notation
//!
//! Every pattern is assembled from the delimiters of a [`Settings`] instance
//! (escaped with [`regex::escape`]) and compiled on first use. To pick up
//! changed settings, build a new [`TripletPatterns`].
//!
//! The patterns only find structure; they do not validate prefixes, names
//! or values.

use crate::error::Result;
use once_cell::sync::OnceCell;
use regex::{escape, Regex};
use std::sync::Arc;
use vsptd_core::Settings;

const WORD: &str = r"(\w+)";
const ANY: &str = r"(.*?)";

const PRESENT: &str = r"(?i:ЕСТЬ|PRESENT)";
const ABSENT: &str = r"(?i:НЕТ|ABSENT)";

/// Lazily compiled pattern family for one set of settings
#[derive(Debug)]
pub struct TripletPatterns {
    settings: Arc<Settings>,
    reference_special: OnceCell<Regex>,
    reference: OnceCell<Regex>,
    bare_reference: OnceCell<Regex>,
    triplet_special: OnceCell<Regex>,
    triplet: OnceCell<Regex>,
    triplets: OnceCell<Regex>,
    present: OnceCell<Regex>,
    present_bare: OnceCell<Regex>,
    absent: OnceCell<Regex>,
    absent_bare: OnceCell<Regex>,
}

impl TripletPatterns {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self {
            settings,
            reference_special: OnceCell::new(),
            reference: OnceCell::new(),
            bare_reference: OnceCell::new(),
            triplet_special: OnceCell::new(),
            triplet: OnceCell::new(),
            triplets: OnceCell::new(),
            present: OnceCell::new(),
            present_bare: OnceCell::new(),
            absent: OnceCell::new(),
            absent_bare: OnceCell::new(),
        }
    }

    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    /// Special reference: `P.N`
    pub fn reference_special_src(&self) -> String {
        format!(
            "{}{}{}",
            WORD,
            escape(&self.settings.prefix_name_separator),
            WORD
        )
    }

    /// Reference: `$P.N`
    pub fn reference_src(&self) -> String {
        format!(
            "{}{}",
            escape(&self.settings.start),
            self.reference_special_src()
        )
    }

    /// Special triplet: `P.N=V;`
    pub fn triplet_special_src(&self) -> String {
        format!(
            "{}{}{}{}",
            self.reference_special_src(),
            escape(&self.settings.name_value_separator),
            ANY,
            escape(&self.settings.end)
        )
    }

    /// Raw value of a triplet: an optional bid marker, then either a quoted
    /// string (which may contain the end and comment delimiters) or unquoted
    /// text up to the first delimiter
    pub fn value_src(&self) -> String {
        let s = &self.settings;
        format!(
            "((?:{bid})?(?:(?s:{vq}.*?{vq})|.*?))",
            bid = escape(&s.bid),
            vq = escape(&s.value_quote),
        )
    }

    /// Triplet: `$P.N=V;`, `$P.N=V"C";`, `$P.N=:V"C";`, `$P.=:;` and so on
    pub fn triplet_src(&self) -> String {
        let s = &self.settings;
        let comment_quote = escape(&s.comment_quote);
        format!(
            "{start}{word}{pn}{word}??{nv}{value}(?:{cq}((?s:.*?)){cq})??{end}",
            start = escape(&s.start),
            word = WORD,
            pn = escape(&s.prefix_name_separator),
            nv = escape(&s.name_value_separator),
            value = self.value_src(),
            cq = comment_quote,
            end = escape(&s.end),
        )
    }

    pub fn reference_special(&self) -> Result<&Regex> {
        compile(&self.reference_special, || self.reference_special_src())
    }

    pub fn reference(&self) -> Result<&Regex> {
        compile(&self.reference, || self.reference_src())
    }

    /// Full match of a reference, e.g. a triplet value such as `$C.D`
    pub fn reference_exact(&self, text: &str) -> Result<Option<(String, String)>> {
        let re = self.reference()?;
        Ok(re
            .captures(text)
            .filter(|caps| caps.get(0).map(|m| m.as_str().len()) == Some(text.len()))
            .and_then(|caps| Some((caps.get(1)?.as_str().to_string(), caps.get(2)?.as_str().to_string()))))
    }

    /// Special reference as it appears inside expression text.
    ///
    /// Group 1 is the character before the reference (or nothing at the
    /// start), groups 2 and 3 are prefix and name. The prefix must start with
    /// a letter, so numbers like `1.5` are not taken for references.
    pub fn bare_reference(&self) -> Result<&Regex> {
        compile(&self.bare_reference, || {
            format!(
                r"(^|[^\w{pn}{start}])([^\W\d]\w*){pn}(\w+)",
                pn = escape(&self.settings.prefix_name_separator),
                start = escape(&self.settings.start),
            )
        })
    }

    pub fn triplet_special(&self) -> Result<&Regex> {
        compile(&self.triplet_special, || self.triplet_special_src())
    }

    pub fn triplet(&self) -> Result<&Regex> {
        compile(&self.triplet, || self.triplet_src())
    }

    /// One or more triplets and nothing else
    pub fn triplets(&self) -> Result<&Regex> {
        compile(&self.triplets, || {
            format!(r"^\s*(?:{}\s*)+$", self.triplet_src())
        })
    }

    /// `PRESENT($P.N)` / `ЕСТЬ($P.N)`, any case
    pub fn present(&self) -> Result<&Regex> {
        compile(&self.present, || function_src(PRESENT, &self.reference_src()))
    }

    /// `PRESENT(P.N)` / `ЕСТЬ(P.N)`, any case
    pub fn present_bare(&self) -> Result<&Regex> {
        compile(&self.present_bare, || {
            function_src(PRESENT, &self.reference_special_src())
        })
    }

    /// `ABSENT($P.N)` / `НЕТ($P.N)`, any case
    pub fn absent(&self) -> Result<&Regex> {
        compile(&self.absent, || function_src(ABSENT, &self.reference_src()))
    }

    /// `ABSENT(P.N)` / `НЕТ(P.N)`, any case
    pub fn absent_bare(&self) -> Result<&Regex> {
        compile(&self.absent_bare, || {
            function_src(ABSENT, &self.reference_special_src())
        })
    }
}

impl Default for TripletPatterns {
    fn default() -> Self {
        Self::new(Settings::shared())
    }
}

fn function_src(keyword: &str, argument: &str) -> String {
    format!(r"\b{}\(\s*{}\s*\)", keyword, argument)
}

fn compile(cell: &OnceCell<Regex>, src: impl FnOnce() -> String) -> Result<&Regex> {
    cell.get_or_try_init(|| {
        let src = src();
        log::trace!("compiling pattern {}", src);
        Ok(Regex::new(&src)?)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_with_default_settings() {
        let p = TripletPatterns::default();
        assert_eq!(p.reference_special_src(), r"(\w+)\.(\w+)");
        assert_eq!(p.reference_src(), r"\$(\w+)\.(\w+)");
        assert_eq!(p.triplet_special_src(), r"(\w+)\.(\w+)=(.*?);");
        assert_eq!(
            p.triplet_src(),
            r#"\$(\w+)\.(\w+)??=((?::)?(?:(?s:'.*?')|.*?))(?:"((?s:.*?))")??;"#
        );
    }

    #[test]
    fn test_triplet_captures() {
        let p = TripletPatterns::default();
        let re = p.triplet().unwrap();

        let caps = re.captures(r#"$A.B='C'"D";"#).unwrap();
        assert_eq!(&caps[1], "A");
        assert_eq!(&caps[2], "B");
        assert_eq!(&caps[3], "'C'");
        assert_eq!(&caps[4], "D");

        let caps = re.captures("$P.=:;").unwrap();
        assert_eq!(&caps[1], "P");
        assert!(caps.get(2).is_none());
        assert_eq!(&caps[3], ":");
    }

    #[test]
    fn test_quoted_value_spans_delimiters() {
        let p = TripletPatterns::default();
        let re = p.triplet().unwrap();

        let caps = re.captures(r#"$A.B='a;b"c';"#).unwrap();
        assert_eq!(&caps[3], r#"'a;b"c'"#);
        assert!(caps.get(4).is_none());

        let caps = re.captures(r#"$A.B=:'it's'"x;y"; $C.D=1;"#).unwrap();
        assert_eq!(&caps[3], ":'it's'");
        assert_eq!(&caps[4], "x;y");

        let all: Vec<_> = re
            .captures_iter("$A.B='x'; $C.D=2;")
            .map(|c| c[3].to_string())
            .collect();
        assert_eq!(all, vec!["'x'", "2"]);

        let caps = re.captures("$A.B='two\nlines'\"note\nhere\";").unwrap();
        assert_eq!(&caps[3], "'two\nlines'");
        assert_eq!(&caps[4], "note\nhere");
    }

    #[test]
    fn test_triplets_full_match() {
        let p = TripletPatterns::default();
        let re = p.triplets().unwrap();
        assert!(re.is_match("$A.B=1; $C.D='x';"));
        assert!(!re.is_match("$A.B=1; junk"));
        assert!(!re.is_match(""));
    }

    #[test]
    fn test_reference_exact() {
        let p = TripletPatterns::default();
        assert_eq!(
            p.reference_exact("$C.D").unwrap(),
            Some(("C".to_string(), "D".to_string()))
        );
        assert_eq!(p.reference_exact("$C.D+1").unwrap(), None);
        assert_eq!(p.reference_exact("C.D").unwrap(), None);
    }

    #[test]
    fn test_bare_reference_skips_numbers_and_sentinels() {
        let p = TripletPatterns::default();
        let re = p.bare_reference().unwrap();
        assert!(re.is_match("A.B > 1"));
        assert!(!re.is_match("1.5 > 1"));
        assert!(!re.is_match("$A.B > 1"));
    }

    #[test]
    fn test_present_absent_any_case() {
        let p = TripletPatterns::default();
        assert!(p.present().unwrap().is_match("ЕСТЬ($A.B)"));
        assert!(p.present().unwrap().is_match("есть( $A.B )"));
        assert!(p.present().unwrap().is_match("Present($A.B)"));
        assert!(!p.present().unwrap().is_match("PRESENT(A.B)"));
        assert!(p.present_bare().unwrap().is_match("PRESENT(A.B)"));
        assert!(p.absent().unwrap().is_match("нет($A.B)"));
        assert!(p.absent_bare().unwrap().is_match("ABSENT(A.B)"));
    }

    #[test]
    fn test_custom_delimiters_are_escaped() {
        let mut settings = Settings::default();
        settings.start = "^".to_string();
        settings.end = "$".to_string();
        let p = TripletPatterns::new(Arc::new(settings));
        let re = p.triplet().unwrap();
        let caps = re.captures("^A.B=1$").unwrap();
        assert_eq!(&caps[3], "1");
    }
}
