//! Rewrite rules and the ordered pattern table.
//!
//! A [`Rule`] pairs a case-insensitive pattern with a replacement that is
//! either a `$`-template or a function of the captures. Rules are compiled
//! and validated once; applying a rule never fails.

pub mod functions;
pub mod syntax;
pub mod types;
pub mod unsupported;

use std::borrow::Cow;
use std::fmt;

use regex::{Captures, Regex, RegexBuilder};

use crate::error::{ConvertError, ConvertResult};

/// Computes the replacement for one match.
pub type ComputeFn = fn(&Captures<'_>) -> String;

/// How a rule rewrites the text it matched.
#[derive(Clone)]
pub enum Replacement {
    /// A `$1` / `${name}` template, validated against the pattern.
    Template(String),
    /// A function of the captured groups.
    Computed(ComputeFn),
}

impl fmt::Debug for Replacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template(t) => f.debug_tuple("Template").field(t).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// A single (pattern, replacement) rewrite rule.
#[derive(Debug, Clone)]
pub struct Rule {
    name: Cow<'static, str>,
    pattern: Regex,
    replacement: Replacement,
}

impl Rule {
    /// Build a rule whose replacement is a template.
    ///
    /// Fails if the pattern does not compile or the template references a
    /// capture group the pattern does not define.
    pub fn template(
        name: impl Into<Cow<'static, str>>,
        pattern: &str,
        template: impl Into<String>,
    ) -> ConvertResult<Self> {
        let name = name.into();
        let pattern = compile(&name, pattern)?;
        let template = template.into();
        validate_template(&name, &pattern, &template)?;
        Ok(Self {
            name,
            pattern,
            replacement: Replacement::Template(template),
        })
    }

    /// Build a rule whose replacement is computed from the captures.
    pub fn computed(
        name: impl Into<Cow<'static, str>>,
        pattern: &str,
        compute: ComputeFn,
    ) -> ConvertResult<Self> {
        let name = name.into();
        let pattern = compile(&name, pattern)?;
        Ok(Self {
            name,
            pattern,
            replacement: Replacement::Computed(compute),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    pub fn replacement(&self) -> &Replacement {
        &self.replacement
    }

    /// Replace every non-overlapping match, left to right.
    pub fn apply<'a>(&self, sql: &'a str) -> Cow<'a, str> {
        match &self.replacement {
            Replacement::Template(template) => self.pattern.replace_all(sql, template.as_str()),
            Replacement::Computed(compute) => self
                .pattern
                .replace_all(sql, |caps: &Captures<'_>| compute(caps)),
        }
    }
}

/// Compile a rule pattern with case-insensitive matching.
pub fn compile(rule: &str, pattern: &str) -> ConvertResult<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| ConvertError::pattern(rule, e))
}

/// Reject templates that reference groups the pattern does not have.
///
/// The regex crate expands unknown groups to the empty string, which would
/// silently drop text on every call.
fn validate_template(rule: &str, pattern: &Regex, template: &str) -> ConvertResult<()> {
    for reference in template_references(template) {
        let known = match reference.parse::<usize>() {
            Ok(index) => index < pattern.captures_len(),
            Err(_) => pattern.capture_names().flatten().any(|n| n == reference),
        };
        if !known {
            return Err(ConvertError::template(rule, reference));
        }
    }
    Ok(())
}

/// Group references in a template, following the regex crate's syntax:
/// `$$` is a literal dollar, `${name}` is braced, `$name` takes the longest
/// run of `[_0-9A-Za-z]`.
fn template_references(template: &str) -> Vec<&str> {
    let mut refs = Vec::new();
    let mut rest = template;
    while let Some(pos) = rest.find('$') {
        rest = &rest[pos + 1..];
        if let Some(after) = rest.strip_prefix('$') {
            rest = after;
            continue;
        }
        if let Some(braced) = rest.strip_prefix('{') {
            if let Some(end) = braced.find('}') {
                refs.push(&braced[..end]);
                rest = &braced[end + 1..];
            }
            continue;
        }
        let end = rest
            .find(|c: char| !(c == '_' || c.is_ascii_alphanumeric()))
            .unwrap_or(rest.len());
        if end > 0 {
            refs.push(&rest[..end]);
            rest = &rest[end..];
        }
    }
    refs
}

/// An immutable, ordered list of rules.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    /// Create a new table builder.
    pub fn builder() -> RuleTableBuilder {
        RuleTableBuilder::default()
    }

    /// The built-in pattern table: types, functions, syntax, then the
    /// advisory annotations.
    pub fn standard() -> ConvertResult<Self> {
        Self::builder()
            .table(syntax::prelude()?)
            .table(types::table()?)
            .table(functions::table()?)
            .table(syntax::table()?)
            .table(unsupported::table()?)
            .build()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn into_rules(self) -> Vec<Rule> {
        self.rules
    }

    /// Apply every rule in table order. Rule `i` rewrites the whole text
    /// before rule `i + 1` is attempted.
    pub fn apply<'a>(&self, sql: &'a str) -> Cow<'a, str> {
        let mut text = Cow::Borrowed(sql);
        for rule in &self.rules {
            let next = match rule.apply(&text) {
                Cow::Borrowed(_) => continue,
                Cow::Owned(next) => next,
            };
            tracing::trace!(rule = rule.name(), "rule matched");
            text = Cow::Owned(next);
        }
        text
    }
}

/// Builder for [`RuleTable`]. The first construction error is kept and
/// returned from [`RuleTableBuilder::build`].
#[derive(Debug, Default)]
pub struct RuleTableBuilder {
    rules: Vec<Rule>,
    error: Option<ConvertError>,
}

impl RuleTableBuilder {
    /// Add a template rule.
    pub fn template(
        mut self,
        name: impl Into<Cow<'static, str>>,
        pattern: &str,
        template: impl Into<String>,
    ) -> Self {
        self.push(Rule::template(name, pattern, template));
        self
    }

    /// Add a computed rule.
    pub fn computed(
        mut self,
        name: impl Into<Cow<'static, str>>,
        pattern: &str,
        compute: ComputeFn,
    ) -> Self {
        self.push(Rule::computed(name, pattern, compute));
        self
    }

    /// Add an already-built rule.
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Append all rules of another table.
    pub fn table(mut self, table: RuleTable) -> Self {
        self.rules.extend(table.rules);
        self
    }

    fn push(&mut self, rule: ConvertResult<Rule>) {
        match rule {
            Ok(rule) => self.rules.push(rule),
            Err(e) => {
                if self.error.is_none() {
                    self.error = Some(e);
                }
            }
        }
    }

    /// Build the table, or return the first rule error.
    pub fn build(self) -> ConvertResult<RuleTable> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(RuleTable { rules: self.rules }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_match() {
        let rule = Rule::template("len", r"\bLEN\(", "LENGTH(").unwrap();
        assert_eq!(rule.apply("select len(a), Len(b)"), "select LENGTH(a), LENGTH(b)");
    }

    #[test]
    fn test_no_match_borrows() {
        let rule = Rule::template("len", r"\bLEN\(", "LENGTH(").unwrap();
        assert!(matches!(rule.apply("SELECT 1"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_template_groups() {
        let rule = Rule::template("swap", r"(\w+)=(\w+)", "${2}=${1}").unwrap();
        assert_eq!(rule.apply("a=b, c=d"), "b=a, d=c");
    }

    #[test]
    fn test_named_group_template() {
        let rule = Rule::template("named", r"USE\s+(?P<db>\w+)", "USE DATABASE $db").unwrap();
        assert_eq!(rule.apply("use sales"), "USE DATABASE sales");
    }

    #[test]
    fn test_unknown_group_rejected() {
        let err = Rule::template("bad", r"(\w+)", "${2}").unwrap_err();
        assert!(matches!(err, ConvertError::InvalidTemplate { ref reference, .. } if reference == "2"));

        let err = Rule::template("bad", r"(\w+)", "$1x").unwrap_err();
        assert!(matches!(err, ConvertError::InvalidTemplate { ref reference, .. } if reference == "1x"));

        let err = Rule::template("bad", r"(?P<a>\w+)", "${b}").unwrap_err();
        assert!(matches!(err, ConvertError::InvalidTemplate { .. }));
    }

    #[test]
    fn test_escaped_dollar_is_literal() {
        let rule = Rule::template("dollar", r"@(\w+)", "$$${1}").unwrap();
        assert_eq!(rule.apply("@x"), "$x");
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = Rule::template("broken", r"(unclosed", "x").unwrap_err();
        assert!(matches!(err, ConvertError::InvalidPattern { ref rule, .. } if rule == "broken"));
    }

    #[test]
    fn test_computed_rule() {
        let rule = Rule::computed("upper", r"\bselect\b", |caps| caps[0].to_uppercase()).unwrap();
        assert_eq!(rule.apply("select 1"), "SELECT 1");
    }

    #[test]
    fn test_builder_keeps_first_error() {
        let err = RuleTable::builder()
            .template("ok", r"a", "b")
            .template("first", r"(", "x")
            .template("second", r"(a)", "$9")
            .build()
            .unwrap_err();
        assert!(matches!(err, ConvertError::InvalidPattern { ref rule, .. } if rule == "first"));
    }

    #[test]
    fn test_table_applies_in_order() {
        let table = RuleTable::builder()
            .template("a-to-b", r"a", "b")
            .template("b-to-c", r"b", "c")
            .build()
            .unwrap();
        assert_eq!(table.apply("a"), "c");
    }

    #[test]
    fn test_standard_table_builds() {
        let table = RuleTable::standard().unwrap();
        assert!(!table.is_empty());
    }
}
