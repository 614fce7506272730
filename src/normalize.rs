//! Normalization passes that run after the structural rewrites.
//!
//! Some of these re-apply a pattern-table rule as a safety net for text the
//! structural steps produced or reshaped. Each pass is idempotent, so a
//! second application is a no-op.

use std::borrow::Cow;

use regex::Captures;

use crate::error::ConvertResult;
use crate::pipeline::RewriteStep;
use crate::rules::{Rule, functions, syntax};

/// Normalization steps in execution order. Sigil replacement is last:
/// every earlier step recognizes T-SQL variables by their `@`.
pub fn steps() -> ConvertResult<Vec<Box<dyn RewriteStep>>> {
    Ok(vec![
        Box::new(temp_table_refs()?),
        Box::new(schema_qualifiers()?),
        Box::new(default_schema()?),
        Box::new(window_functions()?),
        Box::new(functions::isnull()?),
        Box::new(substring()?),
        Box::new(syntax::create_or_replace()?),
        Box::new(syntax::go_separator()?),
        Box::new(syntax::use_database()?),
        Box::new(prompt()?),
        Box::new(SigilReplacement),
    ])
}

/// `#work` / `##work` temp-table references to `work`.
pub fn temp_table_refs() -> ConvertResult<Rule> {
    Rule::template("temp-table-ref", r"##?([A-Za-z_]\w*)", "${1}")
}

/// `db.schema.object` (and `db..object`) to `object`. Lossy: the database
/// and schema are dropped unconditionally.
pub fn schema_qualifiers() -> ConvertResult<Rule> {
    Rule::template("schema-qualifier", r"\b\w+\.(?:\w*\.)+(\w+)\b", "${1}")
}

/// The SQL Server default schema prefix `dbo.`.
pub fn default_schema() -> ConvertResult<Rule> {
    Rule::template("default-schema", r"\bdbo\.", "")
}

/// Canonical `AGG(args) OVER (window)` spacing and case.
pub fn window_functions() -> ConvertResult<Rule> {
    Rule::computed(
        "window-function",
        r"\b(MAX|MIN|SUM|AVG|COUNT)\s*\((.*?)\)\s*OVER\s*\((.*?)\)",
        window_function,
    )
}

fn window_function(caps: &Captures<'_>) -> String {
    format!(
        "{}({}) OVER ({})",
        caps[1].to_uppercase(),
        caps[2].trim(),
        caps[3].trim()
    )
}

/// Canonical `SUBSTRING(expr, start, length)` spacing.
pub fn substring() -> ConvertResult<Rule> {
    Rule::template(
        "substring",
        r"\bSUBSTRING\s*\((.*?),\s*(\d+)\s*,\s*(\d+)\s*\)",
        "SUBSTRING(${1}, ${2}, ${3})",
    )
}

/// Report prompts `@prompt('label', 'type', ...)` to a literal placeholder.
pub fn prompt() -> ConvertResult<Rule> {
    Rule::template(
        "prompt",
        r"@prompt\s*\(\s*'[^']*'\s*,\s*'[^']*'\s*,[^)]*\)",
        "'your_value'",
    )
}

/// Replaces every `@` with Snowflake's `$` variable sigil.
#[derive(Debug, Clone, Copy, Default)]
pub struct SigilReplacement;

impl RewriteStep for SigilReplacement {
    fn name(&self) -> &str {
        "sigil"
    }

    fn rewrite<'a>(&self, sql: &'a str) -> Cow<'a, str> {
        if sql.contains('@') {
            Cow::Owned(sql.replace('@', "$"))
        } else {
            Cow::Borrowed(sql)
        }
    }
}
