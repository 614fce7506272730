//! Final assembly: terminal semicolon and the advisory footer.

use std::borrow::Cow;

use crate::pipeline::RewriteStep;

/// Advisory comment appended to every converted script.
pub const ADVISORY_FOOTER: &str = "/*
 * IMPORTANT: This is an automated conversion from T-SQL to Snowflake SQL.
 * Please review all changes and comments carefully.
 * Some features may require manual adjustment or redesign for Snowflake compatibility.
 */";

/// Collapses trailing whitespace and semicolons into exactly one `;`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalSemicolon;

impl RewriteStep for TerminalSemicolon {
    fn name(&self) -> &str {
        "terminal-semicolon"
    }

    fn rewrite<'a>(&self, sql: &'a str) -> Cow<'a, str> {
        let body = sql.trim_end_matches(|c: char| c == ';' || c.is_whitespace());
        if sql.len() == body.len() + 1 && sql.ends_with(';') {
            Cow::Borrowed(sql)
        } else {
            Cow::Owned(format!("{body};"))
        }
    }
}

/// Remove a footer left by a previous run so converting already-converted
/// output does not stack footers.
pub fn strip_advisory_footer(sql: &str) -> &str {
    let trimmed = sql.trim_end();
    match trimmed.strip_suffix(ADVISORY_FOOTER) {
        Some(body) => body.trim_end(),
        None => sql,
    }
}

/// Append the footer after a blank line.
pub fn append_advisory_footer(mut sql: String) -> String {
    sql.push_str("\n\n");
    sql.push_str(ADVISORY_FOOTER);
    sql
}
