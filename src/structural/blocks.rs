//! Statement blocks: MERGE, dynamic SQL and TRY/CATCH.

use std::borrow::Cow;

use regex::{Captures, Regex};

use crate::error::ConvertResult;
use crate::pipeline::RewriteStep;
use crate::rules::{Rule, compile};

const MERGE_NOTE: &str = "/* MERGE statement - Verify and adjust the following conversion */";

/// Prefixes every MERGE statement with an advisory comment and marks
/// `WHEN NOT MATCHED BY SOURCE` with a condition placeholder.
#[derive(Debug, Clone)]
pub struct MergeAnnotation {
    statement: Regex,
    by_source: Regex,
}

impl MergeAnnotation {
    pub fn new() -> ConvertResult<Self> {
        Ok(Self {
            // Up to the statement separator, or the end of the script.
            statement: compile("merge", r"(?s)\bMERGE\b.*?(?:;|\z)")?,
            by_source: compile("merge", r"\bWHEN\s+NOT\s+MATCHED\s+BY\s+SOURCE\b")?,
        })
    }
}

impl RewriteStep for MergeAnnotation {
    fn name(&self) -> &str {
        "merge"
    }

    fn rewrite<'a>(&self, sql: &'a str) -> Cow<'a, str> {
        self.statement.replace_all(sql, |caps: &Captures<'_>| {
            let statement = self
                .by_source
                .replace_all(&caps[0], "${0} AND <condition>");
            format!("{MERGE_NOTE}\n{statement}")
        })
    }
}

/// `EXEC(@sql)` to `EXECUTE IMMEDIATE @sql`.
pub fn dynamic_sql() -> ConvertResult<Rule> {
    Rule::template(
        "dynamic-sql",
        r"\bEXEC(?:UTE)?\s*\(\s*@(\w+)\s*\)",
        "EXECUTE IMMEDIATE @${1} /* Verify dynamic SQL conversion */",
    )
}

/// `BEGIN TRY ... END TRY BEGIN CATCH ... END CATCH` to a
/// `BEGIN ... EXCEPTION WHEN OTHER THEN ... END;` block.
pub fn try_catch() -> ConvertResult<Rule> {
    Rule::computed(
        "try-catch",
        r"(?s)\bBEGIN\s+TRY\b(.*?)\bEND\s+TRY\b\s*;?\s*BEGIN\s+CATCH\b(.*?)\bEND\s+CATCH\b[ \t]*;?",
        exception_block,
    )
}

fn exception_block(caps: &Captures<'_>) -> String {
    format!(
        "/* TRY/CATCH conversion - Verify the following */
BEGIN
    {}
EXCEPTION
    WHEN OTHER THEN
        {}
END;",
        caps[1].trim(),
        caps[2].trim()
    )
}
