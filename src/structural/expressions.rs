//! Expression rewrites: DECLARE, CONVERT/CAST, concatenation, @@ROWCOUNT.

use regex::Captures;

use crate::error::ConvertResult;
use crate::rules::Rule;

/// `DECLARE @x type = expr;` to `SET @x = expr::type;`.
///
/// Only single-variable, single-line declarations with an initializer
/// match; anything else stays in T-SQL form.
pub fn declare() -> ConvertResult<Rule> {
    Rule::computed(
        "declare",
        r"\bDECLARE[ \t]+@(\w+)[ \t]+(\w+(?:[ \t]*\([^()\r\n]*\))?)[ \t]*=[ \t]*((?:[^;,()\r\n]|\([^()\r\n]*\))+?)[ \t]*;",
        assignment,
    )
}

fn assignment(caps: &Captures<'_>) -> String {
    let expr = &caps[3];
    if expr.contains(char::is_whitespace) {
        format!("SET @{} = ({expr})::{};", &caps[1], &caps[2])
    } else {
        format!("SET @{} = {expr}::{};", &caps[1], &caps[2])
    }
}

/// `CONVERT(type, expr[, style])` to `CAST(expr AS type)`. The style
/// argument only affects formatting in T-SQL and is dropped.
///
/// A `DATETIME` target is normally mapped by the type table first; it is
/// mapped here too for pipelines built without that table.
pub fn convert() -> ConvertResult<Rule> {
    Rule::computed(
        "convert",
        r"\bCONVERT\s*\(\s*(\w+(?:\s*\([^()]*\))?)\s*,\s*((?:[^,()]|\([^()]*\))+?)\s*(?:,\s*\d+\s*)?\)",
        |caps| format!("CAST({} AS {})", &caps[2], cast_type(&caps[1])),
    )
}

/// `CAST(expr AS DATETIME)` to `CAST(expr AS TIMESTAMP_NTZ)`.
///
/// The standard pipeline maps `DATETIME` in its type table, so this only
/// fires in pipelines assembled without it.
pub fn cast_datetime() -> ConvertResult<Rule> {
    Rule::template(
        "cast-datetime",
        r"\bCAST\s*\(\s*((?:[^,()]|\([^()]*\))+?)\s+AS\s+DATETIME\s*\)",
        "CAST(${1} AS TIMESTAMP_NTZ)",
    )
}

fn cast_type(name: &str) -> &str {
    if name.eq_ignore_ascii_case("DATETIME") {
        "TIMESTAMP_NTZ"
    } else {
        name
    }
}

/// `+` after an identifier, literal or closing parenthesis becomes `||`.
///
/// Without type information this cannot tell string concatenation from
/// numeric addition: `price + 1` is rewritten too. Compound `+=` is kept.
pub fn concat() -> ConvertResult<Rule> {
    Rule::computed("concat", r"([\w)'])\s*\+(=?)\s*", |caps| {
        if caps[2].is_empty() {
            format!("{} || ", &caps[1])
        } else {
            caps[0].to_string()
        }
    })
}

/// `@@ROWCOUNT` to `SQLROWCOUNT`.
pub fn rowcount() -> ConvertResult<Rule> {
    Rule::template("rowcount", r"@@ROWCOUNT\b", "SQLROWCOUNT")
}
