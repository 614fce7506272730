//! Clause-level rewrites: OVER, TOP and SELECT INTO.

use std::borrow::Cow;

use regex::Regex;

use crate::error::ConvertResult;
use crate::pipeline::RewriteStep;
use crate::rules::compile;

const OVER_NOTE: &str = " /* Verify OVER clause conversion */";

/// Appends a verification comment after every `OVER (...)` window
/// definition. The window contents are not touched.
#[derive(Debug, Clone)]
pub struct OverAnnotation {
    opener: Regex,
}

impl OverAnnotation {
    pub fn new() -> ConvertResult<Self> {
        Ok(Self {
            opener: compile("over", r"\bOVER\s*\(")?,
        })
    }
}

impl RewriteStep for OverAnnotation {
    fn name(&self) -> &str {
        "over"
    }

    fn rewrite<'a>(&self, sql: &'a str) -> Cow<'a, str> {
        let mut out = String::new();
        let mut copied = 0;
        for m in self.opener.find_iter(sql) {
            if m.start() < copied {
                continue;
            }
            // Unbalanced windows are left as written.
            let Some(close) = closing_paren(sql, m.end() - 1) else {
                continue;
            };
            out.push_str(&sql[copied..=close]);
            out.push_str(OVER_NOTE);
            copied = close + 1;
        }
        if copied == 0 {
            return Cow::Borrowed(sql);
        }
        out.push_str(&sql[copied..]);
        Cow::Owned(out)
    }
}

/// Byte index of the `)` closing the `(` at `open`.
fn closing_paren(sql: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in sql.bytes().enumerate().skip(open) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Moves the first `TOP n` of the script to a trailing `LIMIT n`.
///
/// Only the first occurrence is relocated; later ones stay as written.
/// `TOP n PERCENT` has no LIMIT form, so a first match with PERCENT leaves
/// the script unchanged.
#[derive(Debug, Clone)]
pub struct TopToLimit {
    top: Regex,
}

impl TopToLimit {
    pub fn new() -> ConvertResult<Self> {
        Ok(Self {
            top: compile(
                "top",
                r"\bTOP(?:\s*\(\s*(\d+)\s*\)|\s+(\d+)\b)(\s+PERCENT\b)?\s*",
            )?,
        })
    }
}

impl RewriteStep for TopToLimit {
    fn name(&self) -> &str {
        "top"
    }

    fn rewrite<'a>(&self, sql: &'a str) -> Cow<'a, str> {
        let Some(caps) = self.top.captures(sql) else {
            return Cow::Borrowed(sql);
        };
        if caps.get(3).is_some() {
            return Cow::Borrowed(sql);
        }
        let (Some(whole), Some(limit)) = (caps.get(0), caps.get(1).or_else(|| caps.get(2)))
        else {
            return Cow::Borrowed(sql);
        };

        let mut out = String::with_capacity(sql.len() + 16);
        out.push_str(&sql[..whole.start()]);
        out.push_str(&sql[whole.end()..]);
        let body = out
            .trim_end_matches(|c: char| c == ';' || c.is_whitespace())
            .len();
        out.truncate(body);
        out.push_str(" LIMIT ");
        out.push_str(limit.as_str());
        Cow::Owned(out)
    }
}

/// `SELECT cols INTO target FROM` to
/// `CREATE OR REPLACE TABLE target AS SELECT cols FROM`. A `#temp` target
/// becomes a temporary table.
///
/// Each `INTO target FROM` is paired with the nearest `SELECT` before it.
/// A projection that contains `;` or `FROM` spans more than one statement
/// (or a subquery) and is left as written.
#[derive(Debug, Clone)]
pub struct SelectInto {
    select: Regex,
    into: Regex,
    from: Regex,
}

impl SelectInto {
    pub fn new() -> ConvertResult<Self> {
        Ok(Self {
            select: compile("select-into", r"\bSELECT\b")?,
            into: compile("select-into", r"\bINTO\s+(##?)?(\w+)\s+FROM\b")?,
            from: compile("select-into", r"\bFROM\b")?,
        })
    }
}

impl RewriteStep for SelectInto {
    fn name(&self) -> &str {
        "select-into"
    }

    fn rewrite<'a>(&self, sql: &'a str) -> Cow<'a, str> {
        let mut out = String::new();
        let mut copied = 0;
        for caps in self.into.captures_iter(sql) {
            let (Some(into), Some(target)) = (caps.get(0), caps.get(2)) else {
                continue;
            };
            let Some(select) = self.select.find_iter(&sql[copied..into.start()]).last() else {
                continue;
            };
            let select_start = copied + select.start();
            let projection = sql[copied + select.end()..into.start()].trim();
            if projection.is_empty() || projection.contains(';') || self.from.is_match(projection)
            {
                continue;
            }

            let kind = if caps.get(1).is_some() {
                "TEMPORARY TABLE"
            } else {
                "TABLE"
            };
            out.push_str(&sql[copied..select_start]);
            out.push_str(&format!(
                "CREATE OR REPLACE {kind} {} AS SELECT {projection} FROM",
                target.as_str()
            ));
            copied = into.end();
        }
        if copied == 0 {
            return Cow::Borrowed(sql);
        }
        out.push_str(&sql[copied..]);
        Cow::Owned(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn over(sql: &str) -> String {
        OverAnnotation::new().unwrap().rewrite(sql).into_owned()
    }

    fn top(sql: &str) -> String {
        TopToLimit::new().unwrap().rewrite(sql).into_owned()
    }

    #[test]
    fn test_over_annotated() {
        assert_eq!(
            over("ROW_NUMBER() OVER (ORDER BY id) AS rn"),
            "ROW_NUMBER() OVER (ORDER BY id) /* Verify OVER clause conversion */ AS rn"
        );
    }

    #[test]
    fn test_over_nested_parens() {
        assert_eq!(
            over("SUM(x) OVER (PARTITION BY COALESCE(a, b) ORDER BY d), 1"),
            "SUM(x) OVER (PARTITION BY COALESCE(a, b) ORDER BY d) /* Verify OVER clause conversion */, 1"
        );
    }

    #[test]
    fn test_over_every_occurrence() {
        let out = over("RANK() OVER(ORDER BY a), DENSE_RANK() over (ORDER BY b)");
        assert_eq!(out.matches(OVER_NOTE).count(), 2);
    }

    #[test]
    fn test_over_unbalanced_untouched() {
        let sql = "SUM(x) OVER (PARTITION BY a";
        assert_eq!(over(sql), sql);
    }

    #[test]
    fn test_top_relocated() {
        assert_eq!(top("SELECT TOP 5 * FROM Orders;"), "SELECT * FROM Orders LIMIT 5");
        assert_eq!(top("select top (10) name from t"), "select name from t LIMIT 10");
    }

    #[test]
    fn test_only_first_top_relocated() {
        assert_eq!(
            top("SELECT TOP 1 a FROM t;\nSELECT TOP 2 b FROM u;"),
            "SELECT a FROM t;\nSELECT TOP 2 b FROM u LIMIT 1"
        );
    }

    #[test]
    fn test_top_percent_untouched() {
        let sql = "SELECT TOP 10 PERCENT * FROM t;";
        assert_eq!(top(sql), sql);
    }

    #[test]
    fn test_top_inside_identifier_untouched() {
        let sql = "SELECT top5, stop 3 FROM t";
        assert_eq!(top(sql), sql);
    }

    fn select_into(sql: &str) -> String {
        SelectInto::new().unwrap().rewrite(sql).into_owned()
    }

    #[test]
    fn test_select_into() {
        assert_eq!(
            select_into("SELECT id, name INTO archive FROM customers WHERE x = 1"),
            "CREATE OR REPLACE TABLE archive AS SELECT id, name FROM customers WHERE x = 1"
        );
        assert_eq!(
            select_into("SELECT * INTO #work FROM t"),
            "CREATE OR REPLACE TEMPORARY TABLE work AS SELECT * FROM t"
        );
    }

    #[test]
    fn test_select_into_pairs_nearest_select() {
        assert_eq!(
            select_into("SELECT a FROM t\n\nSELECT b INTO x FROM y"),
            "SELECT a FROM t\n\nCREATE OR REPLACE TABLE x AS SELECT b FROM y"
        );
        assert_eq!(
            select_into("SELECT a FROM t\nSELECT b,\n  c INTO x FROM y"),
            "SELECT a FROM t\nCREATE OR REPLACE TABLE x AS SELECT b,\n  c FROM y"
        );
    }

    #[test]
    fn test_select_into_every_statement() {
        assert_eq!(
            select_into("SELECT a INTO x FROM t;\nSELECT b INTO #y FROM u;"),
            "CREATE OR REPLACE TABLE x AS SELECT a FROM t;\n\
             CREATE OR REPLACE TEMPORARY TABLE y AS SELECT b FROM u;"
        );
    }

    #[test]
    fn test_select_into_subquery_projection_untouched() {
        let sql = "SELECT (SELECT MAX(a) FROM z) m INTO x FROM y";
        assert_eq!(select_into(sql), sql);
    }

    #[test]
    fn test_insert_select_untouched() {
        let sql = "INSERT INTO t SELECT a FROM b;";
        assert_eq!(select_into(sql), sql);
    }
}
