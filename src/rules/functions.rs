//! Built-in function mappings.

use chrono::{Month, NaiveDate};
use regex::Captures;

use super::{Rule, RuleTable};
use crate::error::ConvertResult;

pub fn table() -> ConvertResult<RuleTable> {
    RuleTable::builder()
        .rule(isnull()?)
        .template("iif", r"\bIIF\s*\(", "IFF(")
        .template("getdate", r"\bGETDATE\s*\(\s*\)", "CURRENT_TIMESTAMP()")
        .template("sysdatetime", r"\bSYSDATETIME\s*\(\s*\)", "CURRENT_TIMESTAMP()")
        .template("utc-now", r"\b(?:GETUTCDATE|SYSUTCDATETIME)\s*\(\s*\)", "SYSDATE()")
        .template("newid", r"\bNEWID\s*\(\s*\)", "UUID_STRING()")
        .template(
            "isdate",
            r"\bISDATE\s*\(([^()]*(?:\([^()]*\)[^()]*)*)\)",
            "TRY_TO_DATE(${1}) IS NOT NULL",
        )
        .template("len", r"\bLEN\s*\(", "LENGTH(")
        .template("datalength", r"\bDATALENGTH\s*\(", "OCTET_LENGTH(")
        .template(
            "dateadd",
            r"\bDATEADD\s*\(\s*(\w+)\s*,\s*([^,]+?)\s*,\s*",
            "DATEADD(${1}, ${2}, ",
        )
        .template(
            "datediff",
            r"\bDATEDIFF\s*\(\s*(\w+)\s*,\s*([^,]+?)\s*,\s*",
            "DATEDIFF(${1}, ${2}, ",
        )
        .template("datepart", r"\bDATEPART\s*\(\s*(\w+)\s*,\s*", "DATE_PART(${1}, ")
        .template("system-user", r"\bSYSTEM_USER\b", "CURRENT_USER()")
        .template("suser-name", r"\bSUSER_S?NAME\s*\(\s*\)", "CURRENT_USER()")
        .template("db-name", r"\bDB_NAME\s*\(\s*\)", "CURRENT_DATABASE()")
        // INSERT(base, pos, len, ins) has the same argument order as STUFF.
        .template("stuff", r"\bSTUFF\s*\(", "INSERT(")
        .computed("date-literal", r"'(\d{2})-([A-Z]{3})-(\d{4})'", date_literal)
        .build()
}

/// `ISNULL(` to `COALESCE(`. Shared with the normalization pass.
pub fn isnull() -> ConvertResult<Rule> {
    Rule::template("isnull", r"\bISNULL\s*\(", "COALESCE(")
}

/// `'05-JAN-2024'` to `'2024-01-05'`. Unknown months and impossible dates
/// are left as written.
fn date_literal(caps: &Captures<'_>) -> String {
    let date = caps[2].parse::<Month>().ok().and_then(|month| {
        let day = caps[1].parse().ok()?;
        let year = caps[3].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month.number_from_month(), day)
    });
    match date {
        Some(date) => format!("'{}'", date.format("%Y-%m-%d")),
        None => caps[0].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(sql: &str) -> String {
        table().unwrap().apply(sql).into_owned()
    }

    #[test]
    fn test_null_handling() {
        assert_eq!(convert("ISNULL(a, 0)"), "COALESCE(a, 0)");
        assert_eq!(convert("iif(a > 1, 'x', 'y')"), "IFF(a > 1, 'x', 'y')");
    }

    #[test]
    fn test_current_time() {
        assert_eq!(convert("SELECT GETDATE()"), "SELECT CURRENT_TIMESTAMP()");
        assert_eq!(convert("SELECT SYSDATETIME()"), "SELECT CURRENT_TIMESTAMP()");
        assert_eq!(convert("SELECT GETUTCDATE()"), "SELECT SYSDATE()");
    }

    #[test]
    fn test_isdate() {
        assert_eq!(convert("ISDATE(col)"), "TRY_TO_DATE(col) IS NOT NULL");
        assert_eq!(
            convert("ISDATE(LTRIM(col))"),
            "TRY_TO_DATE(LTRIM(col)) IS NOT NULL"
        );
    }

    #[test]
    fn test_string_functions() {
        assert_eq!(convert("LEN(name)"), "LENGTH(name)");
        assert_eq!(convert("DATALENGTH(name)"), "OCTET_LENGTH(name)");
        assert_eq!(convert("STUFF(s, 2, 3, 'x')"), "INSERT(s, 2, 3, 'x')");
        assert_eq!(convert("NEWID()"), "UUID_STRING()");
    }

    #[test]
    fn test_date_functions() {
        assert_eq!(convert("DATEADD(day,1,d)"), "DATEADD(day, 1, d)");
        assert_eq!(convert("DATEDIFF( month , a , b )"), "DATEDIFF(month, a, b )");
        assert_eq!(convert("DATEPART(year,d)"), "DATE_PART(year, d)");
    }

    #[test]
    fn test_date_functions_idempotent() {
        let once = convert("DATEADD(day,1,GETDATE())");
        assert_eq!(once, "DATEADD(day, 1, CURRENT_TIMESTAMP())");
        assert_eq!(convert(&once), once);
    }

    #[test]
    fn test_session_functions() {
        assert_eq!(convert("SYSTEM_USER"), "CURRENT_USER()");
        assert_eq!(convert("SUSER_SNAME()"), "CURRENT_USER()");
        assert_eq!(convert("db_name()"), "CURRENT_DATABASE()");
    }

    #[test]
    fn test_date_literal() {
        assert_eq!(convert("WHERE d > '05-JAN-2024'"), "WHERE d > '2024-01-05'");
        assert_eq!(convert("'31-dec-1999'"), "'1999-12-31'");
    }

    #[test]
    fn test_invalid_date_literal_untouched() {
        assert_eq!(convert("'05-XYZ-2024'"), "'05-XYZ-2024'");
        assert_eq!(convert("'31-FEB-2024'"), "'31-FEB-2024'");
    }
}
