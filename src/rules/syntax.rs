//! Statement syntax mappings.

use regex::Captures;

use super::{Rule, RuleTable};
use crate::error::ConvertResult;

/// Rules that run before every other table rule.
///
/// Bracket quoting is stripped first so later captures see bare
/// identifiers and `[nvarchar](max)` style type names.
pub fn prelude() -> ConvertResult<RuleTable> {
    RuleTable::builder()
        .template("brackets", r"[\[\]]", "")
        .build()
}

pub fn table() -> ConvertResult<RuleTable> {
    RuleTable::builder()
        .template("nolock", r"\bWITH\s*\(\s*NOLOCK\s*\)", "")
        .rule(go_separator()?)
        .template("create-or-alter", r"\bCREATE\s+OR\s+ALTER\b", "CREATE OR REPLACE")
        .rule(create_or_replace()?)
        .template(
            "temp-table-create",
            r"\bCREATE\s+TABLE\s+##?(\w+)",
            "CREATE OR REPLACE TEMPORARY TABLE ${1}",
        )
        .rule(use_database()?)
        .template("begin-tran", r"\bBEGIN\s+TRAN(?:SACTION)?\b", "BEGIN TRANSACTION")
        .template("end-tran", r"\b(COMMIT|ROLLBACK)\s+TRAN(?:SACTION)?\b", "${1}")
        .computed("exec-call", r"\bEXEC(?:UTE)?\s+(\w+)", exec_call)
        .template(
            "session-settings",
            r"\bSET\s+(?:NOCOUNT|ANSI_NULLS|QUOTED_IDENTIFIER|ANSI_PADDING|ANSI_WARNINGS|XACT_ABORT|ARITHABORT)\s+(?:ON|OFF)\b[ \t]*;?",
            "",
        )
        .template("not-for-replication", r"\bNOT\s+FOR\s+REPLICATION\b", "")
        .template("clustered", r"\b(?:NON)?CLUSTERED\b", "")
        .template("index-options", r"\bWITH\s*\(\s*PAD_INDEX\b[^)]*\)", "")
        .template("filegroup", r"\b(?:TEXTIMAGE_)?ON\s+PRIMARY\b", "")
        .template(
            "identity",
            r"\bIDENTITY\s*\(\s*(\d+)\s*,\s*(\d+)\s*\)",
            "IDENTITY(${1}, ${2})",
        )
        .build()
}

/// Drop `GO` batch separators: a `GO` (optionally with a repeat count)
/// alone on its line, or trailing a statement terminator.
pub fn go_separator() -> ConvertResult<Rule> {
    Rule::template(
        "go",
        r"(?m)(^|;)[ \t]*GO\b[ \t]*\d*[ \t]*\r?$",
        "${1}",
    )
}

/// `CREATE`/`ALTER` of a procedure, function or view becomes
/// `CREATE OR REPLACE`. Shared with the normalization pass.
pub fn create_or_replace() -> ConvertResult<Rule> {
    Rule::computed(
        "create-or-replace",
        r"\b(?:CREATE|ALTER)\s+(PROC(?:EDURE)?|FUNCTION|VIEW)\b",
        |caps| match caps[1].to_uppercase().as_str() {
            "PROC" => "CREATE OR REPLACE PROCEDURE".to_string(),
            object => format!("CREATE OR REPLACE {object}"),
        },
    )
}

/// `USE db` becomes `USE DATABASE db`. Already-qualified forms are kept,
/// so the rule can run more than once.
pub fn use_database() -> ConvertResult<Rule> {
    Rule::computed("use-database", r"\bUSE\s+(\w+)", use_database_target)
}

fn use_database_target(caps: &Captures<'_>) -> String {
    const QUALIFIED: [&str; 5] = ["DATABASE", "SCHEMA", "ROLE", "WAREHOUSE", "SECONDARY"];
    if QUALIFIED.iter().any(|q| caps[1].eq_ignore_ascii_case(q)) {
        caps[0].to_string()
    } else {
        format!("USE DATABASE {}", &caps[1])
    }
}

/// `EXEC proc` becomes `CALL proc`. Dynamic SQL forms are left for the
/// structural rewrite.
fn exec_call(caps: &Captures<'_>) -> String {
    const KEEP: [&str; 3] = ["IMMEDIATE", "AS", "SP_EXECUTESQL"];
    if KEEP.iter().any(|k| caps[1].eq_ignore_ascii_case(k)) {
        caps[0].to_string()
    } else {
        format!("CALL {}", &caps[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(sql: &str) -> String {
        let table = RuleTable::builder()
            .table(prelude().unwrap())
            .table(table().unwrap())
            .build()
            .unwrap();
        table.apply(sql).into_owned()
    }

    #[test]
    fn test_brackets_removed() {
        assert_eq!(convert("SELECT [id] FROM [dbo].[Orders]"), "SELECT id FROM dbo.Orders");
    }

    #[test]
    fn test_nolock_removed() {
        assert_eq!(convert("FROM t WITH (NOLOCK) WHERE"), "FROM t  WHERE");
    }

    #[test]
    fn test_create_alter() {
        assert_eq!(convert("CREATE PROCEDURE p"), "CREATE OR REPLACE PROCEDURE p");
        assert_eq!(convert("create proc p"), "CREATE OR REPLACE PROCEDURE p");
        assert_eq!(convert("ALTER VIEW v"), "CREATE OR REPLACE VIEW v");
        assert_eq!(convert("ALTER  FUNCTION f"), "CREATE OR REPLACE FUNCTION f");
        assert_eq!(convert("CREATE OR ALTER PROCEDURE p"), "CREATE OR REPLACE PROCEDURE p");
        assert_eq!(convert("ALTER TABLE t ADD c INT"), "ALTER TABLE t ADD c INT");
    }

    #[test]
    fn test_create_or_replace_idempotent() {
        let rule = create_or_replace().unwrap();
        let once = rule.apply("CREATE VIEW v AS SELECT 1").into_owned();
        assert_eq!(rule.apply(&once), once);
    }

    #[test]
    fn test_use_database() {
        assert_eq!(convert("USE Sales"), "USE DATABASE Sales");
        let rule = use_database().unwrap();
        assert_eq!(rule.apply("USE DATABASE Sales"), "USE DATABASE Sales");
    }

    #[test]
    fn test_go_separator() {
        assert_eq!(convert("SELECT 1\nGO\nSELECT 2"), "SELECT 1\n\nSELECT 2");
        assert_eq!(convert("SELECT 1;\r\ngo 5\r\n"), "SELECT 1;\r\n\n");
        assert_eq!(convert("SELECT 1; GO"), "SELECT 1;");
        assert_eq!(convert("SELECT go_live FROM t"), "SELECT go_live FROM t");
    }

    #[test]
    fn test_transactions() {
        assert_eq!(convert("BEGIN TRAN"), "BEGIN TRANSACTION");
        assert_eq!(convert("BEGIN TRANSACTION"), "BEGIN TRANSACTION");
        assert_eq!(convert("COMMIT TRAN"), "COMMIT");
        assert_eq!(convert("ROLLBACK TRANSACTION"), "ROLLBACK");
    }

    #[test]
    fn test_exec_call() {
        assert_eq!(convert("EXEC usp_load 1"), "CALL usp_load 1");
        assert_eq!(convert("EXECUTE IMMEDIATE x"), "EXECUTE IMMEDIATE x");
        assert_eq!(convert("EXEC (@sql)"), "EXEC (@sql)");
    }

    #[test]
    fn test_temp_table_create() {
        assert_eq!(
            convert("CREATE TABLE #staging (id INT)"),
            "CREATE OR REPLACE TEMPORARY TABLE staging (id INT)"
        );
    }

    #[test]
    fn test_ddl_noise_removed() {
        assert_eq!(convert("SET NOCOUNT ON;\nSELECT 1"), "\nSELECT 1");
        assert_eq!(
            convert("CONSTRAINT pk PRIMARY KEY CLUSTERED (id)"),
            "CONSTRAINT pk PRIMARY KEY  (id)"
        );
        assert_eq!(convert("id INT NOT FOR REPLICATION"), "id INT ");
        assert_eq!(
            convert(") WITH (PAD_INDEX = OFF, STATISTICS_NORECOMPUTE = OFF) ON [PRIMARY]"),
            ")  "
        );
    }

    #[test]
    fn test_identity_spacing() {
        assert_eq!(convert("id INT IDENTITY(1,1)"), "id INT IDENTITY(1, 1)");
    }
}
