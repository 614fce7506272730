//! Constructs with no mechanical Snowflake equivalent.
//!
//! The matched text stays where it is and gains an inline advisory comment.

use super::RuleTable;
use crate::error::ConvertResult;

pub fn table() -> ConvertResult<RuleTable> {
    RuleTable::builder()
        .template(
            "pivot",
            r"\bPIVOT\b",
            "${0} /* PIVOT - Manual conversion required */",
        )
        .template(
            "unpivot",
            r"\bUNPIVOT\b",
            "${0} /* UNPIVOT - Manual conversion required */",
        )
        .template(
            "cross-apply",
            r"\bCROSS\s+APPLY\b",
            "${0} /* CROSS APPLY - Manual conversion required */",
        )
        .template(
            "outer-apply",
            r"\bOUTER\s+APPLY\b",
            "${0} /* OUTER APPLY - Manual conversion required */",
        )
        .template(
            "for-xml",
            r"\bFOR\s+XML\b",
            "${0} /* FOR XML - Manual conversion required, Snowflake has different XML handling */",
        )
        .template(
            "soundex",
            r"\bSOUNDEX\b(?:\s*\([^()]*\))?",
            "${0} /* SOUNDEX - No direct equivalent in Snowflake */",
        )
        .template(
            "difference",
            r"\bDIFFERENCE\b(?:\s*\([^()]*\))?",
            "${0} /* DIFFERENCE - No direct equivalent in Snowflake */",
        )
        .template(
            "hierarchyid",
            r"\bHIERARCHYID\b",
            "${0} /* hierarchyid - Manual conversion required, no direct equivalent in Snowflake */",
        )
        .template(
            "filestream",
            r"\bFILESTREAM\b",
            "${0} /* FILESTREAM - Manual conversion required, map to Snowflake stage objects */",
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(sql: &str) -> String {
        table().unwrap().apply(sql).into_owned()
    }

    #[test]
    fn test_pivot_annotated() {
        assert_eq!(
            convert("FROM s PIVOT (SUM(x) FOR y IN (a, b)) p"),
            "FROM s PIVOT /* PIVOT - Manual conversion required */ (SUM(x) FOR y IN (a, b)) p"
        );
    }

    #[test]
    fn test_unpivot_not_double_annotated() {
        assert_eq!(
            convert("UNPIVOT"),
            "UNPIVOT /* UNPIVOT - Manual conversion required */"
        );
    }

    #[test]
    fn test_apply_annotated() {
        let out = convert("FROM a cross  apply fn(a.id) b");
        assert!(out.starts_with("FROM a cross  apply /* CROSS APPLY - Manual conversion required */"));
        let out = convert("OUTER APPLY x");
        assert!(out.contains("OUTER APPLY /* OUTER APPLY"));
    }

    #[test]
    fn test_function_calls_keep_arguments() {
        assert_eq!(
            convert("SELECT SOUNDEX(name)"),
            "SELECT SOUNDEX(name) /* SOUNDEX - No direct equivalent in Snowflake */"
        );
        assert_eq!(
            convert("DIFFERENCE(a, b)"),
            "DIFFERENCE(a, b) /* DIFFERENCE - No direct equivalent in Snowflake */"
        );
    }

    #[test]
    fn test_storage_types_annotated() {
        assert!(convert("node hierarchyid").contains("hierarchyid /* hierarchyid - Manual"));
        assert!(convert("doc VARBINARY FILESTREAM").contains("FILESTREAM /* FILESTREAM - Manual"));
        assert!(convert("FOR XML PATH('')").starts_with("FOR XML /* FOR XML - Manual"));
    }
}
