//! Data-type mappings.
//!
//! Every keyword is word-bounded so a type name embedded in a longer
//! identifier (`bit_flags`, `MoneyPaid`) is left alone. `(MAX)` forms come
//! before their bare keyword.

use super::RuleTable;
use crate::error::ConvertResult;

pub fn table() -> ConvertResult<RuleTable> {
    RuleTable::builder()
        .template("nvarchar-max", r"\bNVARCHAR\s*\(\s*MAX\s*\)", "VARCHAR")
        .template("nvarchar", r"\bNVARCHAR\b", "VARCHAR")
        .template("varchar-max", r"\bVARCHAR\s*\(\s*MAX\s*\)", "VARCHAR")
        .template("varbinary-max", r"\bVARBINARY\s*\(\s*MAX\s*\)", "BINARY")
        .template("nchar", r"\bNCHAR\b", "CHAR")
        .template("datetime2", r"\bDATETIME2\b", "TIMESTAMP_NTZ")
        .template("datetime", r"\bDATETIME\b", "TIMESTAMP_NTZ")
        .template("smalldatetime", r"\bSMALLDATETIME\b", "TIMESTAMP_NTZ")
        .template("datetimeoffset", r"\bDATETIMEOFFSET\b", "TIMESTAMP_TZ")
        .template("tinyint", r"\bTINYINT\b", "SMALLINT")
        .template("money", r"\bMONEY\b", "NUMBER(19,4)")
        .template("smallmoney", r"\bSMALLMONEY\b", "NUMBER(10,4)")
        .template("uniqueidentifier", r"\bUNIQUEIDENTIFIER\b", "VARCHAR")
        .template("bit", r"\bBIT\b", "BOOLEAN")
        .template("decimal", r"\bDECIMAL\b", "NUMBER")
        .template("numeric", r"\bNUMERIC\b", "NUMBER")
        .template("real", r"\bREAL\b", "FLOAT")
        .template("ntext", r"\bNTEXT\b", "VARCHAR")
        .template("text", r"\bTEXT\b", "VARCHAR")
        .template("image", r"\bIMAGE\b", "BINARY")
        .template("sql-variant", r"\bSQL_VARIANT\b", "VARIANT")
        .template("rowversion", r"\bROWVERSION\b", "BINARY(8)")
        .build()
}
