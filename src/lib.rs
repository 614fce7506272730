//! # tsql2snowflake
//!
//! Rule-based conversion of T-SQL (SQL Server) scripts to Snowflake SQL.
//!
//! The converter works on text, not on a syntax tree: an ordered pipeline of
//! case-insensitive pattern rewrites maps data types, functions and
//! statement syntax, restructures a handful of multi-part constructs, and
//! annotates what it cannot translate with `/* ... */` comments.
//!
//! ## Quick Example
//!
//! ```rust
//! let sql = tsql2snowflake::convert("SELECT TOP 5 * FROM [dbo].[Orders];");
//! assert!(sql.starts_with("SELECT * FROM Orders LIMIT 5;"));
//! ```
//!
//! ## Pipeline
//!
//! | Stage          | What runs                                           |
//! |----------------|-----------------------------------------------------|
//! | substitution   | brackets, types, functions, syntax, annotations     |
//! | structural     | DECLARE, MERGE, TRY/CATCH, OVER, TOP, CONVERT, ...  |
//! | normalization  | schema stripping, safety-net passes, `@` to `$`     |
//! | finalization   | one terminal `;`, then the advisory footer          |

pub mod config;
pub mod error;
pub mod files;
pub mod finalize;
pub mod normalize;
pub mod pipeline;
pub mod rules;
pub mod structural;

use std::sync::LazyLock;

pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::*;
    pub use crate::pipeline::{Conversion, Pipeline, RewriteStep, Stage};
    pub use crate::rules::{Replacement, Rule, RuleTable};
}

static STANDARD: LazyLock<pipeline::Pipeline> = LazyLock::new(|| {
    pipeline::Pipeline::standard().expect("built-in rewrite rules compile")
});

/// Convert a T-SQL script with the built-in pipeline.
///
/// Never fails. The result always ends with a `;` followed by the advisory
/// footer.
///
/// ```
/// let sql = tsql2snowflake::convert("DECLARE @x INT = 5;");
/// assert!(sql.starts_with("SET $x = 5::INT;"));
/// ```
pub fn convert(input: &str) -> String {
    STANDARD.convert(input)
}
