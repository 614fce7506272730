//! Structural rewrites.
//!
//! Constructs a flat substitution cannot handle: they capture several parts
//! of a statement and reassemble them, or wrap a statement that cannot be
//! translated mechanically in an advisory comment.
//!
//! Every MERGE, TRY/CATCH and SELECT INTO match is lazy and assumes one
//! well-formed, non-nested block per match.

mod blocks;
mod clauses;
mod expressions;

pub use blocks::MergeAnnotation;
pub use clauses::{OverAnnotation, SelectInto, TopToLimit};

use crate::error::ConvertResult;
use crate::pipeline::RewriteStep;

/// Structural steps in execution order.
pub fn steps() -> ConvertResult<Vec<Box<dyn RewriteStep>>> {
    Ok(vec![
        Box::new(expressions::declare()?),
        Box::new(MergeAnnotation::new()?),
        Box::new(blocks::dynamic_sql()?),
        Box::new(blocks::try_catch()?),
        Box::new(OverAnnotation::new()?),
        Box::new(TopToLimit::new()?),
        Box::new(expressions::convert()?),
        Box::new(expressions::cast_datetime()?),
        Box::new(SelectInto::new()?),
        Box::new(expressions::concat()?),
        Box::new(expressions::rowcount()?),
    ])
}
