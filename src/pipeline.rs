//! The rewrite pipeline.
//!
//! A [`Pipeline`] is an immutable, ordered list of [`RewriteStep`]s built
//! once and shared by reference. Each step maps the current script text to
//! the next; order matters because later steps rely on earlier
//! normalization (bracket removal before paren-aware captures, `@` sigils
//! kept until the very end).

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

use crate::config::Config;
use crate::error::ConvertResult;
use crate::finalize;
use crate::normalize;
use crate::rules::{Rule, RuleTable};
use crate::structural;

/// A pure text transformation.
pub trait RewriteStep: Send + Sync {
    /// Stable name used in logs and reports.
    fn name(&self) -> &str;

    /// Rewrite the script. Returns [`Cow::Borrowed`] when nothing matched.
    fn rewrite<'a>(&self, sql: &'a str) -> Cow<'a, str>;
}

impl RewriteStep for Rule {
    fn name(&self) -> &str {
        Rule::name(self)
    }

    fn rewrite<'a>(&self, sql: &'a str) -> Cow<'a, str> {
        self.apply(sql)
    }
}

/// Pipeline phase a step belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Flat pattern-table substitutions.
    Substitution,
    /// Multi-part statement rewrites.
    Structural,
    /// Safety-net and cleanup passes.
    Normalization,
    /// Terminal semicolon enforcement.
    Finalization,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Stage::Substitution => "substitution",
            Stage::Structural => "structural",
            Stage::Normalization => "normalization",
            Stage::Finalization => "finalization",
        })
    }
}

/// A step that changed the text during [`Pipeline::explain`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub step: String,
    pub stage: Stage,
}

/// Result of [`Pipeline::explain`].
#[derive(Debug, Clone, Serialize)]
pub struct Conversion {
    /// The converted script, footer included.
    pub sql: String,
    /// Steps that changed the text, in the order they ran.
    pub applied: Vec<StepReport>,
}

struct Entry {
    stage: Stage,
    step: Box<dyn RewriteStep>,
}

/// The ordered T-SQL to Snowflake rewrite pipeline.
pub struct Pipeline {
    steps: Vec<Entry>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.steps().map(|(name, stage)| format!("{stage}:{name}")))
            .finish()
    }
}

impl Pipeline {
    /// Create an empty pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// The built-in pipeline.
    pub fn standard() -> ConvertResult<Self> {
        Self::with_extra_rules(RuleTable::default())
    }

    /// The built-in pipeline with the user rules from `config` appended to
    /// the pattern table.
    pub fn from_config(config: &Config) -> ConvertResult<Self> {
        Self::with_extra_rules(config.rule_table()?)
    }

    fn with_extra_rules(extra: RuleTable) -> ConvertResult<Self> {
        Ok(Self::builder()
            .table(Stage::Substitution, RuleTable::standard()?)
            .table(Stage::Substitution, extra)
            .steps(Stage::Structural, structural::steps()?)
            .steps(Stage::Normalization, normalize::steps()?)
            .step(Stage::Finalization, finalize::TerminalSemicolon)
            .build())
    }

    /// Step names with their stage, in execution order.
    pub fn steps(&self) -> impl Iterator<Item = (&str, Stage)> {
        self.steps.iter().map(|e| (e.step.name(), e.stage))
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Convert a T-SQL script. Never fails; constructs that cannot be
    /// translated are annotated in place.
    pub fn convert(&self, input: &str) -> String {
        self.run(input, None)
    }

    /// Convert and report which steps changed the text.
    pub fn explain(&self, input: &str) -> Conversion {
        let mut applied = Vec::new();
        let sql = self.run(input, Some(&mut applied));
        Conversion { sql, applied }
    }

    fn run(&self, input: &str, mut report: Option<&mut Vec<StepReport>>) -> String {
        let mut text = finalize::strip_advisory_footer(input).to_string();
        for entry in &self.steps {
            let next = match entry.step.rewrite(&text) {
                Cow::Borrowed(_) => continue,
                Cow::Owned(next) => next,
            };
            if next == text {
                continue;
            }
            tracing::debug!(step = entry.step.name(), stage = %entry.stage, "rewrote script");
            if let Some(report) = report.as_deref_mut() {
                report.push(StepReport {
                    step: entry.step.name().to_string(),
                    stage: entry.stage,
                });
            }
            text = next;
        }
        tracing::debug!(input_bytes = input.len(), output_bytes = text.len(), "conversion finished");
        finalize::append_advisory_footer(text)
    }
}

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    steps: Vec<Entry>,
}

impl PipelineBuilder {
    /// Append one step.
    pub fn step(mut self, stage: Stage, step: impl RewriteStep + 'static) -> Self {
        self.steps.push(Entry {
            stage,
            step: Box::new(step),
        });
        self
    }

    /// Append boxed steps in order.
    pub fn steps(mut self, stage: Stage, steps: Vec<Box<dyn RewriteStep>>) -> Self {
        self.steps
            .extend(steps.into_iter().map(|step| Entry { stage, step }));
        self
    }

    /// Append every rule of a table as its own step, in table order.
    pub fn table(mut self, stage: Stage, table: RuleTable) -> Self {
        self.steps.extend(table.into_rules().into_iter().map(|rule| Entry {
            stage,
            step: Box::new(rule) as Box<dyn RewriteStep>,
        }));
        self
    }

    pub fn build(self) -> Pipeline {
        Pipeline { steps: self.steps }
    }
}
