//! Converter configuration.
//!
//! Loaded from `tsql2snowflake.toml`:
//!
//! ```toml
//! [output]
//! prefix = "converted_"
//! directory = "out"
//!
//! [log]
//! level = "warn"
//!
//! [[rules]]
//! name = "legacy-schema"
//! pattern = '\blegacy_(\w+)'
//! replacement = 'modern_${1}'
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, ConvertResult};
use crate::rules::RuleTable;

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = "tsql2snowflake.toml";

/// Main converter configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub log: LogConfig,
    /// User rules, appended after the built-in pattern table
    pub rules: Vec<RuleConfig>,
}

/// Where converted files are written
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Prepended to the input file name
    pub prefix: String,
    /// Output directory; the input file's directory when unset
    pub directory: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            prefix: "converted_".to_string(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter when `RUST_LOG` is not set
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// A user-defined template rule
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RuleConfig {
    pub name: String,
    pub pattern: String,
    pub replacement: String,
}

impl Config {
    /// Create a new configuration builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> ConvertResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from `path`, or from the first file found in the
    /// working directory and then the user config directory. Defaults when
    /// no file exists.
    ///
    /// An explicit path that does not exist is an error.
    pub fn load(path: Option<&Path>) -> ConvertResult<Self> {
        if let Some(path) = path {
            if !path.is_file() {
                return Err(ConvertError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            return Self::read(path);
        }
        match Self::search_paths().into_iter().find(|p| p.is_file()) {
            Some(found) => Self::read(&found),
            None => {
                tracing::debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Candidate config files, in lookup order.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("tsql2snowflake").join("config.toml"));
        }
        paths
    }

    fn read(path: &Path) -> ConvertResult<Self> {
        tracing::debug!(path = %path.display(), "loading config");
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Compile the user rules. Fails on the first bad pattern or template.
    pub fn rule_table(&self) -> ConvertResult<RuleTable> {
        self.rules
            .iter()
            .try_fold(RuleTable::builder(), |builder, rule| {
                if rule.name.trim().is_empty() {
                    return Err(ConvertError::Config(format!(
                        "rule with pattern '{}' has no name",
                        rule.pattern
                    )));
                }
                Ok(builder.template(rule.name.clone(), &rule.pattern, rule.replacement.as_str()))
            })?
            .build()
    }
}

/// Builder for Config
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the output file name prefix
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.output.prefix = prefix.into();
        self
    }

    /// Set the output directory
    pub fn directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output.directory = Some(dir.into());
        self
    }

    /// Set the default log level
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.log.level = level.into();
        self
    }

    /// Add a user rule
    pub fn rule(
        mut self,
        name: impl Into<String>,
        pattern: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        self.config.rules.push(RuleConfig {
            name: name.into(),
            pattern: pattern.into(),
            replacement: replacement.into(),
        });
        self
    }

    /// Build the configuration
    pub fn build(self) -> Config {
        self.config
    }
}
