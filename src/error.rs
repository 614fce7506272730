//! Error types for the converter.
//!
//! Converting text never fails. Errors come from building the rule table
//! (bad patterns or templates, bad config) and from the file boundary.

use thiserror::Error;

/// The main error type for conversion setup and file handling.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// A rule pattern failed to compile.
    #[error("Invalid pattern in rule '{rule}': {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },

    /// A replacement template references a capture group the pattern lacks.
    #[error("Invalid template in rule '{rule}': unknown capture group '{reference}'")]
    InvalidTemplate { rule: String, reference: String },

    /// No input file was provided.
    #[error("No input file provided")]
    MissingInput,

    /// The input path has no usable file name.
    #[error("Empty file name")]
    EmptyFilename,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed TOML configuration.
    #[error("Configuration error: {0}")]
    Toml(#[from] toml::de::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    /// Create an invalid pattern error for the named rule.
    pub fn pattern(rule: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidPattern {
            rule: rule.into(),
            source,
        }
    }

    /// Create an invalid template error for the named rule.
    pub fn template(rule: impl Into<String>, reference: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            rule: rule.into(),
            reference: reference.into(),
        }
    }

    /// Whether this error rejects the request itself rather than failing
    /// while carrying it out.
    pub fn is_rejected_input(&self) -> bool {
        matches!(self, Self::MissingInput | Self::EmptyFilename)
    }
}

/// Result type alias for converter setup and file operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConvertError::template("date-literal", "4");
        assert_eq!(
            err.to_string(),
            "Invalid template in rule 'date-literal': unknown capture group '4'"
        );
    }

    #[test]
    fn test_rejected_input() {
        assert!(ConvertError::MissingInput.is_rejected_input());
        assert!(ConvertError::EmptyFilename.is_rejected_input());
        assert!(!ConvertError::Config("bad".into()).is_rejected_input());
    }
}
