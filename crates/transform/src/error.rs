//! Transform error types
//!
//! Errors raised while compiling a relabel chain. Evaluation itself cannot
//! fail; a rule either keeps or drops.

use thiserror::Error;

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;

/// Result type for transform operations
pub type TransformResult<T> = std::result::Result<T, TransformError>;

/// Errors that can occur when building a relabel chain
#[derive(Debug, Error)]
pub enum TransformError {
    /// Rule regex does not compile
    #[error("relabel rule {rule}: invalid regex '{pattern}': {source}")]
    InvalidRegex {
        /// Position of the rule in the chain
        rule: usize,
        /// Pattern as written in config
        pattern: String,
        /// Underlying regex error
        #[source]
        source: regex::Error,
    },

    /// Rule fields are inconsistent with its action
    #[error("relabel rule {rule} ({action}): {message}")]
    InvalidRule {
        /// Position of the rule in the chain
        rule: usize,
        /// Action name
        action: &'static str,
        /// What is wrong
        message: String,
    },
}

impl TransformError {
    /// Create an InvalidRegex error
    pub fn regex(rule: usize, pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidRegex {
            rule,
            pattern: pattern.into(),
            source,
        }
    }

    /// Create an InvalidRule error
    pub fn rule(rule: usize, action: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidRule {
            rule,
            action,
            message: message.into(),
        }
    }

    /// Index of the offending rule
    pub fn rule_index(&self) -> usize {
        match self {
            Self::InvalidRegex { rule, .. } | Self::InvalidRule { rule, .. } => *rule,
        }
    }
}
