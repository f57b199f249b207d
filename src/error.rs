//! Error types for parentguard
//!
//! Every failure a caller must branch on is a distinct variant carrying the
//! offending name or pattern. Evaluation itself never fails; only store
//! mutation, policy validation, and config loading do.

use thiserror::Error;

/// Errors raised by [`RuleStore`](crate::filter::store::RuleStore) mutations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A rule with the same name is already present.
    #[error("a filter rule named '{0}' already exists")]
    DuplicateName(String),

    /// No rule with the given name exists.
    #[error("no filter rule named '{0}'")]
    NotFound(String),

    /// A regex pattern failed to compile at insertion time.
    #[error("invalid pattern '{pattern}' in rule '{rule}'")]
    InvalidPattern {
        rule: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Errors raised by [`SafetyPolicy::validate`](crate::policy::SafetyPolicy::validate).
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Two enabled safety rules share the same name.
    #[error("duplicate enabled safety rule '{0}'")]
    Conflict(String),

    /// A custom-level policy has no rule with an explicit action override.
    #[error("custom-level policy '{0}' defines no rule with an explicit action")]
    Incomplete(String),
}

/// Errors raised while loading or building a declarative configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Policy(#[from] PolicyError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::DuplicateName("profanity".to_string());
        assert!(err.to_string().contains("profanity"));

        let err = StoreError::NotFound("missing".to_string());
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_invalid_pattern_carries_source() {
        let source = regex::Regex::new("(unclosed").unwrap_err();
        let err = StoreError::InvalidPattern {
            rule: "broken".to_string(),
            pattern: "(unclosed".to_string(),
            source,
        };
        assert!(err.to_string().contains("broken"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_policy_error_kinds_distinguishable() {
        let conflict = PolicyError::Conflict("dup".to_string());
        let incomplete = PolicyError::Incomplete("custom".to_string());
        assert!(matches!(conflict, PolicyError::Conflict(_)));
        assert!(matches!(incomplete, PolicyError::Incomplete(_)));
    }
}
