//! Declarative configuration for parentguard
//!
//! Households describe a policy and its filter rules in TOML; `build()`
//! compiles the definitions into a validated [`SafetyPolicy`] and a
//! populated [`RuleStore`]. Loading is a caller convenience; the engine
//! itself owns no on-disk state.

use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::filter::store::RuleStore;
use crate::filter::FilterRule;
use crate::policy::{SafetyLevel, SafetyPolicy, SafetyRule};

/// The `[policy]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PolicySection {
    /// Policy name.
    pub name: String,

    /// Safety level.
    pub level: SafetyLevel,

    /// Moderate-level denial threshold.
    pub moderate_threshold: i32,

    /// Safety rules (`[[policy.safety_rules]]` tables).
    pub safety_rules: Vec<SafetyRule>,
}

impl Default for PolicySection {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            level: SafetyLevel::Moderate,
            moderate_threshold: 0,
            safety_rules: Vec::new(),
        }
    }
}

/// Complete declarative configuration: one policy plus filter rules.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GuardianConfig {
    pub policy: PolicySection,

    /// Filter rules (`[[rules]]` tables).
    pub rules: Vec<FilterRule>,
}

impl GuardianConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a configuration from a TOML file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// The embedded default configuration.
    pub fn embedded_default() -> Result<Self, ConfigError> {
        Self::from_toml_str(DEFAULT_CONFIG_TOML)
    }

    /// Compile the definitions into a validated policy and populated store.
    ///
    /// Filter rules are compiled at insertion, so an invalid pattern or a
    /// duplicate name surfaces here rather than during evaluation.
    pub fn build(&self) -> Result<(SafetyPolicy, Arc<RuleStore>), ConfigError> {
        let store = RuleStore::new();
        for rule in &self.rules {
            store.add_rule(rule.clone())?;
        }

        let mut policy = SafetyPolicy::new(self.policy.name.clone(), self.policy.level);
        policy.moderate_threshold = self.policy.moderate_threshold;
        policy.rules = self.policy.safety_rules.clone();
        policy.validate()?;

        log::debug!(
            "built policy '{}' ({} safety rules, {} filter rules)",
            policy.name,
            policy.rules.len(),
            store.len()
        );

        Ok((policy, Arc::new(store)))
    }
}

/// Embedded default configuration: a moderate household policy.
pub const DEFAULT_CONFIG_TOML: &str = r#"
[policy]
name = "child_policy"
level = "moderate"
moderate_threshold = 0

[[policy.safety_rules]]
name = "no_violence"
description = "Deny violent topics"
priority = 10
conditions = { topic = "violence" }

[[policy.safety_rules]]
name = "age_appropriate"
description = "Warn on requests flagged above the child's age band"
priority = 0
conditions = { age_flag = "above_band" }

[[rules]]
name = "profanity"
category = "profanity"
action = "sanitize"
keywords = ["damn", "shit", "fuck"]
priority = 20

[[rules]]
name = "personal-info"
category = "personal_info"
action = "sanitize"
patterns = [
    '\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b',
    '\b\d{3}-\d{2}-\d{4}\b',
]
priority = 50

[[rules]]
name = "dangerous-instructions"
category = "dangerous"
action = "block"
patterns = ['(?i)how\s+to\s+(make|build)\s+(a\s+)?(bomb|explosive|weapon)']
priority = 60
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_embedded_default() {
        let config = GuardianConfig::embedded_default().unwrap();
        assert_eq!(config.policy.name, "child_policy");
        assert_eq!(config.policy.level, SafetyLevel::Moderate);
        assert_eq!(config.policy.safety_rules.len(), 2);
        assert_eq!(config.rules.len(), 3);
    }

    #[test]
    fn test_build_embedded_default() {
        let config = GuardianConfig::embedded_default().unwrap();
        let (policy, store) = config.build().unwrap();
        assert_eq!(policy.name, "child_policy");
        assert_eq!(store.len(), 3);
        assert!(store.contains("profanity"));
    }

    #[test]
    fn test_empty_config_builds() {
        let config = GuardianConfig::from_toml_str("").unwrap();
        let (policy, store) = config.build().unwrap();
        assert_eq!(policy.name, "default");
        assert!(store.is_empty());
    }

    #[test]
    fn test_invalid_pattern_surfaces_as_store_error() {
        let config = GuardianConfig::from_toml_str(
            r#"
            [[rules]]
            name = "broken"
            category = "custom"
            action = "block"
            patterns = ["(unclosed"]
            "#,
        )
        .unwrap();

        let err = config.build().unwrap_err();
        assert!(matches!(err, ConfigError::Store(_)));
    }

    #[test]
    fn test_invalid_policy_surfaces_as_policy_error() {
        let config = GuardianConfig::from_toml_str(
            r#"
            [policy]
            name = "broken"
            level = "custom"

            [[policy.safety_rules]]
            name = "no_override"
            "#,
        )
        .unwrap();

        let err = config.build().unwrap_err();
        assert!(matches!(err, ConfigError::Policy(_)));
    }

    #[test]
    fn test_unparseable_toml() {
        let err = GuardianConfig::from_toml_str("not [ valid").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DEFAULT_CONFIG_TOML.as_bytes()).unwrap();

        let config = GuardianConfig::load_from(file.path()).unwrap();
        assert_eq!(config.policy.name, "child_policy");
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = GuardianConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
