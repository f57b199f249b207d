//! Content filtering for parentguard
//!
//! Defines the filter rule data model and the result type produced by
//! evaluation. The store and evaluator live in submodules.

pub mod evaluator;
pub mod presets;
pub mod store;

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Categories of content that can be filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentCategory {
    Violence,
    Adult,
    Profanity,
    PersonalInfo,
    Dangerous,
    Custom,
}

/// Action to take when content matches a filter rule.
///
/// Variants are declared in ascending severity, so the derived ordering is
/// the action-resolution ranking: `LogOnly < Warn < Sanitize < Block`. When
/// several rules match, the highest-ranked action wins regardless of rule
/// priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterAction {
    LogOnly,
    Warn,
    Sanitize,
    Block,
}

/// An individual content filter rule.
///
/// Keywords match as case-insensitive substrings; patterns are regular
/// expressions compiled when the rule is added to a
/// [`RuleStore`](store::RuleStore). Higher priority rules are evaluated
/// first; priority only orders matches and breaks same-action ties, it never
/// overrides action severity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRule {
    /// Unique name within a rule store.
    pub name: String,

    /// Content category this rule covers.
    pub category: ContentCategory,

    /// Action to take on a match.
    pub action: FilterAction,

    /// Keywords matched as case-insensitive substrings.
    #[serde(default)]
    pub keywords: HashSet<String>,

    /// Regex patterns matched anywhere in the content.
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Whether the rule participates in evaluation.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Evaluation order; higher runs first.
    #[serde(default)]
    pub priority: i32,
}

pub(crate) fn default_enabled() -> bool {
    true
}

impl FilterRule {
    /// Create a rule with no keywords or patterns.
    pub fn new(
        name: impl Into<String>,
        category: ContentCategory,
        action: FilterAction,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            action,
            keywords: HashSet::new(),
            patterns: Vec::new(),
            enabled: true,
            priority: 0,
        }
    }

    /// Add a keyword.
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keywords.insert(keyword.into());
        self
    }

    /// Add a regex pattern.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    /// Set the evaluation priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Create the rule disabled.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Result of evaluating content against a rule snapshot.
///
/// Invariant: `passed` is `false` if and only if `action` is
/// `Some(FilterAction::Block)`. Warn and log-only matches still pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterResult {
    /// Whether the content may be used (possibly after sanitization).
    pub passed: bool,

    /// Effective action across all matched rules; absent when nothing
    /// matched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<FilterAction>,

    /// Names of every matched rule, highest priority first.
    pub matched_rules: Vec<String>,

    /// Masked content, present only when the effective action is sanitize.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sanitized_content: Option<String>,

    /// Additional metadata, including the caller context passed through.
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl FilterResult {
    /// Result for content that matched no rule.
    pub fn clean() -> Self {
        Self {
            passed: true,
            action: None,
            matched_rules: Vec::new(),
            sanitized_content: None,
            metadata: HashMap::new(),
        }
    }

    /// Check whether the effective action is a hard block.
    pub fn is_blocked(&self) -> bool {
        self.action == Some(FilterAction::Block)
    }

    /// Check whether any rule matched.
    pub fn has_matches(&self) -> bool {
        !self.matched_rules.is_empty()
    }
}
