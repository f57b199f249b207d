//! Safety policies for parentguard
//!
//! A policy is a named bundle of coarse-grained safety rules plus a safety
//! level that controls how strictly triggered rules are treated. Policies
//! govern permission decisions from context; keyword/pattern matching lives
//! in the filter engine.

pub mod enforcer;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::context::{ConditionValue, Context};
use crate::error::PolicyError;
use crate::filter::default_enabled;

/// Predefined safety levels controlling default denial strictness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SafetyLevel {
    /// Triggered rules deny.
    Strict,

    /// Triggered rules deny only above the policy's priority threshold.
    #[default]
    Moderate,

    /// Triggered rules warn, never deny, unless a rule says otherwise.
    Permissive,

    /// Behavior driven entirely by per-rule actions; unspecified rules fall
    /// back to moderate semantics.
    Custom,
}

/// Explicit per-rule outcome override, taking precedence over the policy
/// level at every level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerAction {
    Deny,
    Warn,
}

/// An individual safety rule.
///
/// A rule triggers when every declared condition is satisfied by the caller
/// context (exact key/value equality). A rule with no conditions triggers on
/// every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyRule {
    /// Unique name within a policy.
    pub name: String,

    /// Human-readable description.
    #[serde(default)]
    pub description: String,

    /// Whether the rule is consulted during enforcement.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Rule priority; higher triggers are reported first and compared
    /// against the moderate threshold.
    #[serde(default)]
    pub priority: i32,

    /// Conditions matched against caller context.
    #[serde(default)]
    pub conditions: BTreeMap<String, ConditionValue>,

    /// Explicit outcome override; `None` defers to the policy level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<TriggerAction>,
}

impl SafetyRule {
    /// Create an enabled rule with no conditions.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            enabled: true,
            priority: 0,
            conditions: BTreeMap::new(),
            action: None,
        }
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Add a condition.
    pub fn condition(mut self, key: impl Into<String>, value: impl Into<ConditionValue>) -> Self {
        self.conditions.insert(key.into(), value.into());
        self
    }

    /// Set an explicit outcome override.
    pub fn with_action(mut self, action: TriggerAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Create the rule disabled.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Check whether every condition is satisfied by the context.
    pub fn triggers(&self, context: &Context) -> bool {
        self.conditions
            .iter()
            .all(|(key, expected)| context.get(key) == Some(expected))
    }
}

/// A named safety policy: level, rules, and open metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyPolicy {
    /// Policy name.
    pub name: String,

    /// Safety level controlling default trigger behavior.
    #[serde(default)]
    pub level: SafetyLevel,

    /// Safety rules, in declaration order.
    #[serde(default)]
    pub rules: Vec<SafetyRule>,

    /// Additional metadata.
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,

    /// At moderate level, a triggered rule denies only when its priority
    /// exceeds this threshold. The default of 0 means any positive priority
    /// denies.
    #[serde(default)]
    pub moderate_threshold: i32,
}

impl SafetyPolicy {
    /// Create an empty policy at the given level.
    pub fn new(name: impl Into<String>, level: SafetyLevel) -> Self {
        Self {
            name: name.into(),
            level,
            rules: Vec::new(),
            metadata: HashMap::new(),
            moderate_threshold: 0,
        }
    }

    /// Add a rule.
    pub fn with_rule(mut self, rule: SafetyRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Enabled rules ordered by priority descending, declaration order for
    /// ties.
    pub fn enabled_rules_by_priority(&self) -> Vec<&SafetyRule> {
        let mut rules: Vec<&SafetyRule> = self.rules.iter().filter(|r| r.enabled).collect();
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        rules
    }

    /// Validate policy consistency.
    ///
    /// Fails with [`PolicyError::Conflict`] when two enabled rules share a
    /// name and with [`PolicyError::Incomplete`] when the level is custom
    /// but no enabled rule carries an explicit action.
    pub fn validate(&self) -> Result<(), PolicyError> {
        let mut seen = HashSet::new();
        for rule in self.rules.iter().filter(|r| r.enabled) {
            if !seen.insert(rule.name.as_str()) {
                return Err(PolicyError::Conflict(rule.name.clone()));
            }
        }

        if self.level == SafetyLevel::Custom
            && !self
                .rules
                .iter()
                .any(|r| r.enabled && r.action.is_some())
        {
            return Err(PolicyError::Incomplete(self.name.clone()));
        }

        Ok(())
    }
}
