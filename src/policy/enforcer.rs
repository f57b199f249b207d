//! Policy enforcement
//!
//! Combines the content filter's verdict with policy-level safety rules to
//! produce a single allow/deny decision plus the material a caller needs to
//! explain it.

use serde::Serialize;
use std::sync::Arc;

use crate::context::Context;
use crate::filter::evaluator::ContentFilter;
use crate::filter::store::RuleStore;
use crate::filter::FilterResult;
use crate::policy::{SafetyLevel, SafetyPolicy, TriggerAction};

/// Outcome of enforcing a policy over one piece of content.
#[derive(Debug, Clone, Serialize)]
pub struct EnforcementDecision {
    /// Whether the content is allowed through.
    pub allowed: bool,

    /// The rule responsible for a denial: a blocking filter rule, or the
    /// highest-priority denying safety rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denied_by: Option<String>,

    /// Safety rules whose conditions matched the context, highest priority
    /// first. Empty when the filter hard-blocked (fail-fast).
    pub triggered_rules: Vec<String>,

    /// Triggered rules that resolved to a warning.
    pub warnings: Vec<String>,

    /// The underlying content filter result.
    pub filter: FilterResult,
}

impl EnforcementDecision {
    /// Check whether enforcement passed.
    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    /// Check whether the denial came from the content filter rather than a
    /// safety rule.
    pub fn blocked_by_filter(&self) -> bool {
        !self.allowed && self.filter.is_blocked()
    }
}

/// Enforces one [`SafetyPolicy`] using a shared rule store.
pub struct PolicyEnforcer {
    policy: SafetyPolicy,
    filter: ContentFilter,
}

impl PolicyEnforcer {
    /// Create an enforcer for a policy over the given rule store.
    pub fn new(policy: SafetyPolicy, store: Arc<RuleStore>) -> Self {
        Self {
            policy,
            filter: ContentFilter::new(store),
        }
    }

    /// The wrapped policy.
    pub fn policy(&self) -> &SafetyPolicy {
        &self.policy
    }

    /// The content filter backing this enforcer.
    pub fn filter(&self) -> &ContentFilter {
        &self.filter
    }

    /// Run only the content filter, without consulting safety rules.
    pub fn evaluate(&self, content: &str, context: &Context) -> FilterResult {
        self.filter.evaluate(content, context)
    }

    /// Enforce the policy against content and context.
    ///
    /// A hard block from the content filter fails immediately; safety rules
    /// are not consulted. Otherwise every enabled safety rule whose
    /// conditions are satisfied by the context triggers, and the policy
    /// level decides whether each trigger denies or warns (an explicit
    /// per-rule action always wins).
    pub fn enforce(&self, content: &str, context: &Context) -> EnforcementDecision {
        let filter = self.filter.evaluate(content, context);

        if filter.is_blocked() {
            return EnforcementDecision {
                allowed: false,
                denied_by: filter.matched_rules.first().cloned(),
                triggered_rules: Vec::new(),
                warnings: Vec::new(),
                filter,
            };
        }

        let mut triggered_rules = Vec::new();
        let mut warnings = Vec::new();
        let mut denied_by = None;

        for rule in self.policy.enabled_rules_by_priority() {
            if !rule.triggers(context) {
                continue;
            }
            triggered_rules.push(rule.name.clone());

            match self.disposition(rule) {
                TriggerAction::Deny => {
                    if denied_by.is_none() {
                        denied_by = Some(rule.name.clone());
                    }
                }
                TriggerAction::Warn => warnings.push(rule.name.clone()),
            }
        }

        EnforcementDecision {
            allowed: denied_by.is_none(),
            denied_by,
            triggered_rules,
            warnings,
            filter,
        }
    }

    /// Resolve what a triggered rule does under this policy's level.
    fn disposition(&self, rule: &crate::policy::SafetyRule) -> TriggerAction {
        if let Some(action) = rule.action {
            return action;
        }
        match self.policy.level {
            SafetyLevel::Strict => TriggerAction::Deny,
            SafetyLevel::Permissive => TriggerAction::Warn,
            // Custom rules without an explicit action fall back to moderate
            // semantics.
            SafetyLevel::Moderate | SafetyLevel::Custom => {
                if rule.priority > self.policy.moderate_threshold {
                    TriggerAction::Deny
                } else {
                    TriggerAction::Warn
                }
            }
        }
    }
}
