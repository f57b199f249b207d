//! Content evaluation against a rule snapshot
//!
//! The evaluator is total: given well-formed input it always produces a
//! [`FilterResult`], never an error. Rule-set problems are caught at store
//! insertion time, not here.

use std::collections::HashMap;
use std::sync::Arc;

use crate::context::Context;
use crate::filter::store::{CompiledRule, RuleStore};
use crate::filter::{FilterAction, FilterResult};

/// Replacement token used when sanitizing matched content.
pub const MASK_TOKEN: &str = "[filtered]";

/// Evaluates text against the enabled rules of a shared [`RuleStore`].
///
/// Holds only an `Arc` to the store; cloning the filter or calling it from
/// many threads at once is safe, and evaluation sees a consistent snapshot
/// even while another thread mutates the store.
#[derive(Clone)]
pub struct ContentFilter {
    store: Arc<RuleStore>,
}

impl ContentFilter {
    /// Create a filter over the given store.
    pub fn new(store: Arc<RuleStore>) -> Self {
        Self { store }
    }

    /// The underlying rule store.
    pub fn store(&self) -> &Arc<RuleStore> {
        &self.store
    }

    /// Evaluate content against all enabled rules and produce one result.
    ///
    /// Matching: a rule matches if any keyword appears as a case-insensitive
    /// substring, or any pattern matches anywhere. All matching rule names
    /// are collected in priority order. The effective action is the highest
    /// severity among matched actions; severity dominates priority.
    ///
    /// `context` is opaque here: it is echoed into the result metadata for
    /// the caller and never interpreted.
    pub fn evaluate(&self, content: &str, context: &Context) -> FilterResult {
        let snapshot = self.store.enabled_rules();
        let lowered = content.to_lowercase();

        let matched: Vec<&CompiledRule> = snapshot
            .iter()
            .filter(|rule| rule.matches(content, &lowered))
            .collect();

        let action = matched.iter().map(|rule| rule.action()).max();
        let passed = action != Some(FilterAction::Block);

        let sanitized_content = if action == Some(FilterAction::Sanitize) {
            Some(apply_masks(&matched, content))
        } else {
            None
        };

        let mut metadata = HashMap::new();
        metadata.insert(
            "rules_evaluated".to_string(),
            serde_json::Value::from(snapshot.len()),
        );
        if !context.is_empty() {
            metadata.insert(
                "context".to_string(),
                serde_json::to_value(context).unwrap_or(serde_json::Value::Null),
            );
        }

        FilterResult {
            passed,
            action,
            matched_rules: matched.iter().map(|rule| rule.name().to_string()).collect(),
            sanitized_content,
            metadata,
        }
    }
}

/// Replace every matched rule's keyword/pattern occurrences with
/// [`MASK_TOKEN`].
///
/// Rules are applied in snapshot order and keywords are sorted at compile
/// time, so the output is deterministic for identical input and rule set.
fn apply_masks(matched: &[&CompiledRule], content: &str) -> String {
    let mut out = content.to_string();
    for rule in matched {
        out = rule.mask(&out, MASK_TOKEN);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::context_from;
    use crate::filter::{ContentCategory, FilterRule};

    fn filter_with(rules: Vec<FilterRule>) -> ContentFilter {
        ContentFilter::new(Arc::new(RuleStore::with_rules(rules).unwrap()))
    }

    fn no_context() -> Context {
        Context::new()
    }

    #[test]
    fn test_no_match_passes() {
        let filter = filter_with(vec![FilterRule::new(
            "profanity",
            ContentCategory::Profanity,
            FilterAction::Block,
        )
        .keyword("badword")]);

        let result = filter.evaluate("perfectly fine homework question", &no_context());
        assert!(result.passed);
        assert!(result.action.is_none());
        assert!(result.matched_rules.is_empty());
        assert!(result.sanitized_content.is_none());
    }

    #[test]
    fn test_single_block_rule() {
        let filter = filter_with(vec![FilterRule::new(
            "profanity",
            ContentCategory::Profanity,
            FilterAction::Block,
        )
        .keyword("badword")]);

        let result = filter.evaluate("this is a badword here", &no_context());
        assert!(!result.passed);
        assert_eq!(result.action, Some(FilterAction::Block));
        assert_eq!(result.matched_rules, vec!["profanity"]);
        assert!(result.sanitized_content.is_none());
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let filter = filter_with(vec![FilterRule::new(
            "profanity",
            ContentCategory::Profanity,
            FilterAction::Block,
        )
        .keyword("BadWord")]);

        let result = filter.evaluate("a BADWORD and a badword", &no_context());
        assert!(!result.passed);
    }

    #[test]
    fn test_pattern_match() {
        let filter = filter_with(vec![FilterRule::new(
            "ssn",
            ContentCategory::PersonalInfo,
            FilterAction::Block,
        )
        .pattern(r"\b\d{3}-\d{2}-\d{4}\b")]);

        let result = filter.evaluate("my number is 123-45-6789 ok", &no_context());
        assert!(!result.passed);
        assert_eq!(result.matched_rules, vec!["ssn"]);
    }

    #[test]
    fn test_severity_dominates_priority() {
        // warn at priority 5 and block at priority 1: block wins the action,
        // priority only orders matched_rules.
        let filter = filter_with(vec![
            FilterRule::new("warn-rule", ContentCategory::Custom, FilterAction::Warn)
                .keyword("topic")
                .with_priority(5),
            FilterRule::new("block-rule", ContentCategory::Custom, FilterAction::Block)
                .keyword("topic")
                .with_priority(1),
        ]);

        let result = filter.evaluate("about that topic", &no_context());
        assert!(!result.passed);
        assert_eq!(result.action, Some(FilterAction::Block));
        assert_eq!(result.matched_rules, vec!["warn-rule", "block-rule"]);
    }

    #[test]
    fn test_warn_and_log_only_pass() {
        let filter = filter_with(vec![
            FilterRule::new("warned", ContentCategory::Custom, FilterAction::Warn)
                .keyword("caution"),
            FilterRule::new("logged", ContentCategory::Custom, FilterAction::LogOnly)
                .keyword("note"),
        ]);

        let warned = filter.evaluate("caution ahead", &no_context());
        assert!(warned.passed);
        assert_eq!(warned.action, Some(FilterAction::Warn));

        let logged = filter.evaluate("a note", &no_context());
        assert!(logged.passed);
        assert_eq!(logged.action, Some(FilterAction::LogOnly));
    }

    #[test]
    fn test_sanitize_masks_keywords_and_patterns() {
        let filter = filter_with(vec![
            FilterRule::new("profanity", ContentCategory::Profanity, FilterAction::Sanitize)
                .keyword("badword"),
            FilterRule::new("email", ContentCategory::PersonalInfo, FilterAction::Sanitize)
                .pattern(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b"),
        ]);

        let result = filter.evaluate("badword me at kid@example.com", &no_context());
        assert!(result.passed);
        assert_eq!(result.action, Some(FilterAction::Sanitize));
        let sanitized = result.sanitized_content.unwrap();
        assert_eq!(sanitized, "[filtered] me at [filtered]");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let filter = filter_with(vec![FilterRule::new(
            "profanity",
            ContentCategory::Profanity,
            FilterAction::Sanitize,
        )
        .keyword("badword")]);

        let first = filter.evaluate("a badword twice badword", &no_context());
        let sanitized = first.sanitized_content.unwrap();
        assert_eq!(sanitized, "a [filtered] twice [filtered]");

        // Sanitized output no longer matches, so it comes back unchanged.
        let second = filter.evaluate(&sanitized, &no_context());
        assert!(second.passed);
        assert!(second.matched_rules.is_empty());
        assert!(second.sanitized_content.is_none());
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let filter = filter_with(vec![
            FilterRule::new("a", ContentCategory::Custom, FilterAction::Sanitize)
                .keyword("zebra")
                .keyword("apple")
                .keyword("mango"),
            FilterRule::new("b", ContentCategory::Custom, FilterAction::Warn).keyword("apple"),
        ]);

        let text = "zebra apple mango apple";
        let first = filter.evaluate(text, &no_context());
        for _ in 0..10 {
            assert_eq!(filter.evaluate(text, &no_context()), first);
        }
    }

    #[test]
    fn test_context_passed_through_untouched() {
        let filter = filter_with(vec![FilterRule::new(
            "blocked",
            ContentCategory::Custom,
            FilterAction::Block,
        )
        .keyword("topic")]);

        let context = context_from([("topic", "violence")]);
        let result = filter.evaluate("harmless", &context);
        // Context never influences matching.
        assert!(result.passed);
        assert_eq!(
            result.metadata.get("context"),
            Some(&serde_json::json!({"topic": "violence"}))
        );
    }

    #[test]
    fn test_disabled_rule_skipped() {
        let filter = filter_with(vec![FilterRule::new(
            "off",
            ContentCategory::Custom,
            FilterAction::Block,
        )
        .keyword("badword")
        .disabled()]);

        let result = filter.evaluate("a badword here", &no_context());
        assert!(result.passed);
        assert!(result.matched_rules.is_empty());
    }

    #[test]
    fn test_mutation_during_shared_use() {
        let store = Arc::new(RuleStore::new());
        let filter = ContentFilter::new(Arc::clone(&store));

        store
            .add_rule(
                FilterRule::new("late", ContentCategory::Custom, FilterAction::Block)
                    .keyword("badword"),
            )
            .unwrap();
        assert!(!filter.evaluate("badword", &no_context()).passed);

        store.remove_rule("late").unwrap();
        assert!(filter.evaluate("badword", &no_context()).passed);
    }
}
