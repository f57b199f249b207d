//! Built-in filter rules
//!
//! Default rule catalogue for each content category. These are a starting
//! point for a household policy; owners are expected to tune keywords and
//! add their own rules on top.

use once_cell::sync::Lazy;
use std::sync::Arc;

use crate::filter::store::RuleStore;
use crate::filter::{ContentCategory, FilterAction, FilterRule};

/// Violence-related content. Warns rather than blocks so that news or
/// history homework is not rejected outright.
pub fn violence() -> FilterRule {
    // "kill" omitted: substring matching would flag "skill".
    FilterRule::new("builtin-violence", ContentCategory::Violence, FilterAction::Warn)
        .keyword("murder")
        .keyword("massacre")
        .keyword("torture")
        .keyword("behead")
        .keyword("stab")
        .with_priority(30)
}

/// Adult content, blocked at any level.
pub fn adult() -> FilterRule {
    FilterRule::new("builtin-adult", ContentCategory::Adult, FilterAction::Block)
        .keyword("porn")
        .keyword("xxx")
        .keyword("nsfw")
        .keyword("explicit sex")
        .with_priority(40)
}

/// Common profanity, masked instead of blocked.
pub fn profanity() -> FilterRule {
    FilterRule::new(
        "builtin-profanity",
        ContentCategory::Profanity,
        FilterAction::Sanitize,
    )
    .keyword("damn")
    .keyword("shit")
    .keyword("fuck")
    .keyword("bitch")
    .keyword("asshole")
    .with_priority(20)
}

/// Personal information a child might paste into a prompt: email addresses,
/// phone numbers, SSNs. Masked so the rest of the prompt stays usable.
pub fn personal_info() -> FilterRule {
    FilterRule::new(
        "builtin-personal-info",
        ContentCategory::PersonalInfo,
        FilterAction::Sanitize,
    )
    .pattern(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
    .pattern(r"\b\d{3}[-.\s]\d{3}[-.\s]\d{4}\b")
    .pattern(r"\b\d{3}-\d{2}-\d{4}\b")
    .with_priority(50)
}

/// Instructions for weapons or hazardous chemistry, blocked.
pub fn dangerous() -> FilterRule {
    FilterRule::new(
        "builtin-dangerous",
        ContentCategory::Dangerous,
        FilterAction::Block,
    )
    .pattern(r"(?i)how\s+to\s+(make|build)\s+(a\s+)?(bomb|explosive|gun|weapon)")
    .pattern(r"(?i)(mix|combine)\s+bleach\s+(and|with)\s+ammonia")
    .pattern(r"(?i)(buy|get)\s+(drugs|a\s+gun)\s+online")
    .with_priority(60)
}

/// The complete built-in catalogue.
pub static BUILTIN_RULES: Lazy<Vec<FilterRule>> =
    Lazy::new(|| vec![dangerous(), personal_info(), adult(), violence(), profanity()]);

/// A rule store pre-populated with the built-in catalogue.
pub fn default_store() -> Arc<RuleStore> {
    // Built-in patterns are covered by tests; compilation cannot fail here.
    Arc::new(
        RuleStore::with_rules(BUILTIN_RULES.iter().cloned())
            .unwrap_or_else(|_| RuleStore::new()),
    )
}
