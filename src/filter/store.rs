//! Rule store with snapshot-on-read semantics
//!
//! Holds compiled filter rules behind an `RwLock`. Mutations rebuild an
//! `Arc`-shared snapshot of the enabled rules, so evaluation iterates a
//! consistent set without holding the lock and concurrent readers never
//! block each other.

use regex::Regex;
use std::sync::{Arc, RwLock};

use crate::error::StoreError;
use crate::filter::FilterRule;

/// A filter rule with its keywords and patterns compiled for matching.
///
/// Keywords are lowercased and sorted at compile time so sanitization output
/// is deterministic for a given rule set.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    rule: FilterRule,
    keywords: Vec<String>,
    keyword_masks: Vec<Regex>,
    patterns: Vec<Regex>,
    seq: u64,
}

impl CompiledRule {
    fn compile(rule: FilterRule, seq: u64) -> Result<Self, StoreError> {
        let mut keywords: Vec<String> = rule
            .keywords
            .iter()
            .filter_map(|k| {
                let k = k.trim().to_lowercase();
                if k.is_empty() {
                    log::warn!("rule '{}': ignoring empty keyword", rule.name);
                    None
                } else {
                    Some(k)
                }
            })
            .collect();
        keywords.sort();
        keywords.dedup();

        let keyword_masks = keywords
            .iter()
            .map(|k| {
                let escaped = format!("(?i){}", regex::escape(k));
                Regex::new(&escaped).map_err(|source| StoreError::InvalidPattern {
                    rule: rule.name.clone(),
                    pattern: k.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let patterns = rule
            .patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|source| StoreError::InvalidPattern {
                    rule: rule.name.clone(),
                    pattern: p.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            rule,
            keywords,
            keyword_masks,
            patterns,
            seq,
        })
    }

    /// The rule definition this was compiled from.
    pub fn definition(&self) -> &FilterRule {
        &self.rule
    }

    /// Rule name.
    pub fn name(&self) -> &str {
        &self.rule.name
    }

    /// Action taken on a match.
    pub fn action(&self) -> crate::filter::FilterAction {
        self.rule.action
    }

    /// Evaluation priority.
    pub fn priority(&self) -> i32 {
        self.rule.priority
    }

    /// Test whether the rule matches. `lowered` must be the lowercased form
    /// of `content`.
    pub(crate) fn matches(&self, content: &str, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
            || self.patterns.iter().any(|re| re.is_match(content))
    }

    /// Replace every keyword/pattern occurrence with the mask token.
    pub(crate) fn mask(&self, content: &str, mask: &str) -> String {
        let mut out = content.to_string();
        for re in &self.keyword_masks {
            out = re.replace_all(&out, mask).into_owned();
        }
        for re in &self.patterns {
            out = re.replace_all(&out, mask).into_owned();
        }
        out
    }
}

/// Ordered snapshot of enabled rules: priority descending, insertion order
/// for ties.
pub type RuleSnapshot = Arc<[CompiledRule]>;

#[derive(Debug)]
struct Inner {
    rules: Vec<CompiledRule>,
    snapshot: RuleSnapshot,
    next_seq: u64,
}

impl Inner {
    fn rebuild_snapshot(&mut self) {
        let mut enabled: Vec<CompiledRule> = self
            .rules
            .iter()
            .filter(|r| r.rule.enabled)
            .cloned()
            .collect();
        // Stable sort keeps insertion order (seq) within equal priorities.
        enabled.sort_by(|a, b| b.rule.priority.cmp(&a.rule.priority).then(a.seq.cmp(&b.seq)));
        self.snapshot = Arc::from(enabled);
    }
}

/// Mutable collection of filter rules supporting add/remove/snapshot.
///
/// All methods take `&self`; share the store across threads with `Arc`.
#[derive(Debug)]
pub struct RuleStore {
    inner: RwLock<Inner>,
}

impl RuleStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                rules: Vec::new(),
                snapshot: Arc::from(Vec::new()),
                next_seq: 0,
            }),
        }
    }

    /// Create a store pre-populated with rules.
    pub fn with_rules(rules: impl IntoIterator<Item = FilterRule>) -> Result<Self, StoreError> {
        let store = Self::new();
        for rule in rules {
            store.add_rule(rule)?;
        }
        Ok(store)
    }

    /// Add a rule, compiling its patterns.
    ///
    /// Fails with [`StoreError::DuplicateName`] if a rule with the same name
    /// exists and [`StoreError::InvalidPattern`] if any regex does not
    /// compile; the store is unchanged on failure.
    pub fn add_rule(&self, rule: FilterRule) -> Result<(), StoreError> {
        // Compile outside the lock; writers only contend for the insert.
        let name = rule.name.clone();
        let compiled = CompiledRule::compile(rule, 0)?;

        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if inner.rules.iter().any(|r| r.rule.name == name) {
            return Err(StoreError::DuplicateName(name));
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.rules.push(CompiledRule { seq, ..compiled });
        inner.rebuild_snapshot();
        Ok(())
    }

    /// Remove a rule by name, returning its definition.
    pub fn remove_rule(&self, name: &str) -> Result<FilterRule, StoreError> {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let idx = inner
            .rules
            .iter()
            .position(|r| r.rule.name == name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        let removed = inner.rules.remove(idx);
        inner.rebuild_snapshot();
        Ok(removed.rule)
    }

    /// Enable or disable a rule in place.
    pub fn set_enabled(&self, name: &str, enabled: bool) -> Result<(), StoreError> {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let rule = inner
            .rules
            .iter_mut()
            .find(|r| r.rule.name == name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        rule.rule.enabled = enabled;
        inner.rebuild_snapshot();
        Ok(())
    }

    /// Snapshot of the enabled rules, priority descending with insertion
    /// order for ties. Cheap: clones one `Arc`.
    pub fn enabled_rules(&self) -> RuleSnapshot {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&inner.snapshot)
    }

    /// Check whether a rule with the given name exists (enabled or not).
    pub fn contains(&self, name: &str) -> bool {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.rules.iter().any(|r| r.rule.name == name)
    }

    /// Number of rules, including disabled ones.
    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.rules.len()
    }

    /// Check whether the store holds no rules.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RuleStore {
    fn default() -> Self {
        Self::new()
    }
}
