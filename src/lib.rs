//! parentguard - Content filtering and safety policy enforcement for
//! parental AI oversight
//!
//! This library is the enforcement core of a parental oversight framework:
//! it evaluates text against a prioritized rule set and produces a
//! deterministic allow/block/sanitize decision, then layers policy-level
//! safety rules on top.
//!
//! # Features
//!
//! - **Content filtering**: keyword and regex rules per content category,
//!   with action severity resolution (block > sanitize > warn > log-only)
//! - **Safety policies**: context-driven safety rules under strict,
//!   moderate, permissive, or custom levels
//! - **Sanitization**: deterministic masking of matched keywords/patterns
//! - **Concurrent by design**: a shared rule store with snapshot-on-read
//!   semantics, safe to mutate while other threads evaluate
//! - **Declarative config**: TOML policy and rule definitions
//! - **Screening wrapper**: prompt and response checks for an AI
//!   conversation, plus audit and activity records for the oversight side
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use parentguard::{
//!     ContentCategory, ContentFilter, FilterAction, FilterRule, RuleStore,
//! };
//!
//! let store = Arc::new(RuleStore::new());
//! store
//!     .add_rule(
//!         FilterRule::new("profanity", ContentCategory::Profanity, FilterAction::Block)
//!             .keyword("badword"),
//!     )
//!     .unwrap();
//!
//! let filter = ContentFilter::new(store);
//! let result = filter.evaluate("this is a badword here", &Default::default());
//! assert!(!result.passed);
//! assert_eq!(result.matched_rules, vec!["profanity"]);
//! ```

pub mod audit;
pub mod config;
pub mod context;
pub mod error;
pub mod filter;
pub mod monitor;
pub mod policy;
pub mod wrapper;

// Re-exports for convenience
pub use audit::{AuditEntry, AuditEventType, AuditLog, AuditQuery};
pub use config::{GuardianConfig, DEFAULT_CONFIG_TOML};
pub use context::{context_from, ConditionValue, Context};
pub use error::{ConfigError, PolicyError, StoreError};
pub use filter::evaluator::{ContentFilter, MASK_TOKEN};
pub use filter::store::{CompiledRule, RuleSnapshot, RuleStore};
pub use filter::{ContentCategory, FilterAction, FilterResult, FilterRule};
pub use monitor::{Activity, ActivityMonitor, ActivitySummary, ActivityType};
pub use policy::enforcer::{EnforcementDecision, PolicyEnforcer};
pub use policy::{SafetyLevel, SafetyPolicy, SafetyRule, TriggerAction};
pub use wrapper::{AiRequest, AiResponse, SafetyWrapper, BLOCKED_RESPONSE};
