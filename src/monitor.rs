//! Activity monitoring
//!
//! Collects per-user activity records from enforcement outcomes and other
//! events, and aggregates them into summaries for reporting. Purely
//! in-memory; anomaly detection and alerting live outside this crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

use crate::policy::enforcer::EnforcementDecision;

/// Types of activities to monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    AiRequest,
    Login,
    Logout,
    SettingsChange,
    BlockedContent,
    LimitExceeded,
}

/// A single recorded activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// User the activity belongs to.
    pub user_id: String,

    /// When the activity happened.
    pub timestamp: DateTime<Utc>,

    /// Kind of activity.
    pub activity_type: ActivityType,

    /// Free-form details.
    #[serde(default)]
    pub details: HashMap<String, serde_json::Value>,
}

impl Activity {
    /// Create an activity stamped now.
    pub fn new(user_id: impl Into<String>, activity_type: ActivityType) -> Self {
        Self {
            user_id: user_id.into(),
            timestamp: Utc::now(),
            activity_type,
            details: HashMap::new(),
        }
    }

    /// Attach a detail value.
    pub fn detail(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }
}

/// Aggregated view of one user's activity since a point in time.
#[derive(Debug, Clone, Serialize)]
pub struct ActivitySummary {
    pub user_id: String,
    pub since: DateTime<Utc>,
    pub total: usize,
    pub by_type: HashMap<ActivityType, usize>,
}

/// Thread-safe in-memory activity sink.
pub struct ActivityMonitor {
    records: RwLock<Vec<Activity>>,
}

impl ActivityMonitor {
    /// Create an empty monitor.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// Record an activity.
    pub fn log_activity(&self, activity: Activity) {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        records.push(activity);
    }

    /// Record an enforcement outcome: one AI-request activity, plus a
    /// blocked-content activity when the request was denied.
    pub fn record_decision(&self, user_id: &str, decision: &EnforcementDecision) {
        let request = Activity::new(user_id, ActivityType::AiRequest)
            .detail("allowed", decision.allowed.into())
            .detail(
                "triggered_rules",
                serde_json::Value::from(decision.triggered_rules.clone()),
            )
            .detail(
                "matched_rules",
                serde_json::Value::from(decision.filter.matched_rules.clone()),
            );
        self.log_activity(request);

        if !decision.allowed {
            let mut blocked = Activity::new(user_id, ActivityType::BlockedContent);
            if let Some(ref denied_by) = decision.denied_by {
                blocked = blocked.detail("denied_by", denied_by.clone().into());
            }
            self.log_activity(blocked);
        }
    }

    /// All activities for a user, in insertion order.
    pub fn activities_for(&self, user_id: &str) -> Vec<Activity> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        records
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Summarize a user's activity since the given time.
    pub fn summary(&self, user_id: &str, since: DateTime<Utc>) -> ActivitySummary {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        let mut by_type: HashMap<ActivityType, usize> = HashMap::new();
        let mut total = 0;

        for activity in records
            .iter()
            .filter(|a| a.user_id == user_id && a.timestamp >= since)
        {
            total += 1;
            *by_type.entry(activity.activity_type).or_insert(0) += 1;
        }

        ActivitySummary {
            user_id: user_id.to_string(),
            since,
            total,
            by_type,
        }
    }

    /// Total number of records across all users.
    pub fn len(&self) -> usize {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        records.len()
    }

    /// Check whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ActivityMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterResult;

    fn decision(allowed: bool) -> EnforcementDecision {
        EnforcementDecision {
            allowed,
            denied_by: if allowed {
                None
            } else {
                Some("no_violence".to_string())
            },
            triggered_rules: Vec::new(),
            warnings: Vec::new(),
            filter: FilterResult::clean(),
        }
    }

    #[test]
    fn test_allowed_decision_records_one_activity() {
        let monitor = ActivityMonitor::new();
        monitor.record_decision("child_001", &decision(true));

        let activities = monitor.activities_for("child_001");
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].activity_type, ActivityType::AiRequest);
    }

    #[test]
    fn test_blocked_decision_records_blocked_content() {
        let monitor = ActivityMonitor::new();
        monitor.record_decision("child_001", &decision(false));

        let activities = monitor.activities_for("child_001");
        assert_eq!(activities.len(), 2);
        assert_eq!(activities[1].activity_type, ActivityType::BlockedContent);
        assert_eq!(
            activities[1].details.get("denied_by"),
            Some(&serde_json::json!("no_violence"))
        );
    }

    #[test]
    fn test_summary_counts_by_type() {
        let monitor = ActivityMonitor::new();
        let since = Utc::now() - chrono::Duration::hours(1);

        monitor.record_decision("child_001", &decision(true));
        monitor.record_decision("child_001", &decision(false));
        monitor.log_activity(Activity::new("sibling", ActivityType::Login));

        let summary = monitor.summary("child_001", since);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.by_type.get(&ActivityType::AiRequest), Some(&2));
        assert_eq!(summary.by_type.get(&ActivityType::BlockedContent), Some(&1));
        assert!(summary.by_type.get(&ActivityType::Login).is_none());
    }

    #[test]
    fn test_summary_respects_since() {
        let monitor = ActivityMonitor::new();
        monitor.log_activity(Activity::new("child_001", ActivityType::Login));

        let summary = monitor.summary("child_001", Utc::now() + chrono::Duration::hours(1));
        assert_eq!(summary.total, 0);
    }
}
