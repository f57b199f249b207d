//! Audit records for enforcement outcomes
//!
//! Entries are plain serde values the caller may persist and sign however it
//! likes; this module never writes to a store of its own. `export_jsonl`
//! serializes one JSON object per line into a caller-supplied sink.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use std::sync::RwLock;

use crate::policy::enforcer::EnforcementDecision;

/// Types of events to audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    UserAction,
    SystemEvent,
    SecurityEvent,
    PolicyChange,
    DataAccess,
    DataExport,
}

/// An individual audit entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Monotonic entry identifier within one log.
    pub entry_id: u64,

    /// Event time.
    pub timestamp: DateTime<Utc>,

    /// Type of event.
    pub event_type: AuditEventType,

    /// User who triggered the event, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Action performed.
    pub action: String,

    /// Event details.
    #[serde(default)]
    pub details: HashMap<String, serde_json::Value>,
}

/// Filter for retrieving audit entries. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub event_type: Option<AuditEventType>,
    pub user_id: Option<String>,
}

impl AuditQuery {
    fn matches(&self, entry: &AuditEntry) -> bool {
        if let Some(start) = self.start {
            if entry.timestamp < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if entry.timestamp > end {
                return false;
            }
        }
        if let Some(event_type) = self.event_type {
            if entry.event_type != event_type {
                return false;
            }
        }
        if let Some(ref user_id) = self.user_id {
            if entry.user_id.as_deref() != Some(user_id.as_str()) {
                return false;
            }
        }
        true
    }
}

struct Inner {
    entries: Vec<AuditEntry>,
    next_id: u64,
}

/// Thread-safe in-memory audit log.
pub struct AuditLog {
    inner: RwLock<Inner>,
}

impl AuditLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                entries: Vec::new(),
                next_id: 0,
            }),
        }
    }

    /// Append an entry and return it.
    pub fn log(
        &self,
        event_type: AuditEventType,
        action: impl Into<String>,
        user_id: Option<&str>,
        details: HashMap<String, serde_json::Value>,
    ) -> AuditEntry {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let entry = AuditEntry {
            entry_id: inner.next_id,
            timestamp: Utc::now(),
            event_type,
            user_id: user_id.map(str::to_string),
            action: action.into(),
            details,
        };
        inner.next_id += 1;
        inner.entries.push(entry.clone());
        entry
    }

    /// Record one enforcement outcome as a security event.
    pub fn record_decision(&self, user_id: &str, decision: &EnforcementDecision) -> AuditEntry {
        let action = if decision.allowed {
            "request_allowed"
        } else {
            "request_blocked"
        };

        let mut details = HashMap::new();
        details.insert("allowed".to_string(), decision.allowed.into());
        details.insert(
            "triggered_rules".to_string(),
            serde_json::Value::from(decision.triggered_rules.clone()),
        );
        details.insert(
            "matched_rules".to_string(),
            serde_json::Value::from(decision.filter.matched_rules.clone()),
        );
        if let Some(ref denied_by) = decision.denied_by {
            details.insert("denied_by".to_string(), denied_by.clone().into());
        }

        self.log(AuditEventType::SecurityEvent, action, Some(user_id), details)
    }

    /// All entries, in insertion order.
    pub fn entries(&self) -> Vec<AuditEntry> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.entries.clone()
    }

    /// Entries matching the query, in insertion order.
    pub fn entries_matching(&self, query: &AuditQuery) -> Vec<AuditEntry> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner
            .entries
            .iter()
            .filter(|e| query.matches(e))
            .cloned()
            .collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.entries.len()
    }

    /// Check whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write every entry as one JSON object per line into the sink.
    pub fn export_jsonl(&self, writer: &mut impl Write) -> std::io::Result<()> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        for entry in &inner.entries {
            let json = serde_json::to_string(entry)?;
            writeln!(writer, "{}", json)?;
        }
        Ok(())
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}
