//! Caller-supplied context and typed condition values
//!
//! Safety rule conditions and evaluation context share one value type so the
//! matching logic stays exhaustive instead of comparing untyped maps.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single typed value used in safety rule conditions and caller context.
///
/// Untagged serde representation keeps declarative configs natural:
/// `topic = "violence"`, `age = 12`, `supervised = true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl ConditionValue {
    /// Convert a scalar JSON value, if it maps onto a condition value.
    ///
    /// Arrays, objects, and null have no condition equivalent and return
    /// `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(ConditionValue::Bool(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(ConditionValue::Integer(i))
                } else {
                    n.as_f64().map(ConditionValue::Float)
                }
            }
            serde_json::Value::String(s) => Some(ConditionValue::String(s.clone())),
            _ => None,
        }
    }
}

impl From<&str> for ConditionValue {
    fn from(s: &str) -> Self {
        ConditionValue::String(s.to_string())
    }
}

impl From<String> for ConditionValue {
    fn from(s: String) -> Self {
        ConditionValue::String(s)
    }
}

impl From<i64> for ConditionValue {
    fn from(i: i64) -> Self {
        ConditionValue::Integer(i)
    }
}

impl From<f64> for ConditionValue {
    fn from(f: f64) -> Self {
        ConditionValue::Float(f)
    }
}

impl From<bool> for ConditionValue {
    fn from(b: bool) -> Self {
        ConditionValue::Bool(b)
    }
}

/// Opaque key-value context passed alongside content.
///
/// The evaluator never interprets it; the policy enforcer matches safety rule
/// conditions against it by exact equality.
pub type Context = BTreeMap<String, ConditionValue>;

/// Build a context from key-value pairs.
pub fn context_from<K, V, I>(pairs: I) -> Context
where
    K: Into<String>,
    V: Into<ConditionValue>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
