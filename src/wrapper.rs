//! AI request/response screening
//!
//! Wraps a [`PolicyEnforcer`] around the two edges of an AI conversation:
//! the inbound prompt and the outbound model response. The wrapper itself
//! performs no network calls; the caller talks to its AI provider and hands
//! text in and out.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::context::{ConditionValue, Context};
use crate::policy::enforcer::{EnforcementDecision, PolicyEnforcer};

/// Message returned in place of a blocked model response.
pub const BLOCKED_RESPONSE: &str =
    "This response was blocked by your family's safety settings.";

/// A request bound for an AI system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiRequest {
    /// User prompt.
    pub prompt: String,

    /// User making the request.
    pub user_id: String,

    /// Additional metadata. Scalar entries double as enforcement context
    /// (e.g. a role or age value set by the access-control layer).
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl AiRequest {
    /// Create a request with empty metadata.
    pub fn new(user_id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            user_id: user_id.into(),
            metadata: HashMap::new(),
        }
    }

    /// Attach a metadata value.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Enforcement context derived from the scalar metadata entries.
    pub fn context(&self) -> Context {
        self.metadata
            .iter()
            .filter_map(|(k, v)| ConditionValue::from_json(v).map(|cv| (k.clone(), cv)))
            .collect()
    }
}

/// A response returning from an AI system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiResponse {
    /// Response content, possibly sanitized or replaced.
    pub content: String,

    /// Whether the content was modified or replaced on the way through.
    #[serde(default)]
    pub filtered: bool,

    /// Additional metadata.
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// Outcome of screening an inbound request.
#[derive(Debug, Clone)]
pub struct ScreenedRequest {
    /// The request to forward, `None` when blocked. A sanitized prompt is
    /// substituted when the filter masked it.
    pub forwarded: Option<AiRequest>,

    /// The enforcement decision, for the monitoring collaborators.
    pub decision: EnforcementDecision,
}

/// Outcome of screening an outbound response.
#[derive(Debug, Clone)]
pub struct ScreenedResponse {
    /// The response to hand back to the user.
    pub response: AiResponse,

    /// The enforcement decision, for the monitoring collaborators.
    pub decision: EnforcementDecision,
}

/// Screens prompts and responses with one policy enforcer.
pub struct SafetyWrapper {
    enforcer: PolicyEnforcer,
}

impl SafetyWrapper {
    /// Create a wrapper around an enforcer.
    pub fn new(enforcer: PolicyEnforcer) -> Self {
        Self { enforcer }
    }

    /// The wrapped enforcer.
    pub fn enforcer(&self) -> &PolicyEnforcer {
        &self.enforcer
    }

    /// Screen an inbound prompt before it reaches the AI system.
    pub fn process_request(&self, request: &AiRequest) -> ScreenedRequest {
        let context = request.context();
        let decision = self.enforcer.enforce(&request.prompt, &context);

        let forwarded = if decision.allowed {
            let mut forwarded = request.clone();
            if let Some(ref sanitized) = decision.filter.sanitized_content {
                forwarded.prompt = sanitized.clone();
            }
            Some(forwarded)
        } else {
            None
        };

        ScreenedRequest { forwarded, decision }
    }

    /// Screen a model response before it reaches the user.
    ///
    /// A blocked response is replaced with [`BLOCKED_RESPONSE`]; a sanitized
    /// one carries the masked text.
    pub fn process_response(&self, content: &str, request: &AiRequest) -> ScreenedResponse {
        let context = request.context();
        let decision = self.enforcer.enforce(content, &context);

        let (content, filtered) = if !decision.allowed {
            (BLOCKED_RESPONSE.to_string(), true)
        } else if let Some(ref sanitized) = decision.filter.sanitized_content {
            (sanitized.clone(), true)
        } else {
            (content.to_string(), false)
        };

        ScreenedResponse {
            response: AiResponse {
                content,
                filtered,
                metadata: HashMap::new(),
            },
            decision,
        }
    }
}
