use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids;

pub const DEFAULT_USER_ID: &str = "user-123";
pub const DEFAULT_SESSION_ID: &str = "session-456";

/// One simulated LLM invocation, as it goes over the wire. Optional fields are
/// omitted from the payload entirely when unset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TelemetryRecord {
    pub timestamp: DateTime<Utc>,
    pub service_name: String,
    pub model_name: String,
    pub latency_ms: f64,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
    pub cost_usd: f64,
    pub user_id: String,
    pub session_id: String,
    pub request_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, serde_json::Value>>,
}

/// Builder for [`TelemetryRecord`]. `total_tokens` is always computed from the
/// prompt and completion counts; it cannot be set by callers.
#[derive(Debug, Clone)]
pub struct RecordDraft {
    service_name: String,
    model_name: String,
    latency_ms: f64,
    prompt_tokens: u32,
    completion_tokens: u32,
    cost_usd: f64,
    user_id: Option<String>,
    session_id: Option<String>,
    request_id: Option<String>,
    prompt_text: Option<String>,
    response_text: Option<String>,
    metadata: Option<BTreeMap<String, serde_json::Value>>,
}

impl RecordDraft {
    pub fn new(
        service_name: impl Into<String>,
        model_name: impl Into<String>,
        latency_ms: f64,
        prompt_tokens: u32,
        completion_tokens: u32,
        cost_usd: f64,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            model_name: model_name.into(),
            latency_ms,
            prompt_tokens,
            completion_tokens,
            cost_usd,
            user_id: None,
            session_id: None,
            request_id: None,
            prompt_text: None,
            response_text: None,
            metadata: None,
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_prompt_text(mut self, text: impl Into<String>) -> Self {
        self.prompt_text = Some(text.into());
        self
    }

    pub fn with_response_text(mut self, text: impl Into<String>) -> Self {
        self.response_text = Some(text.into());
        self
    }

    pub fn with_metadata(mut self, metadata: BTreeMap<String, serde_json::Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn build(self) -> TelemetryRecord {
        TelemetryRecord {
            timestamp: Utc::now(),
            total_tokens: self.prompt_tokens + self.completion_tokens,
            service_name: self.service_name,
            model_name: self.model_name,
            latency_ms: self.latency_ms,
            prompt_tokens: self.prompt_tokens,
            completion_tokens: self.completion_tokens,
            cost_usd: self.cost_usd,
            user_id: self.user_id.unwrap_or_else(|| DEFAULT_USER_ID.to_string()),
            session_id: self
                .session_id
                .unwrap_or_else(|| DEFAULT_SESSION_ID.to_string()),
            request_id: self.request_id.unwrap_or_else(ids::request_id),
            prompt_text: self.prompt_text,
            response_text: self.response_text,
            metadata: self.metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> RecordDraft {
        RecordDraft::new("chat-api", "gpt-4", 1000.0, 100, 200, 0.015)
    }

    #[test]
    fn totals_tokens_at_build_time() {
        let record = draft().build();
        assert_eq!(record.total_tokens, 300);
        assert_eq!(
            record.total_tokens,
            record.prompt_tokens + record.completion_tokens
        );
    }

    #[test]
    fn fills_defaults_when_unset() {
        let record = draft().build();
        assert_eq!(record.user_id, DEFAULT_USER_ID);
        assert_eq!(record.session_id, DEFAULT_SESSION_ID);
        assert!(record.request_id.starts_with("req-"));
        assert!(record.prompt_text.is_none());
        assert!(record.response_text.is_none());
        assert!(record.metadata.is_none());
    }

    #[test]
    fn keeps_supplied_identifiers() {
        let record = draft()
            .with_user_id("user-7")
            .with_session_id("session-9")
            .with_request_id("req-custom")
            .build();
        assert_eq!(record.user_id, "user-7");
        assert_eq!(record.session_id, "session-9");
        assert_eq!(record.request_id, "req-custom");
    }

    #[test]
    fn serializes_without_absent_optional_fields() {
        let record = draft().with_request_id("req-1").build();
        let json = serde_json::to_value(&record).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("timestamp"));
        assert!(obj.contains_key("service_name"));
        assert!(obj.contains_key("total_tokens"));
        assert!(!obj.contains_key("prompt_text"));
        assert!(!obj.contains_key("response_text"));
        assert!(!obj.contains_key("metadata"));
    }

    #[test]
    fn serializes_optional_fields_when_present() {
        let mut metadata = BTreeMap::new();
        metadata.insert("region".to_string(), serde_json::json!("us-east-1"));
        let record = draft()
            .with_prompt_text("hello")
            .with_response_text("world")
            .with_metadata(metadata)
            .build();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["prompt_text"], "hello");
        assert_eq!(json["response_text"], "world");
        assert_eq!(json["metadata"]["region"], "us-east-1");
    }

    #[test]
    fn round_trips_through_json() {
        let record = draft().with_prompt_text("hi").build();
        let json = serde_json::to_string(&record).unwrap();
        let parsed: TelemetryRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, parsed);
    }
}
