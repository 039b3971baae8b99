//! Wire types for the form agent's REST surface

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize)]
pub struct StartSessionRequest {
    pub session_id: String,
    pub form_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartSessionResponse {
    pub session_id: String,
    pub next_question: Option<String>,
    #[serde(default)]
    pub is_complete: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnRequest {
    pub session_id: String,
    pub user_text: String,
}

/// One agent turn. `field_updates` is kept as raw JSON: the agent reports
/// plain strings or status-wrapped values, and the merge layer decides
/// per-field what to accept.
#[derive(Debug, Clone, Deserialize)]
pub struct TurnResponse {
    pub agent_reply: String,
    pub audio_url: Option<String>,
    #[serde(default, alias = "form_state")]
    pub field_updates: Value,
    #[serde(default)]
    pub is_complete: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResetRequest {
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitRequest {
    pub session_id: String,
    pub responses: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub id: String,
    pub confirmation_message: Option<String>,
}

/// Entry in the predefined template list
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateSummary {
    pub key: String,
    pub title: String,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_turn_response_accepts_form_state_alias() {
        let response: TurnResponse = serde_json::from_value(json!({
            "agent_reply": "What's your email?",
            "form_state": {"full_name": "Ada"},
            "is_complete": false
        }))
        .unwrap();

        assert_eq!(response.agent_reply, "What's your email?");
        assert_eq!(response.field_updates["full_name"], "Ada");
        assert!(response.audio_url.is_none());
    }

    #[test]
    fn test_turn_response_defaults() {
        let response: TurnResponse =
            serde_json::from_value(json!({"agent_reply": "hi"})).unwrap();
        assert!(response.field_updates.is_null());
        assert!(!response.is_complete);
    }

    #[test]
    fn test_turn_request_shape() {
        let request = TurnRequest {
            session_id: "abc".to_string(),
            user_text: "my name is Ada".to_string(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["session_id"], "abc");
        assert_eq!(value["user_text"], "my name is Ada");
    }
}
