//! Anthropic Messages API format

use serde_json::Value;

use super::FormatHandler;
use crate::ai::request::{ChatMessage, ChatPayload};

const API_VERSION: &str = "2023-06-01";

pub struct AnthropicFormat {
    base_url: String,
    endpoint: String,
}

impl AnthropicFormat {
    pub fn new() -> Self {
        Self {
            base_url: "https://api.anthropic.com".to_string(),
            endpoint: "/v1/messages".to_string(),
        }
    }
}

impl Default for AnthropicFormat {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatHandler for AnthropicFormat {
    fn default_base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint_url(&self, base_url: &str, _payload: &ChatPayload, _api_key: &str) -> String {
        format!("{}{}", base_url, self.endpoint)
    }

    fn auth_headers(&self, api_key: &str) -> Vec<(String, String)> {
        vec![
            ("x-api-key".to_string(), api_key.to_string()),
            ("anthropic-version".to_string(), API_VERSION.to_string()),
        ]
    }

    /// The API only knows `user` and `assistant`
    fn convert_messages(&self, messages: &[ChatMessage]) -> Vec<Value> {
        messages
            .iter()
            .map(|m| {
                let role = if m.role == "assistant" {
                    "assistant"
                } else {
                    "user"
                };
                serde_json::json!({
                    "role": role,
                    "content": m.content,
                })
            })
            .collect()
    }

    fn build_request_body(&self, payload: &ChatPayload, messages: Vec<Value>) -> Value {
        let mut body = serde_json::json!({
            "messages": messages,
            "max_tokens": payload.max_tokens(),
            "temperature": payload.temperature(),
            "stream": true,
        });

        if let Some(model) = &payload.model {
            body["model"] = serde_json::json!(model);
        }

        body
    }
}
