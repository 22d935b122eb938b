//! OpenAI chat completions format
//!
//! Also used for custom and unknown providers.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::FormatHandler;
use crate::ai::request::{ChatMessage, ChatPayload};

/// Base URL already ending in a version segment (`.../v1`, `.../v4`)
static VERSIONED_BASE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"/v\d+$").unwrap());

pub struct OpenAiFormat {
    base_url: String,
}

impl OpenAiFormat {
    pub fn new() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
        }
    }
}

impl Default for OpenAiFormat {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatHandler for OpenAiFormat {
    fn default_base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint_url(&self, base_url: &str, _payload: &ChatPayload, _api_key: &str) -> String {
        if VERSIONED_BASE_REGEX.is_match(base_url) {
            format!("{}/chat/completions", base_url)
        } else {
            format!("{}/v1/chat/completions", base_url)
        }
    }

    fn auth_headers(&self, api_key: &str) -> Vec<(String, String)> {
        vec![("Authorization".to_string(), format!("Bearer {}", api_key))]
    }

    fn convert_messages(&self, messages: &[ChatMessage]) -> Vec<Value> {
        messages
            .iter()
            .map(|m| {
                serde_json::json!({
                    "role": m.role,
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
