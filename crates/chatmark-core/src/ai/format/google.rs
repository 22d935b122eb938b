//! Google Gemini streaming format
//!
//! The API key travels as a query parameter rather than a header.

use serde_json::Value;
use url::Url;

use super::FormatHandler;
use crate::ai::request::{ChatMessage, ChatPayload};

const DEFAULT_MODEL: &str = "gemini-1.5-flash";

pub struct GoogleFormat {
    base_url: String,
}

impl GoogleFormat {
    pub fn new() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
        }
    }
}

impl Default for GoogleFormat {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatHandler for GoogleFormat {
    fn default_base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint_url(&self, base_url: &str, payload: &ChatPayload, api_key: &str) -> String {
        let model = payload.model.as_deref().unwrap_or(DEFAULT_MODEL);
        let endpoint = format!("{}/v1beta/models/{}:streamGenerateContent", base_url, model);
        match Url::parse(&endpoint) {
            Ok(mut url) => {
                url.query_pairs_mut().append_pair("key", api_key);
                url.into()
            }
            // Rejected again by `build_request`
            Err(_) => endpoint,
        }
    }

    fn auth_headers(&self, _api_key: &str) -> Vec<(String, String)> {
        Vec::new()
    }

    /// `user` stays, every other role becomes `model`
    fn convert_messages(&self, messages: &[ChatMessage]) -> Vec<Value> {
        messages
            .iter()
            .map(|m| {
                let role = if m.role == "user" { "user" } else { "model" };
                serde_json::json!({
                    "role": role,
                    "parts": [{"text": m.content}],
                })
            })
            .collect()
    }

    fn build_request_body(&self, payload: &ChatPayload, messages: Vec<Value>) -> Value {
        serde_json::json!({
            "contents": messages,
            "generationConfig": {
                "temperature": payload.temperature(),
                "maxOutputTokens": payload.max_tokens(),
            },
            "stream": true,
        })
    }
}
