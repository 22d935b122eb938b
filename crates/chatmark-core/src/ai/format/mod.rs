//! Provider request formats
//!
//! Each handler knows its default host, endpoint, auth headers and body
//! shape. [`FormatHandler::build_request`] ties them together and validates
//! the resulting URL.

mod anthropic;
mod google;
mod openai;

pub use anthropic::AnthropicFormat;
pub use google::GoogleFormat;
pub use openai::OpenAiFormat;

use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::request::{ChatMessage, ChatPayload, ProviderRequest};

pub trait FormatHandler {
    /// Host used when the payload has no base URL
    fn default_base_url(&self) -> &str;

    /// Full endpoint URL for an already normalised base
    fn endpoint_url(&self, base_url: &str, payload: &ChatPayload, api_key: &str) -> String;

    /// Auth and protocol headers, besides `Content-Type`
    fn auth_headers(&self, api_key: &str) -> Vec<(String, String)>;

    fn convert_messages(&self, messages: &[ChatMessage]) -> Vec<Value>;

    fn build_request_body(&self, payload: &ChatPayload, messages: Vec<Value>) -> Value;

    /// Build the full request, or `None` when no valid URL comes out
    fn build_request(&self, payload: &ChatPayload, api_key: &str) -> Option<ProviderRequest> {
        let base_url = payload
            .base_url
            .as_deref()
            .map(normalize_base_url)
            .filter(|base| !base.is_empty())
            .unwrap_or_else(|| self.default_base_url().to_string());

        let endpoint = self.endpoint_url(&base_url, payload, api_key);
        let url = match Url::parse(&endpoint) {
            Ok(url) => url,
            Err(e) => {
                warn!("Cannot build request URL from base {:?}: {}", base_url, e);
                return None;
            }
        };

        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        headers.extend(self.auth_headers(api_key));

        let messages = self.convert_messages(&payload.messages);
        debug!(
            "Built request with {} messages for {}",
            messages.len(),
            url.host_str().unwrap_or("")
        );

        Some(ProviderRequest {
            url: url.to_string(),
            headers,
            body: self.build_request_body(payload, messages),
        })
    }
}

/// Trim whitespace and a single trailing slash
pub fn normalize_base_url(url: &str) -> String {
    let url = url.trim();
    url.strip_suffix('/').unwrap_or(url).to_string()
}
