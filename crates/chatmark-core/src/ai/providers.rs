//! Provider identifiers

use serde::{Deserialize, Serialize};

use super::format::{AnthropicFormat, FormatHandler, GoogleFormat, OpenAiFormat};

/// Chat providers a request can be built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    #[default]
    OpenAi,
    Anthropic,
    Gemini,
    /// Self-hosted or third-party endpoint speaking the OpenAI protocol
    Custom,
}

impl ProviderId {
    /// Parse a provider name. Unknown names fall back to OpenAI, since most
    /// third-party endpoints are OpenAI-compatible.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "anthropic" => ProviderId::Anthropic,
            "gemini" => ProviderId::Gemini,
            "custom" => ProviderId::Custom,
            _ => ProviderId::OpenAi,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "openai",
            ProviderId::Anthropic => "anthropic",
            ProviderId::Gemini => "gemini",
            ProviderId::Custom => "custom",
        }
    }

    /// Format handler shaping requests for this provider
    pub fn format_handler(&self) -> Box<dyn FormatHandler> {
        match self {
            ProviderId::Anthropic => Box::new(AnthropicFormat::new()),
            ProviderId::Gemini => Box::new(GoogleFormat::new()),
            ProviderId::OpenAi | ProviderId::Custom => Box::new(OpenAiFormat::new()),
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
