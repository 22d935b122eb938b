//! Chat provider request building
//!
//! Turns a chat payload into the command line of a streaming `curl` call.
//! Response handling is left to the caller, which reads the status marker
//! appended after the body.

mod curl;
pub mod format;
pub mod providers;
mod request;

pub use curl::{build_curl_command, parse_status_marker, STATUS_MARKER};
pub use providers::ProviderId;
pub use request::{ChatMessage, ChatPayload, ProviderRequest};
