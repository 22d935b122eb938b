//! `curl` command lines for streaming chat requests

use tracing::{debug, info};
use url::form_urlencoded;

use super::providers::ProviderId;
use super::request::ChatPayload;

/// Prefix of the line `curl -w` appends after the response body
pub const STATUS_MARKER: &str = "HTTP_STATUS:";

const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Build the argument vector for a streaming `curl` call
///
/// `provider` is a name as accepted by [`ProviderId::parse`]. Returns `None`
/// when no valid URL can be built from the payload's base URL.
pub fn build_curl_command(provider: &str, payload: &ChatPayload, api_key: &str) -> Option<Vec<String>> {
    let provider = ProviderId::parse(provider);
    let request = provider.format_handler().build_request(payload, api_key)?;
    info!("Building {} request to {}", provider, redact_key(&request.url, api_key));

    let mut cmd: Vec<String> = [
        "curl",
        "-sS",
        "--no-buffer",
        "--show-error",
        "--connect-timeout",
    ]
    .iter()
    .map(|arg| arg.to_string())
    .collect();
    cmd.push(CONNECT_TIMEOUT_SECS.to_string());
    cmd.push("--max-time".to_string());
    cmd.push(payload.timeout().to_string());
    cmd.push("--compressed".to_string());
    cmd.push("-w".to_string());
    cmd.push(format!("\\n{}%{{http_code}}\\n", STATUS_MARKER));

    for (name, value) in &request.headers {
        cmd.push("-H".to_string());
        cmd.push(format!("{}: {}", name, value));
    }

    cmd.push("-d".to_string());
    cmd.push(request.body.to_string());
    cmd.push(request.url);

    debug!("curl command has {} arguments", cmd.len());
    Some(cmd)
}

/// Read the HTTP status from a line produced by the `-w` format
pub fn parse_status_marker(line: &str) -> Option<u16> {
    line.trim().strip_prefix(STATUS_MARKER)?.trim().parse().ok()
}

/// Hide a key carried in the URL, raw or query-encoded, before it reaches
/// the logs
fn redact_key(url: &str, api_key: &str) -> String {
    if api_key.is_empty() {
        return url.to_string();
    }
    let encoded: String = form_urlencoded::byte_serialize(api_key.as_bytes()).collect();
    url.replace(&encoded, "***").replace(api_key, "***")
}
