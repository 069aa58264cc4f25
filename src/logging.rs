//! Tracing setup and HTTP call logging with credential redaction.

use tracing::{debug, info, trace};
use tracing_subscriber::EnvFilter;

/// Initializes the subscriber from the `-v` count, falling back to the
/// `IDPULL_LOG` filter and then to errors only.
pub fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => std::env::var(crate::constants::ENV_LOG).unwrap_or_else(|_| "error".to_string()),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };

    let env_filter = EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("error"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Headers whose values must never reach the log output.
#[must_use]
pub fn should_redact_header(header_name: &str) -> bool {
    matches!(
        header_name.to_lowercase().as_str(),
        "authorization" | "x-api-key" | "x-auth-token" | "api-key" | "token" | "password"
    )
}

/// Logs an outgoing request: method and URL at info, headers (redacted
/// where sensitive) at debug.
pub fn log_request(method: &str, url: &str, headers: Option<&reqwest::header::HeaderMap>) {
    info!(target: "idpull::dispatcher", "→ {method} {url}");

    let Some(header_map) = headers else {
        return;
    };
    for (name, value) in header_map {
        let header_value = if should_redact_header(name.as_str()) {
            "[REDACTED]"
        } else {
            value.to_str().unwrap_or("<binary>")
        };
        debug!(target: "idpull::dispatcher", "  {}: {}", name.as_str(), header_value);
    }
}

/// Logs a response: status and duration at info, body at trace.
pub fn log_response(status: u16, duration_ms: u128, body: &str) {
    info!(target: "idpull::dispatcher", "← {status} ({duration_ms}ms)");
    trace!(target: "idpull::dispatcher", "Response body: {body}");
}
