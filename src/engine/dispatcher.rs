//! Sequential invocation of a selected endpoint batch.
//!
//! One call at a time, in selection order. A failure on one endpoint
//! (missing parameter, transport error, non-2xx status) is recorded as that
//! endpoint's outcome and the loop moves on; only a failure to persist or
//! archive the session data aborts the batch, since that prevents result
//! delivery.

use crate::archive;
use crate::auth::AuthContext;
use crate::constants;
use crate::engine::resolver::SelectionEntry;
use crate::error::Error;
use crate::logging;
use crate::session::Session;
use indexmap::IndexMap;
use serde::ser::Serializer;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// Decoded response body for one successful call.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(serde_json::Value),
    Text(String),
}

/// Outcome of one endpoint invocation. Serializes to the payload itself on
/// success and to the error string on failure, mirroring the response map
/// handed to the display layer.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    Success(Payload),
    Failure(String),
}

impl Serialize for CallOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Success(Payload::Json(value)) => value.serialize(serializer),
            Self::Success(Payload::Text(text)) => serializer.serialize_str(text),
            Self::Failure(message) => serializer.serialize_str(message),
        }
    }
}

/// Everything a finished batch hands back: the in-memory response map, the
/// session archive, and the session id for cross-call correlation.
#[derive(Debug)]
pub struct BatchResult {
    pub responses: IndexMap<String, CallOutcome>,
    pub archive_path: PathBuf,
    pub session_id: String,
}

/// Builds an HTTP client with the default transport timeout.
///
/// # Errors
///
/// Returns `Error::Config` if the TLS backend cannot be initialized.
pub fn build_http_client() -> Result<reqwest::Client, Error> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(constants::HTTP_TIMEOUT_SECS))
        .build()
        .map_err(|e| Error::Config(format!("failed to create HTTP client: {e}")))
}

/// Prefixes `https://` when the base URL carries no scheme and reconciles
/// the slash between base and endpoint path.
#[must_use]
pub fn build_url(base_url: &str, endpoint: &str) -> String {
    let base = if base_url.contains("://") {
        base_url.to_string()
    } else {
        format!("https://{base_url}")
    };
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

/// Replaces every `{name}` token with its URL-encoded resolved value.
///
/// # Errors
///
/// Returns `Error::MissingParameter` for the first token with no resolved
/// value; the caller records it as that endpoint's outcome.
pub fn substitute_path_params(
    endpoint: &str,
    values: &HashMap<String, String>,
) -> Result<String, Error> {
    let mut path = endpoint.to_string();
    for name in crate::engine::resolver::extract_path_params(endpoint) {
        let value = values.get(&name).ok_or_else(|| Error::MissingParameter {
            endpoint: endpoint.to_string(),
            name: name.clone(),
        })?;
        path = path.replace(&format!("{{{name}}}"), &urlencoding::encode(value));
    }
    Ok(path)
}

/// Collects the query pairs to append for one selection. Unsupplied optional
/// parameters are omitted; an unsupplied required one fails the endpoint.
fn build_query_pairs(
    selection: &SelectionEntry,
    values: &HashMap<String, String>,
) -> Result<Vec<(String, String)>, Error> {
    let mut pairs = Vec::new();
    for decl in &selection.query_params {
        match values.get(&decl.name) {
            Some(value) => pairs.push((decl.name.clone(), value.clone())),
            None if decl.required => {
                return Err(Error::MissingParameter {
                    endpoint: selection.endpoint.clone(),
                    name: decl.name.clone(),
                });
            }
            None => {}
        }
    }
    Ok(pairs)
}

/// Invokes every selected endpoint in order, persisting each successful
/// payload to the session before moving on, then archives the session
/// directory.
///
/// # Errors
///
/// Only `Error::Archive` escapes (persisting or zipping session data
/// failed). Per-endpoint failures are data in the returned response map.
pub async fn dispatch(
    client: &reqwest::Client,
    selections: &[SelectionEntry],
    values: &HashMap<String, String>,
    auth: &mut AuthContext,
    base_url: &str,
    session: &Session,
) -> Result<BatchResult, Error> {
    let mut responses = IndexMap::new();

    for selection in selections {
        match call_endpoint(client, selection, values, auth, base_url).await {
            Ok(payload) => {
                session.save_response(&selection.endpoint, &payload)?;
                responses.insert(selection.endpoint.clone(), CallOutcome::Success(payload));
            }
            Err(e) => {
                warn!(target: "idpull::dispatcher", "{} failed: {e}", selection.endpoint);
                responses.insert(
                    selection.endpoint.clone(),
                    CallOutcome::Failure(format!("Error: {}", e.chain())),
                );
            }
        }
    }

    let archive_path = archive::zip_session(session)?;
    info!(
        target: "idpull::dispatcher",
        "batch of {} call(s) archived to {}",
        selections.len(),
        archive_path.display()
    );

    Ok(BatchResult {
        responses,
        archive_path,
        session_id: session.id().to_string(),
    })
}

async fn call_endpoint(
    client: &reqwest::Client,
    selection: &SelectionEntry,
    values: &HashMap<String, String>,
    auth: &mut AuthContext,
    base_url: &str,
) -> Result<Payload, Error> {
    let path = substitute_path_params(&selection.endpoint, values)?;
    let url = build_url(base_url, &path);
    let query = build_query_pairs(selection, values)?;
    let headers = auth.headers(client, base_url).await?;

    logging::log_request(selection.method.as_str(), &url, Some(&headers));
    let started = Instant::now();

    let response = client
        .request(selection.method.into(), &url)
        .headers(headers)
        .query(&query)
        .send()
        .await
        .map_err(|e| Error::EndpointCall {
            endpoint: selection.endpoint.clone(),
            reason: e.to_string(),
        })?;

    let status = response.status();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body = response.text().await.map_err(|e| Error::EndpointCall {
        endpoint: selection.endpoint.clone(),
        reason: format!("failed to read response body: {e}"),
    })?;

    logging::log_response(status.as_u16(), started.elapsed().as_millis(), &body);

    if !status.is_success() {
        return Err(Error::EndpointCall {
            endpoint: selection.endpoint.clone(),
            reason: format!("HTTP {status}: {body}"),
        });
    }

    if content_type.starts_with("application/json") {
        match serde_json::from_str(&body) {
            Ok(value) => Ok(Payload::Json(value)),
            // Declared JSON but undecodable; keep the raw text rather than
            // failing a call that the server answered successfully.
            Err(_) => Ok(Payload::Text(body)),
        }
    } else {
        Ok(Payload::Text(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_is_defaulted_and_slashes_reconciled() {
        assert_eq!(
            build_url("example.com", "/users/42"),
            "https://example.com/users/42"
        );
        assert_eq!(
            build_url("https://example.com/", "/users"),
            "https://example.com/users"
        );
        assert_eq!(
            build_url("http://localhost:8080", "users"),
            "http://localhost:8080/users"
        );
    }

    #[test]
    fn substitution_encodes_values() {
        let mut values = HashMap::new();
        values.insert("id".to_string(), "a b/c".to_string());
        let path = substitute_path_params("/users/{id}", &values).unwrap();
        assert_eq!(path, "/users/a%20b%2Fc");
    }

    #[test]
    fn substitution_reports_the_missing_token() {
        let values = HashMap::new();
        let err = substitute_path_params("/users/{id}", &values).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingParameter { name, .. } if name == "id"
        ));
    }

    #[test]
    fn repeated_token_is_replaced_everywhere() {
        let mut values = HashMap::new();
        values.insert("id".to_string(), "7".to_string());
        let path = substitute_path_params("/users/{id}/clones/{id}", &values).unwrap();
        assert_eq!(path, "/users/7/clones/7");
    }

    #[test]
    fn failure_outcome_serializes_to_its_message() {
        let outcome = CallOutcome::Failure("Error: boom".to_string());
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            serde_json::json!("Error: boom")
        );
    }
}
