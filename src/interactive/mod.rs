//! Guided terminal flow: pick a provider, refresh and browse endpoints,
//! select a subset, supply parameter values and credentials, run the batch.
//!
//! The flow is the display layer over the discovery pipeline; the ceilings
//! here (`MAX_GROUPS`, `MAX_PARAM_SLOTS`) bound what is *shown and prompted
//! for*, never what the resolver computes.

pub mod mock;

use crate::auth::AuthContext;
use crate::constants;
use crate::engine::dispatcher::{self, BatchResult};
use crate::engine::grouper;
use crate::engine::resolver::{self, SelectionEntry};
use crate::error::Error;
use crate::output::Output;
use crate::provider::Provider;
use crate::session::Session;
use crate::spec::{self, EndpointTable, HttpMethod};
use mock::Console;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// Maximum accepted input length.
const MAX_INPUT_LENGTH: usize = 1024;

/// Retry attempts for invalid input before giving up.
const MAX_RETRIES: usize = 3;

/// Reads one trimmed line, rejecting oversized input and control characters.
pub fn prompt<C: Console>(console: &C, message: &str) -> Result<String, Error> {
    console.write(message)?;
    let input = console.read_line()?;
    let trimmed = input.trim();

    if trimmed.len() > MAX_INPUT_LENGTH {
        return Err(Error::Config(format!(
            "input too long: {} characters (maximum: {MAX_INPUT_LENGTH})",
            trimmed.len()
        )));
    }
    if trimmed.chars().any(|c| c.is_control() && c != '\t') {
        return Err(Error::Config(
            "input contains invalid control characters".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Prompts until a non-empty value is given, up to the retry limit.
pub fn prompt_required<C: Console>(console: &C, message: &str) -> Result<String, Error> {
    for attempt in 1..=MAX_RETRIES {
        let value = prompt(console, message)?;
        if !value.is_empty() {
            return Ok(value);
        }
        if attempt < MAX_RETRIES {
            console.write_line("A value is required.")?;
        }
    }
    Err(Error::Config(format!(
        "maximum retry attempts ({MAX_RETRIES}) exceeded"
    )))
}

/// Presents numbered options and returns the chosen index.
pub fn select_option<C: Console>(
    console: &C,
    message: &str,
    options: &[&str],
) -> Result<usize, Error> {
    if options.is_empty() {
        return Err(Error::Config("no options available".to_string()));
    }

    console.write_line(message)?;
    for (i, option) in options.iter().enumerate() {
        console.write_line(&format!("  {}: {option}", i + 1))?;
    }

    for attempt in 1..=MAX_RETRIES {
        let input = prompt(console, "Enter your choice (number): ")?;
        if let Ok(n) = input.parse::<usize>() {
            if n >= 1 && n <= options.len() {
                return Ok(n - 1);
            }
        }
        if attempt < MAX_RETRIES {
            console.write_line(&format!(
                "Invalid selection. Enter a number between 1 and {}.",
                options.len()
            ))?;
        }
    }
    Err(Error::Config(format!(
        "maximum retry attempts ({MAX_RETRIES}) exceeded"
    )))
}

/// Parses a comma-separated list of 1-based indices, dropping out-of-range
/// and duplicate entries while keeping first-mention order.
#[must_use]
pub fn parse_selection_list(input: &str, len: usize) -> Vec<usize> {
    let mut picked = Vec::new();
    for piece in input.split(',') {
        if let Ok(n) = piece.trim().parse::<usize>() {
            if n >= 1 && n <= len {
                let index = n - 1;
                if !picked.contains(&index) {
                    picked.push(index);
                }
            }
        }
    }
    picked
}

/// One line of the numbered endpoint listing: the callable path and its
/// display label.
struct ListingRow {
    path: String,
    label: String,
}

/// Flattens the grouped GET endpoints into a numbered listing, honoring the
/// group display ceiling.
fn build_listing(table: &EndpointTable, provider: Provider) -> Vec<ListingRow> {
    let groups = grouper::group(table, provider);
    let mut rows = Vec::new();

    for (i, (group_key, paths)) in groups.iter().enumerate() {
        if i >= constants::MAX_GROUPS {
            debug!(
                "group ceiling reached; {} group(s) not shown",
                groups.len() - constants::MAX_GROUPS
            );
            break;
        }
        for path in paths {
            if let Some(operation) = table.get(path).and_then(|ops| ops.get(&HttpMethod::Get)) {
                let summary = if operation.summary.is_empty() {
                    "No summary"
                } else {
                    &operation.summary
                };
                rows.push(ListingRow {
                    path: path.clone(),
                    label: format!("[{group_key}] {path} | GET - {summary}"),
                });
            }
        }
    }
    rows
}

/// Prompts for values for each selection's parameters, respecting the
/// global input-slot ceiling. Parameters beyond the ceiling are resolved
/// but not surfaced for input.
fn prompt_parameter_values<C: Console>(
    console: &C,
    selections: &[SelectionEntry],
) -> Result<HashMap<String, String>, Error> {
    let mut values = HashMap::new();
    let mut slots_used = 0usize;

    for selection in selections {
        for name in &selection.path_params {
            if slots_used >= constants::MAX_PARAM_SLOTS {
                debug!("parameter slot ceiling reached; '{name}' not prompted");
                continue;
            }
            if values.contains_key(name) {
                continue;
            }
            console.write_line(&format!("Endpoint: {} - Path Parameter", selection.endpoint))?;
            let value =
                prompt_required(console, &format!("Enter path parameter '{name}': "))?;
            values.insert(name.clone(), value);
            slots_used += 1;
        }

        for decl in &selection.query_params {
            if slots_used >= constants::MAX_PARAM_SLOTS {
                debug!("parameter slot ceiling reached; '{}' not prompted", decl.name);
                continue;
            }
            if values.contains_key(&decl.name) {
                continue;
            }
            console.write_line(&format!(
                "Endpoint: {} - Query Parameter",
                selection.endpoint
            ))?;
            if !decl.description.is_empty() {
                console.write_line(&format!("  {}", decl.description))?;
            }
            let value = if decl.required {
                prompt_required(
                    console,
                    &format!("Enter query parameter '{}' (Required): ", decl.name),
                )?
            } else {
                prompt(
                    console,
                    &format!("Enter query parameter '{}' (Optional): ", decl.name),
                )?
            };
            slots_used += 1;
            if value.is_empty() {
                continue;
            }
            values.insert(decl.name.clone(), value);
        }
    }
    Ok(values)
}

/// Prompts for the provider's credentials.
fn prompt_auth<C: Console>(console: &C, provider: Provider) -> Result<AuthContext, Error> {
    match provider {
        Provider::Okta => Ok(AuthContext::Ssws {
            token: prompt_required(console, "Enter Okta API Token: ")?,
        }),
        Provider::IdentityNow => {
            let grant_type = prompt(
                console,
                &format!(
                    "Enter grant_type [{}]: ",
                    constants::DEFAULT_GRANT_TYPE
                ),
            )?;
            let grant_type = if grant_type.is_empty() {
                constants::DEFAULT_GRANT_TYPE.to_string()
            } else {
                grant_type
            };
            Ok(AuthContext::client_credentials(
                grant_type,
                prompt_required(console, "Enter client_id: ")?,
                prompt_required(console, "Enter client_secret: ")?,
            ))
        }
        Provider::Iiq => Ok(AuthContext::Basic {
            username: prompt_required(console, "Enter IIQ Username: ")?,
            password: prompt_required(console, "Enter IIQ Password: ")?,
        }),
    }
}

/// Runs the whole guided flow. Returns without error when there is nothing
/// to do (no endpoints discovered, nothing selected).
pub async fn run_flow<C: Console>(
    console: &C,
    client: &reqwest::Client,
    provider: Option<Provider>,
    spec_url: Option<&str>,
    session_root: PathBuf,
    session_id: Option<String>,
    output: &Output,
) -> Result<(), Error> {
    let provider = match provider {
        Some(p) => p,
        None => {
            let labels: Vec<&str> = Provider::ALL.iter().map(|p| p.label()).collect();
            Provider::ALL[select_option(console, "Choose API Spec", &labels)?]
        }
    };

    output.info(format!("Refreshing endpoints for {}...", provider.label()));
    let (table, diagnostic) = spec::load_endpoints(client, provider, spec_url).await;
    if let Some(message) = diagnostic {
        console.write_line(&format!("⚠️ {message}"))?;
    }
    if table.is_empty() {
        console.write_line("⚠️ No endpoints found")?;
        return Ok(());
    }

    let listing = build_listing(&table, provider);
    if listing.is_empty() {
        console.write_line("⚠️ No GET endpoints found")?;
        return Ok(());
    }

    for (i, row) in listing.iter().enumerate() {
        console.write_line(&format!("  {}: {}", i + 1, row.label))?;
    }
    let picked = parse_selection_list(
        &prompt_required(console, "Select endpoints (comma-separated numbers): ")?,
        listing.len(),
    );
    if picked.is_empty() {
        console.write_line("Nothing selected.")?;
        return Ok(());
    }

    let selections: Vec<SelectionEntry> = picked
        .iter()
        .map(|&i| {
            let path = &listing[i].path;
            let operation = table
                .get(path)
                .and_then(|ops| ops.get(&HttpMethod::Get))
                .cloned()
                .unwrap_or_default();
            resolver::resolve_params(
                &provider.canonical_endpoint(path),
                &operation,
                HttpMethod::Get,
            )
        })
        .collect();

    let values = prompt_parameter_values(console, &selections)?;
    let mut auth = prompt_auth(console, provider)?;
    let base_url = prompt_required(console, "Enter API Base URL: ")?;
    let session_id = match session_id {
        Some(id) => Some(id),
        None => {
            let entered = prompt(console, "Enter session id (blank for a new session): ")?;
            (!entered.is_empty()).then_some(entered)
        }
    };

    let session = Session::new(session_root, provider.dir_name(), session_id);
    let BatchResult {
        responses,
        archive_path,
        session_id,
    } = dispatcher::dispatch(client, &selections, &values, &mut auth, &base_url, &session).await?;

    console.write_line(&serde_json::to_string_pretty(&responses)?)?;
    output.info(format!("Session id: {session_id}"));
    output.info(format!("Archive: {}", archive_path.display()));
    output.success(format!("✅ {} API calls complete!", provider.label()));
    Ok(())
}
