//! Per-endpoint parameter resolution for a confirmed selection.
//!
//! Pure functions: given a path template and its operation spec, determine
//! which path parameters (from `{name}` tokens) and which query parameters
//! (from the declaration list) need user-supplied values. Display ceilings
//! are the caller's concern; resolution itself is unbounded.

use crate::spec::{HttpMethod, OperationSpec, ParameterDecl, ParameterLocation};
use regex::Regex;

/// One selected endpoint with its resolved parameter requirements. Derived
/// at confirmation time; transient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEntry {
    pub endpoint: String,
    pub method: HttpMethod,
    pub path_params: Vec<String>,
    pub query_params: Vec<ParameterDecl>,
}

/// Builds the parameter-input surface for one selected endpoint.
#[must_use]
pub fn resolve_params(endpoint: &str, spec: &OperationSpec, method: HttpMethod) -> SelectionEntry {
    SelectionEntry {
        endpoint: endpoint.to_string(),
        method,
        path_params: extract_path_params(endpoint),
        query_params: spec
            .parameters
            .iter()
            .filter(|decl| decl.location == ParameterLocation::Query)
            .cloned()
            .collect(),
    }
}

/// Every distinct `{token}` in the path template, in order of first
/// occurrence. A parameter used twice in one path is resolved once.
#[must_use]
pub fn extract_path_params(path: &str) -> Vec<String> {
    let token = Regex::new(r"\{([^{}]+)\}").expect("Regex pattern is hardcoded and valid");
    let mut names = Vec::new();
    for capture in token.captures_iter(path) {
        let name = capture[1].to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}
