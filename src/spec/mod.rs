//! In-memory model of a vendor API specification.
//!
//! The set of endpoints, groups, and parameters is discovered at runtime per
//! vendor spec, so everything here is a fixed-shape record keyed by string
//! maps rather than a typed OpenAPI document. Maps are `IndexMap` because
//! document order is significant downstream (grouping and display order).

pub mod fetcher;
pub mod normalizer;

use crate::provider::Provider;
use indexmap::IndexMap;
use std::fmt;
use tracing::warn;

/// Document format of a provider's spec source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecFormat {
    Yaml,
    Json,
}

/// The HTTP methods recognized when walking a spec's `paths` mapping.
/// Anything else under a path entry (e.g. `parameters`, vendor extensions)
/// is not an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    pub const ALL: [Self; 7] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Delete,
        Self::Patch,
        Self::Head,
        Self::Options,
    ];

    /// Matches a `paths` mapping key case-insensitively against the method
    /// enum. Returns `None` for unrecognized keys so callers can skip them.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "get" => Some(Self::Get),
            "post" => Some(Self::Post),
            "put" => Some(Self::Put),
            "delete" => Some(Self::Delete),
            "patch" => Some(Self::Patch),
            "head" => Some(Self::Head),
            "options" => Some(Self::Options),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Self::GET,
            HttpMethod::Post => Self::POST,
            HttpMethod::Put => Self::PUT,
            HttpMethod::Delete => Self::DELETE,
            HttpMethod::Patch => Self::PATCH,
            HttpMethod::Head => Self::HEAD,
            HttpMethod::Options => Self::OPTIONS,
        }
    }
}

/// Where a declared parameter lives. Only `Path` and `Query` participate in
/// resolution; `Header` and `Cookie` declarations are carried but unused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl ParameterLocation {
    /// Parses an OpenAPI `in` field. Unknown locations yield `None` and the
    /// declaration is skipped at normalization time.
    #[must_use]
    pub fn from_spec(value: &str) -> Option<Self> {
        match value {
            "path" => Some(Self::Path),
            "query" => Some(Self::Query),
            "header" => Some(Self::Header),
            "cookie" => Some(Self::Cookie),
            _ => None,
        }
    }
}

/// One declared parameter on an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDecl {
    pub location: ParameterLocation,
    pub name: String,
    pub required: bool,
    pub description: String,
}

/// One operation under a path: summary, description, and the concatenation
/// of path-level followed by operation-level parameter declarations, in
/// declaration order. Duplicates are kept; downstream consumers take the
/// first match by name, so order is significant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationSpec {
    pub summary: String,
    pub description: String,
    pub parameters: Vec<ParameterDecl>,
}

/// path -> method -> operation, in document order. Rebuilt on every spec
/// refresh; never persisted.
pub type EndpointTable = IndexMap<String, IndexMap<HttpMethod, OperationSpec>>;

/// Fetches and normalizes the spec for a provider, degrading to an empty
/// table plus a status message on any fetch or parse failure. This is the
/// "Refresh Endpoints" entry point: failures here are surfaced as text for
/// the caller to display, never propagated.
pub async fn load_endpoints(
    client: &reqwest::Client,
    provider: Provider,
    url_override: Option<&str>,
) -> (EndpointTable, Option<String>) {
    let url = match url_override.map(str::to_string).or_else(|| provider.spec_url()) {
        Some(url) => url,
        None => {
            return (
                EndpointTable::new(),
                Some(format!(
                    "No spec URL configured for {}; set {} or pass --spec-url",
                    provider.label(),
                    provider.spec_url_env()
                )),
            );
        }
    };

    let raw = match fetcher::fetch(client, &url).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("spec fetch failed: {e}");
            return (EndpointTable::new(), Some(e.to_string()));
        }
    };

    match normalizer::normalize(&raw, provider.spec_format()) {
        Ok(table) => (table, None),
        Err(e) => {
            warn!("spec parse failed: {e}");
            (EndpointTable::new(), Some(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_keys_match_case_insensitively() {
        assert_eq!(HttpMethod::from_key("GET"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::from_key("Delete"), Some(HttpMethod::Delete));
        assert_eq!(HttpMethod::from_key("options"), Some(HttpMethod::Options));
        assert_eq!(HttpMethod::from_key("parameters"), None);
        assert_eq!(HttpMethod::from_key("x-okta-tags"), None);
    }

    #[test]
    fn unknown_parameter_location_is_none() {
        assert_eq!(
            ParameterLocation::from_spec("query"),
            Some(ParameterLocation::Query)
        );
        assert_eq!(ParameterLocation::from_spec("body"), None);
    }
}
