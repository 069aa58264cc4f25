//! Grouping of normalized endpoints by resource name.

use crate::constants;
use crate::provider::Provider;
use crate::spec::EndpointTable;
use indexmap::IndexMap;

/// group key -> paths, both in table (document) order. Every path in the
/// table lands in exactly one bucket.
pub type EndpointGroups = IndexMap<String, Vec<String>>;

/// Buckets every path in the table under its first non-empty path segment,
/// after the provider's prefix-stripping rule. Identical input always yields
/// identical structure and ordering.
#[must_use]
pub fn group(table: &EndpointTable, provider: Provider) -> EndpointGroups {
    let mut groups = EndpointGroups::new();
    for path in table.keys() {
        groups
            .entry(group_key(path, provider.group_prefix()))
            .or_default()
            .push(path.clone());
    }
    groups
}

/// First `/`-delimited non-empty segment of the path, after stripping the
/// provider prefix when present. Paths with no non-empty segment fall back
/// to the sentinel group.
fn group_key(path: &str, strip_prefix: Option<&str>) -> String {
    let effective = strip_prefix
        .and_then(|prefix| path.strip_prefix(prefix))
        .unwrap_or(path);

    effective
        .split('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or(constants::FALLBACK_GROUP)
        .to_string()
}
