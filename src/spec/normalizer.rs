//! Normalization of a raw spec document into an [`EndpointTable`].
//!
//! Vendor specs arrive as YAML or JSON with an OpenAPI-style `paths`
//! mapping. Both formats are walked through a single `serde_yaml::Value`
//! view; JSON documents are bridged into it after parsing so that one
//! traversal serves both. Insertion order of the underlying mappings is
//! preserved end to end, which is what makes grouping deterministic.

use crate::error::Error;
use crate::spec::{
    EndpointTable, HttpMethod, OperationSpec, ParameterDecl, ParameterLocation, SpecFormat,
};
use indexmap::IndexMap;
use serde_yaml::Value;

/// Parses `raw` per the declared format and builds the endpoint table.
///
/// # Errors
///
/// Returns `Error::SpecParse` when the document is malformed or lacks a
/// top-level `paths` mapping. Callers degrade to an empty table plus a
/// diagnostic; nothing here panics on hostile input.
pub fn normalize(raw: &str, format: SpecFormat) -> Result<EndpointTable, Error> {
    let document = parse_document(raw, format)?;

    let paths = document
        .get("paths")
        .and_then(Value::as_mapping)
        .ok_or_else(|| Error::SpecParse {
            reason: "document has no top-level `paths` mapping".to_string(),
        })?;

    let mut table = EndpointTable::new();
    for (path_key, methods) in paths {
        let Some(path) = path_key.as_str() else {
            continue;
        };
        // The path stays in the table even when it carries no operations, so
        // grouping sees every path the document declares.
        let operations = table.entry(path.to_string()).or_insert_with(IndexMap::new);

        let Some(methods) = methods.as_mapping() else {
            continue;
        };

        // Parameters declared on the path item itself apply to every
        // operation beneath it and precede the operation's own list.
        let path_level = methods
            .get("parameters")
            .map(parse_parameter_list)
            .unwrap_or_default();

        for (method_key, details) in methods {
            let Some(method) = method_key.as_str().and_then(HttpMethod::from_key) else {
                continue;
            };

            let mut parameters = path_level.clone();
            parameters.extend(
                details
                    .get("parameters")
                    .map(parse_parameter_list)
                    .unwrap_or_default(),
            );

            operations.insert(
                method,
                OperationSpec {
                    summary: string_field(details, "summary"),
                    description: string_field(details, "description"),
                    parameters,
                },
            );
        }
    }

    Ok(table)
}

fn parse_document(raw: &str, format: SpecFormat) -> Result<Value, Error> {
    match format {
        SpecFormat::Yaml => serde_yaml::from_str(raw).map_err(|e| Error::SpecParse {
            reason: format!("invalid YAML: {e}"),
        }),
        SpecFormat::Json => {
            let json: serde_json::Value =
                serde_json::from_str(raw).map_err(|e| Error::SpecParse {
                    reason: format!("invalid JSON: {e}"),
                })?;
            serde_yaml::to_value(json).map_err(|e| Error::SpecParse {
                reason: format!("unrepresentable JSON document: {e}"),
            })
        }
    }
}

/// Reads a declaration list. Entries that are not mappings, lack a name, or
/// declare an unrecognized location are skipped; everything else is kept in
/// declaration order, duplicates included.
fn parse_parameter_list(value: &Value) -> Vec<ParameterDecl> {
    let Some(entries) = value.as_sequence() else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let name = entry.get("name")?.as_str()?;
            let location = entry
                .get("in")
                .and_then(Value::as_str)
                .and_then(ParameterLocation::from_spec)?;
            Some(ParameterDecl {
                location,
                name: name.to_string(),
                required: entry
                    .get("required")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
                description: string_field(entry, "description"),
            })
        })
        .collect()
}

fn string_field(value: &Value, field: &str) -> String {
    value
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
