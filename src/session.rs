//! On-disk session storage for collected responses.
//!
//! A session correlates one batch of API calls and their persisted outputs.
//! The root directory is an explicit capability handed in by the caller;
//! nothing here assumes a process-wide relative path.

use crate::constants;
use crate::engine::dispatcher::Payload;
use crate::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    root: PathBuf,
    provider_dir: PathBuf,
}

impl Session {
    /// Opens a session under `root` for the given provider directory name,
    /// generating a fresh id when the caller supplied none. The id is
    /// immutable for the lifetime of the batch.
    pub fn new(root: impl Into<PathBuf>, provider_dir: &str, id: Option<String>) -> Self {
        let root = root.into();
        let id = id
            .filter(|candidate| !candidate.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let provider_dir = root.join(&id).join(provider_dir);
        Self {
            id,
            root,
            provider_dir,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding everything collected for this session.
    #[must_use]
    pub fn dir(&self) -> PathBuf {
        self.root.join(&self.id)
    }

    /// Persists one endpoint's payload under a deterministic folder name:
    /// sanitized endpoint path plus a timestamp, so repeated calls to the
    /// same endpoint within a session land in separate folders.
    ///
    /// # Errors
    ///
    /// Returns `Error::Archive`: a failed write prevents result delivery,
    /// which the batch treats as an overall failure.
    pub fn save_response(&self, endpoint: &str, payload: &Payload) -> Result<PathBuf, Error> {
        let timestamp = chrono::Local::now().format(constants::FOLDER_TIMESTAMP_FORMAT);
        let base_name = format!("{} ({timestamp})", sanitize_endpoint(endpoint));
        let mut folder = self.provider_dir.join(&base_name);
        // Timestamps are millisecond-precision; disambiguate the rare case
        // of two calls landing in the same tick.
        let mut attempt = 1;
        while folder.exists() {
            folder = self.provider_dir.join(format!("{base_name}-{attempt}"));
            attempt += 1;
        }

        fs::create_dir_all(&folder).map_err(|e| Error::Archive {
            reason: format!("could not create {}: {e}", folder.display()),
        })?;

        let file = folder.join(constants::DATA_FILE_NAME);
        fs::write(&file, render_jsonl(payload)?).map_err(|e| Error::Archive {
            reason: format!("could not write {}: {e}", file.display()),
        })?;

        debug!(target: "idpull::session", "saved {endpoint} response to {}", file.display());
        Ok(file)
    }
}

/// Line-delimited JSON rendering: arrays become one object per line, other
/// JSON payloads a single line, text payloads are written verbatim.
fn render_jsonl(payload: &Payload) -> Result<String, Error> {
    match payload {
        Payload::Json(serde_json::Value::Array(items)) => {
            let mut out = String::new();
            for item in items {
                out.push_str(&serde_json::to_string(item)?);
                out.push('\n');
            }
            Ok(out)
        }
        Payload::Json(value) => Ok(format!("{}\n", serde_json::to_string(value)?)),
        Payload::Text(text) => Ok(text.clone()),
    }
}

/// Folder-safe form of an endpoint path: slashes become underscores,
/// leading/trailing slashes are stripped, and the empty path maps to "root".
#[must_use]
pub fn sanitize_endpoint(endpoint: &str) -> String {
    let sanitized = endpoint.trim_matches('/').replace('/', "_");
    if sanitized.is_empty() {
        "root".to_string()
    } else {
        sanitized
    }
}
