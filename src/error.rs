use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to fetch spec from {url}: {reason}")]
    SpecFetch { url: String, reason: String },
    #[error("Failed to parse spec: {reason}")]
    SpecParse { reason: String },
    #[error("Missing value for parameter '{name}' on {endpoint}")]
    MissingParameter { endpoint: String, name: String },
    #[error("Call to {endpoint} failed: {reason}")]
    EndpointCall { endpoint: String, reason: String },
    #[error("Failed to write or archive session data: {reason}")]
    Archive { reason: String },
    #[error("Authentication failed: {reason}")]
    Auth { reason: String },
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Renders the error together with its full source chain, for recording
    /// a per-endpoint failure as data rather than letting it escape the batch.
    #[must_use]
    pub fn chain(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            message.push_str(&format!("\n  caused by: {cause}"));
            source = cause.source();
        }
        message
    }
}
