//! Fixed values shared across the crate.

/// Upper bound on parameter input slots surfaced by the interactive flow.
/// Parameters resolved beyond this ceiling are not prompted for.
pub const MAX_PARAM_SLOTS: usize = 5;

/// Upper bound on endpoint groups shown by the listing and interactive flows.
pub const MAX_GROUPS: usize = 100;

/// Group key for paths with no non-empty segment.
pub const FALLBACK_GROUP: &str = "other";

/// Version prefix stripped from Okta paths before grouping.
pub const OKTA_VERSION_PREFIX: &str = "/api/v1/";

/// Environment variables holding the per-provider spec URLs.
pub const ENV_OKTA_SPEC: &str = "OKTA_API_SPEC";
pub const ENV_IDENTITY_NOW_SPEC: &str = "IDENTITY_NOW_API_SPEC";
pub const ENV_IIQ_SPEC: &str = "IIQ_API_SPEC";

/// Environment variable controlling the log filter when no `-v` flag is given.
pub const ENV_LOG: &str = "IDPULL_LOG";

/// Default directory holding per-session response data.
pub const DEFAULT_SESSION_ROOT: &str = "sessions";

/// File name for the line-delimited JSON payload inside each response folder.
pub const DATA_FILE_NAME: &str = "data.jsonl";

/// Timestamp format for response folder names. Millisecond precision so
/// repeated calls to one endpoint within a session cannot collide.
pub const FOLDER_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S%.3f";

/// HTTP client timeout in seconds (transport default, no per-call override).
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Relative path of the OAuth token endpoint used by the
/// client-credentials exchange.
pub const OAUTH_TOKEN_PATH: &str = "/oauth/token";

/// Default grant type for the client-credentials exchange.
pub const DEFAULT_GRANT_TYPE: &str = "client_credentials";
