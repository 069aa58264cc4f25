use crate::constants;
use crate::provider::Provider;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "idpull: batch data puller for identity-management REST APIs",
    long_about = "idpull discovers the endpoints of an identity-management REST API from its\n\
                  OpenAPI-style specification, groups them by resource, resolves the path and\n\
                  query parameters a selection needs, invokes the selected endpoints with\n\
                  provider-appropriate authentication, and archives the collected responses\n\
                  per session.\n\n\
                  Examples:\n  \
                  idpull providers\n  \
                  idpull endpoints --provider okta\n  \
                  idpull call --provider okta --base-url dev-1.okta.com \\\n      \
                  --endpoint '/api/v1/users/{userId}' --param userId=00u1ab2c \\\n      \
                  --api-token $OKTA_TOKEN\n  \
                  idpull interactive"
)]
pub struct Cli {
    /// Suppress informational output; print only data and errors
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short = 'v', global = true, action = ArgAction::Count)]
    pub verbosity: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the supported providers
    Providers,

    /// Fetch a provider's spec and print its endpoints grouped by resource
    Endpoints {
        #[arg(long, value_enum)]
        provider: Provider,

        /// Override the spec URL (defaults to the provider's env var)
        #[arg(long)]
        spec_url: Option<String>,
    },

    /// Invoke a batch of endpoints and archive the responses
    Call {
        #[arg(long, value_enum)]
        provider: Provider,

        /// Target API base URL; `https://` is assumed when no scheme is given
        #[arg(long)]
        base_url: String,

        /// Endpoint path to call; repeat for a batch. Called in order.
        #[arg(long = "endpoint", value_name = "PATH", required = true)]
        endpoints: Vec<String>,

        /// Parameter value as name=value; repeat as needed
        #[arg(long = "param", value_name = "NAME=VALUE", value_parser = parse_key_value)]
        params: Vec<(String, String)>,

        /// Override the spec URL (defaults to the provider's env var)
        #[arg(long)]
        spec_url: Option<String>,

        /// Reuse an existing session id instead of generating one
        #[arg(long)]
        session_id: Option<String>,

        /// Directory holding per-session response data
        #[arg(long, default_value = constants::DEFAULT_SESSION_ROOT)]
        session_root: PathBuf,

        /// Okta API token (SSWS)
        #[arg(long)]
        api_token: Option<String>,

        /// IdentityNow OAuth client id
        #[arg(long)]
        client_id: Option<String>,

        /// IdentityNow OAuth client secret
        #[arg(long)]
        client_secret: Option<String>,

        /// OAuth grant type for the token exchange
        #[arg(long, default_value = constants::DEFAULT_GRANT_TYPE)]
        grant_type: String,

        /// IIQ username
        #[arg(long)]
        username: Option<String>,

        /// IIQ password
        #[arg(long)]
        password: Option<String>,
    },

    /// Guided flow: pick provider, browse endpoints, select, supply values, run
    Interactive {
        #[arg(long, value_enum)]
        provider: Option<Provider>,

        /// Override the spec URL (defaults to the provider's env var)
        #[arg(long)]
        spec_url: Option<String>,

        /// Reuse an existing session id instead of being prompted
        #[arg(long)]
        session_id: Option<String>,

        /// Directory holding per-session response data
        #[arg(long, default_value = constants::DEFAULT_SESSION_ROOT)]
        session_root: PathBuf,
    },
}

/// Parses a `name=value` argument.
fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))
}
