use clap::Parser;
use idpull::auth::AuthContext;
use idpull::cli::{Cli, Commands};
use idpull::constants;
use idpull::engine::dispatcher::{self, BatchResult};
use idpull::engine::{grouper, resolver};
use idpull::error::Error;
use idpull::interactive::{self, mock::StdConsole};
use idpull::logging;
use idpull::output::Output;
use idpull::provider::Provider;
use idpull::session::Session;
use idpull::spec::{self, HttpMethod};
use std::collections::HashMap;
use std::path::PathBuf;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbosity);

    if let Err(e) = run_command(cli).await {
        print_error(&e);
        std::process::exit(1);
    }
}

async fn run_command(cli: Cli) -> Result<(), Error> {
    let output = Output::new(cli.quiet);

    match cli.command {
        Commands::Providers => {
            println!("Supported providers:");
            for provider in Provider::ALL {
                println!(
                    "- {} (spec URL from {})",
                    provider.label(),
                    provider.spec_url_env()
                );
            }
        }
        Commands::Endpoints { provider, spec_url } => {
            list_endpoints(provider, spec_url.as_deref(), &output).await?;
        }
        Commands::Call {
            provider,
            base_url,
            endpoints,
            params,
            spec_url,
            session_id,
            session_root,
            api_token,
            client_id,
            client_secret,
            grant_type,
            username,
            password,
        } => {
            let auth = build_auth(
                provider,
                api_token,
                client_id,
                client_secret,
                grant_type,
                username,
                password,
            )?;
            run_batch(
                provider,
                &base_url,
                &endpoints,
                params,
                spec_url.as_deref(),
                session_id,
                session_root,
                auth,
                &output,
            )
            .await?;
        }
        Commands::Interactive {
            provider,
            spec_url,
            session_id,
            session_root,
        } => {
            let client = dispatcher::build_http_client()?;
            interactive::run_flow(
                &StdConsole,
                &client,
                provider,
                spec_url.as_deref(),
                session_root,
                session_id,
                &output,
            )
            .await?;
        }
    }

    Ok(())
}

async fn list_endpoints(
    provider: Provider,
    spec_url: Option<&str>,
    output: &Output,
) -> Result<(), Error> {
    let client = dispatcher::build_http_client()?;
    let (table, diagnostic) = spec::load_endpoints(&client, provider, spec_url).await;
    if let Some(message) = diagnostic {
        output.info(format!("⚠️ {message}"));
    }
    if table.is_empty() {
        output.info("⚠️ No endpoints found");
        return Ok(());
    }

    let groups = grouper::group(&table, provider);
    let mut listed_groups = 0usize;
    for (group_key, paths) in &groups {
        if listed_groups >= constants::MAX_GROUPS {
            output.info(format!(
                "... {} more group(s) not shown",
                groups.len() - constants::MAX_GROUPS
            ));
            break;
        }
        println!("Group: {group_key}");
        for path in paths {
            let Some(operations) = table.get(path) else {
                continue;
            };
            if let Some(operation) = operations.get(&HttpMethod::Get) {
                let summary = if operation.summary.is_empty() {
                    "No summary"
                } else {
                    &operation.summary
                };
                println!("  {path} | GET - {summary}");
            }
        }
        listed_groups += 1;
    }
    output.success(format!("✅ Loaded {} group(s)", groups.len()));
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn run_batch(
    provider: Provider,
    base_url: &str,
    endpoints: &[String],
    params: Vec<(String, String)>,
    spec_url: Option<&str>,
    session_id: Option<String>,
    session_root: PathBuf,
    mut auth: AuthContext,
    output: &Output,
) -> Result<(), Error> {
    let client = dispatcher::build_http_client()?;

    // The normalized table supplies the query declarations for each selected
    // endpoint; when it cannot be loaded, path parameters still resolve from
    // the templates and the batch proceeds without query declarations.
    let (table, diagnostic) = spec::load_endpoints(&client, provider, spec_url).await;
    if let Some(message) = diagnostic {
        output.info(format!("⚠️ {message}"));
    }

    let selections: Vec<_> = endpoints
        .iter()
        .map(|endpoint| {
            let path = provider.canonical_endpoint(endpoint);
            let operation = table
                .get(&path)
                .or_else(|| table.get(endpoint.as_str()))
                .and_then(|ops| ops.get(&HttpMethod::Get))
                .cloned()
                .unwrap_or_default();
            resolver::resolve_params(&path, &operation, HttpMethod::Get)
        })
        .collect();

    let values: HashMap<String, String> = params.into_iter().collect();
    let session = Session::new(session_root, provider.dir_name(), session_id);

    let BatchResult {
        responses,
        archive_path,
        session_id,
    } = dispatcher::dispatch(&client, &selections, &values, &mut auth, base_url, &session).await?;

    println!("{}", serde_json::to_string_pretty(&responses)?);
    output.info(format!("Session id: {session_id}"));
    output.info(format!("Archive: {}", archive_path.display()));
    output.success(format!("✅ {} API calls complete!", provider.label()));
    Ok(())
}

fn build_auth(
    provider: Provider,
    api_token: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    grant_type: String,
    username: Option<String>,
    password: Option<String>,
) -> Result<AuthContext, Error> {
    match provider {
        Provider::Okta => api_token.map(|token| AuthContext::Ssws { token }).ok_or_else(|| {
            Error::Config("Okta calls require --api-token".to_string())
        }),
        Provider::IdentityNow => match (client_id, client_secret) {
            (Some(id), Some(secret)) => Ok(AuthContext::client_credentials(grant_type, id, secret)),
            _ => Err(Error::Config(
                "IdentityNow calls require --client-id and --client-secret".to_string(),
            )),
        },
        Provider::Iiq => match (username, password) {
            (Some(username), Some(password)) => Ok(AuthContext::Basic { username, password }),
            _ => Err(Error::Config(
                "IIQ calls require --username and --password".to_string(),
            )),
        },
    }
}

/// Prints a user-friendly error message with a hint where one helps.
fn print_error(error: &Error) {
    match error {
        Error::Config(msg) => {
            eprintln!("🚫 Configuration Error\n{msg}");
        }
        Error::SpecFetch { .. } | Error::Network(_) => {
            eprintln!("🌐 Network Error\n{error}\n\nHint: Check that the spec URL and API server are reachable.");
        }
        Error::SpecParse { .. } | Error::Yaml(_) | Error::Json(_) => {
            eprintln!("📄 Spec Error\n{error}\n\nHint: Check that the specification is valid YAML or JSON with a `paths` mapping.");
        }
        Error::Auth { .. } => {
            eprintln!("🔐 Authentication Error\n{error}\n\nHint: Check the credentials for the selected provider.");
        }
        Error::Archive { .. } => {
            eprintln!("📦 Session Data Error\n{error}\n\nHint: Check that the session root directory is writable.");
        }
        Error::Io(io_err) => {
            eprintln!("🚫 File System Error\n{io_err}");
        }
        _ => {
            eprintln!("💥 Error\n{error}");
        }
    }
}
