//! Retrieval of the raw spec document for a provider.

use crate::error::Error;
use tracing::debug;

/// Performs a single GET for the spec document. Non-2xx status or transport
/// failure becomes `Error::SpecFetch`; the caller degrades to an empty
/// endpoint table rather than aborting. No retries: refresh is a manual
/// action and retry policy is out of scope.
pub async fn fetch(client: &reqwest::Client, url: &str) -> Result<String, Error> {
    debug!(target: "idpull::fetcher", "fetching spec document from {url}");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::SpecFetch {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::SpecFetch {
            url: url.to_string(),
            reason: format!("HTTP {status}"),
        });
    }

    response.text().await.map_err(|e| Error::SpecFetch {
        url: url.to_string(),
        reason: format!("failed to read response body: {e}"),
    })
}
