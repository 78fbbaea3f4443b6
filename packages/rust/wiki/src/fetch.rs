//! Fetching the source wiki page.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use seenlist_shared::{Result, SeenlistError};

/// User-Agent string for wiki requests.
const USER_AGENT: &str = concat!("seenlist/", env!("CARGO_PKG_VERSION"));

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// Build a reqwest client for page fetches.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(timeout)
        .build()
        .map_err(|e| SeenlistError::Transport(format!("failed to build HTTP client: {e}")))
}

/// GET a page and return its body. Anything but `200 OK` is an error.
#[instrument(skip_all, fields(url = %url))]
pub async fn fetch_document(client: &Client, url: &Url) -> Result<String> {
    debug!("fetching wiki page");

    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| SeenlistError::Transport(format!("failed to fetch wiki page {url}: {e}")))?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(SeenlistError::upstream("wiki page", status.as_u16()));
    }

    let body = response
        .text()
        .await
        .map_err(|e| SeenlistError::Transport(format!("{url}: body read failed: {e}")))?;

    debug!(bytes = body.len(), "wiki page fetched");
    Ok(body)
}
