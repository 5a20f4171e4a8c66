//! Upstream playlist retrieval.
//!
//! Every configured source is fetched concurrently on each request. A
//! source that fails (transport error or non-success status) contributes
//! an empty document instead of failing the whole aggregation, so one
//! dead upstream cannot take the service down.

use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, warn};

use crate::errors::AppResult;

/// Per-request timeout for a single upstream download.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// One downloaded playlist, still unparsed.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// URL the document was downloaded from. Carried through the pipeline
    /// as the origin of every entry parsed out of the body.
    pub source: String,
    pub body: String,
}

/// Seam for playlist retrieval so the pipeline can be driven by stub
/// documents in tests.
#[async_trait]
pub trait PlaylistFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> AppResult<String>;
}

/// HTTP fetcher used in production.
pub struct HttpPlaylistFetcher {
    client: reqwest::Client,
}

impl HttpPlaylistFetcher {
    pub fn new() -> AppResult<Self> {
        let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PlaylistFetcher for HttpPlaylistFetcher {
    async fn fetch(&self, url: &str) -> AppResult<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Download all sources concurrently, preserving input order.
///
/// Failures are logged and mapped to empty documents. The caller sees one
/// `FetchedDocument` per requested URL regardless of outcome.
pub async fn fetch_all(fetcher: &dyn PlaylistFetcher, urls: &[String]) -> Vec<FetchedDocument> {
    let downloads = urls.iter().map(|url| async move {
        match fetcher.fetch(url).await {
            Ok(body) => {
                debug!("Fetched {} bytes from '{}'", body.len(), url);
                FetchedDocument {
                    source: url.clone(),
                    body,
                }
            }
            Err(error) => {
                warn!("Failed to fetch source '{}': {}", url, error);
                FetchedDocument {
                    source: url.clone(),
                    body: String::new(),
                }
            }
        }
    });

    join_all(downloads).await
}
