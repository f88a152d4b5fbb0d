// Client for the Google Books volumes endpoint, with a bundled-file fallback

use std::path::{Path, PathBuf};

use reqwest::Url;
use serde::Deserialize;

use crate::{
    domain::{mapping::map_response_to_books, models::Book},
    error::{BookStoreError, Result},
};

pub const DEFAULT_API_URL: &str = "https://www.googleapis.com/books/v1/volumes";
pub const DEFAULT_SEARCH_TERM: &str = "ios";
pub const DEFAULT_MAX_RESULTS: u32 = 40;

const SEARCH_TERM_PARAM: &str = "q";
const MAX_RESULTS_PARAM: &str = "maxResults";
const START_INDEX_PARAM: &str = "startIndex";

/// Where catalog pages come from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CatalogSource {
    /// Query the remote volumes endpoint.
    #[default]
    Remote,
    /// Read a JSON file with the same envelope as the remote endpoint.
    Local(PathBuf),
}

#[derive(Debug, Clone)]
pub struct CatalogClientConfig {
    /// Full URL of the volumes endpoint (scheme, host and path).
    pub api_url: String,
    /// Search term used when a caller does not pass one.
    pub search_term: String,
    /// Page size used by [`CatalogClient::fetch_default_page`].
    pub max_results: Option<u32>,
    pub source: CatalogSource,
}

impl Default for CatalogClientConfig {
    fn default() -> Self {
        CatalogClientConfig {
            api_url: DEFAULT_API_URL.to_string(),
            search_term: DEFAULT_SEARCH_TERM.to_string(),
            max_results: Some(DEFAULT_MAX_RESULTS),
            source: CatalogSource::Remote,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CatalogClient {
    config: CatalogClientConfig,
    client: reqwest::Client,
}

impl CatalogClient {
    /// Create a client with its own HTTP connection pool.
    pub fn new(config: CatalogClientConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::with_http_client(config, client))
    }

    /// Create a client that shares an existing HTTP connection pool.
    pub fn with_http_client(config: CatalogClientConfig, client: reqwest::Client) -> Self {
        tracing::debug!(
            api_url = %config.api_url,
            source = ?config.source,
            "creating CatalogClient"
        );
        CatalogClient { config, client }
    }

    pub fn config(&self) -> &CatalogClientConfig {
        &self.config
    }

    /// Build the request target for one page. Nothing is sent.
    pub fn endpoint(
        &self,
        search_term: Option<&str>,
        max_results: Option<u32>,
        start_index: Option<u32>,
    ) -> Result<Url> {
        let api_url = &self.config.api_url;
        let mut url = Url::parse(api_url)
            .map_err(|e| BookStoreError::InvalidUrl(format!("{api_url}: {e}")))?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(BookStoreError::InvalidUrl(format!(
                "{api_url}: not an http(s) endpoint"
            )));
        }

        {
            let mut query = url.query_pairs_mut();
            query.append_pair(
                SEARCH_TERM_PARAM,
                search_term.unwrap_or(&self.config.search_term),
            );
            if let Some(max_results) = max_results {
                query.append_pair(MAX_RESULTS_PARAM, &max_results.to_string());
            }
            if let Some(start_index) = start_index {
                query.append_pair(START_INDEX_PARAM, &start_index.to_string());
            }
        }
        Ok(url)
    }

    /// Fetch the first page with the configured search term and page size.
    pub async fn fetch_default_page(&self) -> Result<Vec<Book>> {
        self.fetch_page(None, self.config.max_results, None).await
    }

    /// Fetch one page of books. Never returns more than `max_results` items.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn fetch_page(
        &self,
        search_term: Option<&str>,
        max_results: Option<u32>,
        start_index: Option<u32>,
    ) -> Result<Vec<Book>> {
        let mut books = match &self.config.source {
            CatalogSource::Remote => {
                self.fetch_remote(search_term, max_results, start_index)
                    .await?
            }
            CatalogSource::Local(path) => {
                let mut books = read_local(path).await?;
                let skip = (start_index.unwrap_or(0) as usize).min(books.len());
                books.drain(..skip);
                tracing::info!(
                    count = books.len(),
                    path = %path.display(),
                    "books retrieved from local dataset"
                );
                books
            }
        };
        if let Some(max_results) = max_results {
            books.truncate(max_results as usize);
        }
        Ok(books)
    }

    async fn fetch_remote(
        &self,
        search_term: Option<&str>,
        max_results: Option<u32>,
        start_index: Option<u32>,
    ) -> Result<Vec<Book>> {
        let url = self.endpoint(search_term, max_results, start_index)?;
        tracing::debug!(%url, "GET volumes");

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(BookStoreError::from_transport)?;
        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(%status, "catalog endpoint returned an error status");
            return Err(BookStoreError::from_status(status));
        }
        let body = resp.text().await.map_err(BookStoreError::from_transport)?;
        let books = decode_books(&body)?;
        tracing::info!(count = books.len(), "books retrieved from network");
        Ok(books)
    }
}

fn decode_books(body: &str) -> Result<Vec<Book>> {
    match serde_json::from_str::<VolumesResponse>(body) {
        Ok(parsed) => Ok(map_response_to_books(parsed)),
        Err(e) => {
            let snippet: String = body.chars().take(2000).collect();
            tracing::error!(error = %e, body_snippet = %snippet, "failed to parse VolumesResponse");
            Err(e.into())
        }
    }
}

async fn read_local(path: &Path) -> Result<Vec<Book>> {
    let body = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| BookStoreError::InvalidUrl(format!("{}: {e}", path.display())))?;
    decode_books(&body)
}

// ============ Wire format ============

#[derive(Debug, Deserialize, PartialEq)]
pub struct VolumesResponse {
    // The API omits `items` entirely when a page is empty
    #[serde(default)]
    pub items: Vec<Volume>,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub id: String,
    pub volume_info: VolumeInfo,
    pub sale_info: Option<SaleInfo>,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    pub title: String,
    pub authors: Option<Vec<String>>,
    pub description: Option<String>,
    pub image_links: Option<ImageLinks>,
    pub info_link: Option<String>,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct ImageLinks {
    pub thumbnail: String,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaleInfo {
    pub buy_link: Option<String>,
}
