//! Cache-aside store for cover thumbnails.
//!
//! Entries are keyed by the exact URL string (no normalization) and live as
//! long as the cache does: there is no TTL and no eviction, so memory use
//! grows with the number of distinct thumbnails requested. Concurrent misses
//! for the same key share one network fetch.

use std::{
    collections::HashMap,
    fmt::Debug,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use futures::future::{BoxFuture, FutureExt, Shared};
use image::DynamicImage;
use reqwest::Url;

use crate::error::{BookStoreError, Result};

pub type CoverImage = Arc<DynamicImage>;

type InFlight = Shared<BoxFuture<'static, Result<CoverImage>>>;

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CoverImage>,
    in_flight: HashMap<String, InFlight>,
}

pub struct ImageCache {
    client: reqwest::Client,
    state: Mutex<CacheState>,
}

impl Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("ImageCache")
            .field("entries", &state.entries.len())
            .field("in_flight", &state.in_flight.len())
            .finish_non_exhaustive()
    }
}

impl ImageCache {
    pub fn new(client: reqwest::Client) -> Self {
        ImageCache {
            client,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Return the image stored under `url`, fetching and decoding it on a miss.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get(&self, url: Option<&str>) -> Result<CoverImage> {
        let Some(url) = url else {
            return Err(BookStoreError::InvalidUrl("no image URL".into()));
        };

        let fetch = {
            let mut state = self.lock();
            if let Some(image) = state.entries.get(url) {
                tracing::debug!(%url, "image retrieved from cache");
                return Ok(image.clone());
            }
            match state.in_flight.get(url).cloned() {
                Some(fetch) => {
                    tracing::debug!(%url, "joining in-flight image fetch");
                    fetch
                }
                None => {
                    let target = Url::parse(url)
                        .map_err(|e| BookStoreError::InvalidUrl(format!("{url}: {e}")))?;
                    let fetch = fetch_image(self.client.clone(), target).boxed().shared();
                    state.in_flight.insert(url.to_string(), fetch.clone());
                    fetch
                }
            }
        };

        let outcome = fetch.clone().await;

        // Whoever still finds this fetch registered settles it; later waiters
        // already hold the same outcome.
        let mut state = self.lock();
        if state
            .in_flight
            .get(url)
            .is_some_and(|current| current.ptr_eq(&fetch))
        {
            state.in_flight.remove(url);
            match &outcome {
                Ok(image) => {
                    tracing::debug!(%url, "image retrieved from network");
                    state.entries.insert(url.to_string(), image.clone());
                }
                Err(e) => tracing::debug!(%url, error = %e, "image fetch failed"),
            }
        }
        outcome
    }

    pub fn contains(&self, url: &str) -> bool {
        self.lock().entries.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn fetch_image(client: reqwest::Client, url: Url) -> Result<CoverImage> {
    let resp = client
        .get(url.clone())
        .send()
        .await
        .map_err(BookStoreError::from_transport)?;
    let status = resp.status();
    if !status.is_success() {
        return Err(BookStoreError::from_status(status));
    }
    let bytes = resp.bytes().await.map_err(BookStoreError::from_transport)?;

    let decoded = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
        .await
        .map_err(|e| BookStoreError::InvalidImageData(format!("{url}: {e}")))?;
    let image = decoded.map_err(|e| BookStoreError::InvalidImageData(format!("{url}: {e}")))?;
    Ok(Arc::new(image))
}
