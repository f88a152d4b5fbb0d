use std::path::PathBuf;

use anyhow::Context;

use crate::books_client::{
    CatalogClientConfig, CatalogSource, DEFAULT_API_URL, DEFAULT_MAX_RESULTS, DEFAULT_SEARCH_TERM,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub search_term: String,
    pub max_results: u32,
    pub preferences_path: PathBuf,
    /// Read the catalog from this file instead of the network.
    pub mock_data_path: Option<PathBuf>,
}

const DEFAULT_PREFERENCES_PATH: &str = "bookstore-preferences.json";

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: DEFAULT_API_URL.into(),
            search_term: DEFAULT_SEARCH_TERM.into(),
            max_results: DEFAULT_MAX_RESULTS,
            preferences_path: DEFAULT_PREFERENCES_PATH.into(),
            mock_data_path: None,
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any variable source; unset or empty values take
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        let max_results = match var("BOOKSTORE_MAX_RESULTS") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid BOOKSTORE_MAX_RESULTS: {}", raw))?,
            None => defaults.max_results,
        };

        Ok(Config {
            api_url: var("BOOKSTORE_API_URL").unwrap_or(defaults.api_url),
            search_term: var("BOOKSTORE_SEARCH_TERM").unwrap_or(defaults.search_term),
            max_results,
            preferences_path: var("BOOKSTORE_PREFERENCES_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.preferences_path),
            mock_data_path: var("BOOKSTORE_MOCK_DATA").map(PathBuf::from),
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.api_url.is_empty() {
            return Err("BOOKSTORE_API_URL is missing".into());
        }
        if self.search_term.is_empty() {
            return Err("BOOKSTORE_SEARCH_TERM is missing".into());
        }
        if self.max_results == 0 {
            return Err("BOOKSTORE_MAX_RESULTS must be greater than zero".into());
        }
        Ok(())
    }

    pub fn catalog_client_config(&self) -> CatalogClientConfig {
        CatalogClientConfig {
            api_url: self.api_url.clone(),
            search_term: self.search_term.clone(),
            max_results: Some(self.max_results),
            source: match &self.mock_data_path {
                Some(path) => CatalogSource::Local(path.clone()),
                None => CatalogSource::Remote,
            },
        }
    }
}
