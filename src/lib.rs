//! Data-access and view-state core of a book catalog browser.
//!
//! - [`books_client::CatalogClient`] fetches one page of books from the
//!   Google Books volumes endpoint, or from a bundled JSON dataset.
//! - [`storage::ImageCache`] lazily fetches cover thumbnails, one fetch per URL.
//! - [`storage::PreferenceStore`] persists favorites and the display mode.
//! - [`view_models`] merge the above into list, cell and detail state for a
//!   presentation layer to render.

pub mod books_client;
pub mod config;
pub mod domain;
pub mod error;
pub mod storage;
pub mod view_models;

pub use books_client::{CatalogClient, CatalogClientConfig, CatalogSource};
pub use config::Config;
pub use domain::models::Book;
pub use error::{BookStoreError, Result};
pub use storage::{CoverImage, ImageCache, PreferenceStore};
pub use view_models::{CatalogEvent, CatalogViewModel, CellViewModel, DetailViewModel};
