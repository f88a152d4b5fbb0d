use std::sync::Arc;

use crate::{
    domain::models::Book,
    storage::{CoverImage, ImageCache},
};

/// One row of the catalog list.
#[derive(Debug, Clone)]
pub struct CellViewModel {
    book: Book,
    images: Arc<ImageCache>,
}

impl CellViewModel {
    pub fn new(book: Book, images: Arc<ImageCache>) -> Self {
        CellViewModel { book, images }
    }

    pub fn book(&self) -> &Book {
        &self.book
    }

    pub fn title(&self) -> &str {
        self.book.title()
    }

    /// The cover thumbnail, or `None` when the book has none or it could not
    /// be loaded. Failures are logged and never reach the caller.
    pub async fn thumbnail(&self) -> Option<CoverImage> {
        let url = self.book.thumbnail_url()?;
        match self.images.get(Some(url)).await {
            Ok(image) => Some(image),
            Err(e) => {
                tracing::warn!(
                    book_id = %self.book.id(),
                    %url,
                    error = %e,
                    "failed to fetch thumbnail"
                );
                None
            }
        }
    }
}
