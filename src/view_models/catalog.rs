//! State behind the catalog list screen.
//!
//! The view model owns the last successfully fetched page and derives the
//! displayed list from it on every call, reading the display-mode flag and
//! favorite set from the [`PreferenceStore`] at that moment. Updates are
//! announced as [`CatalogEvent`]s on an unbounded queue; the presentation
//! layer owns the only receiver and drains it on its own update context, so
//! events arrive in emission order on whatever thread it chooses.

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::{Mutex, mpsc};

use super::{
    FAVORITE_OFF_SYMBOL, FAVORITE_ON_SYMBOL, cell::CellViewModel, detail::DetailViewModel,
};
use crate::{
    books_client::CatalogClient,
    domain::models::Book,
    error::Result,
    storage::{ImageCache, PreferenceStore},
};

pub const NO_BOOKS_MESSAGE: &str = "No books to display.";
pub const NO_FAVORITES_MESSAGE: &str =
    "No favorites yet. Mark a book as favorite to see it here.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEvent {
    /// The displayed list may have changed.
    DataChanged,
    /// A caller selected this book.
    BookSelected(Book),
}

#[derive(Debug)]
pub struct CatalogViewModel {
    client: CatalogClient,
    preferences: Arc<PreferenceStore>,
    images: Arc<ImageCache>,
    all_books: RwLock<Arc<Vec<Book>>>,
    refresh_gate: Mutex<()>,
    events: mpsc::UnboundedSender<CatalogEvent>,
}

impl CatalogViewModel {
    /// Build the view model and the receiving end of its event queue.
    pub fn new(
        client: CatalogClient,
        preferences: Arc<PreferenceStore>,
        images: Arc<ImageCache>,
    ) -> (Self, mpsc::UnboundedReceiver<CatalogEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let view_model = CatalogViewModel {
            client,
            preferences,
            images,
            all_books: RwLock::new(Arc::new(Vec::new())),
            refresh_gate: Mutex::new(()),
            events,
        };
        (view_model, receiver)
    }

    /// Fetch the default page and replace the catalog with it.
    ///
    /// Refreshes on one instance run one at a time. On failure the current
    /// catalog is kept and the error is returned unchanged; retrying is up
    /// to the caller.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn refresh(&self) -> Result<()> {
        let _gate = self.refresh_gate.lock().await;
        let books = self
            .client
            .fetch_default_page()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "failed to refresh catalog"))?;
        tracing::info!(count = books.len(), "catalog refreshed");
        *self
            .all_books
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(books);
        self.emit(CatalogEvent::DataChanged);
        Ok(())
    }

    /// The last fetched page, unfiltered.
    pub fn all_books(&self) -> Arc<Vec<Book>> {
        self.all_books
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Books to show: all of them, or only favorites (in catalog order) when
    /// the display-mode flag is set.
    pub fn displayed(&self) -> Vec<Book> {
        let books = self.all_books();
        if !self.preferences.display_favorites_only() {
            return books.to_vec();
        }
        let favorites = self.preferences.favorite_ids();
        books
            .iter()
            .filter(|book| favorites.contains(book.id()))
            .cloned()
            .collect()
    }

    pub fn count(&self) -> usize {
        self.displayed().len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn book_at(&self, index: usize) -> Option<Book> {
        self.displayed().get(index).cloned()
    }

    pub fn cell_view_model(&self, index: usize) -> Option<CellViewModel> {
        self.book_at(index)
            .map(|book| CellViewModel::new(book, self.images.clone()))
    }

    pub fn detail_view_model(&self, book: Book) -> DetailViewModel {
        DetailViewModel::new(book, self.preferences.clone())
    }

    pub fn display_favorites_only(&self) -> bool {
        self.preferences.display_favorites_only()
    }

    /// Switch between showing all books and favorites only.
    pub fn toggle_display_mode(&self) {
        let favorites_only = self.preferences.toggle_display_favorites_only();
        tracing::debug!(favorites_only, "display mode toggled");
        self.emit(CatalogEvent::DataChanged);
    }

    /// Announce the book at `index`. Returns whether the index resolved.
    pub fn select(&self, index: usize) -> bool {
        match self.book_at(index) {
            Some(book) => {
                tracing::debug!(book_id = %book.id(), index, "book selected");
                self.emit(CatalogEvent::BookSelected(book));
                true
            }
            None => {
                tracing::debug!(index, "ignoring selection outside the displayed list");
                false
            }
        }
    }

    /// Symbol name for the display-mode toggle in its current state.
    pub fn display_mode_symbol(&self) -> &'static str {
        if self.display_favorites_only() {
            FAVORITE_ON_SYMBOL
        } else {
            FAVORITE_OFF_SYMBOL
        }
    }

    /// What to show in place of an empty list.
    pub fn empty_list_message(&self) -> &'static str {
        if self.display_favorites_only() {
            NO_FAVORITES_MESSAGE
        } else {
            NO_BOOKS_MESSAGE
        }
    }

    fn emit(&self, event: CatalogEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("event receiver dropped, notification discarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        path::Path,
        time::{Duration, Instant},
    };

    use httpmock::prelude::*;
    use serde_json::json;
    use tokio::sync::mpsc::error::TryRecvError;

    use super::*;
    use crate::{
        books_client::{CatalogClientConfig, CatalogSource},
        error::BookStoreError,
    };

    const VOLUMES_PATH: &str = "/books/v1/volumes";

    fn local_client() -> CatalogClient {
        CatalogClient::new(CatalogClientConfig {
            source: CatalogSource::Local(
                Path::new(env!("CARGO_MANIFEST_DIR")).join("data/books.json"),
            ),
            ..Default::default()
        })
        .unwrap()
    }

    fn remote_client(server: &MockServer) -> CatalogClient {
        CatalogClient::new(CatalogClientConfig {
            api_url: server.url(VOLUMES_PATH),
            ..Default::default()
        })
        .unwrap()
    }

    fn view_model(
        client: CatalogClient,
    ) -> (
        CatalogViewModel,
        mpsc::UnboundedReceiver<CatalogEvent>,
        Arc<PreferenceStore>,
    ) {
        let preferences = Arc::new(PreferenceStore::in_memory());
        let images = Arc::new(ImageCache::new(reqwest::Client::new()));
        let (vm, rx) = CatalogViewModel::new(client, preferences.clone(), images);
        (vm, rx, preferences)
    }

    fn ids(books: &[Book]) -> Vec<&str> {
        books.iter().map(|b| b.id.as_str()).collect()
    }

    #[tokio::test]
    async fn starts_empty_and_refresh_announces_data() {
        let (vm, mut rx, _) = view_model(local_client());
        assert!(vm.is_empty());
        assert_eq!(vm.empty_list_message(), NO_BOOKS_MESSAGE);
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));

        vm.refresh().await.unwrap();

        assert_eq!(rx.try_recv(), Ok(CatalogEvent::DataChanged));
        assert_eq!(vm.count(), 4);
        assert_eq!(vm.displayed(), *vm.all_books());
    }

    #[tokio::test]
    async fn favorites_filter_preserves_catalog_order() {
        let (vm, _rx, preferences) = view_model(local_client());
        vm.refresh().await.unwrap();
        let all = vm.all_books();

        preferences.set_favorite(&all[3].id, true);
        preferences.set_favorite(&all[1].id, true);
        preferences.set_favorite("not-in-catalog", true);
        assert_eq!(vm.displayed(), *all);

        vm.toggle_display_mode();
        assert_eq!(ids(&vm.displayed()), [all[1].id.as_str(), all[3].id.as_str()]);
        assert_eq!(vm.count(), 2);
        assert_eq!(vm.display_mode_symbol(), FAVORITE_ON_SYMBOL);
        // ids outside the catalog are kept
        assert!(preferences.is_favorite("not-in-catalog"));
    }

    #[tokio::test]
    async fn toggle_display_mode_is_an_involution() {
        let (vm, mut rx, preferences) = view_model(local_client());
        vm.refresh().await.unwrap();
        preferences.set_favorite("-J1WEAAAQBAJ", true);
        let before = vm.displayed();

        vm.toggle_display_mode();
        assert!(vm.display_favorites_only());
        assert_ne!(vm.displayed(), before);
        vm.toggle_display_mode();

        assert!(!vm.display_favorites_only());
        assert_eq!(vm.displayed(), before);
        let events: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert_eq!(events, vec![CatalogEvent::DataChanged; 3]);
    }

    #[tokio::test]
    async fn favorites_only_with_no_favorites_is_empty() {
        let (vm, _rx, _) = view_model(local_client());
        vm.refresh().await.unwrap();
        vm.toggle_display_mode();

        assert!(vm.is_empty());
        assert_eq!(vm.empty_list_message(), NO_FAVORITES_MESSAGE);
        assert_eq!(vm.book_at(0), None);
    }

    #[tokio::test]
    async fn out_of_range_index_is_none() {
        let (vm, mut rx, _) = view_model(local_client());
        assert_eq!(vm.book_at(0), None);
        assert!(vm.cell_view_model(0).is_none());

        vm.refresh().await.unwrap();
        let _ = rx.try_recv();
        let count = vm.count();
        assert!(vm.book_at(count - 1).is_some());
        assert_eq!(vm.book_at(count), None);
        assert_eq!(vm.book_at(usize::MAX), None);
        assert!(vm.cell_view_model(count).is_none());
        assert!(!vm.select(count));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn select_announces_the_displayed_book() {
        let (vm, mut rx, _) = view_model(local_client());
        vm.refresh().await.unwrap();
        let _ = rx.try_recv();

        assert!(vm.select(2));
        match rx.try_recv() {
            Ok(CatalogEvent::BookSelected(book)) => assert_eq!(book.id, "-J1WEAAAQBAJ"),
            other => panic!("expected selection, got {other:?}"),
        }

        let cell = vm.cell_view_model(2).unwrap();
        assert_eq!(cell.title(), "iOS 15 Programming for Beginners");
    }

    #[tokio::test]
    async fn detail_changes_are_visible_on_next_display() {
        let (vm, _rx, _) = view_model(local_client());
        vm.refresh().await.unwrap();
        vm.toggle_display_mode();
        assert!(vm.is_empty());

        let detail = vm.detail_view_model(vm.all_books()[0].clone());
        detail.set_favorite(true);
        assert_eq!(vm.count(), 1);

        detail.set_favorite(false);
        assert!(vm.is_empty());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_catalog_and_propagates_error() {
        let server = MockServer::start_async().await;
        let mut ok = server
            .mock_async(|when, then| {
                when.method(GET).path(VOLUMES_PATH);
                then.status(200).json_body(json!({
                    "items": [ { "id": "a", "volumeInfo": { "title": "A" } } ]
                }));
            })
            .await;
        let (vm, mut rx, _) = view_model(remote_client(&server));
        vm.refresh().await.unwrap();
        assert_eq!(rx.try_recv(), Ok(CatalogEvent::DataChanged));

        ok.delete_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(VOLUMES_PATH);
                then.status(500);
            })
            .await;

        let err = vm.refresh().await.unwrap_err();
        assert!(matches!(err, BookStoreError::InvalidServerResponse(_)), "{err:?}");
        assert_eq!(ids(&vm.displayed()), ["a"]);
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn overlapping_refreshes_run_one_after_another() {
        const RESPONSE_DELAY: Duration = Duration::from_millis(200);
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path(VOLUMES_PATH);
                then.status(200)
                    .json_body(json!({
                        "items": [
                            { "id": "a", "volumeInfo": { "title": "A" } },
                            { "id": "b", "volumeInfo": { "title": "B" } }
                        ]
                    }))
                    .delay(RESPONSE_DELAY);
            })
            .await;
        let (vm, mut rx, _) = view_model(remote_client(&server));

        let started = Instant::now();
        let (first, second) = tokio::join!(vm.refresh(), vm.refresh());
        let elapsed = started.elapsed();
        first.unwrap();
        second.unwrap();

        // Concurrent requests would both finish after one delay.
        assert!(
            elapsed >= RESPONSE_DELAY * 2,
            "refreshes overlapped: both done after {elapsed:?}"
        );
        mock.assert_hits_async(2).await;
        assert_eq!(ids(&vm.displayed()), ["a", "b"]);
        assert_eq!(rx.try_recv(), Ok(CatalogEvent::DataChanged));
        assert_eq!(rx.try_recv(), Ok(CatalogEvent::DataChanged));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn refresh_after_toggle_uses_current_flag() {
        let (vm, _rx, preferences) = view_model(local_client());
        preferences.set_favorite("-J1WEAAAQBAJ", true);
        vm.toggle_display_mode();

        vm.refresh().await.unwrap();
        assert_eq!(ids(&vm.displayed()), ["-J1WEAAAQBAJ"]);
    }

    #[tokio::test]
    async fn dropped_receiver_does_not_break_updates() {
        let (vm, rx, _) = view_model(local_client());
        drop(rx);
        vm.refresh().await.unwrap();
        vm.toggle_display_mode();
        assert!(!vm.select(0));
    }
}
