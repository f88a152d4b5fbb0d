//! Detail screen state for a single book.
//!
//! Text is derived once when the view model is built. Favorite status is not
//! cached: every read and write goes straight to the [`PreferenceStore`], so a
//! change made here shows up in the next
//! [`CatalogViewModel::displayed`](super::CatalogViewModel::displayed).

use std::sync::Arc;

use reqwest::Url;

use super::{FAVORITE_OFF_SYMBOL, FAVORITE_ON_SYMBOL};
use crate::{domain::models::Book, storage::PreferenceStore};

/// User-facing strings the detail screen derives its text from.
///
/// Defaults are English; a presentation layer with its own localization
/// passes translated labels to [`DetailViewModel::with_labels`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailLabels {
    pub authors_prefix: String,
    pub authors_separator: String,
    pub default_author: String,
    pub default_description: String,
    pub buy_button_title: String,
}

impl Default for DetailLabels {
    fn default() -> Self {
        DetailLabels {
            authors_prefix: "By: ".into(),
            authors_separator: ", ".into(),
            default_author: "Unknown author".into(),
            default_description: "No description available.".into(),
            buy_button_title: "Buy Now".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlignment {
    Natural,
    Justified,
}

/// How the presentation layer should lay out the description paragraphs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DescriptionFormat {
    pub line_spacing: f32,
    pub alignment: TextAlignment,
}

impl Default for DescriptionFormat {
    fn default() -> Self {
        DescriptionFormat {
            line_spacing: 6.0,
            alignment: TextAlignment::Justified,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormattedDescription {
    pub text: String,
    pub format: DescriptionFormat,
}

#[derive(Debug, Clone)]
pub struct DetailViewModel {
    book: Book,
    preferences: Arc<PreferenceStore>,
    authors_line: String,
    description: FormattedDescription,
    buy_link: Option<Url>,
    info_link: Option<Url>,
    buy_button_title: String,
}

impl DetailViewModel {
    pub fn new(book: Book, preferences: Arc<PreferenceStore>) -> Self {
        Self::with_labels(book, preferences, &DetailLabels::default())
    }

    pub fn with_labels(
        book: Book,
        preferences: Arc<PreferenceStore>,
        labels: &DetailLabels,
    ) -> Self {
        let authors = match book.authors() {
            Some(authors) if !authors.is_empty() => {
                authors.join(labels.authors_separator.as_str())
            }
            _ => labels.default_author.clone(),
        };
        let authors_line = format!("{}{}", labels.authors_prefix, authors);

        let description = FormattedDescription {
            text: book
                .description()
                .unwrap_or(labels.default_description.as_str())
                .to_string(),
            format: DescriptionFormat::default(),
        };

        let buy_link = parse_link(book.id(), "buy", book.buy_link());
        let info_link = parse_link(book.id(), "info", book.info_link());

        DetailViewModel {
            book,
            preferences,
            authors_line,
            description,
            buy_link,
            info_link,
            buy_button_title: labels.buy_button_title.clone(),
        }
    }

    pub fn book(&self) -> &Book {
        &self.book
    }

    pub fn id(&self) -> &str {
        self.book.id()
    }

    pub fn title(&self) -> &str {
        self.book.title()
    }

    pub fn authors_line(&self) -> &str {
        &self.authors_line
    }

    pub fn formatted_description(&self) -> &FormattedDescription {
        &self.description
    }

    pub fn buy_link(&self) -> Option<&Url> {
        self.buy_link.as_ref()
    }

    pub fn info_link(&self) -> Option<&Url> {
        self.info_link.as_ref()
    }

    pub fn buy_button_title(&self) -> &str {
        &self.buy_button_title
    }

    pub fn is_favorite(&self) -> bool {
        self.preferences.is_favorite(self.book.id())
    }

    pub fn set_favorite(&self, favorite: bool) {
        self.preferences.set_favorite(self.book.id(), favorite);
    }

    /// Flip favorite status and return the new value.
    pub fn toggle_favorite(&self) -> bool {
        self.preferences.toggle_favorite(self.book.id())
    }

    /// Symbol name for the favorite button in its current state.
    pub fn favorite_symbol(&self) -> &'static str {
        if self.is_favorite() {
            FAVORITE_ON_SYMBOL
        } else {
            FAVORITE_OFF_SYMBOL
        }
    }
}

fn parse_link(book_id: &str, kind: &str, link: Option<&str>) -> Option<Url> {
    let link = link?;
    match Url::parse(link) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::debug!(%book_id, kind, %link, error = %e, "ignoring unparsable link");
            None
        }
    }
}
