// Domain models the view models work with, independent of the wire format

use std::hash::{Hash, Hasher};

/// One catalog entry. Identity is the source API's volume id.
///
/// Books are read-only outside this crate once decoded.
#[derive(Debug, Clone)]
pub struct Book {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) authors: Option<Vec<String>>,
    pub(crate) description: Option<String>,
    pub(crate) thumbnail_url: Option<String>,
    pub(crate) info_link: Option<String>,
    pub(crate) buy_link: Option<String>,
}

impl Book {
    /// A book with only the required fields set.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Book {
            id: id.into(),
            title: title.into(),
            authors: None,
            description: None,
            thumbnail_url: None,
            info_link: None,
            buy_link: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Author names in source order. `Some` of an empty slice is possible.
    pub fn authors(&self) -> Option<&[String]> {
        self.authors.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail_url.as_deref()
    }

    pub fn info_link(&self) -> Option<&str> {
        self.info_link.as_deref()
    }

    pub fn buy_link(&self) -> Option<&str> {
        self.buy_link.as_deref()
    }
}

impl PartialEq for Book {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Book {}

impl Hash for Book {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
