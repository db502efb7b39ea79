//! Feed domain model.
//!
//! # Responsibility
//! - Define the feed root aggregate identified by its canonical URL.
//! - Provide the content comparison used by the feed-level merge.
//!
//! # Invariants
//! - `link` is the canonical URL and unique across the store.
//! - Feed lifetime is decided by the number of bookmarks referencing that
//!   URL, never by object reachability.

use crate::model::news::{Category, Person};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for feed entities.
pub type FeedId = Uuid;

/// Feed root aggregate. News rows reference it by id; the model itself stays
/// shallow so callers control hydration depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    pub uuid: FeedId,
    /// Canonical URL; bookmarks reference the feed through this value.
    pub link: String,
    pub title: Option<String>,
    pub homepage: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub copyright: Option<String>,
    /// Epoch milliseconds.
    pub publish_date: Option<i64>,
    /// Epoch milliseconds.
    pub last_build_date: Option<i64>,
    pub image_url: Option<String>,
    pub author: Option<Person>,
    pub categories: Vec<Category>,
}

impl Feed {
    pub fn new(link: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            link: link.into(),
            title: None,
            homepage: None,
            description: None,
            language: None,
            copyright: None,
            publish_date: None,
            last_build_date: None,
            image_url: None,
            author: None,
            categories: Vec::new(),
        }
    }

    /// Returns whether the incoming feed carries the same descriptive
    /// attributes as this one. Author and categories are compared by
    /// content because parsed child rows get fresh uuids on every fetch.
    pub fn same_content(&self, incoming: &Feed) -> bool {
        self.title == incoming.title
            && self.homepage == incoming.homepage
            && self.description == incoming.description
            && self.language == incoming.language
            && self.copyright == incoming.copyright
            && self.publish_date == incoming.publish_date
            && self.last_build_date == incoming.last_build_date
            && self.image_url == incoming.image_url
            && same_author(self.author.as_ref(), incoming.author.as_ref())
            && self.categories.len() == incoming.categories.len()
            && self
                .categories
                .iter()
                .zip(&incoming.categories)
                .all(|(ours, theirs)| ours.same_content(theirs))
    }

    /// Copies descriptive attributes of `incoming` onto `self` in place,
    /// preserving identity and canonical URL.
    pub fn copy_content_from(&mut self, incoming: &Feed) {
        self.title = incoming.title.clone();
        self.homepage = incoming.homepage.clone();
        self.description = incoming.description.clone();
        self.language = incoming.language.clone();
        self.copyright = incoming.copyright.clone();
        self.publish_date = incoming.publish_date;
        self.last_build_date = incoming.last_build_date;
        self.image_url = incoming.image_url.clone();
        self.author = incoming.author.clone();
        self.categories = incoming.categories.clone();
    }
}

fn same_author(ours: Option<&Person>, theirs: Option<&Person>) -> bool {
    match (ours, theirs) {
        (Some(ours), Some(theirs)) => ours.same_content(theirs),
        (None, None) => true,
        _ => false,
    }
}
