//! News domain model: state machine, identity keys and content fingerprints.
//!
//! # Responsibility
//! - Define the canonical news record and its owned child entities.
//! - Provide the ordered identity-key strategy (permalink guid, link, title).
//! - Provide the strategy-dependent content fingerprint comparison.
//!
//! # Invariants
//! - A news with a permalink guid is identified primarily by that guid,
//!   else by its link, else by its normalized title.
//! - Publish date is never part of the title identity key.
//! - `rev` increases monotonically on every persisted update.

use crate::model::feed::FeedId;
use crate::model::folder::MarkId;
use crate::model::label::LabelId;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Stable identifier for news entities.
pub type NewsId = Uuid;

/// Lifecycle state of a news item.
///
/// `New` is the parser default for freshly fetched content and is treated
/// specially by the state-merge rule: it never overwrites persisted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsState {
    New,
    Updated,
    Unread,
    Read,
    Hidden,
    Deleted,
}

impl NewsState {
    /// Returns whether this state counts as not-yet-read for display.
    pub fn is_unread(self) -> bool {
        matches!(self, Self::New | Self::Updated | Self::Unread)
    }
}

/// Feed-supplied identifier with a flag marking stable permanent identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guid {
    pub value: String,
    /// True when the guid denotes a stable, reusable identity across fetches.
    pub permalink: bool,
}

impl Guid {
    pub fn permalink(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            permalink: true,
        }
    }

    pub fn transient(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            permalink: false,
        }
    }
}

/// Author record owned by exactly one news or one feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub uuid: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub uri: Option<String>,
}

impl Person {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: Some(name.into()),
            email: None,
            uri: None,
        }
    }

    /// Compares descriptive fields, ignoring the row identity. Parsed
    /// persons get a fresh uuid on every fetch.
    pub fn same_content(&self, other: &Person) -> bool {
        self.name == other.name && self.email == other.email && self.uri == other.uri
    }
}

/// Category record owned by exactly one news or one feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub uuid: Uuid,
    pub name: String,
    pub domain: Option<String>,
}

impl Category {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            domain: None,
        }
    }

    /// Compares descriptive fields, ignoring the row identity.
    pub fn same_content(&self, other: &Category) -> bool {
        self.name == other.name && self.domain == other.domain
    }
}

/// Enclosure record owned by exactly one news.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub uuid: Uuid,
    pub news_uuid: NewsId,
    pub url: String,
    pub mime_type: Option<String>,
    pub length: Option<i64>,
}

/// Owner of a news record: exactly one feed or one news bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsParent {
    Feed(FeedId),
    Bin(MarkId),
}

/// Canonical news record.
///
/// Incoming (parser-produced) news carry `parent: None` and `rev: 0`;
/// persisted news always have an owner and a store-assigned revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct News {
    pub uuid: NewsId,
    pub parent: Option<NewsParent>,
    pub title: Option<String>,
    pub link: Option<String>,
    pub guid: Option<Guid>,
    pub description: Option<String>,
    pub source: Option<String>,
    /// Epoch milliseconds.
    pub publish_date: Option<i64>,
    /// Epoch milliseconds.
    pub modified_date: Option<i64>,
    /// Epoch milliseconds; set when the item was first received.
    pub received_date: i64,
    pub rating: Option<i64>,
    /// Sticky flag controlled by the user, never by merge.
    pub flagged: bool,
    pub state: NewsState,
    pub author: Option<Person>,
    pub categories: Vec<Category>,
    pub attachments: Vec<Attachment>,
    /// Assigned label ids; managed through label operations, not merge.
    pub labels: Vec<LabelId>,
    /// Store revision counter for concurrent-modification detection.
    pub rev: i64,
    pub sort_order: i64,
}

/// Identity key produced by the ordered key strategy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityKey {
    Guid(String),
    Link(String),
    /// Whitespace-normalized title; publish date is never part of this key.
    Title(String),
}

/// Cross-feed equivalence key used by state propagation.
///
/// Title is deliberately excluded: it is too weak an identity to fan state
/// changes out across feeds and bins.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EquivalenceKey {
    Guid(String),
    Link(String),
}

/// Which identity strategy produced a match; selects the fingerprint fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    Guid,
    Link,
    Title,
}

impl News {
    /// Creates a transient (unpersisted) news record in state `New`.
    pub fn incoming(received_date: i64) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            parent: None,
            title: None,
            link: None,
            guid: None,
            description: None,
            source: None,
            publish_date: None,
            modified_date: None,
            received_date,
            rating: None,
            flagged: false,
            state: NewsState::New,
            author: None,
            categories: Vec::new(),
            attachments: Vec::new(),
            labels: Vec::new(),
            rev: 0,
            sort_order: 0,
        }
    }

    /// Returns the identity key under the strict priority order:
    /// permalink guid value, else link, else normalized title.
    ///
    /// Returns `None` when the item carries none of the three.
    pub fn identity_key(&self) -> Option<IdentityKey> {
        if let Some(guid) = &self.guid {
            if guid.permalink && !guid.value.is_empty() {
                return Some(IdentityKey::Guid(guid.value.clone()));
            }
        }
        if let Some(link) = &self.link {
            if !link.is_empty() {
                return Some(IdentityKey::Link(link.clone()));
            }
        }
        self.title
            .as_deref()
            .filter(|title| !title.trim().is_empty())
            .map(|title| IdentityKey::Title(normalize_title(title)))
    }

    /// Returns the key under which equivalent copies in other feeds and bins
    /// are found, or `None` for title-only items.
    pub fn equivalence_key(&self) -> Option<EquivalenceKey> {
        if let Some(guid) = &self.guid {
            if guid.permalink && !guid.value.is_empty() {
                return Some(EquivalenceKey::Guid(guid.value.clone()));
            }
        }
        self.link
            .as_ref()
            .filter(|link| !link.is_empty())
            .map(|link| EquivalenceKey::Link(link.clone()))
    }

    /// Compares the content fingerprint of `self` against `incoming` under
    /// the strategy that matched the two.
    ///
    /// - Guid-matched: title, description, link, publish date.
    /// - Link-matched: title, description.
    /// - Title-matched: description only.
    pub fn same_content(&self, incoming: &News, strategy: MatchStrategy) -> bool {
        match strategy {
            MatchStrategy::Guid => {
                self.title == incoming.title
                    && self.description == incoming.description
                    && self.link == incoming.link
                    && self.publish_date == incoming.publish_date
            }
            MatchStrategy::Link => {
                self.title == incoming.title && self.description == incoming.description
            }
            MatchStrategy::Title => self.description == incoming.description,
        }
    }

    /// Copies all content attributes of `incoming` onto `self` in place.
    ///
    /// Object identity, ownership, received date, sticky flag, labels and
    /// state are deliberately left untouched; the caller decides the state.
    pub fn copy_content_from(&mut self, incoming: &News) {
        self.title = incoming.title.clone();
        self.link = incoming.link.clone();
        self.guid = incoming.guid.clone();
        self.description = incoming.description.clone();
        self.source = incoming.source.clone();
        self.publish_date = incoming.publish_date;
        self.modified_date = incoming.modified_date;
        self.rating = incoming.rating;
        self.author = incoming.author.clone();
        self.categories = incoming.categories.clone();
        self.attachments = incoming
            .attachments
            .iter()
            .cloned()
            .map(|mut attachment| {
                attachment.news_uuid = self.uuid;
                attachment
            })
            .collect();
    }
}

/// Collapses runs of whitespace so cosmetic reformatting does not break the
/// title identity key.
pub fn normalize_title(title: &str) -> String {
    WHITESPACE_RE.replace_all(title.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn news_with(
        guid: Option<Guid>,
        link: Option<&str>,
        title: Option<&str>,
    ) -> News {
        let mut news = News::incoming(0);
        news.guid = guid;
        news.link = link.map(str::to_string);
        news.title = title.map(str::to_string);
        news
    }

    #[test]
    fn permalink_guid_wins_over_link_and_title() {
        let news = news_with(Some(Guid::permalink("g-1")), Some("http://a"), Some("t"));
        assert_eq!(news.identity_key(), Some(IdentityKey::Guid("g-1".into())));
    }

    #[test]
    fn non_permalink_guid_is_skipped_for_identity() {
        let news = news_with(Some(Guid::transient("g-1")), Some("http://a"), Some("t"));
        assert_eq!(
            news.identity_key(),
            Some(IdentityKey::Link("http://a".into()))
        );
    }

    #[test]
    fn title_fallback_normalizes_whitespace() {
        let news = news_with(None, None, Some("  a   b\tc "));
        assert_eq!(news.identity_key(), Some(IdentityKey::Title("a b c".into())));
    }

    #[test]
    fn no_identity_for_empty_item() {
        let news = news_with(None, None, Some("   "));
        assert_eq!(news.identity_key(), None);
    }

    #[test]
    fn equivalence_excludes_title() {
        let news = news_with(None, None, Some("only title"));
        assert_eq!(news.equivalence_key(), None);
    }

    #[test]
    fn state_serializes_snake_case() {
        let json = serde_json::to_string(&NewsState::Updated).unwrap();
        assert_eq!(json, "\"updated\"");
        let state: NewsState = serde_json::from_str("\"hidden\"").unwrap();
        assert_eq!(state, NewsState::Hidden);
    }

    #[test]
    fn title_fingerprint_ignores_publish_date_and_link() {
        let mut persisted = news_with(None, None, Some("t"));
        persisted.description = Some("d".into());
        let mut incoming = persisted.clone();
        incoming.publish_date = Some(123);
        incoming.link = Some("http://elsewhere".into());
        assert!(persisted.same_content(&incoming, MatchStrategy::Title));
        assert!(!persisted.same_content(&incoming, MatchStrategy::Guid));
    }
}
