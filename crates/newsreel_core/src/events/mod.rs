//! Typed entity-lifecycle events and the listener bus.
//!
//! # Responsibility
//! - Define the event shape (new snapshot, old snapshot for updates, and
//!   the root/non-root tag).
//! - Own the per-entity-type listener registries with typed
//!   subscribe/unsubscribe.
//! - Deliver committed batches exactly once per listener, isolating
//!   listener panics from each other and from the committed transaction.
//!
//! # Invariants
//! - Delivery happens after commit, never before.
//! - One event per entity per logical change; duplicate delivery is
//!   forbidden.
//! - A panicking listener never prevents delivery to the remaining
//!   listeners.

mod batch;

pub use batch::EventBatch;

use crate::model::feed::Feed;
use crate::model::folder::{Folder, Mark};
use crate::model::label::Label;
use crate::model::news::{Attachment, News};
use log::error;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// One lifecycle event for one entity.
///
/// `old_entity` is populated for updates so listeners can diff; `root` marks
/// whether the entity was the direct target of the operation or changed as a
/// cascade side effect.
#[derive(Debug, Clone)]
pub struct EntityEvent<T> {
    pub entity: T,
    pub old_entity: Option<T>,
    pub root: bool,
}

impl<T> EntityEvent<T> {
    pub(crate) fn added(entity: T, root: bool) -> Self {
        Self {
            entity,
            old_entity: None,
            root,
        }
    }

    pub(crate) fn updated(old_entity: T, entity: T, root: bool) -> Self {
        Self {
            entity,
            old_entity: Some(old_entity),
            root,
        }
    }

    pub(crate) fn deleted(entity: T, root: bool) -> Self {
        Self {
            entity,
            old_entity: None,
            root,
        }
    }
}

/// Listener for one entity type. All methods default to no-ops so listeners
/// implement only what they watch.
pub trait EntityListener<T>: Send + Sync {
    fn entities_added(&self, _events: &[EntityEvent<T>]) {}
    fn entities_updated(&self, _events: &[EntityEvent<T>]) {}
    fn entities_deleted(&self, _events: &[EntityEvent<T>]) {}
}

/// Opaque handle returned by subscribe calls, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerToken(u64);

struct ListenerList<T> {
    entries: RwLock<Vec<(u64, Arc<dyn EntityListener<T>>)>>,
}

impl<T> Default for ListenerList<T> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }
}

enum Delivery {
    Added,
    Updated,
    Deleted,
}

impl<T> ListenerList<T> {
    fn subscribe(&self, token: u64, listener: Arc<dyn EntityListener<T>>) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|err| err.into_inner());
        entries.push((token, listener));
    }

    fn unsubscribe(&self, token: u64) -> bool {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|err| err.into_inner());
        let before = entries.len();
        entries.retain(|(entry_token, _)| *entry_token != token);
        entries.len() != before
    }

    fn notify(&self, delivery: Delivery, events: &[EntityEvent<T>]) {
        if events.is_empty() {
            return;
        }
        let listeners: Vec<Arc<dyn EntityListener<T>>> = {
            let entries = self.entries.read().unwrap_or_else(|err| err.into_inner());
            entries.iter().map(|(_, listener)| Arc::clone(listener)).collect()
        };
        for listener in listeners {
            // A panicking listener must not rob the others of their delivery,
            // and must never unwind into the committed transaction.
            let outcome = catch_unwind(AssertUnwindSafe(|| match delivery {
                Delivery::Added => listener.entities_added(events),
                Delivery::Updated => listener.entities_updated(events),
                Delivery::Deleted => listener.entities_deleted(events),
            }));
            if outcome.is_err() {
                error!("event=listener_panic module=events status=error");
            }
        }
    }
}

/// Owned listener registry, injected into the engine at construction so
/// tests can build isolated buses.
#[derive(Default)]
pub struct EventBus {
    next_token: AtomicU64,
    news: ListenerList<News>,
    feeds: ListenerList<Feed>,
    folders: ListenerList<Folder>,
    marks: ListenerList<Mark>,
    labels: ListenerList<Label>,
    attachments: ListenerList<Attachment>,
}

macro_rules! bus_accessors {
    ($subscribe:ident, $unsubscribe:ident, $field:ident, $ty:ty) => {
        pub fn $subscribe(&self, listener: Arc<dyn EntityListener<$ty>>) -> ListenerToken {
            let token = self.next_token.fetch_add(1, Ordering::Relaxed);
            self.$field.subscribe(token, listener);
            ListenerToken(token)
        }

        pub fn $unsubscribe(&self, token: ListenerToken) -> bool {
            self.$field.unsubscribe(token.0)
        }
    };
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    bus_accessors!(subscribe_news, unsubscribe_news, news, News);
    bus_accessors!(subscribe_feeds, unsubscribe_feeds, feeds, Feed);
    bus_accessors!(subscribe_folders, unsubscribe_folders, folders, Folder);
    bus_accessors!(subscribe_marks, unsubscribe_marks, marks, Mark);
    bus_accessors!(subscribe_labels, unsubscribe_labels, labels, Label);
    bus_accessors!(
        subscribe_attachments,
        unsubscribe_attachments,
        attachments,
        Attachment
    );

    /// Delivers one committed batch: per entity type, one added, one updated
    /// and one deleted notification at most, each listener invoked once.
    ///
    /// Invocation order across entity types is unspecified.
    pub(crate) fn dispatch(&self, batch: EventBatch) {
        let (news, feeds, folders, marks, labels, attachments) = batch.into_parts();

        self.news.notify(Delivery::Added, &news.added);
        self.news.notify(Delivery::Updated, &news.updated);
        self.news.notify(Delivery::Deleted, &news.deleted);

        self.feeds.notify(Delivery::Added, &feeds.added);
        self.feeds.notify(Delivery::Updated, &feeds.updated);
        self.feeds.notify(Delivery::Deleted, &feeds.deleted);

        self.folders.notify(Delivery::Added, &folders.added);
        self.folders.notify(Delivery::Updated, &folders.updated);
        self.folders.notify(Delivery::Deleted, &folders.deleted);

        self.marks.notify(Delivery::Added, &marks.added);
        self.marks.notify(Delivery::Updated, &marks.updated);
        self.marks.notify(Delivery::Deleted, &marks.deleted);

        self.labels.notify(Delivery::Added, &labels.added);
        self.labels.notify(Delivery::Updated, &labels.updated);
        self.labels.notify(Delivery::Deleted, &labels.deleted);

        self.attachments.notify(Delivery::Added, &attachments.added);
        self.attachments
            .notify(Delivery::Updated, &attachments.updated);
        self.attachments
            .notify(Delivery::Deleted, &attachments.deleted);
    }
}
