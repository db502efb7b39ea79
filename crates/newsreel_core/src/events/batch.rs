//! Per-transaction event staging.
//!
//! # Responsibility
//! - Collect events while a transaction runs and coalesce them so each
//!   entity yields at most one event per logical change.
//! - Enforce the suppression rules: a delete swallows any earlier add or
//!   update for the same entity, and no update is staged for an entity
//!   already deleted in the same operation.
//!
//! # Invariants
//! - Staged events only leave this type through `EventBus::dispatch`,
//!   after the underlying transaction committed.

use crate::events::EntityEvent;
use crate::model::feed::Feed;
use crate::model::folder::{Folder, Mark};
use crate::model::label::Label;
use crate::model::news::{Attachment, News};
use uuid::Uuid;

pub(crate) struct EventStage<T> {
    pub(crate) added: Vec<EntityEvent<T>>,
    pub(crate) updated: Vec<EntityEvent<T>>,
    pub(crate) deleted: Vec<EntityEvent<T>>,
    added_ids: Vec<Uuid>,
    updated_ids: Vec<Uuid>,
    deleted_ids: Vec<Uuid>,
}

impl<T> Default for EventStage<T> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            updated: Vec::new(),
            deleted: Vec::new(),
            added_ids: Vec::new(),
            updated_ids: Vec::new(),
            deleted_ids: Vec::new(),
        }
    }
}

impl<T: Clone> EventStage<T> {
    fn stage_added(&mut self, uuid: Uuid, entity: T, root: bool) {
        if self.deleted_ids.contains(&uuid) || self.added_ids.contains(&uuid) {
            return;
        }
        self.added_ids.push(uuid);
        self.added.push(EntityEvent::added(entity, root));
    }

    fn stage_updated(&mut self, uuid: Uuid, old_entity: T, entity: T, root: bool) {
        if self.deleted_ids.contains(&uuid) {
            return;
        }
        if let Some(position) = self.added_ids.iter().position(|id| *id == uuid) {
            // The entity was born in this transaction; fold the change into
            // its single add event.
            self.added[position].entity = entity;
            self.added[position].root |= root;
            return;
        }
        if let Some(position) = self.updated_ids.iter().position(|id| *id == uuid) {
            // Coalesce: keep the oldest snapshot, carry the newest entity.
            self.updated[position].entity = entity;
            self.updated[position].root |= root;
            return;
        }
        self.updated_ids.push(uuid);
        self.updated
            .push(EntityEvent::updated(old_entity, entity, root));
    }

    fn stage_deleted(&mut self, uuid: Uuid, entity: T, root: bool) {
        if self.deleted_ids.contains(&uuid) {
            return;
        }
        if let Some(position) = self.added_ids.iter().position(|id| *id == uuid) {
            self.added_ids.remove(position);
            self.added.remove(position);
        }
        if let Some(position) = self.updated_ids.iter().position(|id| *id == uuid) {
            self.updated_ids.remove(position);
            self.updated.remove(position);
        }
        self.deleted_ids.push(uuid);
        self.deleted.push(EntityEvent::deleted(entity, root));
    }

    fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }
}

/// Event batch staged during one mutating operation.
#[derive(Default)]
pub struct EventBatch {
    news: EventStage<News>,
    feeds: EventStage<Feed>,
    folders: EventStage<Folder>,
    marks: EventStage<Mark>,
    labels: EventStage<Label>,
    attachments: EventStage<Attachment>,
}

impl EventBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.news.is_empty()
            && self.feeds.is_empty()
            && self.folders.is_empty()
            && self.marks.is_empty()
            && self.labels.is_empty()
            && self.attachments.is_empty()
    }

    pub(crate) fn news_added(&mut self, news: News, root: bool) {
        self.news.stage_added(news.uuid, news, root);
    }

    pub(crate) fn news_updated(&mut self, old: News, new: News, root: bool) {
        self.news.stage_updated(new.uuid, old, new, root);
    }

    pub(crate) fn news_deleted(&mut self, news: News, root: bool) {
        self.news.stage_deleted(news.uuid, news, root);
    }

    pub(crate) fn feed_added(&mut self, feed: Feed, root: bool) {
        self.feeds.stage_added(feed.uuid, feed, root);
    }

    pub(crate) fn feed_updated(&mut self, old: Feed, new: Feed, root: bool) {
        self.feeds.stage_updated(new.uuid, old, new, root);
    }

    pub(crate) fn feed_deleted(&mut self, feed: Feed, root: bool) {
        self.feeds.stage_deleted(feed.uuid, feed, root);
    }

    pub(crate) fn folder_added(&mut self, folder: Folder, root: bool) {
        self.folders.stage_added(folder.uuid, folder, root);
    }

    pub(crate) fn folder_updated(&mut self, old: Folder, new: Folder, root: bool) {
        self.folders.stage_updated(new.uuid, old, new, root);
    }

    pub(crate) fn folder_deleted(&mut self, folder: Folder, root: bool) {
        self.folders.stage_deleted(folder.uuid, folder, root);
    }

    pub(crate) fn mark_added(&mut self, mark: Mark, root: bool) {
        self.marks.stage_added(mark.uuid, mark, root);
    }

    pub(crate) fn mark_updated(&mut self, old: Mark, new: Mark, root: bool) {
        self.marks.stage_updated(new.uuid, old, new, root);
    }

    pub(crate) fn mark_deleted(&mut self, mark: Mark, root: bool) {
        self.marks.stage_deleted(mark.uuid, mark, root);
    }

    pub(crate) fn label_added(&mut self, label: Label, root: bool) {
        self.labels.stage_added(label.uuid, label, root);
    }

    pub(crate) fn label_deleted(&mut self, label: Label, root: bool) {
        self.labels.stage_deleted(label.uuid, label, root);
    }

    pub(crate) fn attachment_added(&mut self, attachment: Attachment, root: bool) {
        self.attachments
            .stage_added(attachment.uuid, attachment, root);
    }

    pub(crate) fn attachment_deleted(&mut self, attachment: Attachment, root: bool) {
        self.attachments
            .stage_deleted(attachment.uuid, attachment, root);
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        EventStage<News>,
        EventStage<Feed>,
        EventStage<Folder>,
        EventStage<Mark>,
        EventStage<Label>,
        EventStage<Attachment>,
    ) {
        (
            self.news,
            self.feeds,
            self.folders,
            self.marks,
            self.labels,
            self.attachments,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::news::News;

    #[test]
    fn delete_suppresses_prior_update() {
        let mut batch = EventBatch::new();
        let news = News::incoming(0);
        let old = news.clone();

        batch.news_updated(old, news.clone(), true);
        batch.news_deleted(news.clone(), true);

        let (stage, ..) = batch.into_parts();
        assert!(stage.updated.is_empty());
        assert_eq!(stage.deleted.len(), 1);
    }

    #[test]
    fn update_after_delete_is_dropped() {
        let mut batch = EventBatch::new();
        let news = News::incoming(0);

        batch.news_deleted(news.clone(), true);
        batch.news_updated(news.clone(), news.clone(), false);

        let (stage, ..) = batch.into_parts();
        assert!(stage.updated.is_empty());
        assert_eq!(stage.deleted.len(), 1);
    }

    #[test]
    fn updates_coalesce_keeping_oldest_snapshot() {
        let mut batch = EventBatch::new();
        let mut news = News::incoming(0);
        let first = news.clone();
        news.title = Some("second".into());
        let second = news.clone();
        news.title = Some("third".into());
        let third = news.clone();

        batch.news_updated(first.clone(), second.clone(), false);
        batch.news_updated(second, third.clone(), true);

        let (stage, ..) = batch.into_parts();
        assert_eq!(stage.updated.len(), 1);
        let event = &stage.updated[0];
        assert_eq!(event.old_entity.as_ref().unwrap().title, first.title);
        assert_eq!(event.entity.title, third.title);
        assert!(event.root);
    }

    #[test]
    fn add_then_update_stays_one_add() {
        let mut batch = EventBatch::new();
        let mut news = News::incoming(0);
        batch.news_added(news.clone(), true);
        let old = news.clone();
        news.title = Some("revised".into());
        batch.news_updated(old, news.clone(), false);

        let (stage, ..) = batch.into_parts();
        assert_eq!(stage.added.len(), 1);
        assert!(stage.updated.is_empty());
        assert_eq!(stage.added[0].entity.title.as_deref(), Some("revised"));
    }
}
