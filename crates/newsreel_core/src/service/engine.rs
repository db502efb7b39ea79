//! Transactional reconciliation engine.
//!
//! # Responsibility
//! - Run merge, retention and state propagation against the store under
//!   the single process-wide write lock, commit atomically, then deliver
//!   the staged event batch.
//! - Walk the cascade table for deletes, staging one event per entity.
//!
//! # Invariants
//! - Either every mutation of an operation commits and its events are
//!   delivered together, or none are.
//! - Event delivery happens after the lock is released, so listener work
//!   never blocks the next writer.

use crate::events::{EventBatch, EventBus};
use crate::model::feed::{Feed, FeedId};
use crate::model::folder::{Folder, FolderId, Mark, MarkId, MarkKind};
use crate::model::label::{Label, LabelId};
use crate::model::news::{News, NewsId, NewsParent, NewsState};
use crate::model::reference::{EntityKind, EntityRef};
use crate::repo::feed_repo::{FeedRepository, SqliteFeedRepository};
use crate::repo::news_repo::{NewsRepository, SqliteNewsRepository};
use crate::repo::tree_repo::{SqliteTreeRepository, TreeRepository};
use crate::service::cascade::cascade_plan;
use crate::service::merge::{merge_feed, IncomingFeed};
use crate::service::retention::{cleanup, retention_overflow, RetentionPolicy};
use crate::service::{EngineError, EngineResult};
use log::{debug, info};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Summary of one committed feed reload, in feed order.
#[derive(Debug, Clone, Default)]
pub struct ReloadOutcome {
    pub additions: Vec<News>,
    pub updates: Vec<News>,
    pub soft_deleted: Vec<NewsId>,
    pub purged: Vec<NewsId>,
}

impl ReloadOutcome {
    /// The news the downstream filter pipeline should see: additions and
    /// updates, never no-op items.
    pub fn affected(&self) -> Vec<News> {
        let mut affected = self.additions.clone();
        affected.extend(self.updates.iter().cloned());
        affected
    }
}

/// Reconciliation engine owning the store connection and the event bus.
pub struct Engine {
    conn: Mutex<Connection>,
    bus: EventBus,
}

impl Engine {
    pub fn new(conn: Connection, bus: EventBus) -> Self {
        Self {
            conn: Mutex::new(conn),
            bus,
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Runs one mutating operation inside an immediate transaction and
    /// dispatches its staged events after the lock is released.
    fn mutate<T>(
        &self,
        op: impl FnOnce(&Connection, &mut EventBatch) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let (value, batch) = {
            let conn = self.conn.lock().unwrap_or_else(|err| err.into_inner());
            let tx = Transaction::new_unchecked(&conn, TransactionBehavior::Immediate)?;
            let mut batch = EventBatch::new();
            let value = op(&conn, &mut batch)?;
            tx.commit()?;
            (value, batch)
        };
        if !batch.is_empty() {
            self.bus.dispatch(batch);
        }
        Ok(value)
    }

    fn read<T>(&self, op: impl FnOnce(&Connection) -> EngineResult<T>) -> EngineResult<T> {
        let conn = self.conn.lock().unwrap_or_else(|err| err.into_inner());
        op(&conn)
    }

    /// Reconciles a fetched feed graph against the store through the given
    /// bookmark and commits merge plus cleanup as one unit.
    pub fn handle_feed_reload(
        &self,
        bookmark_uuid: MarkId,
        incoming: &IncomingFeed,
        policy: &RetentionPolicy,
    ) -> EngineResult<ReloadOutcome> {
        let outcome = self.mutate(|conn, batch| {
            let tree_repo = SqliteTreeRepository::new(conn);
            let feed_repo = SqliteFeedRepository::new(conn);
            let news_repo = SqliteNewsRepository::new(conn);

            let mark = tree_repo
                .get_mark(bookmark_uuid)?
                .ok_or(EngineError::NotFound {
                    kind: EntityKind::Mark,
                    uuid: bookmark_uuid,
                })?;
            if mark.kind != MarkKind::Bookmark {
                return Err(EngineError::InvalidOperation(format!(
                    "mark {bookmark_uuid} is not a bookmark"
                )));
            }
            let link = mark.feed_link.clone().ok_or_else(|| {
                EngineError::InvalidOperation(format!("bookmark {bookmark_uuid} has no feed URL"))
            })?;

            let feed = match feed_repo.get_feed_by_link(&link)? {
                Some(feed) => feed,
                None => {
                    let mut feed = incoming.feed.clone();
                    feed.link = link.clone();
                    feed_repo.insert_feed(&feed)?;
                    batch.feed_added(feed.clone(), true);
                    feed
                }
            };

            let persisted = news_repo.list_feed_news(feed.uuid)?;
            let merged = merge_feed(&feed, &persisted, incoming);
            let mut reload = ReloadOutcome::default();

            let mut next_sort = news_repo.next_sort_order(NewsParent::Feed(feed.uuid))?;
            for mut addition in merged.additions {
                addition.parent = Some(NewsParent::Feed(feed.uuid));
                addition.sort_order = next_sort;
                next_sort += 1;
                news_repo.insert_news(&addition)?;
                batch.news_added(addition.clone(), false);
                for attachment in &addition.attachments {
                    batch.attachment_added(attachment.clone(), false);
                }
                reload.additions.push(addition);
            }

            for update in merged.updates {
                // Pure state merges go through the row-only path so the
                // shallow working snapshot never replaces child rows.
                let new_rev = if update.content_changed {
                    news_repo.update_news_content(&update.new, update.old.rev)?
                } else {
                    news_repo.update_news_state(
                        update.new.uuid,
                        update.new.state,
                        update.old.rev,
                    )?
                };
                let mut new = update.new;
                new.rev = new_rev;
                batch.news_updated(update.old, new.clone(), false);
                reload.updates.push(new);
            }

            let unmatched: Vec<News> = persisted
                .iter()
                .filter(|news| merged.unmatched.contains(&news.uuid))
                .cloned()
                .collect();
            let cleaned = cleanup(&unmatched, policy);
            for uuid in cleaned.to_soft_delete {
                if let Some(old) = unmatched.iter().find(|news| news.uuid == uuid) {
                    let new_rev =
                        news_repo.update_news_state(uuid, NewsState::Deleted, old.rev)?;
                    let mut new = old.clone();
                    new.state = NewsState::Deleted;
                    new.rev = new_rev;
                    batch.news_updated(old.clone(), new, false);
                    reload.soft_deleted.push(uuid);
                }
            }
            for uuid in cleaned.to_purge {
                cascade_delete(conn, batch, EntityRef::news(uuid), false)?;
                reload.purged.push(uuid);
            }

            let remaining = news_repo.list_feed_news(feed.uuid)?;
            for uuid in retention_overflow(&remaining, policy, now_ms()) {
                if let Some(old) = remaining.iter().find(|news| news.uuid == uuid) {
                    let new_rev =
                        news_repo.update_news_state(uuid, NewsState::Deleted, old.rev)?;
                    let mut new = old.clone();
                    new.state = NewsState::Deleted;
                    new.rev = new_rev;
                    batch.news_updated(old.clone(), new, false);
                    reload.soft_deleted.push(uuid);
                }
            }

            if let Some(updated) = merged.feed_update {
                feed_repo.update_feed(&updated)?;
                batch.feed_updated(feed, updated, true);
            }

            Ok(reload)
        })?;

        info!(
            "event=feed_reload module=engine added={} updated={} soft_deleted={} purged={} status=ok",
            outcome.additions.len(),
            outcome.updates.len(),
            outcome.soft_deleted.len(),
            outcome.purged.len()
        );
        Ok(outcome)
    }

    /// Applies a state change to the given news and, when requested, to
    /// every persisted equivalent across all feeds and bins.
    ///
    /// Unsaved input items are rejected; equivalents are changed only when
    /// their current state differs or `force` is set.
    pub fn set_news_state(
        &self,
        news_ids: &[NewsId],
        state: NewsState,
        affect_equivalent: bool,
        force: bool,
    ) -> EngineResult<Vec<News>> {
        let changed = self.mutate(|conn, batch| {
            let news_repo = SqliteNewsRepository::new(conn);
            let mut candidates: Vec<News> = Vec::new();
            let mut push = |news: News, into: &mut Vec<News>| {
                if !into.iter().any(|existing| existing.uuid == news.uuid) {
                    into.push(news);
                }
            };

            for &uuid in news_ids {
                let news = news_repo
                    .get_news(uuid, false)?
                    .ok_or(EngineError::IdentityResolution(uuid))?;
                if affect_equivalent {
                    match news.equivalence_key() {
                        Some(key) => {
                            for equivalent in news_repo.find_equivalent(&key)? {
                                push(equivalent, &mut candidates);
                            }
                        }
                        // Title-only identity is too weak to fan out; only
                        // the exact instance changes.
                        None => push(news, &mut candidates),
                    }
                } else {
                    push(news, &mut candidates);
                }
            }

            let mut changed = Vec::new();
            for old in candidates {
                if old.state == state && !force {
                    continue;
                }
                let new_rev = news_repo.update_news_state(old.uuid, state, old.rev)?;
                let mut new = old.clone();
                new.state = state;
                new.rev = new_rev;
                let root = news_ids.contains(&old.uuid);
                batch.news_updated(old, new.clone(), root);
                changed.push(new);
            }
            Ok(changed)
        })?;

        debug!(
            "event=set_news_state module=engine requested={} changed={} status=ok",
            news_ids.len(),
            changed.len()
        );
        Ok(changed)
    }

    /// Persists a directly edited news record. The record's `rev` must be
    /// the one it was loaded with.
    pub fn save_news(&self, news: &News) -> EngineResult<News> {
        self.mutate(|conn, batch| {
            let news_repo = SqliteNewsRepository::new(conn);
            let old = news_repo
                .get_news(news.uuid, false)?
                .ok_or(EngineError::NotFound {
                    kind: EntityKind::News,
                    uuid: news.uuid,
                })?;
            let new_rev = news_repo.update_news_content(news, news.rev)?;
            let mut updated = news.clone();
            updated.rev = new_rev;
            batch.news_updated(old, updated.clone(), true);
            Ok(updated)
        })
    }

    pub fn get_news(&self, uuid: NewsId) -> EngineResult<Option<News>> {
        self.read(|conn| Ok(SqliteNewsRepository::new(conn).get_news(uuid, true)?))
    }

    pub fn delete_news(&self, uuid: NewsId) -> EngineResult<()> {
        self.mutate(|conn, batch| cascade_delete(conn, batch, EntityRef::news(uuid), true))
    }

    /// Deletes one attachment on its own. The owning news is untouched.
    pub fn delete_attachment(&self, uuid: Uuid) -> EngineResult<()> {
        self.mutate(|conn, batch| {
            let news_repo = SqliteNewsRepository::new(conn);
            let attachment =
                news_repo
                    .get_attachment(uuid)?
                    .ok_or(EngineError::NotFound {
                        kind: EntityKind::Attachment,
                        uuid,
                    })?;
            news_repo.delete_attachment(uuid)?;
            batch.attachment_deleted(attachment, true);
            Ok(())
        })
    }

    pub fn feed_by_link(&self, link: &str) -> EngineResult<Option<Feed>> {
        self.read(|conn| Ok(SqliteFeedRepository::new(conn).get_feed_by_link(link)?))
    }

    pub fn news_of_feed(&self, feed_uuid: FeedId) -> EngineResult<Vec<News>> {
        self.read(|conn| Ok(SqliteNewsRepository::new(conn).list_feed_news(feed_uuid)?))
    }

    pub fn news_of_bin(&self, bin_uuid: MarkId) -> EngineResult<Vec<News>> {
        self.read(|conn| Ok(SqliteNewsRepository::new(conn).list_bin_news(bin_uuid)?))
    }

    /// Deletes a feed and everything it owns, with one root feed event and
    /// non-root events for the cascade.
    pub fn delete_feed(&self, uuid: FeedId) -> EngineResult<()> {
        self.mutate(|conn, batch| cascade_delete(conn, batch, EntityRef::feed(uuid), true))
    }

    pub fn create_folder(
        &self,
        parent: Option<FolderId>,
        name: &str,
    ) -> EngineResult<Folder> {
        self.mutate(|conn, batch| {
            let tree_repo = SqliteTreeRepository::new(conn);
            let folder = Folder {
                uuid: Uuid::new_v4(),
                parent_uuid: parent,
                name: name.to_string(),
                sort_order: tree_repo.next_folder_sort_order(parent)?,
            };
            tree_repo.insert_folder(&folder)?;
            batch.folder_added(folder.clone(), true);
            Ok(folder)
        })
    }

    pub fn rename_folder(&self, uuid: FolderId, name: &str) -> EngineResult<Folder> {
        self.mutate(|conn, batch| {
            let tree_repo = SqliteTreeRepository::new(conn);
            let old = tree_repo.get_folder(uuid)?.ok_or(EngineError::NotFound {
                kind: EntityKind::Folder,
                uuid,
            })?;
            tree_repo.rename_folder(uuid, name)?;
            let mut new = old.clone();
            new.name = name.to_string();
            batch.folder_updated(old, new.clone(), true);
            Ok(new)
        })
    }

    pub fn move_folder(
        &self,
        uuid: FolderId,
        new_parent: Option<FolderId>,
    ) -> EngineResult<Folder> {
        self.mutate(|conn, batch| {
            let tree_repo = SqliteTreeRepository::new(conn);
            let old = tree_repo.get_folder(uuid)?.ok_or(EngineError::NotFound {
                kind: EntityKind::Folder,
                uuid,
            })?;
            tree_repo.move_folder(uuid, new_parent)?;
            let mut new = old.clone();
            new.parent_uuid = new_parent;
            batch.folder_updated(old, new.clone(), true);
            Ok(new)
        })
    }

    /// Deletes a folder with its subtree: contained marks, their news
    /// copies and child folders.
    pub fn delete_folder(&self, uuid: FolderId) -> EngineResult<()> {
        self.mutate(|conn, batch| {
            cascade_delete(conn, batch, EntityRef::new(EntityKind::Folder, uuid), true)
        })
    }

    pub fn get_folder(&self, uuid: FolderId) -> EngineResult<Option<Folder>> {
        self.read(|conn| Ok(SqliteTreeRepository::new(conn).get_folder(uuid)?))
    }

    pub fn child_folders(&self, parent: Option<FolderId>) -> EngineResult<Vec<Folder>> {
        self.read(|conn| Ok(SqliteTreeRepository::new(conn).list_child_folders(parent)?))
    }

    pub fn folder_marks(&self, folder: Option<FolderId>) -> EngineResult<Vec<Mark>> {
        self.read(|conn| Ok(SqliteTreeRepository::new(conn).list_folder_marks(folder)?))
    }

    pub fn get_mark(&self, uuid: MarkId) -> EngineResult<Option<Mark>> {
        self.read(|conn| Ok(SqliteTreeRepository::new(conn).get_mark(uuid)?))
    }

    pub fn create_bookmark(
        &self,
        folder: Option<FolderId>,
        name: &str,
        feed_link: &str,
    ) -> EngineResult<Mark> {
        self.create_mark(folder, name, MarkKind::Bookmark, Some(feed_link))
    }

    pub fn create_news_bin(&self, folder: Option<FolderId>, name: &str) -> EngineResult<Mark> {
        self.create_mark(folder, name, MarkKind::NewsBin, None)
    }

    pub fn create_search_mark(&self, folder: Option<FolderId>, name: &str) -> EngineResult<Mark> {
        self.create_mark(folder, name, MarkKind::SearchMark, None)
    }

    fn create_mark(
        &self,
        folder: Option<FolderId>,
        name: &str,
        kind: MarkKind,
        feed_link: Option<&str>,
    ) -> EngineResult<Mark> {
        self.mutate(|conn, batch| {
            let tree_repo = SqliteTreeRepository::new(conn);
            let mark = Mark {
                uuid: Uuid::new_v4(),
                folder_uuid: folder,
                kind,
                name: name.to_string(),
                feed_link: feed_link.map(str::to_string),
                sort_order: tree_repo.next_mark_sort_order(folder)?,
            };
            tree_repo.insert_mark(&mark)?;
            batch.mark_added(mark.clone(), true);
            Ok(mark)
        })
    }

    pub fn rename_mark(&self, uuid: MarkId, name: &str) -> EngineResult<Mark> {
        self.mutate(|conn, batch| {
            let tree_repo = SqliteTreeRepository::new(conn);
            let old = tree_repo.get_mark(uuid)?.ok_or(EngineError::NotFound {
                kind: EntityKind::Mark,
                uuid,
            })?;
            tree_repo.rename_mark(uuid, name)?;
            let mut new = old.clone();
            new.name = name.to_string();
            batch.mark_updated(old, new.clone(), true);
            Ok(new)
        })
    }

    pub fn move_mark(&self, uuid: MarkId, new_folder: Option<FolderId>) -> EngineResult<Mark> {
        self.mutate(|conn, batch| {
            let tree_repo = SqliteTreeRepository::new(conn);
            let old = tree_repo.get_mark(uuid)?.ok_or(EngineError::NotFound {
                kind: EntityKind::Mark,
                uuid,
            })?;
            tree_repo.move_mark(uuid, new_folder)?;
            let mut new = old.clone();
            new.folder_uuid = new_folder;
            batch.mark_updated(old, new.clone(), true);
            Ok(new)
        })
    }

    /// Deletes a mark. A news bin takes its news copies with it; deleting
    /// the last bookmark of a feed URL purges the now-unreferenced feed.
    pub fn delete_mark(&self, uuid: MarkId) -> EngineResult<()> {
        self.mutate(|conn, batch| {
            let tree_repo = SqliteTreeRepository::new(conn);
            let feed_repo = SqliteFeedRepository::new(conn);
            let mark = tree_repo.get_mark(uuid)?.ok_or(EngineError::NotFound {
                kind: EntityKind::Mark,
                uuid,
            })?;
            cascade_delete(conn, batch, EntityRef::new(EntityKind::Mark, uuid), true)?;

            if mark.kind == MarkKind::Bookmark {
                if let Some(link) = mark.feed_link.as_deref() {
                    if tree_repo.list_bookmarks_for_link(link)?.is_empty() {
                        if let Some(feed) = feed_repo.get_feed_by_link(link)? {
                            cascade_delete(conn, batch, EntityRef::feed(feed.uuid), false)?;
                            info!(
                                "event=feed_purge module=engine link={link} status=ok"
                            );
                        }
                    }
                }
            }
            Ok(())
        })
    }

    pub fn create_label(&self, name: &str, color: Option<&str>) -> EngineResult<Label> {
        self.mutate(|conn, batch| {
            let news_repo = SqliteNewsRepository::new(conn);
            let mut label = Label::named(name);
            label.color = color.map(str::to_string);
            label.sort_order = news_repo.list_labels()?.len() as i64;
            news_repo.insert_label(&label)?;
            batch.label_added(label.clone(), true);
            Ok(label)
        })
    }

    pub fn labels(&self) -> EngineResult<Vec<Label>> {
        self.read(|conn| Ok(SqliteNewsRepository::new(conn).list_labels()?))
    }

    pub fn attach_label(&self, news_uuid: NewsId, label_uuid: LabelId) -> EngineResult<()> {
        self.mutate(|conn, batch| {
            let news_repo = SqliteNewsRepository::new(conn);
            let old = news_repo
                .get_news(news_uuid, true)?
                .ok_or(EngineError::NotFound {
                    kind: EntityKind::News,
                    uuid: news_uuid,
                })?;
            news_repo.get_label(label_uuid)?.ok_or(EngineError::NotFound {
                kind: EntityKind::Label,
                uuid: label_uuid,
            })?;
            if news_repo.attach_label(news_uuid, label_uuid)? {
                let mut new = old.clone();
                new.labels.push(label_uuid);
                batch.news_updated(old, new, true);
            }
            Ok(())
        })
    }

    pub fn detach_label(&self, news_uuid: NewsId, label_uuid: LabelId) -> EngineResult<()> {
        self.mutate(|conn, batch| {
            let news_repo = SqliteNewsRepository::new(conn);
            let old = news_repo
                .get_news(news_uuid, true)?
                .ok_or(EngineError::NotFound {
                    kind: EntityKind::News,
                    uuid: news_uuid,
                })?;
            if news_repo.detach_label(news_uuid, label_uuid)? {
                let mut new = old.clone();
                new.labels.retain(|label| *label != label_uuid);
                batch.news_updated(old, new, true);
            }
            Ok(())
        })
    }

    /// Deletes a label and its assignments. Labeled news survive and
    /// receive non-root update events.
    pub fn delete_label(&self, uuid: LabelId) -> EngineResult<()> {
        self.mutate(|conn, batch| {
            let news_repo = SqliteNewsRepository::new(conn);
            let label = news_repo.get_label(uuid)?.ok_or(EngineError::NotFound {
                kind: EntityKind::Label,
                uuid,
            })?;
            let affected = news_repo.news_with_label(uuid)?;
            let mut olds = Vec::new();
            for news_uuid in affected {
                if let Some(old) = news_repo.get_news(news_uuid, true)? {
                    olds.push(old);
                }
            }
            news_repo.delete_label(uuid)?;
            for old in olds {
                let mut new = old.clone();
                new.labels.retain(|label| *label != uuid);
                batch.news_updated(old, new, false);
            }
            batch.label_deleted(label, true);
            Ok(())
        })
    }

    /// Copies news into a bin as independent records with new identities
    /// and their own lifecycle.
    pub fn copy_news_to_bin(
        &self,
        news_ids: &[NewsId],
        bin_uuid: MarkId,
    ) -> EngineResult<Vec<News>> {
        self.mutate(|conn, batch| {
            let copies = copy_into_bin(conn, batch, news_ids, bin_uuid)?;
            Ok(copies)
        })
    }

    /// Moves news into a bin: a copy is created and the original deleted,
    /// within one transaction.
    pub fn move_news_to_bin(
        &self,
        news_ids: &[NewsId],
        bin_uuid: MarkId,
    ) -> EngineResult<Vec<News>> {
        self.mutate(|conn, batch| {
            let copies = copy_into_bin(conn, batch, news_ids, bin_uuid)?;
            for &uuid in news_ids {
                cascade_delete(conn, batch, EntityRef::news(uuid), true)?;
            }
            Ok(copies)
        })
    }
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

fn copy_into_bin(
    conn: &Connection,
    batch: &mut EventBatch,
    news_ids: &[NewsId],
    bin_uuid: MarkId,
) -> EngineResult<Vec<News>> {
    let tree_repo = SqliteTreeRepository::new(conn);
    let news_repo = SqliteNewsRepository::new(conn);

    let bin = tree_repo.get_mark(bin_uuid)?.ok_or(EngineError::NotFound {
        kind: EntityKind::Mark,
        uuid: bin_uuid,
    })?;
    if bin.kind != MarkKind::NewsBin {
        return Err(EngineError::InvalidOperation(format!(
            "mark {bin_uuid} is not a news bin"
        )));
    }

    let mut next_sort = news_repo.next_sort_order(NewsParent::Bin(bin_uuid))?;
    let mut copies = Vec::new();
    for &uuid in news_ids {
        let original = news_repo
            .get_news(uuid, true)?
            .ok_or(EngineError::NotFound {
                kind: EntityKind::News,
                uuid,
            })?;
        let mut copy = original.clone();
        copy.uuid = Uuid::new_v4();
        copy.parent = Some(NewsParent::Bin(bin_uuid));
        copy.rev = 0;
        copy.sort_order = next_sort;
        next_sort += 1;
        if let Some(author) = &mut copy.author {
            author.uuid = Uuid::new_v4();
        }
        for category in &mut copy.categories {
            category.uuid = Uuid::new_v4();
        }
        for attachment in &mut copy.attachments {
            attachment.uuid = Uuid::new_v4();
            attachment.news_uuid = copy.uuid;
        }
        news_repo.insert_news(&copy)?;
        batch.news_added(copy.clone(), true);
        for attachment in &copy.attachments {
            batch.attachment_added(attachment.clone(), false);
        }
        copies.push(copy);
    }
    Ok(copies)
}

/// Deletes one entity and everything it owns, children strictly first.
///
/// `root_is_target` marks whether the root entity was the direct subject
/// of the caller's request; cascaded entities always produce non-root
/// events, and row-only child kinds produce none.
fn cascade_delete(
    conn: &Connection,
    batch: &mut EventBatch,
    root: EntityRef,
    root_is_target: bool,
) -> EngineResult<()> {
    let news_repo = SqliteNewsRepository::new(conn);
    let feed_repo = SqliteFeedRepository::new(conn);
    let tree_repo = SqliteTreeRepository::new(conn);

    let plan = cascade_plan(root, |parent, child_kind| -> EngineResult<Vec<Uuid>> {
        match (parent.kind, child_kind) {
            (EntityKind::Feed, EntityKind::News) => Ok(news_repo
                .list_feed_news(parent.uuid)?
                .into_iter()
                .map(|news| news.uuid)
                .collect()),
            (EntityKind::Feed, kind) => Ok(feed_repo.list_feed_child_ids(parent.uuid, kind)?),
            (EntityKind::News, kind) => Ok(news_repo.list_child_ids(parent.uuid, kind)?),
            (EntityKind::Folder, EntityKind::Folder) => Ok(tree_repo
                .list_child_folders(Some(parent.uuid))?
                .into_iter()
                .map(|folder| folder.uuid)
                .collect()),
            (EntityKind::Folder, EntityKind::Mark) => Ok(tree_repo
                .list_folder_marks(Some(parent.uuid))?
                .into_iter()
                .map(|mark| mark.uuid)
                .collect()),
            (EntityKind::Mark, EntityKind::News) => Ok(news_repo
                .list_bin_news(parent.uuid)?
                .into_iter()
                .map(|news| news.uuid)
                .collect()),
            _ => Ok(Vec::new()),
        }
    })?;

    for entity in plan {
        let root_flag = entity == root && root_is_target;
        match entity.kind {
            EntityKind::Attachment => {
                if let Some(attachment) = news_repo.get_attachment(entity.uuid)? {
                    news_repo.delete_attachment(entity.uuid)?;
                    batch.attachment_deleted(attachment, root_flag);
                }
            }
            EntityKind::Category => news_repo.delete_category(entity.uuid)?,
            EntityKind::Person => news_repo.delete_person(entity.uuid)?,
            EntityKind::News => {
                if let Some(news) = news_repo.get_news(entity.uuid, false)? {
                    news_repo.delete_news(entity.uuid)?;
                    batch.news_deleted(news, root_flag);
                } else if root_flag {
                    return Err(EngineError::NotFound {
                        kind: EntityKind::News,
                        uuid: entity.uuid,
                    });
                }
            }
            EntityKind::Feed => {
                if let Some(feed) = feed_repo.get_feed(entity.uuid)? {
                    feed_repo.delete_feed(entity.uuid)?;
                    batch.feed_deleted(feed, root_flag);
                } else if root_flag {
                    return Err(EngineError::NotFound {
                        kind: EntityKind::Feed,
                        uuid: entity.uuid,
                    });
                }
            }
            EntityKind::Folder => {
                if let Some(folder) = tree_repo.get_folder(entity.uuid)? {
                    tree_repo.delete_folder(entity.uuid)?;
                    batch.folder_deleted(folder, root_flag);
                } else if root_flag {
                    return Err(EngineError::NotFound {
                        kind: EntityKind::Folder,
                        uuid: entity.uuid,
                    });
                }
            }
            EntityKind::Mark => {
                if let Some(mark) = tree_repo.get_mark(entity.uuid)? {
                    tree_repo.delete_mark(entity.uuid)?;
                    batch.mark_deleted(mark, root_flag);
                } else if root_flag {
                    return Err(EngineError::NotFound {
                        kind: EntityKind::Mark,
                        uuid: entity.uuid,
                    });
                }
            }
            EntityKind::Label => {}
        }
    }

    if root.kind == EntityKind::News && root_is_target {
        debug!("event=news_delete module=engine status=ok");
    }
    Ok(())
}
