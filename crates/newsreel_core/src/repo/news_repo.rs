//! News repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over news rows plus their owned child rows (author,
//!   categories, attachments) and label assignments.
//! - Provide the equivalence query (guid/link across all feeds and bins)
//!   used by state propagation.
//!
//! # Invariants
//! - Every persisted news has exactly one owner (feed or bin).
//! - Row updates bump `rev` and fail on revision mismatch instead of
//!   silently overwriting another writer.
//! - Label assignments are only changed through label operations; content
//!   and state updates never touch them.

use crate::model::label::{Label, LabelId};
use crate::model::news::{
    Attachment, Category, EquivalenceKey, Guid, News, NewsId, NewsParent, NewsState, Person,
};
use crate::model::reference::EntityKind;
use crate::repo::{bool_to_int, parse_bool, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const NEWS_SELECT_SQL: &str = "SELECT
    uuid,
    feed_uuid,
    bin_uuid,
    title,
    link,
    guid_value,
    guid_permalink,
    description,
    source,
    publish_date,
    modified_date,
    received_date,
    rating,
    flagged,
    state,
    rev,
    sort_order
FROM news";

/// Repository interface for news persistence and queries.
pub trait NewsRepository {
    /// Inserts one news row plus its child rows. The news must be owned.
    fn insert_news(&self, news: &News) -> RepoResult<()>;
    /// Replaces content attributes and child rows; returns the new revision.
    fn update_news_content(&self, news: &News, expected_rev: i64) -> RepoResult<i64>;
    /// Updates state only; returns the new revision.
    fn update_news_state(
        &self,
        uuid: NewsId,
        state: NewsState,
        expected_rev: i64,
    ) -> RepoResult<i64>;
    /// Loads one news; `hydrate` additionally loads author, categories,
    /// attachments and label assignments.
    fn get_news(&self, uuid: NewsId, hydrate: bool) -> RepoResult<Option<News>>;
    /// Lists the news of one feed in feed order, shallow.
    fn list_feed_news(&self, feed_uuid: Uuid) -> RepoResult<Vec<News>>;
    /// Lists the news copies of one bin in bin order, shallow.
    fn list_bin_news(&self, bin_uuid: Uuid) -> RepoResult<Vec<News>>;
    /// Next free sort position under the given owner.
    fn next_sort_order(&self, parent: NewsParent) -> RepoResult<i64>;
    /// All persisted news sharing the identity key, across feeds and bins.
    fn find_equivalent(&self, key: &EquivalenceKey) -> RepoResult<Vec<News>>;
    fn list_attachments(&self, news_uuid: NewsId) -> RepoResult<Vec<Attachment>>;
    fn get_attachment(&self, uuid: Uuid) -> RepoResult<Option<Attachment>>;
    fn delete_attachment(&self, uuid: Uuid) -> RepoResult<()>;
    /// Child row ids of one news for the given child kind.
    fn list_child_ids(&self, news_uuid: NewsId, child: EntityKind) -> RepoResult<Vec<Uuid>>;
    fn delete_category(&self, uuid: Uuid) -> RepoResult<()>;
    fn delete_person(&self, uuid: Uuid) -> RepoResult<()>;
    /// Deletes the news row and its label assignments. Child rows must have
    /// been removed by the cascade walk beforehand.
    fn delete_news(&self, uuid: NewsId) -> RepoResult<()>;

    fn insert_label(&self, label: &Label) -> RepoResult<()>;
    fn get_label(&self, uuid: LabelId) -> RepoResult<Option<Label>>;
    fn list_labels(&self) -> RepoResult<Vec<Label>>;
    /// Returns false when the assignment already existed.
    fn attach_label(&self, news_uuid: NewsId, label_uuid: LabelId) -> RepoResult<bool>;
    /// Returns false when there was no assignment to remove.
    fn detach_label(&self, news_uuid: NewsId, label_uuid: LabelId) -> RepoResult<bool>;
    fn news_with_label(&self, label_uuid: LabelId) -> RepoResult<Vec<NewsId>>;
    /// Deletes the label and all its assignments; never the news.
    fn delete_label(&self, uuid: LabelId) -> RepoResult<()>;
    fn labels_of(&self, news_uuid: NewsId) -> RepoResult<Vec<LabelId>>;
}

/// SQLite-backed news repository.
pub struct SqliteNewsRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNewsRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn insert_children(&self, news: &News) -> RepoResult<()> {
        if let Some(author) = &news.author {
            self.conn.execute(
                "INSERT INTO persons (uuid, news_uuid, feed_uuid, name, email, uri)
                 VALUES (?1, ?2, NULL, ?3, ?4, ?5);",
                params![
                    author.uuid.to_string(),
                    news.uuid.to_string(),
                    author.name.as_deref(),
                    author.email.as_deref(),
                    author.uri.as_deref(),
                ],
            )?;
        }
        for category in &news.categories {
            self.conn.execute(
                "INSERT INTO categories (uuid, news_uuid, feed_uuid, name, domain)
                 VALUES (?1, ?2, NULL, ?3, ?4);",
                params![
                    category.uuid.to_string(),
                    news.uuid.to_string(),
                    category.name.as_str(),
                    category.domain.as_deref(),
                ],
            )?;
        }
        for attachment in &news.attachments {
            self.conn.execute(
                "INSERT INTO attachments (uuid, news_uuid, url, mime_type, length)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    attachment.uuid.to_string(),
                    news.uuid.to_string(),
                    attachment.url.as_str(),
                    attachment.mime_type.as_deref(),
                    attachment.length,
                ],
            )?;
        }
        Ok(())
    }

    fn delete_children(&self, news_uuid: NewsId) -> RepoResult<()> {
        let uuid_text = news_uuid.to_string();
        self.conn
            .execute("DELETE FROM persons WHERE news_uuid = ?1;", [&uuid_text])?;
        self.conn
            .execute("DELETE FROM categories WHERE news_uuid = ?1;", [&uuid_text])?;
        self.conn
            .execute("DELETE FROM attachments WHERE news_uuid = ?1;", [&uuid_text])?;
        Ok(())
    }

    fn current_rev(&self, uuid: NewsId) -> RepoResult<Option<i64>> {
        let rev = self
            .conn
            .query_row(
                "SELECT rev FROM news WHERE uuid = ?1;",
                [uuid.to_string()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(rev)
    }

    fn hydrate(&self, news: &mut News) -> RepoResult<()> {
        let uuid_text = news.uuid.to_string();

        news.author = self
            .conn
            .query_row(
                "SELECT uuid, name, email, uri FROM persons WHERE news_uuid = ?1;",
                [&uuid_text],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<String>>(3)?,
                    ))
                },
            )
            .optional()?
            .map(|(uuid, name, email, uri)| {
                Ok::<_, RepoError>(Person {
                    uuid: parse_uuid(&uuid, "persons.uuid")?,
                    name,
                    email,
                    uri,
                })
            })
            .transpose()?;

        let mut stmt = self.conn.prepare(
            "SELECT uuid, name, domain FROM categories WHERE news_uuid = ?1 ORDER BY uuid;",
        )?;
        let mut rows = stmt.query([&uuid_text])?;
        news.categories.clear();
        while let Some(row) = rows.next()? {
            let uuid: String = row.get(0)?;
            news.categories.push(Category {
                uuid: parse_uuid(&uuid, "categories.uuid")?,
                name: row.get(1)?,
                domain: row.get(2)?,
            });
        }

        news.attachments = self.list_attachments(news.uuid)?;
        news.labels = self.labels_of(news.uuid)?;
        Ok(())
    }
}

impl NewsRepository for SqliteNewsRepository<'_> {
    fn insert_news(&self, news: &News) -> RepoResult<()> {
        let (feed_uuid, bin_uuid) = match news.parent {
            Some(NewsParent::Feed(feed_uuid)) => (Some(feed_uuid.to_string()), None),
            Some(NewsParent::Bin(bin_uuid)) => (None, Some(bin_uuid.to_string())),
            None => {
                return Err(RepoError::InvalidData(format!(
                    "refusing to persist unowned news {}",
                    news.uuid
                )));
            }
        };

        self.conn.execute(
            "INSERT INTO news (
                uuid, feed_uuid, bin_uuid, title, link, guid_value, guid_permalink,
                description, source, publish_date, modified_date, received_date,
                rating, flagged, state, rev, sort_order
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17);",
            params![
                news.uuid.to_string(),
                feed_uuid,
                bin_uuid,
                news.title.as_deref(),
                news.link.as_deref(),
                news.guid.as_ref().map(|guid| guid.value.as_str()),
                bool_to_int(news.guid.as_ref().map(|guid| guid.permalink).unwrap_or(false)),
                news.description.as_deref(),
                news.source.as_deref(),
                news.publish_date,
                news.modified_date,
                news.received_date,
                news.rating,
                bool_to_int(news.flagged),
                state_to_db(news.state),
                news.rev,
                news.sort_order,
            ],
        )?;

        self.insert_children(news)?;
        for label_uuid in &news.labels {
            self.attach_label(news.uuid, *label_uuid)?;
        }
        Ok(())
    }

    fn update_news_content(&self, news: &News, expected_rev: i64) -> RepoResult<i64> {
        let new_rev = expected_rev + 1;
        let changed = self.conn.execute(
            "UPDATE news SET
                title = ?1,
                link = ?2,
                guid_value = ?3,
                guid_permalink = ?4,
                description = ?5,
                source = ?6,
                publish_date = ?7,
                modified_date = ?8,
                rating = ?9,
                flagged = ?10,
                state = ?11,
                sort_order = ?12,
                rev = ?13
             WHERE uuid = ?14 AND rev = ?15;",
            params![
                news.title.as_deref(),
                news.link.as_deref(),
                news.guid.as_ref().map(|guid| guid.value.as_str()),
                bool_to_int(news.guid.as_ref().map(|guid| guid.permalink).unwrap_or(false)),
                news.description.as_deref(),
                news.source.as_deref(),
                news.publish_date,
                news.modified_date,
                news.rating,
                bool_to_int(news.flagged),
                state_to_db(news.state),
                news.sort_order,
                new_rev,
                news.uuid.to_string(),
                expected_rev,
            ],
        )?;

        if changed == 0 {
            return match self.current_rev(news.uuid)? {
                None => Err(RepoError::not_found(EntityKind::News, news.uuid)),
                Some(actual_rev) => Err(RepoError::RevisionConflict {
                    uuid: news.uuid,
                    expected_rev,
                    actual_rev,
                }),
            };
        }

        self.delete_children(news.uuid)?;
        self.insert_children(news)?;
        Ok(new_rev)
    }

    fn update_news_state(
        &self,
        uuid: NewsId,
        state: NewsState,
        expected_rev: i64,
    ) -> RepoResult<i64> {
        let new_rev = expected_rev + 1;
        let changed = self.conn.execute(
            "UPDATE news SET state = ?1, rev = ?2 WHERE uuid = ?3 AND rev = ?4;",
            params![state_to_db(state), new_rev, uuid.to_string(), expected_rev],
        )?;

        if changed == 0 {
            return match self.current_rev(uuid)? {
                None => Err(RepoError::not_found(EntityKind::News, uuid)),
                Some(actual_rev) => Err(RepoError::RevisionConflict {
                    uuid,
                    expected_rev,
                    actual_rev,
                }),
            };
        }
        Ok(new_rev)
    }

    fn get_news(&self, uuid: NewsId, hydrate: bool) -> RepoResult<Option<News>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NEWS_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([uuid.to_string()])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        let mut news = parse_news_row(row)?;
        if hydrate {
            self.hydrate(&mut news)?;
        }
        Ok(Some(news))
    }

    fn list_feed_news(&self, feed_uuid: Uuid) -> RepoResult<Vec<News>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NEWS_SELECT_SQL} WHERE feed_uuid = ?1 ORDER BY sort_order ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([feed_uuid.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_news_row(row)?);
        }
        Ok(items)
    }

    fn list_bin_news(&self, bin_uuid: Uuid) -> RepoResult<Vec<News>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NEWS_SELECT_SQL} WHERE bin_uuid = ?1 ORDER BY sort_order ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([bin_uuid.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_news_row(row)?);
        }
        Ok(items)
    }

    fn next_sort_order(&self, parent: NewsParent) -> RepoResult<i64> {
        let (column, uuid) = match parent {
            NewsParent::Feed(uuid) => ("feed_uuid", uuid),
            NewsParent::Bin(uuid) => ("bin_uuid", uuid),
        };
        let max: Option<i64> = self.conn.query_row(
            &format!("SELECT MAX(sort_order) FROM news WHERE {column} = ?1;"),
            [uuid.to_string()],
            |row| row.get(0),
        )?;
        Ok(max.map_or(0, |value| value + 1))
    }

    fn find_equivalent(&self, key: &EquivalenceKey) -> RepoResult<Vec<News>> {
        let (sql, value) = match key {
            EquivalenceKey::Guid(value) => (
                format!("{NEWS_SELECT_SQL} WHERE guid_value = ?1 ORDER BY uuid ASC;"),
                value,
            ),
            EquivalenceKey::Link(value) => (
                format!("{NEWS_SELECT_SQL} WHERE link = ?1 ORDER BY uuid ASC;"),
                value,
            ),
        };
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([value.as_str()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_news_row(row)?);
        }
        Ok(items)
    }

    fn list_attachments(&self, news_uuid: NewsId) -> RepoResult<Vec<Attachment>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, news_uuid, url, mime_type, length
             FROM attachments WHERE news_uuid = ?1 ORDER BY uuid ASC;",
        )?;
        let mut rows = stmt.query([news_uuid.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_attachment_row(row)?);
        }
        Ok(items)
    }

    fn get_attachment(&self, uuid: Uuid) -> RepoResult<Option<Attachment>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, news_uuid, url, mime_type, length FROM attachments WHERE uuid = ?1;",
        )?;
        let mut rows = stmt.query([uuid.to_string()])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        Ok(Some(parse_attachment_row(row)?))
    }

    fn delete_attachment(&self, uuid: Uuid) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM attachments WHERE uuid = ?1;", [uuid.to_string()])?;
        Ok(())
    }

    fn list_child_ids(&self, news_uuid: NewsId, child: EntityKind) -> RepoResult<Vec<Uuid>> {
        let sql = match child {
            EntityKind::Attachment => "SELECT uuid FROM attachments WHERE news_uuid = ?1;",
            EntityKind::Category => "SELECT uuid FROM categories WHERE news_uuid = ?1;",
            EntityKind::Person => "SELECT uuid FROM persons WHERE news_uuid = ?1;",
            other => {
                return Err(RepoError::InvalidData(format!(
                    "news has no child rows of kind {other:?}"
                )));
            }
        };
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([news_uuid.to_string()])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid: String = row.get(0)?;
            ids.push(parse_uuid(&uuid, "child uuid")?);
        }
        Ok(ids)
    }

    fn delete_category(&self, uuid: Uuid) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM categories WHERE uuid = ?1;", [uuid.to_string()])?;
        Ok(())
    }

    fn delete_person(&self, uuid: Uuid) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM persons WHERE uuid = ?1;", [uuid.to_string()])?;
        Ok(())
    }

    fn delete_news(&self, uuid: NewsId) -> RepoResult<()> {
        let uuid_text = uuid.to_string();
        self.conn
            .execute("DELETE FROM news_labels WHERE news_uuid = ?1;", [&uuid_text])?;
        let changed = self
            .conn
            .execute("DELETE FROM news WHERE uuid = ?1;", [&uuid_text])?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::News, uuid));
        }
        Ok(())
    }

    fn insert_label(&self, label: &Label) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO labels (uuid, name, color, sort_order) VALUES (?1, ?2, ?3, ?4);",
            params![
                label.uuid.to_string(),
                label.name.as_str(),
                label.color.as_deref(),
                label.sort_order,
            ],
        )?;
        Ok(())
    }

    fn get_label(&self, uuid: LabelId) -> RepoResult<Option<Label>> {
        let mut stmt = self
            .conn
            .prepare("SELECT uuid, name, color, sort_order FROM labels WHERE uuid = ?1;")?;
        let mut rows = stmt.query([uuid.to_string()])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        let uuid_text: String = row.get(0)?;
        Ok(Some(Label {
            uuid: parse_uuid(&uuid_text, "labels.uuid")?,
            name: row.get(1)?,
            color: row.get(2)?,
            sort_order: row.get(3)?,
        }))
    }

    fn list_labels(&self) -> RepoResult<Vec<Label>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, name, color, sort_order FROM labels ORDER BY sort_order ASC, name ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get(0)?;
            items.push(Label {
                uuid: parse_uuid(&uuid_text, "labels.uuid")?,
                name: row.get(1)?,
                color: row.get(2)?,
                sort_order: row.get(3)?,
            });
        }
        Ok(items)
    }

    fn attach_label(&self, news_uuid: NewsId, label_uuid: LabelId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO news_labels (news_uuid, label_uuid) VALUES (?1, ?2);",
            params![news_uuid.to_string(), label_uuid.to_string()],
        )?;
        Ok(changed > 0)
    }

    fn detach_label(&self, news_uuid: NewsId, label_uuid: LabelId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM news_labels WHERE news_uuid = ?1 AND label_uuid = ?2;",
            params![news_uuid.to_string(), label_uuid.to_string()],
        )?;
        Ok(changed > 0)
    }

    fn news_with_label(&self, label_uuid: LabelId) -> RepoResult<Vec<NewsId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT news_uuid FROM news_labels WHERE label_uuid = ?1 ORDER BY news_uuid;")?;
        let mut rows = stmt.query([label_uuid.to_string()])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid: String = row.get(0)?;
            ids.push(parse_uuid(&uuid, "news_labels.news_uuid")?);
        }
        Ok(ids)
    }

    fn delete_label(&self, uuid: LabelId) -> RepoResult<()> {
        let uuid_text = uuid.to_string();
        self.conn
            .execute("DELETE FROM news_labels WHERE label_uuid = ?1;", [&uuid_text])?;
        let changed = self
            .conn
            .execute("DELETE FROM labels WHERE uuid = ?1;", [&uuid_text])?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Label, uuid));
        }
        Ok(())
    }

    fn labels_of(&self, news_uuid: NewsId) -> RepoResult<Vec<LabelId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT label_uuid FROM news_labels WHERE news_uuid = ?1 ORDER BY label_uuid;")?;
        let mut rows = stmt.query([news_uuid.to_string()])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid: String = row.get(0)?;
            ids.push(parse_uuid(&uuid, "news_labels.label_uuid")?);
        }
        Ok(ids)
    }
}

fn parse_news_row(row: &Row<'_>) -> RepoResult<News> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = parse_uuid(&uuid_text, "news.uuid")?;

    let feed_uuid: Option<String> = row.get("feed_uuid")?;
    let bin_uuid: Option<String> = row.get("bin_uuid")?;
    let parent = match (feed_uuid, bin_uuid) {
        (Some(feed), None) => NewsParent::Feed(parse_uuid(&feed, "news.feed_uuid")?),
        (None, Some(bin)) => NewsParent::Bin(parse_uuid(&bin, "news.bin_uuid")?),
        _ => {
            return Err(RepoError::InvalidData(format!(
                "news {uuid_text} must have exactly one owner"
            )));
        }
    };

    let guid = match row.get::<_, Option<String>>("guid_value")? {
        Some(value) => Some(Guid {
            value,
            permalink: parse_bool(row.get("guid_permalink")?, "news.guid_permalink")?,
        }),
        None => None,
    };

    let state_text: String = row.get("state")?;
    let state = parse_state(&state_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid state `{state_text}` in news.state"))
    })?;

    Ok(News {
        uuid,
        parent: Some(parent),
        title: row.get("title")?,
        link: row.get("link")?,
        guid,
        description: row.get("description")?,
        source: row.get("source")?,
        publish_date: row.get("publish_date")?,
        modified_date: row.get("modified_date")?,
        received_date: row.get("received_date")?,
        rating: row.get("rating")?,
        flagged: parse_bool(row.get("flagged")?, "news.flagged")?,
        state,
        author: None,
        categories: Vec::new(),
        attachments: Vec::new(),
        labels: Vec::new(),
        rev: row.get("rev")?,
        sort_order: row.get("sort_order")?,
    })
}

fn parse_attachment_row(row: &Row<'_>) -> RepoResult<Attachment> {
    let uuid_text: String = row.get(0)?;
    let news_uuid_text: String = row.get(1)?;
    Ok(Attachment {
        uuid: parse_uuid(&uuid_text, "attachments.uuid")?,
        news_uuid: parse_uuid(&news_uuid_text, "attachments.news_uuid")?,
        url: row.get(2)?,
        mime_type: row.get(3)?,
        length: row.get(4)?,
    })
}

pub(crate) fn state_to_db(state: NewsState) -> &'static str {
    match state {
        NewsState::New => "new",
        NewsState::Updated => "updated",
        NewsState::Unread => "unread",
        NewsState::Read => "read",
        NewsState::Hidden => "hidden",
        NewsState::Deleted => "deleted",
    }
}

pub(crate) fn parse_state(value: &str) -> Option<NewsState> {
    match value {
        "new" => Some(NewsState::New),
        "updated" => Some(NewsState::Updated),
        "unread" => Some(NewsState::Unread),
        "read" => Some(NewsState::Read),
        "hidden" => Some(NewsState::Hidden),
        "deleted" => Some(NewsState::Deleted),
        _ => None,
    }
}
