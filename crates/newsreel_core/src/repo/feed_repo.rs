//! Feed repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over feed rows and the feed-owned author/category rows.
//! - Resolve feeds by canonical URL for bookmark-driven lookups.
//!
//! # Invariants
//! - The canonical URL is unique; one feed row per subscribed source.
//! - Deleting a feed row never removes its child rows here; the cascade
//!   walk enumerates and removes them first.

use crate::model::feed::{Feed, FeedId};
use crate::model::news::{Category, Person};
use crate::model::reference::EntityKind;
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const FEED_SELECT_SQL: &str = "SELECT
    uuid,
    link,
    title,
    homepage,
    description,
    language,
    copyright,
    publish_date,
    last_build_date,
    image_url
FROM feeds";

/// Repository interface for feed persistence.
pub trait FeedRepository {
    fn insert_feed(&self, feed: &Feed) -> RepoResult<()>;
    /// Replaces descriptive attributes and feed-owned child rows.
    fn update_feed(&self, feed: &Feed) -> RepoResult<()>;
    fn get_feed(&self, uuid: FeedId) -> RepoResult<Option<Feed>>;
    fn get_feed_by_link(&self, link: &str) -> RepoResult<Option<Feed>>;
    fn list_feeds(&self) -> RepoResult<Vec<Feed>>;
    /// Feed-owned child row ids of the given kind (categories, persons).
    fn list_feed_child_ids(&self, feed_uuid: FeedId, child: EntityKind) -> RepoResult<Vec<Uuid>>;
    /// Deletes the feed row only.
    fn delete_feed(&self, uuid: FeedId) -> RepoResult<()>;
}

/// SQLite-backed feed repository.
pub struct SqliteFeedRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFeedRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn insert_children(&self, feed: &Feed) -> RepoResult<()> {
        if let Some(author) = &feed.author {
            self.conn.execute(
                "INSERT INTO persons (uuid, news_uuid, feed_uuid, name, email, uri)
                 VALUES (?1, NULL, ?2, ?3, ?4, ?5);",
                params![
                    author.uuid.to_string(),
                    feed.uuid.to_string(),
                    author.name.as_deref(),
                    author.email.as_deref(),
                    author.uri.as_deref(),
                ],
            )?;
        }
        for category in &feed.categories {
            self.conn.execute(
                "INSERT INTO categories (uuid, news_uuid, feed_uuid, name, domain)
                 VALUES (?1, NULL, ?2, ?3, ?4);",
                params![
                    category.uuid.to_string(),
                    feed.uuid.to_string(),
                    category.name.as_str(),
                    category.domain.as_deref(),
                ],
            )?;
        }
        Ok(())
    }

    fn delete_children(&self, feed_uuid: FeedId) -> RepoResult<()> {
        let uuid_text = feed_uuid.to_string();
        self.conn
            .execute("DELETE FROM persons WHERE feed_uuid = ?1;", [&uuid_text])?;
        self.conn
            .execute("DELETE FROM categories WHERE feed_uuid = ?1;", [&uuid_text])?;
        Ok(())
    }

    fn hydrate(&self, feed: &mut Feed) -> RepoResult<()> {
        let uuid_text = feed.uuid.to_string();

        feed.author = self
            .conn
            .query_row(
                "SELECT uuid, name, email, uri FROM persons WHERE feed_uuid = ?1;",
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
            "SELECT uuid, name, domain FROM categories WHERE feed_uuid = ?1 ORDER BY uuid;",
        )?;
        let mut rows = stmt.query([&uuid_text])?;
        feed.categories.clear();
        while let Some(row) = rows.next()? {
            let uuid: String = row.get(0)?;
            feed.categories.push(Category {
                uuid: parse_uuid(&uuid, "categories.uuid")?,
                name: row.get(1)?,
                domain: row.get(2)?,
            });
        }
        Ok(())
    }
}

impl FeedRepository for SqliteFeedRepository<'_> {
    fn insert_feed(&self, feed: &Feed) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO feeds (
                uuid, link, title, homepage, description, language, copyright,
                publish_date, last_build_date, image_url
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                feed.uuid.to_string(),
                feed.link.as_str(),
                feed.title.as_deref(),
                feed.homepage.as_deref(),
                feed.description.as_deref(),
                feed.language.as_deref(),
                feed.copyright.as_deref(),
                feed.publish_date,
                feed.last_build_date,
                feed.image_url.as_deref(),
            ],
        )?;
        self.insert_children(feed)
    }

    fn update_feed(&self, feed: &Feed) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE feeds SET
                title = ?1,
                homepage = ?2,
                description = ?3,
                language = ?4,
                copyright = ?5,
                publish_date = ?6,
                last_build_date = ?7,
                image_url = ?8,
                updated_at = strftime('%s', 'now') * 1000
             WHERE uuid = ?9;",
            params![
                feed.title.as_deref(),
                feed.homepage.as_deref(),
                feed.description.as_deref(),
                feed.language.as_deref(),
                feed.copyright.as_deref(),
                feed.publish_date,
                feed.last_build_date,
                feed.image_url.as_deref(),
                feed.uuid.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Feed, feed.uuid));
        }
        self.delete_children(feed.uuid)?;
        self.insert_children(feed)
    }

    fn get_feed(&self, uuid: FeedId) -> RepoResult<Option<Feed>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{FEED_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([uuid.to_string()])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        let mut feed = parse_feed_row(row)?;
        self.hydrate(&mut feed)?;
        Ok(Some(feed))
    }

    fn get_feed_by_link(&self, link: &str) -> RepoResult<Option<Feed>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{FEED_SELECT_SQL} WHERE link = ?1;"))?;
        let mut rows = stmt.query([link])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        let mut feed = parse_feed_row(row)?;
        self.hydrate(&mut feed)?;
        Ok(Some(feed))
    }

    fn list_feeds(&self) -> RepoResult<Vec<Feed>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{FEED_SELECT_SQL} ORDER BY link ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut feeds = Vec::new();
        while let Some(row) = rows.next()? {
            feeds.push(parse_feed_row(row)?);
        }
        Ok(feeds)
    }

    fn list_feed_child_ids(&self, feed_uuid: FeedId, child: EntityKind) -> RepoResult<Vec<Uuid>> {
        let sql = match child {
            EntityKind::Category => "SELECT uuid FROM categories WHERE feed_uuid = ?1;",
            EntityKind::Person => "SELECT uuid FROM persons WHERE feed_uuid = ?1;",
            other => {
                return Err(RepoError::InvalidData(format!(
                    "feeds own no child rows of kind {other:?}"
                )));
            }
        };
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([feed_uuid.to_string()])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid: String = row.get(0)?;
            ids.push(parse_uuid(&uuid, "child uuid")?);
        }
        Ok(ids)
    }

    fn delete_feed(&self, uuid: FeedId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM feeds WHERE uuid = ?1;", [uuid.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Feed, uuid));
        }
        Ok(())
    }
}

fn parse_feed_row(row: &Row<'_>) -> RepoResult<Feed> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Feed {
        uuid: parse_uuid(&uuid_text, "feeds.uuid")?,
        link: row.get("link")?,
        title: row.get("title")?,
        homepage: row.get("homepage")?,
        description: row.get("description")?,
        language: row.get("language")?,
        copyright: row.get("copyright")?,
        publish_date: row.get("publish_date")?,
        last_build_date: row.get("last_build_date")?,
        image_url: row.get("image_url")?,
        author: None,
        categories: Vec::new(),
    })
}
