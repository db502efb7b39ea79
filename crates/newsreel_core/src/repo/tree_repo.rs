//! Folder/mark tree repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over folders and marks (bookmarks, search marks, news
//!   bins) plus the bookmark-by-URL query that drives feed lifetime.
//!
//! # Invariants
//! - Folder moves are rejected when they would create a cycle.
//! - Bookmark marks always carry a feed URL; the constraint is enforced by
//!   the schema and re-checked here for clearer errors.

use crate::model::folder::{Folder, FolderId, Mark, MarkId, MarkKind};
use crate::model::reference::EntityKind;
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const FOLDER_SELECT_SQL: &str =
    "SELECT uuid, parent_uuid, name, sort_order FROM folders";
const MARK_SELECT_SQL: &str =
    "SELECT uuid, folder_uuid, kind, name, feed_link, sort_order FROM marks";

/// Repository interface for the folder/mark hierarchy.
pub trait TreeRepository {
    fn insert_folder(&self, folder: &Folder) -> RepoResult<()>;
    fn get_folder(&self, uuid: FolderId) -> RepoResult<Option<Folder>>;
    /// Direct child folders; `None` lists root-level folders.
    fn list_child_folders(&self, parent: Option<FolderId>) -> RepoResult<Vec<Folder>>;
    fn rename_folder(&self, uuid: FolderId, name: &str) -> RepoResult<()>;
    /// Re-parents a folder; fails when the target is the folder itself or
    /// one of its descendants.
    fn move_folder(&self, uuid: FolderId, new_parent: Option<FolderId>) -> RepoResult<()>;
    /// Deletes the folder row only; contained marks and subfolders are
    /// removed by the cascade walk beforehand.
    fn delete_folder(&self, uuid: FolderId) -> RepoResult<()>;

    fn insert_mark(&self, mark: &Mark) -> RepoResult<()>;
    fn get_mark(&self, uuid: MarkId) -> RepoResult<Option<Mark>>;
    /// Marks under one folder; `None` lists root-level marks.
    fn list_folder_marks(&self, folder: Option<FolderId>) -> RepoResult<Vec<Mark>>;
    fn rename_mark(&self, uuid: MarkId, name: &str) -> RepoResult<()>;
    fn move_mark(&self, uuid: MarkId, new_folder: Option<FolderId>) -> RepoResult<()>;
    fn delete_mark(&self, uuid: MarkId) -> RepoResult<()>;

    /// All bookmark marks referencing the given canonical feed URL.
    fn list_bookmarks_for_link(&self, link: &str) -> RepoResult<Vec<Mark>>;

    fn next_folder_sort_order(&self, parent: Option<FolderId>) -> RepoResult<i64>;
    fn next_mark_sort_order(&self, folder: Option<FolderId>) -> RepoResult<i64>;
}

/// SQLite-backed tree repository.
pub struct SqliteTreeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTreeRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn is_descendant_or_self(&self, candidate: FolderId, root: FolderId) -> RepoResult<bool> {
        let mut cursor = Some(candidate);
        while let Some(current) = cursor {
            if current == root {
                return Ok(true);
            }
            let parent: Option<String> = self
                .conn
                .query_row(
                    "SELECT parent_uuid FROM folders WHERE uuid = ?1;",
                    [current.to_string()],
                    |row| row.get(0),
                )
                .optional()?
                .flatten();
            cursor = parent
                .map(|uuid| parse_uuid(&uuid, "folders.parent_uuid"))
                .transpose()?;
        }
        Ok(false)
    }
}

impl TreeRepository for SqliteTreeRepository<'_> {
    fn insert_folder(&self, folder: &Folder) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO folders (uuid, parent_uuid, name, sort_order) VALUES (?1, ?2, ?3, ?4);",
            params![
                folder.uuid.to_string(),
                folder.parent_uuid.map(|uuid| uuid.to_string()),
                folder.name.as_str(),
                folder.sort_order,
            ],
        )?;
        Ok(())
    }

    fn get_folder(&self, uuid: FolderId) -> RepoResult<Option<Folder>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{FOLDER_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([uuid.to_string()])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        Ok(Some(parse_folder_row(row)?))
    }

    fn list_child_folders(&self, parent: Option<FolderId>) -> RepoResult<Vec<Folder>> {
        let (sql, param) = match parent {
            Some(parent) => (
                format!(
                    "{FOLDER_SELECT_SQL} WHERE parent_uuid = ?1 ORDER BY sort_order ASC, name ASC;"
                ),
                Some(parent.to_string()),
            ),
            None => (
                format!(
                    "{FOLDER_SELECT_SQL} WHERE parent_uuid IS NULL ORDER BY sort_order ASC, name ASC;"
                ),
                None,
            ),
        };
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = match &param {
            Some(uuid) => stmt.query([uuid.as_str()])?,
            None => stmt.query([])?,
        };
        let mut folders = Vec::new();
        while let Some(row) = rows.next()? {
            folders.push(parse_folder_row(row)?);
        }
        Ok(folders)
    }

    fn rename_folder(&self, uuid: FolderId, name: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE folders SET name = ?1, updated_at = strftime('%s', 'now') * 1000
             WHERE uuid = ?2;",
            params![name, uuid.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Folder, uuid));
        }
        Ok(())
    }

    fn move_folder(&self, uuid: FolderId, new_parent: Option<FolderId>) -> RepoResult<()> {
        if let Some(parent) = new_parent {
            if self.is_descendant_or_self(parent, uuid)? {
                return Err(RepoError::InvalidData(format!(
                    "moving folder {uuid} under {parent} would create a cycle"
                )));
            }
            if self.get_folder(parent)?.is_none() {
                return Err(RepoError::not_found(EntityKind::Folder, parent));
            }
        }
        let changed = self.conn.execute(
            "UPDATE folders SET parent_uuid = ?1, updated_at = strftime('%s', 'now') * 1000
             WHERE uuid = ?2;",
            params![new_parent.map(|parent| parent.to_string()), uuid.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Folder, uuid));
        }
        Ok(())
    }

    fn delete_folder(&self, uuid: FolderId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM folders WHERE uuid = ?1;", [uuid.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Folder, uuid));
        }
        Ok(())
    }

    fn insert_mark(&self, mark: &Mark) -> RepoResult<()> {
        if mark.kind == MarkKind::Bookmark && mark.feed_link.is_none() {
            return Err(RepoError::InvalidData(format!(
                "bookmark {} must reference a feed URL",
                mark.uuid
            )));
        }
        self.conn.execute(
            "INSERT INTO marks (uuid, folder_uuid, kind, name, feed_link, sort_order)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                mark.uuid.to_string(),
                mark.folder_uuid.map(|uuid| uuid.to_string()),
                kind_to_db(mark.kind),
                mark.name.as_str(),
                mark.feed_link.as_deref(),
                mark.sort_order,
            ],
        )?;
        Ok(())
    }

    fn get_mark(&self, uuid: MarkId) -> RepoResult<Option<Mark>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MARK_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([uuid.to_string()])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        Ok(Some(parse_mark_row(row)?))
    }

    fn list_folder_marks(&self, folder: Option<FolderId>) -> RepoResult<Vec<Mark>> {
        let (sql, param) = match folder {
            Some(folder) => (
                format!(
                    "{MARK_SELECT_SQL} WHERE folder_uuid = ?1 ORDER BY sort_order ASC, name ASC;"
                ),
                Some(folder.to_string()),
            ),
            None => (
                format!(
                    "{MARK_SELECT_SQL} WHERE folder_uuid IS NULL ORDER BY sort_order ASC, name ASC;"
                ),
                None,
            ),
        };
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = match &param {
            Some(uuid) => stmt.query([uuid.as_str()])?,
            None => stmt.query([])?,
        };
        let mut marks = Vec::new();
        while let Some(row) = rows.next()? {
            marks.push(parse_mark_row(row)?);
        }
        Ok(marks)
    }

    fn rename_mark(&self, uuid: MarkId, name: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE marks SET name = ?1, updated_at = strftime('%s', 'now') * 1000
             WHERE uuid = ?2;",
            params![name, uuid.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Mark, uuid));
        }
        Ok(())
    }

    fn move_mark(&self, uuid: MarkId, new_folder: Option<FolderId>) -> RepoResult<()> {
        if let Some(folder) = new_folder {
            if self.get_folder(folder)?.is_none() {
                return Err(RepoError::not_found(EntityKind::Folder, folder));
            }
        }
        let changed = self.conn.execute(
            "UPDATE marks SET folder_uuid = ?1, updated_at = strftime('%s', 'now') * 1000
             WHERE uuid = ?2;",
            params![new_folder.map(|folder| folder.to_string()), uuid.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Mark, uuid));
        }
        Ok(())
    }

    fn delete_mark(&self, uuid: MarkId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM marks WHERE uuid = ?1;", [uuid.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Mark, uuid));
        }
        Ok(())
    }

    fn list_bookmarks_for_link(&self, link: &str) -> RepoResult<Vec<Mark>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MARK_SELECT_SQL} WHERE kind = 'bookmark' AND feed_link = ?1 ORDER BY uuid ASC;"
        ))?;
        let mut rows = stmt.query([link])?;
        let mut marks = Vec::new();
        while let Some(row) = rows.next()? {
            marks.push(parse_mark_row(row)?);
        }
        Ok(marks)
    }

    fn next_folder_sort_order(&self, parent: Option<FolderId>) -> RepoResult<i64> {
        let max: Option<i64> = match parent {
            Some(parent) => self.conn.query_row(
                "SELECT MAX(sort_order) FROM folders WHERE parent_uuid = ?1;",
                [parent.to_string()],
                |row| row.get(0),
            )?,
            None => self.conn.query_row(
                "SELECT MAX(sort_order) FROM folders WHERE parent_uuid IS NULL;",
                [],
                |row| row.get(0),
            )?,
        };
        Ok(max.map_or(0, |value| value + 1))
    }

    fn next_mark_sort_order(&self, folder: Option<FolderId>) -> RepoResult<i64> {
        let max: Option<i64> = match folder {
            Some(folder) => self.conn.query_row(
                "SELECT MAX(sort_order) FROM marks WHERE folder_uuid = ?1;",
                [folder.to_string()],
                |row| row.get(0),
            )?,
            None => self.conn.query_row(
                "SELECT MAX(sort_order) FROM marks WHERE folder_uuid IS NULL;",
                [],
                |row| row.get(0),
            )?,
        };
        Ok(max.map_or(0, |value| value + 1))
    }
}

fn parse_folder_row(row: &Row<'_>) -> RepoResult<Folder> {
    let uuid_text: String = row.get(0)?;
    let parent_text: Option<String> = row.get(1)?;
    Ok(Folder {
        uuid: parse_uuid(&uuid_text, "folders.uuid")?,
        parent_uuid: parent_text
            .map(|uuid| parse_uuid(&uuid, "folders.parent_uuid"))
            .transpose()?,
        name: row.get(2)?,
        sort_order: row.get(3)?,
    })
}

fn parse_mark_row(row: &Row<'_>) -> RepoResult<Mark> {
    let uuid_text: String = row.get(0)?;
    let folder_text: Option<String> = row.get(1)?;
    let kind_text: String = row.get(2)?;
    let kind = parse_kind(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid kind `{kind_text}` in marks.kind"))
    })?;
    Ok(Mark {
        uuid: parse_uuid(&uuid_text, "marks.uuid")?,
        folder_uuid: folder_text
            .map(|uuid| parse_uuid(&uuid, "marks.folder_uuid"))
            .transpose()?,
        kind,
        name: row.get(3)?,
        feed_link: row.get(4)?,
        sort_order: row.get(5)?,
    })
}

pub(crate) fn kind_to_db(kind: MarkKind) -> &'static str {
    match kind {
        MarkKind::Bookmark => "bookmark",
        MarkKind::SearchMark => "search_mark",
        MarkKind::NewsBin => "news_bin",
    }
}

pub(crate) fn parse_kind(value: &str) -> Option<MarkKind> {
    match value {
        "bookmark" => Some(MarkKind::Bookmark),
        "search_mark" => Some(MarkKind::SearchMark),
        "news_bin" => Some(MarkKind::NewsBin),
        _ => None,
    }
}
