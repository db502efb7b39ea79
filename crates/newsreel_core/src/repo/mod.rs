//! Persistence contracts and SQLite implementations.
//!
//! # Responsibility
//! - Provide the load/save/delete/query-by-field primitives the engine
//!   composes into transactions.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Repositories never open their own transactions for multi-entity
//!   operations; the engine owns transaction scope.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::reference::EntityKind;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod feed_repo;
pub mod news_repo;
pub mod tree_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by all entity repositories.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound { kind: EntityKind, uuid: Uuid },
    /// Stored revision differs from the revision the caller read.
    RevisionConflict {
        uuid: Uuid,
        expected_rev: i64,
        actual_rev: i64,
    },
    InvalidData(String),
}

impl RepoError {
    pub(crate) fn not_found(kind: EntityKind, uuid: Uuid) -> Self {
        Self::NotFound { kind, uuid }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { kind, uuid } => write!(f, "entity not found: {kind:?} {uuid}"),
            Self::RevisionConflict {
                uuid,
                expected_rev,
                actual_rev,
            } => write!(
                f,
                "revision conflict on {uuid}: expected {expected_rev}, store has {actual_rev}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn parse_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
