//! Reconciliation services on top of the repositories.
//!
//! # Responsibility
//! - Define the engine-facing error taxonomy.
//! - Host the pure merge and retention computations, the cascade table and
//!   the transactional engine that ties them together.

pub mod cascade;
pub mod engine;
pub mod merge;
pub mod retention;

use crate::model::news::NewsId;
use crate::model::reference::EntityKind;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt;
use uuid::Uuid;

/// Errors surfaced by engine operations.
#[derive(Debug)]
pub enum EngineError {
    /// Underlying store failure. The whole transaction was rolled back.
    Store(RepoError),
    /// Another writer mutated the entity between read and commit. Not
    /// retried automatically; a silent retry could duplicate fan-out.
    ConcurrentModification {
        uuid: Uuid,
        expected_rev: i64,
        actual_rev: i64,
    },
    NotFound {
        kind: EntityKind,
        uuid: Uuid,
    },
    /// State propagation was requested for an item that is not persisted.
    IdentityResolution(NewsId),
    InvalidOperation(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(source) => write!(f, "store failure: {source}"),
            Self::ConcurrentModification {
                uuid,
                expected_rev,
                actual_rev,
            } => write!(
                f,
                "concurrent modification of {uuid}: expected rev {expected_rev}, found {actual_rev}"
            ),
            Self::NotFound { kind, uuid } => write!(f, "no {kind:?} with uuid {uuid}"),
            Self::IdentityResolution(uuid) => write!(
                f,
                "news {uuid} has no persisted identity; save it before propagating state"
            ),
            Self::InvalidOperation(message) => write!(f, "invalid operation: {message}"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(source) => Some(source),
            _ => None,
        }
    }
}

impl From<RepoError> for EngineError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::RevisionConflict {
                uuid,
                expected_rev,
                actual_rev,
            } => Self::ConcurrentModification {
                uuid,
                expected_rev,
                actual_rev,
            },
            RepoError::NotFound { kind, uuid } => Self::NotFound { kind, uuid },
            other => Self::Store(other),
        }
    }
}

impl From<rusqlite::Error> for EngineError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Store(RepoError::from(value))
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
