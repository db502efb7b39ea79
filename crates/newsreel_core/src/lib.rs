//! Core reconciliation logic for Newsreel.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod events;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use events::{EntityEvent, EntityListener, EventBus, ListenerToken};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::feed::{Feed, FeedId};
pub use model::folder::{Folder, FolderId, Mark, MarkId, MarkKind};
pub use model::label::{Label, LabelId};
pub use model::news::{
    Attachment, Category, EquivalenceKey, Guid, IdentityKey, MatchStrategy, News, NewsId,
    NewsParent, NewsState, Person,
};
pub use model::reference::{EntityKind, EntityRef};
pub use repo::{RepoError, RepoResult};
pub use service::engine::{Engine, ReloadOutcome};
pub use service::merge::{merge_feed, IncomingFeed, MergeOutcome, NewsUpdate};
pub use service::retention::{CleanupOutcome, RetentionPolicy};
pub use service::{EngineError, EngineResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
