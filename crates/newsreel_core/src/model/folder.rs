//! Folder/mark hierarchy model.
//!
//! # Responsibility
//! - Define folder tree nodes and the three mark kinds that live in them.
//!
//! # Invariants
//! - Folders form a tree; moves must never create cycles.
//! - A bookmark mark always carries the canonical URL of its feed.
//! - A news-bin mark parents independent news copies with their own
//!   lifecycle.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for folder entities.
pub type FolderId = Uuid;

/// Stable identifier for mark entities (bookmarks, search marks, news bins).
pub type MarkId = Uuid;

/// Tree node grouping marks and child folders; purely structural, used for
/// cascade-delete scoping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub uuid: FolderId,
    /// `None` means root-level folder.
    pub parent_uuid: Option<FolderId>,
    pub name: String,
    pub sort_order: i64,
}

/// Kind of a mark node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkKind {
    /// Weak reference to a feed by canonical URL.
    Bookmark,
    /// Saved search definition (evaluated outside this core).
    SearchMark,
    /// Container of independent news copies.
    NewsBin,
}

/// Mark node living under an optional folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    pub uuid: MarkId,
    pub folder_uuid: Option<FolderId>,
    pub kind: MarkKind,
    pub name: String,
    /// Canonical feed URL; present exactly for `MarkKind::Bookmark`.
    pub feed_link: Option<String>,
    pub sort_order: i64,
}
