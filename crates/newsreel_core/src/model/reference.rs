//! Entity kinds and lightweight re-resolvable references.
//!
//! # Responsibility
//! - Enumerate the closed set of entity kinds used by events and by the
//!   cascade-delete table.
//! - Provide an id+kind handle that survives hydration boundaries: code
//!   that must retain an entity across a transaction keeps the reference
//!   and re-resolves it through the store instead of holding a stale deep
//!   graph.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closed set of entity kinds known to the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Feed,
    News,
    Folder,
    Mark,
    Label,
    Attachment,
    Category,
    Person,
}

/// Lightweight handle: entity kind plus stable id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub uuid: Uuid,
}

impl EntityRef {
    pub fn new(kind: EntityKind, uuid: Uuid) -> Self {
        Self { kind, uuid }
    }

    pub fn news(uuid: Uuid) -> Self {
        Self::new(EntityKind::News, uuid)
    }

    pub fn feed(uuid: Uuid) -> Self {
        Self::new(EntityKind::Feed, uuid)
    }
}
