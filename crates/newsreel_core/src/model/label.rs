//! Label domain model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for label entities.
pub type LabelId = Uuid;

/// User-defined label attachable to many news.
///
/// Deleting a label detaches it everywhere; it never deletes news.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub uuid: LabelId,
    pub name: String,
    pub color: Option<String>,
    pub sort_order: i64,
}

impl Label {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            color: None,
            sort_order: 0,
        }
    }
}
