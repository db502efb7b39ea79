//! Ownership cascade table and generic delete planning.
//!
//! # Responsibility
//! - Declare, as data, which child kinds each entity kind owns.
//! - Turn one delete request into a post-order plan (children strictly
//!   before their parent) so the engine can remove rows and stage delete
//!   events in one generic walk.
//!
//! # Invariants
//! - Deleting a child kind on its own never appears in any plan for its
//!   parent; plans only ever grow downward through ownership.

use crate::model::reference::{EntityKind, EntityRef};
use uuid::Uuid;

/// Child kinds owned by the given kind, in enumeration order.
pub(crate) fn children_of(kind: EntityKind) -> &'static [EntityKind] {
    match kind {
        EntityKind::Feed => &[EntityKind::News, EntityKind::Category, EntityKind::Person],
        EntityKind::News => &[
            EntityKind::Attachment,
            EntityKind::Category,
            EntityKind::Person,
        ],
        EntityKind::Folder => &[EntityKind::Mark, EntityKind::Folder],
        EntityKind::Mark => &[EntityKind::News],
        EntityKind::Label | EntityKind::Attachment | EntityKind::Category | EntityKind::Person => {
            &[]
        }
    }
}

/// Builds the post-order delete plan rooted at `root`.
///
/// `list_children` enumerates the persisted child ids of one parent for one
/// child kind; it is called once per (parent, child-kind) edge.
pub(crate) fn cascade_plan<F, E>(root: EntityRef, mut list_children: F) -> Result<Vec<EntityRef>, E>
where
    F: FnMut(EntityRef, EntityKind) -> Result<Vec<Uuid>, E>,
{
    let mut plan = Vec::new();
    walk(root, &mut list_children, &mut plan)?;
    Ok(plan)
}

fn walk<F, E>(node: EntityRef, list_children: &mut F, plan: &mut Vec<EntityRef>) -> Result<(), E>
where
    F: FnMut(EntityRef, EntityKind) -> Result<Vec<Uuid>, E>,
{
    for &child_kind in children_of(node.kind) {
        for uuid in list_children(node, child_kind)? {
            walk(EntityRef::new(child_kind, uuid), list_children, plan)?;
        }
    }
    plan.push(node);
    Ok(())
}
