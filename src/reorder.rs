//! Drag-and-drop reordering arithmetic, independent of any UI events

use serde::{Deserialize, Serialize};

/// Which side of the drop target the dragged item lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPosition {
    Above,
    Below,
}

/// Compute the id order after dropping `dragged_id` above or below `target_id`.
///
/// The dragged id is removed first and the insertion point is taken from the
/// target's index in the shortened list, so a dragged item that sat before the
/// target does not shift the result by one. Returns `None` when either id is
/// unknown or both name the same item.
pub fn compute_insertion_index(
    ordered_ids: &[String],
    dragged_id: &str,
    target_id: &str,
    position: DropPosition,
) -> Option<Vec<String>> {
    if dragged_id == target_id {
        return None;
    }

    let dragged_index = ordered_ids.iter().position(|id| id == dragged_id)?;
    let target_index = ordered_ids.iter().position(|id| id == target_id)?;

    let mut ids = ordered_ids.to_vec();
    let removed = ids.remove(dragged_index);

    let target_after_removal = if dragged_index < target_index {
        target_index - 1
    } else {
        target_index
    };
    let insert_index = match position {
        DropPosition::Above => target_after_removal,
        DropPosition::Below => target_after_removal + 1,
    }
    .min(ids.len());

    ids.insert(insert_index, removed);
    Some(ids)
}
