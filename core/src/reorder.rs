//! Drag-and-drop reordering of record ids.
//!
//! Grids send the dragged row and the row it was dropped in front of. These
//! functions apply that move to the list of ids in their stored order, so the
//! caller can rewrite each row's position column from the new index.

use crate::error::ReorderError;
use crate::protocol::MoveBefore;

fn index_of(ids: &[i64], id: i64) -> Option<usize> {
    ids.iter().position(|&v| v == id)
}

/// Move `id` so it sits immediately before `target`, or last for [`MoveBefore::Bottom`].
///
/// Leaves `ids` untouched when the record is already in place.
///
/// # Errors
///
/// Returns [`ReorderError`] if `ids` is empty or either id is not present.
///
/// # Example
///
/// ```
/// use w2kit_core::protocol::MoveBefore;
/// use w2kit_core::reorder::reorder;
///
/// let mut ids = [1, 2, 3, 4];
/// reorder(&mut ids, 4, MoveBefore::Record(2))?;
/// assert_eq!(ids, [1, 4, 2, 3]);
/// # Ok::<(), w2kit_core::ReorderError>(())
/// ```
pub fn reorder(ids: &mut [i64], id: i64, target: MoveBefore) -> Result<(), ReorderError> {
    if ids.is_empty() {
        return Err(ReorderError::Empty);
    }

    let from = index_of(ids, id).ok_or(ReorderError::IdNotFound(id))?;
    let before = match target {
        MoveBefore::Bottom => ids.len(),
        MoveBefore::Record(target) => {
            index_of(ids, target).ok_or(ReorderError::TargetNotFound(target))?
        }
    };

    if from + 1 == before || from == before {
        return Ok(());
    }

    if from < before {
        ids[from..before].rotate_left(1);
    } else {
        ids[before..=from].rotate_right(1);
    }

    Ok(())
}

/// Move every id in `moved` in front of `target`, keeping their current relative order.
///
/// # Errors
///
/// Returns [`ReorderError`] if `ids` is empty, any id is not present, or
/// `target` is itself being moved.
pub fn reorder_many(
    ids: &mut Vec<i64>,
    moved: &[i64],
    target: MoveBefore,
) -> Result<(), ReorderError> {
    if ids.is_empty() {
        return Err(ReorderError::Empty);
    }

    if let Some(&missing) = moved.iter().find(|&&id| index_of(ids, id).is_none()) {
        return Err(ReorderError::IdNotFound(missing));
    }

    if let MoveBefore::Record(target) = target {
        if moved.contains(&target) {
            return Err(ReorderError::TargetIsMoved(target));
        }
        if index_of(ids, target).is_none() {
            return Err(ReorderError::TargetNotFound(target));
        }
    }

    let (block, mut rest): (Vec<i64>, Vec<i64>) =
        ids.iter().partition(|id| moved.contains(id));

    let at = match target {
        MoveBefore::Bottom => rest.len(),
        MoveBefore::Record(target) => index_of(&rest, target).unwrap_or(rest.len()),
    };

    rest.splice(at..at, block);
    *ids = rest;
    Ok(())
}
