use crate::error::{AppError, Result};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Normalizes a proposed member list for the given viewer: duplicates are
/// collapsed and the viewer is always part of the result. The size check is
/// structural per chat kind, a group needs more than two unique members
/// counting the viewer, a direct chat exactly two.
///
/// # Errors
/// Returns `AppError::Validation` if the normalized set is the wrong size for
/// the requested chat kind.
pub fn normalize_members(viewer: Uuid, proposed: &[Uuid], is_group: bool) -> Result<BTreeSet<Uuid>> {
    let mut members: BTreeSet<Uuid> = proposed.iter().copied().collect();
    members.insert(viewer);

    if is_group {
        if members.len() <= 2 {
            return Err(AppError::Validation(
                "A group chat needs more than two unique members".to_string(),
            ));
        }
    } else if members.len() != 2 {
        return Err(AppError::Validation(
            "A direct chat needs exactly one other member".to_string(),
        ));
    }

    Ok(members)
}
