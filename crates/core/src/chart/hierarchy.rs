//! Hierarchy consistency checks.
//!
//! The chart is an arena of nodes keyed by id with parent-id edges; no node
//! holds a live reference to another. Validity is checked by id-lookup
//! traversal with a depth guard so a cycle is detected even if one is ever
//! introduced by hand-edited data.

use std::collections::HashMap;

use meridian_shared::types::{AccountGroupId, SubGroupId};

use super::error::ChartError;
use super::types::{AccountGroup, AccountParent, AccountSubGroup};

/// Validates a sub-group against the existing hierarchy.
///
/// Checks that the parent group exists, that any parent sub-group exists,
/// and that following parent edges terminates without revisiting a node or
/// exceeding `max_depth`.
///
/// # Errors
///
/// Returns a [`ChartError`] naming the first structural problem found.
pub fn validate_sub_group(
    sub_group: &AccountSubGroup,
    groups: &HashMap<AccountGroupId, AccountGroup>,
    sub_groups: &HashMap<SubGroupId, AccountSubGroup>,
    max_depth: usize,
) -> Result<(), ChartError> {
    if sub_group.code.trim().is_empty() {
        return Err(ChartError::EmptyCode);
    }

    if !groups.contains_key(&sub_group.parent_group) {
        return Err(ChartError::GroupNotFound(sub_group.parent_group));
    }

    let mut seen = vec![sub_group.id];
    let mut next = sub_group.parent_sub_group;
    let mut depth = 0usize;

    while let Some(parent_id) = next {
        if seen.contains(&parent_id) {
            return Err(ChartError::CycleDetected(parent_id));
        }
        depth += 1;
        if depth > max_depth {
            return Err(ChartError::HierarchyTooDeep { max_depth });
        }

        let parent = sub_groups
            .get(&parent_id)
            .ok_or(ChartError::SubGroupNotFound(parent_id))?;
        seen.push(parent_id);
        next = parent.parent_sub_group;
    }

    Ok(())
}

/// Checks that an account's declared parent exists in the hierarchy.
///
/// # Errors
///
/// Returns a [`ChartError`] if the referenced group or sub-group is missing.
pub fn account_parent_exists(
    parent: AccountParent,
    groups: &HashMap<AccountGroupId, AccountGroup>,
    sub_groups: &HashMap<SubGroupId, AccountSubGroup>,
) -> Result<(), ChartError> {
    match parent {
        AccountParent::Group(id) => {
            if groups.contains_key(&id) {
                Ok(())
            } else {
                Err(ChartError::GroupNotFound(id))
            }
        }
        AccountParent::SubGroup(id) => {
            if sub_groups.contains_key(&id) {
                Ok(())
            } else {
                Err(ChartError::SubGroupNotFound(id))
            }
        }
    }
}
