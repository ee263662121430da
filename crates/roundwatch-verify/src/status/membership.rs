//! Status set membership checks

use crate::violation::{render_list, Violation};
use roundwatch_core::{NodeId, PlatformStatus};
use std::collections::BTreeSet;

/// Fail if `status` is in `forbidden`.
pub fn check_not_any_of(
    node: NodeId,
    status: PlatformStatus,
    forbidden: &BTreeSet<PlatformStatus>,
) -> Result<(), Violation> {
    if forbidden.contains(&status) {
        return Err(Violation::ForbiddenStatus {
            node,
            status,
            forbidden: render_list(forbidden),
        });
    }
    Ok(())
}

/// Fail if `status` is not in `allowed`.
pub fn check_only(
    node: NodeId,
    status: PlatformStatus,
    allowed: &BTreeSet<PlatformStatus>,
) -> Result<(), Violation> {
    if !allowed.contains(&status) {
        return Err(Violation::StatusNotAllowed {
            node,
            status,
            allowed: render_list(allowed),
        });
    }
    Ok(())
}
