// ABOUTME: Validated domain types shared across the crate.
// ABOUTME: Release identifiers and task group names.

mod group_name;
mod release_id;

pub use group_name::{GroupName, GroupNameError};
pub use release_id::{ReleaseId, ReleaseIdError, SKIP_MARKER};
