use crate::{AccessOptions, Feature, ProgramId, UserPermission, resolve_feature_access};

/// Returns whether the caller's program membership covers a record's owning program.
///
/// This never grants edit rights on its own; see [`can_edit_record`].
#[must_use]
pub fn owns_record(
    permission: Option<&UserPermission>,
    record_program_id: Option<ProgramId>,
    options: AccessOptions,
) -> bool {
    if options.is_passcode_user {
        return true;
    }

    let Some(permission) = permission else {
        return false;
    };

    if permission.is_admin() {
        return true;
    }

    match record_program_id {
        // Unassigned records may be claimed by anyone with feature-level edit.
        None => true,
        Some(program_id) => permission.programs().contains(program_id),
    }
}

/// Per-row edit decision: feature-level edit AND record ownership.
#[must_use]
pub fn can_edit_record(
    permission: Option<&UserPermission>,
    feature: Feature,
    record_program_id: Option<ProgramId>,
    options: AccessOptions,
) -> bool {
    resolve_feature_access(permission, feature, options).can_edit()
        && owns_record(permission, record_program_id, options)
}
