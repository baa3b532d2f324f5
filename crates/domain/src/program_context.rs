use std::collections::BTreeSet;

use crate::{ProgramId, UserPermission};

/// Program membership classification derived from one permission record.
///
/// Computed per decision and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramPermissionContext {
    /// Whether the record grants any program-scoped access.
    pub has_access: bool,
    /// Effective program set used by downstream checks.
    pub program_ids: BTreeSet<ProgramId>,
    /// NVS without CoE or Nodal.
    pub is_nvs_only: bool,
    /// CoE or Nodal present.
    pub has_coe_or_nodal: bool,
}

impl ProgramPermissionContext {
    /// Resolves the program context for an optional permission record.
    #[must_use]
    pub fn resolve(permission: Option<&UserPermission>) -> Self {
        let Some(permission) = permission else {
            return Self::denied();
        };

        if permission.is_admin() {
            let program_ids = permission
                .programs()
                .programs()
                .cloned()
                .unwrap_or_else(ProgramId::admin_defaults);

            return Self {
                has_access: true,
                program_ids,
                is_nvs_only: false,
                has_coe_or_nodal: true,
            };
        }

        let Some(programs) = permission.programs().programs() else {
            return Self::denied();
        };

        let has_nvs = programs.contains(&ProgramId::NVS);
        let has_coe_or_nodal =
            programs.contains(&ProgramId::COE) || programs.contains(&ProgramId::NODAL);

        Self {
            has_access: true,
            program_ids: programs.clone(),
            is_nvs_only: has_nvs && !has_coe_or_nodal,
            has_coe_or_nodal,
        }
    }

    fn denied() -> Self {
        Self {
            has_access: false,
            program_ids: BTreeSet::new(),
            is_nvs_only: false,
            has_coe_or_nodal: false,
        }
    }
}
