use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Organizational cohort identifier a user is provisioned against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgramId(i32);

impl ProgramId {
    /// Centre of Excellence program.
    pub const COE: Self = Self(1);
    /// Nodal program.
    pub const NODAL: Self = Self(2);
    /// NVS program.
    pub const NVS: Self = Self(64);

    /// Creates a program identifier from its stored integer value.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Returns the stored integer value.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Returns the programs an admin is treated as holding when none are provisioned.
    #[must_use]
    pub fn admin_defaults() -> BTreeSet<Self> {
        BTreeSet::from([Self::COE, Self::NODAL, Self::NVS])
    }
}

impl Display for ProgramId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Program provisioning state of a permission record.
///
/// Storage cannot tell "never provisioned" (`NULL`) from "provisioned with no
/// programs" (`{}`). Both currently fail closed, but they are kept apart so a
/// later policy can treat them differently.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProgramMembership {
    /// The column was never populated.
    #[default]
    Unset,
    /// The column was populated with an empty list.
    Empty,
    /// At least one program is provisioned.
    Programs(BTreeSet<ProgramId>),
}

impl ProgramMembership {
    /// Builds membership from a nullable stored integer array.
    #[must_use]
    pub fn from_storage(values: Option<Vec<i32>>) -> Self {
        match values {
            None => Self::Unset,
            Some(values) => Self::from_programs(values.into_iter().map(ProgramId::new)),
        }
    }

    /// Builds membership from program identifiers; no identifiers yields `Empty`.
    #[must_use]
    pub fn from_programs(programs: impl IntoIterator<Item = ProgramId>) -> Self {
        let programs: BTreeSet<ProgramId> = programs.into_iter().collect();
        if programs.is_empty() {
            Self::Empty
        } else {
            Self::Programs(programs)
        }
    }

    /// Returns the provisioned programs, or `None` for `Unset` and `Empty`.
    #[must_use]
    pub fn programs(&self) -> Option<&BTreeSet<ProgramId>> {
        match self {
            Self::Programs(programs) => Some(programs),
            Self::Unset | Self::Empty => None,
        }
    }

    /// Returns whether the program is provisioned.
    #[must_use]
    pub fn contains(&self, program_id: ProgramId) -> bool {
        self.programs()
            .is_some_and(|programs| programs.contains(&program_id))
    }
}

#[cfg(test)]
mod tests {
    use super::{ProgramId, ProgramMembership};

    #[test]
    fn null_and_empty_storage_stay_distinct() {
        assert_eq!(ProgramMembership::from_storage(None), ProgramMembership::Unset);
        assert_eq!(
            ProgramMembership::from_storage(Some(Vec::new())),
            ProgramMembership::Empty
        );
        assert!(ProgramMembership::Unset.programs().is_none());
        assert!(ProgramMembership::Empty.programs().is_none());
    }

    #[test]
    fn stored_ids_map_to_program_constants() {
        let membership = ProgramMembership::from_storage(Some(vec![1, 64]));
        assert!(membership.contains(ProgramId::COE));
        assert!(membership.contains(ProgramId::NVS));
        assert!(!membership.contains(ProgramId::NODAL));
    }
}
