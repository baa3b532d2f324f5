use std::str::FromStr;

use schoolgate_core::AppError;
use serde::{Deserialize, Serialize};

use crate::Role;

/// Functional areas gated independently of raw data access.
///
/// Adding a variant fails to compile until [`base_access`] has a row for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// Student enrollment records.
    Students,
    /// Site-visit logging.
    Visits,
    /// Curriculum tracking.
    Curriculum,
    /// Mentorship sessions.
    Mentorship,
    /// Performance reports.
    Performance,
    /// Aggregated summary statistics.
    SummaryStats,
    /// Program manager dashboard.
    PmDashboard,
}

impl Feature {
    /// Returns a stable transport value for this feature.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Students => "students",
            Self::Visits => "visits",
            Self::Curriculum => "curriculum",
            Self::Mentorship => "mentorship",
            Self::Performance => "performance",
            Self::SummaryStats => "summary_stats",
            Self::PmDashboard => "pm_dashboard",
        }
    }

    /// Returns all known features.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Feature] = &[
            Feature::Students,
            Feature::Visits,
            Feature::Curriculum,
            Feature::Mentorship,
            Feature::Performance,
            Feature::SummaryStats,
            Feature::PmDashboard,
        ];

        ALL
    }

    /// Returns whether access requires CoE or Nodal membership.
    #[must_use]
    pub fn is_program_gated(&self) -> bool {
        matches!(
            self,
            Self::Visits
                | Self::Curriculum
                | Self::Mentorship
                | Self::PmDashboard
                | Self::SummaryStats
        )
    }

    /// Parses a transport value into a feature.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl FromStr for Feature {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|feature| feature.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown feature value '{value}'")))
    }
}

/// Per-feature capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    /// No access.
    None,
    /// Read access.
    View,
    /// Read and write access.
    Edit,
}

impl AccessLevel {
    /// Returns a stable transport value for this level.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::View => "view",
            Self::Edit => "edit",
        }
    }
}

/// Final access verdict for one feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeatureAccessResult {
    access: AccessLevel,
}

impl FeatureAccessResult {
    /// Wraps an access level.
    #[must_use]
    pub fn from_access(access: AccessLevel) -> Self {
        Self { access }
    }

    /// Returns a verdict with no access.
    #[must_use]
    pub fn none() -> Self {
        Self::from_access(AccessLevel::None)
    }

    /// Returns the access level.
    #[must_use]
    pub fn access(&self) -> AccessLevel {
        self.access
    }

    /// Returns whether the feature may be viewed.
    #[must_use]
    pub fn can_view(&self) -> bool {
        self.access != AccessLevel::None
    }

    /// Returns whether the feature may be edited.
    #[must_use]
    pub fn can_edit(&self) -> bool {
        self.access == AccessLevel::Edit
    }
}

/// One matrix row. Struct literals force every role to be listed.
struct RoleAccessRow {
    teacher: AccessLevel,
    program_manager: AccessLevel,
    program_admin: AccessLevel,
    admin: AccessLevel,
}

impl RoleAccessRow {
    fn for_role(&self, role: Role) -> AccessLevel {
        match role {
            Role::Teacher => self.teacher,
            Role::ProgramManager => self.program_manager,
            Role::ProgramAdmin => self.program_admin,
            Role::Admin => self.admin,
        }
    }
}

fn matrix_row(feature: Feature) -> RoleAccessRow {
    use AccessLevel::{Edit, View};

    const NONE: AccessLevel = AccessLevel::None;

    match feature {
        Feature::Students => RoleAccessRow {
            teacher: Edit,
            program_manager: Edit,
            program_admin: Edit,
            admin: Edit,
        },
        Feature::Visits => RoleAccessRow {
            teacher: NONE,
            program_manager: Edit,
            program_admin: View,
            admin: Edit,
        },
        Feature::Curriculum => RoleAccessRow {
            teacher: Edit,
            program_manager: Edit,
            program_admin: View,
            admin: Edit,
        },
        Feature::Mentorship => RoleAccessRow {
            teacher: View,
            program_manager: Edit,
            program_admin: View,
            admin: Edit,
        },
        Feature::Performance => RoleAccessRow {
            teacher: View,
            program_manager: View,
            program_admin: View,
            admin: Edit,
        },
        Feature::SummaryStats => RoleAccessRow {
            teacher: NONE,
            program_manager: View,
            program_admin: View,
            admin: View,
        },
        Feature::PmDashboard => RoleAccessRow {
            teacher: NONE,
            program_manager: Edit,
            program_admin: View,
            admin: Edit,
        },
    }
}

/// Returns the matrix entry for a feature and role, before gating and downgrades.
#[must_use]
pub fn base_access(feature: Feature, role: Role) -> AccessLevel {
    matrix_row(feature).for_role(role)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{AccessLevel, Feature, FeatureAccessResult, base_access};
    use crate::Role;

    #[test]
    fn feature_roundtrip_transport_value() {
        for feature in Feature::all() {
            let restored = Feature::from_str(feature.as_str());
            assert_eq!(restored.ok(), Some(*feature));
        }
    }

    #[test]
    fn unknown_feature_is_rejected() {
        assert!(Feature::from_str("quiz_sessions").is_err());
    }

    #[test]
    fn matrix_rows_match_documented_table() {
        use AccessLevel::{Edit, None as NoAccess, View};

        let expected = [
            (Feature::Students, [Edit, Edit, Edit, Edit]),
            (Feature::Visits, [NoAccess, Edit, View, Edit]),
            (Feature::Curriculum, [Edit, Edit, View, Edit]),
            (Feature::Mentorship, [View, Edit, View, Edit]),
            (Feature::Performance, [View, View, View, Edit]),
            (Feature::SummaryStats, [NoAccess, View, View, View]),
            (Feature::PmDashboard, [NoAccess, Edit, View, Edit]),
        ];

        for (feature, row) in expected {
            for (role, access) in Role::all().iter().zip(row) {
                assert_eq!(
                    base_access(feature, *role),
                    access,
                    "{} / {}",
                    feature.as_str(),
                    role.as_str()
                );
            }
        }
    }

    #[test]
    fn admin_is_never_below_view_in_matrix() {
        for feature in Feature::all() {
            assert_ne!(base_access(*feature, Role::Admin), AccessLevel::None);
        }
    }

    #[test]
    fn edit_verdict_implies_view() {
        for level in [AccessLevel::None, AccessLevel::View, AccessLevel::Edit] {
            let result = FeatureAccessResult::from_access(level);
            assert!(!result.can_edit() || result.can_view());
        }
    }
}
