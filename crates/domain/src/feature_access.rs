use schoolgate_core::UserIdentity;

use crate::{
    AccessLevel, Feature, FeatureAccessResult, ProgramPermissionContext, UserPermission,
    base_access,
};

/// Per-request flags supplied alongside the permission record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccessOptions {
    /// The caller authenticated with a school passcode.
    pub is_passcode_user: bool,
}

impl AccessOptions {
    /// Derives options from the session identity.
    #[must_use]
    pub fn for_identity(identity: &UserIdentity) -> Self {
        Self {
            is_passcode_user: identity.is_passcode_user(),
        }
    }
}

/// Resolves the access verdict for one feature.
///
/// Order: passcode shortcut, missing record, matrix lookup, program gating,
/// read-only downgrade.
#[must_use]
pub fn resolve_feature_access(
    permission: Option<&UserPermission>,
    feature: Feature,
    options: AccessOptions,
) -> FeatureAccessResult {
    if options.is_passcode_user {
        return FeatureAccessResult::from_access(match feature {
            Feature::Students => AccessLevel::Edit,
            _ => AccessLevel::None,
        });
    }

    let Some(permission) = permission else {
        return FeatureAccessResult::none();
    };

    let mut access = base_access(feature, permission.role());

    if feature.is_program_gated() && access != AccessLevel::None {
        let context = ProgramPermissionContext::resolve(Some(permission));
        if !context.has_coe_or_nodal {
            access = AccessLevel::None;
        }
    }

    if access == AccessLevel::Edit && permission.read_only() {
        access = AccessLevel::View;
    }

    FeatureAccessResult::from_access(access)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use schoolgate_core::UserIdentity;

    use super::{AccessOptions, resolve_feature_access};
    use crate::{
        AccessLevel, Feature, PermissionLevel, ProgramId, ProgramMembership,
        ProgramPermissionContext, Role, UserPermission, base_access,
    };

    const PASSCODE: AccessOptions = AccessOptions {
        is_passcode_user: true,
    };

    fn permission(role: Role, programs: &[ProgramId], read_only: bool) -> UserPermission {
        UserPermission::new("user@example.org", PermissionLevel::SingleSchool, role)
            .with_programs(ProgramMembership::from_programs(programs.iter().copied()))
            .with_read_only(read_only)
    }

    #[test]
    fn program_manager_with_coe_edits_visits() {
        let manager = permission(Role::ProgramManager, &[ProgramId::COE], false);
        let result =
            resolve_feature_access(Some(&manager), Feature::Visits, AccessOptions::default());
        assert_eq!(result.access(), AccessLevel::Edit);
        assert!(result.can_view());
        assert!(result.can_edit());
    }

    #[test]
    fn nvs_only_program_manager_cannot_see_visits() {
        let manager = permission(Role::ProgramManager, &[ProgramId::NVS], false);
        let result =
            resolve_feature_access(Some(&manager), Feature::Visits, AccessOptions::default());
        assert_eq!(result.access(), AccessLevel::None);
        assert!(!result.can_view());
    }

    #[test]
    fn read_only_teacher_views_students() {
        let teacher = permission(Role::Teacher, &[ProgramId::COE], true);
        let result =
            resolve_feature_access(Some(&teacher), Feature::Students, AccessOptions::default());
        assert_eq!(result.access(), AccessLevel::View);
        assert!(!result.can_edit());
    }

    #[test]
    fn students_are_not_program_gated() {
        let teacher = permission(Role::Teacher, &[], false);
        let result =
            resolve_feature_access(Some(&teacher), Feature::Students, AccessOptions::default());
        assert_eq!(result.access(), AccessLevel::Edit);
    }

    #[test]
    fn missing_permission_has_no_access() {
        for feature in Feature::all() {
            let result = resolve_feature_access(None, *feature, AccessOptions::default());
            assert_eq!(result.access(), AccessLevel::None);
        }
    }

    #[test]
    fn passcode_shortcut_ignores_permission_record() {
        let admin = permission(Role::Admin, &[ProgramId::COE], true);
        for feature in Feature::all() {
            let expected = if *feature == Feature::Students {
                AccessLevel::Edit
            } else {
                AccessLevel::None
            };
            assert_eq!(
                resolve_feature_access(Some(&admin), *feature, PASSCODE).access(),
                expected
            );
            assert_eq!(resolve_feature_access(None, *feature, PASSCODE).access(), expected);
        }
    }

    #[test]
    fn options_follow_identity_kind() {
        let site = UserIdentity::for_passcode_school("passcode-70705", "School 70705", "70705");
        let staff = UserIdentity::new("sub", "Staff", Some("staff@example.org".to_owned()));
        assert!(AccessOptions::for_identity(&site).is_passcode_user);
        assert!(!AccessOptions::for_identity(&staff).is_passcode_user);
    }

    fn role_strategy() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::all().to_vec())
    }

    fn feature_strategy() -> impl Strategy<Value = Feature> {
        prop::sample::select(Feature::all().to_vec())
    }

    fn programs_strategy() -> impl Strategy<Value = ProgramMembership> {
        prop::option::of(prop::collection::vec(
            prop::sample::select(vec![1_i32, 2, 7, 64]),
            0..4,
        ))
        .prop_map(ProgramMembership::from_storage)
    }

    fn permission_strategy() -> impl Strategy<Value = UserPermission> {
        (role_strategy(), programs_strategy(), any::<bool>()).prop_map(
            |(role, programs, read_only)| {
                UserPermission::new("prop@example.org", PermissionLevel::AllSchools, role)
                    .with_programs(programs)
                    .with_read_only(read_only)
            },
        )
    }

    proptest! {
        #[test]
        fn verdict_never_exceeds_matrix_entry(
            permission in permission_strategy(),
            feature in feature_strategy(),
        ) {
            let result =
                resolve_feature_access(Some(&permission), feature, AccessOptions::default());
            prop_assert!(result.access() <= base_access(feature, permission.role()));
        }

        #[test]
        fn coe_member_verdict_equals_matrix_entry(
            role in role_strategy(),
            feature in feature_strategy(),
        ) {
            let permission =
                UserPermission::new("prop@example.org", PermissionLevel::AllSchools, role)
                    .with_programs(ProgramMembership::from_programs([ProgramId::COE]));
            let result =
                resolve_feature_access(Some(&permission), feature, AccessOptions::default());
            prop_assert_eq!(result.access(), base_access(feature, role));
        }

        #[test]
        fn resolution_is_idempotent(
            permission in permission_strategy(),
            feature in feature_strategy(),
            is_passcode_user in any::<bool>(),
        ) {
            let options = AccessOptions { is_passcode_user };
            let first = resolve_feature_access(Some(&permission), feature, options);
            let second = resolve_feature_access(Some(&permission), feature, options);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn gated_features_require_coe_or_nodal(
            permission in permission_strategy(),
            feature in feature_strategy(),
        ) {
            let context = ProgramPermissionContext::resolve(Some(&permission));
            let result =
                resolve_feature_access(Some(&permission), feature, AccessOptions::default());
            if feature.is_program_gated() && !context.has_coe_or_nodal {
                prop_assert_eq!(result.access(), AccessLevel::None);
            }
        }

        #[test]
        fn read_only_never_edits(
            permission in permission_strategy(),
            feature in feature_strategy(),
        ) {
            let permission = permission.with_read_only(true);
            let result =
                resolve_feature_access(Some(&permission), feature, AccessOptions::default());
            prop_assert_ne!(result.access(), AccessLevel::Edit);
            prop_assert!(!result.can_edit() || result.can_view());
        }

        #[test]
        fn passcode_verdict_is_unconditional(
            permission in prop::option::of(permission_strategy()),
            feature in feature_strategy(),
        ) {
            let result = resolve_feature_access(permission.as_ref(), feature, PASSCODE);
            let expected = if feature == Feature::Students {
                AccessLevel::Edit
            } else {
                AccessLevel::None
            };
            prop_assert_eq!(result.access(), expected);
        }
    }
}
