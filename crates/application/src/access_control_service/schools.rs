use schoolgate_domain::PermissionLevel;
use tracing::warn;

use super::*;

impl AccessControlService {
    /// Resolves the schools an email may see.
    ///
    /// Pass `prefetched` when the caller already holds the record to skip the
    /// repository read. Region-level records cost exactly one directory call.
    pub async fn school_scope(
        &self,
        email: &str,
        prefetched: Option<&UserPermission>,
    ) -> AppResult<SchoolScope> {
        let fetched;
        let permission = match prefetched {
            Some(permission) => Some(permission),
            None => {
                fetched = self.find_permission(email).await?;
                fetched.as_ref()
            }
        };

        let Some(permission) = permission else {
            return Ok(SchoolScope::none());
        };

        match permission.level() {
            PermissionLevel::AllSchools => Ok(SchoolScope::All),
            PermissionLevel::SingleSchool => {
                Ok(SchoolScope::Schools(permission.school_codes().clone()))
            }
            PermissionLevel::Region => {
                if permission.regions().is_empty() {
                    return Ok(SchoolScope::none());
                }

                let school_codes = self
                    .region_directory
                    .managed_school_codes_in_regions(permission.regions())
                    .await?;
                Ok(SchoolScope::Schools(school_codes))
            }
            PermissionLevel::Unrecognized(value) => {
                warn_unrecognized_level(permission, value);
                Ok(SchoolScope::none())
            }
        }
    }

    /// Resolves the school scope of a session identity.
    ///
    /// Passcode identities see only the school they signed in with.
    pub async fn school_scope_for_identity(
        &self,
        identity: &UserIdentity,
    ) -> AppResult<SchoolScope> {
        if let Some(school_code) = identity.school_code() {
            return Ok(SchoolScope::Schools(BTreeSet::from([school_code.to_owned()])));
        }

        match identity.email() {
            Some(email) => self.school_scope(email, None).await,
            None => Ok(SchoolScope::none()),
        }
    }

    /// Returns whether an email may touch one school.
    ///
    /// `school_region` must be supplied by the caller for region-level records;
    /// this check never looks it up. Without it a region-level record is denied.
    pub async fn can_access_school(
        &self,
        email: &str,
        school_code: &str,
        school_region: Option<&str>,
        prefetched: Option<&UserPermission>,
    ) -> AppResult<bool> {
        if let Some(permission) = prefetched {
            return Ok(permission_covers_school(permission, school_code, school_region));
        }

        Ok(self
            .find_permission(email)
            .await?
            .is_some_and(|permission| {
                permission_covers_school(&permission, school_code, school_region)
            }))
    }

    /// Returns whether a session identity may touch one school.
    pub async fn can_access_school_for_identity(
        &self,
        identity: &UserIdentity,
        school_code: &str,
        school_region: Option<&str>,
    ) -> AppResult<bool> {
        if let Some(own_school) = identity.school_code() {
            return Ok(own_school == school_code);
        }

        match identity.email() {
            Some(email) => {
                self.can_access_school(email, school_code, school_region, None)
                    .await
            }
            None => Ok(false),
        }
    }

    /// Looks up the region of a school for callers that must supply it explicitly.
    pub async fn region_for_school(&self, school_code: &str) -> AppResult<Option<String>> {
        self.region_directory.region_for_school(school_code).await
    }
}

fn permission_covers_school(
    permission: &UserPermission,
    school_code: &str,
    school_region: Option<&str>,
) -> bool {
    match permission.level() {
        PermissionLevel::AllSchools => true,
        PermissionLevel::SingleSchool => permission.school_codes().contains(school_code),
        PermissionLevel::Region => {
            school_region.is_some_and(|region| permission.regions().contains(region))
        }
        PermissionLevel::Unrecognized(value) => {
            warn_unrecognized_level(permission, value);
            false
        }
    }
}

fn warn_unrecognized_level(permission: &UserPermission, value: i32) {
    warn!(
        category = "data_integrity",
        email = permission.email(),
        level = value,
        "unrecognized permission level resolved to no school access"
    );
}
