use std::collections::BTreeSet;
use std::sync::Arc;

use schoolgate_core::{AppResult, UserIdentity};
use schoolgate_domain::{EmailAddress, FeatureAccessResult, UserPermission};
use tracing::debug;

use crate::{PermissionRepository, RegionDirectory};

mod features;
mod schools;


/// Schools a user may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchoolScope {
    /// Every school.
    All,
    /// Only the listed school codes (possibly none).
    Schools(BTreeSet<String>),
}

impl SchoolScope {
    /// Returns an empty scope.
    #[must_use]
    pub fn none() -> Self {
        Self::Schools(BTreeSet::new())
    }
}

/// Per-row edit decision for one record of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordAccess {
    /// Feature-level verdict.
    pub feature_access: FeatureAccessResult,
    /// Whether the caller's programs cover the record's program.
    pub owns_record: bool,
    /// Feature edit AND ownership.
    pub can_edit: bool,
}

/// Application service resolving feature, record and school access.
#[derive(Clone)]
pub struct AccessControlService {
    permission_repository: Arc<dyn PermissionRepository>,
    region_directory: Arc<dyn RegionDirectory>,
}

impl AccessControlService {
    /// Creates a new access control service from its ports.
    #[must_use]
    pub fn new(
        permission_repository: Arc<dyn PermissionRepository>,
        region_directory: Arc<dyn RegionDirectory>,
    ) -> Self {
        Self {
            permission_repository,
            region_directory,
        }
    }

    /// Loads the permission record for an email.
    ///
    /// Malformed emails cannot match a row and resolve to `None` without a read.
    pub async fn find_permission(&self, email: &str) -> AppResult<Option<UserPermission>> {
        let Ok(email) = EmailAddress::new(email) else {
            debug!(category = "access_denied", "permission lookup skipped for malformed email");
            return Ok(None);
        };

        self.permission_repository.find_by_email(&email).await
    }

    /// Loads the permission record backing a session identity.
    ///
    /// Passcode identities have no record and never trigger a read.
    pub async fn permission_for_identity(
        &self,
        identity: &UserIdentity,
    ) -> AppResult<Option<UserPermission>> {
        if identity.is_passcode_user() {
            return Ok(None);
        }

        match identity.email() {
            Some(email) => self.find_permission(email).await,
            None => Ok(None),
        }
    }
}
