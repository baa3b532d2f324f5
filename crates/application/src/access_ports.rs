use std::collections::BTreeSet;

use async_trait::async_trait;
use schoolgate_core::AppResult;
use schoolgate_domain::{EmailAddress, UserPermission};

/// Repository port for stored permission records.
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Finds the permission record for an email, matched case-insensitively.
    ///
    /// A missing row is `Ok(None)`; only a failed read is an error.
    async fn find_by_email(&self, email: &EmailAddress) -> AppResult<Option<UserPermission>>;
}

/// Port for expanding regions into managed schools.
#[async_trait]
pub trait RegionDirectory: Send + Sync {
    /// Returns the codes of managed-category schools located in any of the regions.
    async fn managed_school_codes_in_regions(
        &self,
        regions: &BTreeSet<String>,
    ) -> AppResult<BTreeSet<String>>;

    /// Returns the region of one school, if the school is known.
    async fn region_for_school(&self, school_code: &str) -> AppResult<Option<String>>;
}
