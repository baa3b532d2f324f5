use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use schoolgate_application::RegionDirectory;
use schoolgate_core::AppResult;

/// In-memory region directory holding only managed-category schools.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRegionDirectory {
    regions_by_school: HashMap<String, String>,
}

impl InMemoryRegionDirectory {
    /// Creates a directory from `(school_code, region)` pairs.
    #[must_use]
    pub fn new<I, C, R>(schools: I) -> Self
    where
        I: IntoIterator<Item = (C, R)>,
        C: Into<String>,
        R: Into<String>,
    {
        Self {
            regions_by_school: schools
                .into_iter()
                .map(|(code, region)| (code.into(), region.into()))
                .collect(),
        }
    }
}

#[async_trait]
impl RegionDirectory for InMemoryRegionDirectory {
    async fn managed_school_codes_in_regions(
        &self,
        regions: &BTreeSet<String>,
    ) -> AppResult<BTreeSet<String>> {
        Ok(self
            .regions_by_school
            .iter()
            .filter(|(_, region)| regions.contains(*region))
            .map(|(code, _)| code.clone())
            .collect())
    }

    async fn region_for_school(&self, school_code: &str) -> AppResult<Option<String>> {
        Ok(self.regions_by_school.get(school_code).cloned())
    }
}
