use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use schoolgate_application::RegionDirectory;
use schoolgate_core::{AppError, AppResult};

/// Region directory backed by the `school` table.
///
/// Only schools of the managed category are returned by region expansion.
#[derive(Clone)]
pub struct PostgresRegionDirectory {
    pool: PgPool,
    managed_category: String,
}

impl PostgresRegionDirectory {
    /// Creates a directory filtering region expansion to one school category.
    #[must_use]
    pub fn new(pool: PgPool, managed_category: impl Into<String>) -> Self {
        Self {
            pool,
            managed_category: managed_category.into(),
        }
    }
}

#[async_trait]
impl RegionDirectory for PostgresRegionDirectory {
    async fn managed_school_codes_in_regions(
        &self,
        regions: &BTreeSet<String>,
    ) -> AppResult<BTreeSet<String>> {
        let regions: Vec<String> = regions.iter().cloned().collect();

        let codes = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT code
            FROM school
            WHERE region = ANY($1)
                AND af_school_category = $2
            "#,
        )
        .bind(regions.as_slice())
        .bind(self.managed_category.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to expand regions into schools: {error}"))
        })?;

        debug!(
            regions = regions.len(),
            schools = codes.len(),
            category = self.managed_category.as_str(),
            "expanded regions into managed schools"
        );

        Ok(codes.into_iter().collect())
    }

    async fn region_for_school(&self, school_code: &str) -> AppResult<Option<String>> {
        sqlx::query_scalar::<_, Option<String>>(
            r#"
            SELECT region
            FROM school
            WHERE code = $1
            "#,
        )
        .bind(school_code)
        .fetch_optional(&self.pool)
        .await
        .map(Option::flatten)
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load region for school '{school_code}': {error}"
            ))
        })
    }
}
