use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use schoolgate_application::PermissionRepository;
use schoolgate_core::{AppError, AppResult};
use schoolgate_domain::{
    EmailAddress, PermissionLevel, ProgramMembership, Role, UserPermission,
};


/// PostgreSQL-backed repository for stored permission records.
#[derive(Clone)]
pub struct PostgresPermissionRepository {
    pool: PgPool,
}

impl PostgresPermissionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserPermissionRow {
    email: String,
    level: i32,
    role: Option<String>,
    school_codes: Option<Vec<String>>,
    regions: Option<Vec<String>>,
    program_ids: Option<Vec<i32>>,
    read_only: Option<bool>,
}

impl From<UserPermissionRow> for UserPermission {
    fn from(row: UserPermissionRow) -> Self {
        UserPermission::new(
            row.email,
            PermissionLevel::from_storage(row.level),
            Role::from_storage(row.role.as_deref()),
        )
        .with_school_codes(row.school_codes.unwrap_or_default())
        .with_regions(row.regions.unwrap_or_default())
        .with_programs(ProgramMembership::from_storage(row.program_ids))
        .with_read_only(row.read_only.unwrap_or(false))
    }
}

#[async_trait]
impl PermissionRepository for PostgresPermissionRepository {
    async fn find_by_email(&self, email: &EmailAddress) -> AppResult<Option<UserPermission>> {
        let row = sqlx::query_as::<_, UserPermissionRow>(
            r#"
            SELECT email, level, role, school_codes, regions, program_ids, read_only
            FROM user_permission
            WHERE LOWER(email) = LOWER($1)
            LIMIT 1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load permission record: {error}"))
        })?;

        Ok(row.map(UserPermission::from))
    }
}
