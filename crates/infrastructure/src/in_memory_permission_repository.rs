use std::collections::HashMap;

use async_trait::async_trait;
use schoolgate_application::PermissionRepository;
use schoolgate_core::AppResult;
use schoolgate_domain::{EmailAddress, UserPermission};
use tokio::sync::RwLock;

/// In-memory permission repository keyed on lower-cased email.
#[derive(Debug, Default)]
pub struct InMemoryPermissionRepository {
    rows: RwLock<HashMap<String, UserPermission>>,
}

impl InMemoryPermissionRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the record for its email.
    pub async fn upsert(&self, permission: UserPermission) {
        self.rows
            .write()
            .await
            .insert(permission.email().trim().to_lowercase(), permission);
    }
}

#[async_trait]
impl PermissionRepository for InMemoryPermissionRepository {
    async fn find_by_email(&self, email: &EmailAddress) -> AppResult<Option<UserPermission>> {
        Ok(self.rows.read().await.get(email.as_str()).cloned())
    }
}

#[cfg(test)]
mod tests {
    use schoolgate_application::PermissionRepository;
    use schoolgate_domain::{EmailAddress, PermissionLevel, Role, UserPermission};

    use super::InMemoryPermissionRepository;

    #[tokio::test]
    async fn stored_mixed_case_email_is_found() {
        let repository = InMemoryPermissionRepository::new();
        repository
            .upsert(UserPermission::new(
                "Asha@Example.org",
                PermissionLevel::SingleSchool,
                Role::Teacher,
            ))
            .await;

        let Ok(email) = EmailAddress::new("ASHA@example.org") else {
            panic!("test email must be valid");
        };
        let found = repository.find_by_email(&email).await;
        assert!(matches!(found, Ok(Some(_))));
    }
}
