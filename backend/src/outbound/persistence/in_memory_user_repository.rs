//! In-process `UserRepository` implementation.
//!
//! Records live in a `tokio` `RwLock`ed map keyed by id. Revisions start at 1
//! on insert and increase by one per successful save; a save carrying any
//! other revision is rejected with `RevisionMismatch`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, Role, User, UserId};

/// Map-backed implementation of the `UserRepository` port.
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// Whether no users are stored.
    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<User, UserPersistenceError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email() == user.email()) {
            return Err(UserPersistenceError::duplicate_email(user.email().as_str()));
        }
        if users.contains_key(&user.id()) {
            return Err(UserPersistenceError::query(format!(
                "user {} already exists",
                user.id()
            )));
        }
        let stored = user.clone().with_revision(1);
        users.insert(stored.id(), stored.clone());
        Ok(stored)
    }

    async fn save(&self, user: &User) -> Result<User, UserPersistenceError> {
        let mut users = self.users.write().await;
        let Some(current) = users.get_mut(&user.id()) else {
            return Err(UserPersistenceError::query(format!(
                "user {} does not exist",
                user.id()
            )));
        };
        if current.revision() != user.revision() {
            debug!(
                user_id = %user.id(),
                expected = user.revision(),
                actual = current.revision(),
                "stale user write rejected"
            );
            return Err(UserPersistenceError::revision_mismatch(
                user.revision(),
                current.revision(),
            ));
        }
        let stored = user.clone().with_revision(user.revision() + 1);
        *current = stored.clone();
        Ok(stored)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email() == email)
            .cloned())
    }

    async fn find_patients_of(
        &self,
        doctor_id: &UserId,
    ) -> Result<Vec<User>, UserPersistenceError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .filter(|u| u.role() == Role::Patient && u.doctor_ref() == Some(*doctor_id))
            .cloned()
            .collect())
    }

    async fn find_doctors_listing(
        &self,
        patient_id: &UserId,
    ) -> Result<Vec<User>, UserPersistenceError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .filter(|u| u.role() == Role::Doctor && u.patient_refs().contains(patient_id))
            .cloned()
            .collect())
    }
}
