//! Revision-checked read-modify-write over the user repository.
//!
//! Every domain service mutates users through [`UserStore::mutate`], which
//! reloads and replays the closure when a concurrent writer moved the
//! revision. Authorisation checks run inside the closure so they always see
//! the record that is about to be written.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Error, Role, RoleMismatch, User, UserId};

/// Attempts per mutation before a revision race surfaces as `conflict`.
pub const MAX_WRITE_ATTEMPTS: usize = 3;

/// Shared access to user records for domain services.
pub struct UserStore<R> {
    repo: Arc<R>,
}

impl<R> Clone for UserStore<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

/// Translate repository failures into domain errors.
pub fn map_user_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::RevisionMismatch { expected, actual } => {
            Error::conflict("user record was modified concurrently").with_details(json!({
                "expectedRevision": expected,
                "actualRevision": actual,
                "code": "revision_mismatch",
            }))
        }
        UserPersistenceError::DuplicateEmail { email } => {
            Error::conflict(format!("email {email} is already registered"))
        }
    }
}

/// Express a role mismatch as a missing record of the expected role.
pub fn role_not_found(err: RoleMismatch) -> Error {
    Error::not_found(format!("{} {} not found", err.expected, err.id))
}

impl<R: UserRepository> UserStore<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub async fn find(&self, id: &UserId) -> Result<Option<User>, Error> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(map_user_persistence_error)
    }

    /// Load a user or fail with `not_found`.
    pub async fn load(&self, id: &UserId) -> Result<User, Error> {
        self.find(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))
    }

    /// Load a user holding `role`, treating any other role as missing.
    pub async fn load_with_role(&self, id: &UserId, role: Role) -> Result<User, Error> {
        let user = self
            .find(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("{role} {id} not found")))?;
        user.require_role(role).map_err(role_not_found)?;
        Ok(user)
    }

    pub async fn patients_of(&self, doctor_id: &UserId) -> Result<Vec<User>, Error> {
        self.repo
            .find_patients_of(doctor_id)
            .await
            .map_err(map_user_persistence_error)
    }

    pub async fn doctors_listing(&self, patient_id: &UserId) -> Result<Vec<User>, Error> {
        self.repo
            .find_doctors_listing(patient_id)
            .await
            .map_err(map_user_persistence_error)
    }

    /// Apply `change` to the stored record and save it.
    ///
    /// The closure may run more than once; it must derive everything from the
    /// record it is handed. Returning an error aborts without writing.
    pub async fn mutate<T, F>(&self, id: &UserId, mut change: F) -> Result<(User, T), Error>
    where
        F: FnMut(&mut User) -> Result<T, Error> + Send,
        T: Send,
    {
        let mut attempt = 1;
        loop {
            let mut user = self.load(id).await?;
            let outcome = change(&mut user)?;
            match self.repo.save(&user).await {
                Ok(saved) => return Ok((saved, outcome)),
                Err(UserPersistenceError::RevisionMismatch { expected, actual })
                    if attempt < MAX_WRITE_ATTEMPTS =>
                {
                    debug!(user_id = %id, expected, actual, attempt, "retrying stale user write");
                    attempt += 1;
                }
                Err(err) => return Err(map_user_persistence_error(err)),
            }
        }
    }
}
