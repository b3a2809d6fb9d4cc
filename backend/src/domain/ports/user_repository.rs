//! Port abstraction for user persistence adapters and their errors.
//!
//! Writes are revision-checked: `save` succeeds only when the stored record
//! still carries the revision the caller read.

use async_trait::async_trait;

use crate::domain::{Email, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Stored record moved on since it was read.
        RevisionMismatch { expected: u64, actual: u64 } =>
            "user revision mismatch: expected {expected}, found {actual}",
        /// Another user already holds the email address.
        DuplicateEmail { email: String } => "email {email} is already registered",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Store a new user. Returns the record stamped with its first revision.
    async fn insert(&self, user: &User) -> Result<User, UserPersistenceError>;

    /// Replace a user if its stored revision equals `user.revision()`.
    ///
    /// Returns the record stamped with the new revision.
    async fn save(&self, user: &User) -> Result<User, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by normalised email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError>;

    /// Patients whose `doctor_ref` points at `doctor_id`.
    async fn find_patients_of(
        &self,
        doctor_id: &UserId,
    ) -> Result<Vec<User>, UserPersistenceError>;

    /// Doctors whose `patient_refs` contain `patient_id`.
    async fn find_doctors_listing(
        &self,
        patient_id: &UserId,
    ) -> Result<Vec<User>, UserPersistenceError>;
}

/// Empty repository used where no persistence is wired.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserRepository;

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn insert(&self, user: &User) -> Result<User, UserPersistenceError> {
        Ok(user.clone().with_revision(1))
    }

    async fn save(&self, user: &User) -> Result<User, UserPersistenceError> {
        Ok(user.clone().with_revision(user.revision() + 1))
    }

    async fn find_by_id(&self, _id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(None)
    }

    async fn find_by_email(&self, _email: &Email) -> Result<Option<User>, UserPersistenceError> {
        Ok(None)
    }

    async fn find_patients_of(
        &self,
        _doctor_id: &UserId,
    ) -> Result<Vec<User>, UserPersistenceError> {
        Ok(Vec::new())
    }

    async fn find_doctors_listing(
        &self,
        _patient_id: &UserId,
    ) -> Result<Vec<User>, UserPersistenceError> {
        Ok(Vec::new())
    }
}
