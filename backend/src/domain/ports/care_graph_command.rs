//! Driving port for doctor/patient assignment.

use async_trait::async_trait;

use crate::domain::{Actor, Error, User, UserId};

/// Both sides of a link after an assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CareLinkPair {
    pub doctor: User,
    pub patient: User,
}

/// Maintains the doctor/patient assignment relation.
///
/// Implementations repair any half-link on the patient before mutating it so
/// that both sides agree once a call returns successfully.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CareGraphCommand: Send + Sync {
    /// Link `patient_id` to `doctor_id`. Idempotent.
    ///
    /// # Errors
    /// - `not_found` when either user is missing or has the wrong role.
    /// - `unauthorized` unless the actor is an admin.
    async fn assign(
        &self,
        actor: &Actor,
        doctor_id: &UserId,
        patient_id: &UserId,
    ) -> Result<CareLinkPair, Error>;

    /// Remove the patient's doctor link.
    ///
    /// # Errors
    /// `conflict` when the patient has no doctor.
    async fn unassign(&self, actor: &Actor, patient_id: &UserId) -> Result<User, Error>;
}
