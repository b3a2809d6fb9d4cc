//! Driving ports for stored and computed alerts.
//!
//! Doctor inbox alerts are hard-deleted by the clear operations; patient-held
//! alerts are only ever flagged as dismissed.

use async_trait::async_trait;

use crate::domain::{Actor, Alert, AlertId, ComputedAlert, Error, PatientAlertView, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AlertCommand: Send + Sync {
    /// Store an alert on a patient record.
    async fn push_patient_alert(
        &self,
        actor: &Actor,
        patient_id: &UserId,
        message: String,
    ) -> Result<Alert, Error>;

    /// Flag a patient-held alert as dismissed.
    async fn dismiss_patient_alert(
        &self,
        actor: &Actor,
        patient_id: &UserId,
        alert_id: &AlertId,
    ) -> Result<Alert, Error>;

    /// Physically remove one inbox alert. `not_found` if absent.
    async fn clear_doctor_alert(
        &self,
        actor: &Actor,
        doctor_id: &UserId,
        alert_id: &AlertId,
    ) -> Result<(), Error>;

    /// Physically remove every inbox alert, fall-tagged or not.
    ///
    /// Returns the number of alerts removed.
    async fn clear_doctor_alerts(&self, actor: &Actor, doctor_id: &UserId)
    -> Result<usize, Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AlertQuery: Send + Sync {
    /// Derive clinical alerts from the ledgers of the doctor's patients.
    async fn compute_doctor_alerts(
        &self,
        actor: &Actor,
        doctor_id: &UserId,
    ) -> Result<Vec<ComputedAlert>, Error>;

    /// Inbox alerts carrying the fall tag.
    async fn list_doctor_fall_alerts(
        &self,
        actor: &Actor,
        doctor_id: &UserId,
    ) -> Result<Vec<Alert>, Error>;

    /// Undismissed alerts held by the doctor's patients.
    async fn list_patient_alerts(
        &self,
        actor: &Actor,
        doctor_id: &UserId,
    ) -> Result<Vec<PatientAlertView>, Error>;
}
