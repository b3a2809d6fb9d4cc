//! Alert engine.
//!
//! Three alert paths coexist and are deliberately not unified:
//! - doctor inbox alerts, pushed by external events and hard-deleted by the
//!   clear operations;
//! - computed clinical alerts, derived from ledgers on every read and never
//!   stored;
//! - patient-held alerts, soft-deleted through a `dismissed` flag.
//!
//! `clear_doctor_alerts` removes every inbox alert, including ones without
//! the fall tag, even though the fall listing only shows tagged alerts.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{AlertCommand, AlertQuery, UserRepository};
use crate::domain::user_store::{UserStore, role_not_found};
use crate::domain::{
    Action, Actor, Alert, AlertId, AlertSeverity, ComputedAlert, Error, PatientAlertView, Role,
    User, UserId, can,
};

/// Message emitted for a listed patient whose `doctor_ref` is empty.
pub const UNASSIGNED_PATIENT_MESSAGE: &str = "Unassigned patient";

fn alert_not_found(owner: &UserId, alert_id: &AlertId) -> Error {
    Error::not_found(format!("alert {alert_id} not found for user {owner}"))
}

/// Derive computed alerts for one patient of `doctor_id`.
///
/// Patients linked to a different doctor yield nothing.
pub fn derive_clinical_alerts(doctor_id: &UserId, patient: &User) -> Vec<ComputedAlert> {
    let mut alerts = Vec::new();
    match patient.doctor_ref() {
        Some(linked) if linked != *doctor_id => return alerts,
        Some(_) => {}
        None => alerts.push(ComputedAlert {
            patient_id: patient.id(),
            message: UNASSIGNED_PATIENT_MESSAGE.to_owned(),
            severity: AlertSeverity::High,
        }),
    }

    for entry in patient.medical_history() {
        for vital in entry.vitals() {
            if let Some(severity) = vital.status.alert_severity() {
                alerts.push(ComputedAlert {
                    patient_id: patient.id(),
                    message: format!("Abnormal vital {}: {}", vital.name, vital.status),
                    severity,
                });
            }
        }
    }
    alerts
}

/// Alert engine implementing the alert driving ports.
pub struct AlertService<R> {
    users: UserStore<R>,
    clock: Arc<dyn Clock>,
}

impl<R> Clone for AlertService<R> {
    fn clone(&self) -> Self {
        Self {
            users: self.users.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R: UserRepository> AlertService<R> {
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users: UserStore::new(repo),
            clock,
        }
    }

    /// Append an alert to a doctor's inbox.
    ///
    /// Invoked by event sources such as the fall pipeline, not by end users,
    /// so no actor is checked.
    pub async fn push_doctor_alert(
        &self,
        doctor_id: &UserId,
        message: &str,
        related_patient: Option<UserId>,
    ) -> Result<Alert, Error> {
        let alert = Alert::new(AlertId::random(), message, self.clock.utc(), related_patient);
        self.users
            .mutate(doctor_id, |doctor| {
                doctor.require_role(Role::Doctor).map_err(role_not_found)?;
                doctor.push_alert(alert.clone());
                Ok(())
            })
            .await?;
        info!(doctor_id = %doctor_id, alert_id = %alert.id(), "doctor alert pushed");
        Ok(alert)
    }

    async fn gate_patient(
        &self,
        actor: &Actor,
        action: Action,
        patient_id: &UserId,
    ) -> Result<User, Error> {
        let patient = self.users.load_with_role(patient_id, Role::Patient).await?;
        can(actor, action, &patient)?;
        Ok(patient)
    }

    async fn gate_inbox(&self, actor: &Actor, doctor_id: &UserId) -> Result<User, Error> {
        let doctor = self.users.load_with_role(doctor_id, Role::Doctor).await?;
        can(actor, Action::ManageDoctorInbox, &doctor)?;
        Ok(doctor)
    }

    /// Union of the doctor's `patient_refs` and patients pointing at it.
    async fn patients_seen_by(&self, doctor: &User) -> Result<Vec<User>, Error> {
        let linked = self.users.patients_of(&doctor.id()).await?;
        let mut seen: HashSet<UserId> = HashSet::new();
        let mut patients = Vec::with_capacity(linked.len());

        for patient_id in doctor.patient_refs() {
            if let Some(patient) = linked.iter().find(|p| p.id() == *patient_id) {
                seen.insert(*patient_id);
                patients.push(patient.clone());
                continue;
            }
            match self.users.find(patient_id).await? {
                Some(patient) if patient.role() == Role::Patient => {
                    seen.insert(*patient_id);
                    patients.push(patient);
                }
                _ => warn!(
                    doctor_id = %doctor.id(),
                    patient_id = %patient_id,
                    "doctor lists a missing patient"
                ),
            }
        }
        patients.extend(linked.into_iter().filter(|p| seen.insert(p.id())));
        Ok(patients)
    }
}

#[async_trait]
impl<R: UserRepository> AlertCommand for AlertService<R> {
    async fn push_patient_alert(
        &self,
        actor: &Actor,
        patient_id: &UserId,
        message: String,
    ) -> Result<Alert, Error> {
        if message.trim().is_empty() {
            return Err(Error::validation("alert message must not be empty"));
        }
        self.gate_patient(actor, Action::PushPatientAlert, patient_id)
            .await?;

        let alert = Alert::new(
            AlertId::random(),
            message,
            self.clock.utc(),
            Some(*patient_id),
        );
        self.users
            .mutate(patient_id, |patient| {
                can(actor, Action::PushPatientAlert, patient)?;
                patient.push_alert(alert.clone());
                Ok(())
            })
            .await?;

        info!(patient_id = %patient_id, alert_id = %alert.id(), "patient alert pushed");
        Ok(alert)
    }

    async fn dismiss_patient_alert(
        &self,
        actor: &Actor,
        patient_id: &UserId,
        alert_id: &AlertId,
    ) -> Result<Alert, Error> {
        self.gate_patient(actor, Action::DismissPatientAlert, patient_id)
            .await?;
        let (_, alert) = self
            .users
            .mutate(patient_id, |patient| {
                can(actor, Action::DismissPatientAlert, patient)?;
                let alert = patient
                    .alert_mut(*alert_id)
                    .ok_or_else(|| alert_not_found(patient_id, alert_id))?;
                alert.dismiss();
                Ok(alert.clone())
            })
            .await?;
        info!(patient_id = %patient_id, alert_id = %alert_id, "patient alert dismissed");
        Ok(alert)
    }

    async fn clear_doctor_alert(
        &self,
        actor: &Actor,
        doctor_id: &UserId,
        alert_id: &AlertId,
    ) -> Result<(), Error> {
        self.gate_inbox(actor, doctor_id).await?;
        self.users
            .mutate(doctor_id, |doctor| {
                doctor
                    .remove_alert(*alert_id)
                    .map(|_| ())
                    .ok_or_else(|| alert_not_found(doctor_id, alert_id))
            })
            .await?;
        info!(doctor_id = %doctor_id, alert_id = %alert_id, "doctor alert cleared");
        Ok(())
    }

    async fn clear_doctor_alerts(
        &self,
        actor: &Actor,
        doctor_id: &UserId,
    ) -> Result<usize, Error> {
        self.gate_inbox(actor, doctor_id).await?;
        let (_, (removed, untagged)) = self
            .users
            .mutate(doctor_id, |doctor| {
                let untagged = doctor.alerts().iter().filter(|a| !a.is_fall()).count();
                Ok((doctor.clear_alerts(), untagged))
            })
            .await?;
        if untagged > 0 {
            warn!(
                doctor_id = %doctor_id,
                untagged,
                "clearing inbox removed alerts without the fall tag"
            );
        }
        info!(doctor_id = %doctor_id, removed, "doctor inbox cleared");
        Ok(removed)
    }
}

#[async_trait]
impl<R: UserRepository> AlertQuery for AlertService<R> {
    async fn compute_doctor_alerts(
        &self,
        actor: &Actor,
        doctor_id: &UserId,
    ) -> Result<Vec<ComputedAlert>, Error> {
        let doctor = self.gate_inbox(actor, doctor_id).await?;
        let patients = self.patients_seen_by(&doctor).await?;
        Ok(patients
            .iter()
            .flat_map(|patient| derive_clinical_alerts(doctor_id, patient))
            .collect())
    }

    async fn list_doctor_fall_alerts(
        &self,
        actor: &Actor,
        doctor_id: &UserId,
    ) -> Result<Vec<Alert>, Error> {
        let doctor = self.gate_inbox(actor, doctor_id).await?;
        Ok(doctor
            .alerts()
            .iter()
            .filter(|alert| alert.is_fall())
            .cloned()
            .collect())
    }

    async fn list_patient_alerts(
        &self,
        actor: &Actor,
        doctor_id: &UserId,
    ) -> Result<Vec<PatientAlertView>, Error> {
        self.gate_inbox(actor, doctor_id).await?;
        let patients = self.users.patients_of(doctor_id).await?;
        Ok(patients
            .iter()
            .flat_map(|patient| {
                patient
                    .alerts()
                    .iter()
                    .filter(|alert| !alert.is_dismissed())
                    .map(|alert| PatientAlertView {
                        patient_id: patient.id(),
                        patient_name: patient.name().to_owned(),
                        alert: alert.clone(),
                    })
            })
            .collect())
    }
}

#[cfg(test)]
#[path = "alerts_tests.rs"]
mod tests;
