//! Doctor/patient assignment service.
//!
//! Links are two weak references written independently: the patient's
//! `doctor_ref` and the doctor's `patient_refs`. The patient side is the
//! source of truth. [`CareGraphService::repair`] runs before every mutation
//! and rewrites doctor records to agree with it, so a crash between the two
//! writes never leaves a permanent half-link.
//!
//! Concurrent assignments of one patient to different doctors resolve
//! last-write-wins on `doctor_ref`; the losing doctor's stale entry is removed
//! by the next repair.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{CareGraphCommand, CareLinkPair, UserRepository};
use crate::domain::user_store::{UserStore, role_not_found};
use crate::domain::{Action, Actor, Error, ErrorCode, Role, Subject, User, UserId, can_on};

/// Doctor records touched while repairing one patient's links.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Doctors that listed the patient without being its `doctor_ref`.
    pub removed_from: Vec<UserId>,
    /// Doctor that was missing the patient despite being its `doctor_ref`.
    pub restored_on: Option<UserId>,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        self.removed_from.is_empty() && self.restored_on.is_none()
    }
}

/// Care graph service implementing [`CareGraphCommand`].
pub struct CareGraphService<R> {
    users: UserStore<R>,
}

impl<R> Clone for CareGraphService<R> {
    fn clone(&self) -> Self {
        Self {
            users: self.users.clone(),
        }
    }
}

impl<R: UserRepository> CareGraphService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            users: UserStore::new(repo),
        }
    }

    /// Make every doctor record agree with the patient's `doctor_ref`.
    pub async fn repair(&self, patient_id: &UserId) -> Result<RepairReport, Error> {
        let patient = self.users.load_with_role(patient_id, Role::Patient).await?;
        let truth = patient.doctor_ref();
        let mut report = RepairReport::default();

        for doctor in self.users.doctors_listing(patient_id).await? {
            if Some(doctor.id()) == truth {
                continue;
            }
            warn!(
                patient_id = %patient_id,
                doctor_id = %doctor.id(),
                "removing stale patient reference"
            );
            self.release_from(&doctor.id(), patient_id).await?;
            report.removed_from.push(doctor.id());
        }

        if let Some(doctor_id) = truth {
            match self.users.find(&doctor_id).await? {
                Some(doctor) if doctor.role() == Role::Doctor => {
                    if !doctor.patient_refs().contains(patient_id) {
                        warn!(
                            patient_id = %patient_id,
                            doctor_id = %doctor_id,
                            "restoring missing patient reference"
                        );
                        self.add_patient_ref(&doctor_id, patient_id).await?;
                        report.restored_on = Some(doctor_id);
                    }
                }
                _ => warn!(
                    patient_id = %patient_id,
                    doctor_id = %doctor_id,
                    "patient references a missing doctor"
                ),
            }
        }

        Ok(report)
    }

    async fn add_patient_ref(&self, doctor_id: &UserId, patient_id: &UserId) -> Result<User, Error> {
        let patient_id = *patient_id;
        let (doctor, _) = self
            .users
            .mutate(doctor_id, |doctor| {
                doctor.add_patient_ref(patient_id).map_err(role_not_found)
            })
            .await?;
        Ok(doctor)
    }

    async fn drop_patient_ref(&self, doctor_id: &UserId, patient_id: &UserId) -> Result<(), Error> {
        let patient_id = *patient_id;
        self.users
            .mutate(doctor_id, |doctor| {
                doctor.remove_patient_ref(patient_id).map_err(role_not_found)
            })
            .await
            .map(|_| ())
    }

    /// Remove the patient from a doctor that may no longer exist.
    async fn release_from(&self, doctor_id: &UserId, patient_id: &UserId) -> Result<(), Error> {
        match self.drop_patient_ref(doctor_id, patient_id).await {
            Ok(()) => Ok(()),
            Err(err) if err.code() == ErrorCode::NotFound => {
                warn!(
                    patient_id = %patient_id,
                    doctor_id = %doctor_id,
                    "linked doctor missing; clearing patient side only"
                );
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl<R: UserRepository> CareGraphCommand for CareGraphService<R> {
    async fn assign(
        &self,
        actor: &Actor,
        doctor_id: &UserId,
        patient_id: &UserId,
    ) -> Result<CareLinkPair, Error> {
        can_on(actor, Action::ManageCareGraph, Subject::unresolved(*patient_id))?;
        self.users.load_with_role(doctor_id, Role::Doctor).await?;
        self.users.load_with_role(patient_id, Role::Patient).await?;
        self.repair(patient_id).await?;

        let target = *doctor_id;
        let (patient, previous) = self
            .users
            .mutate(patient_id, |patient| {
                let previous = patient.doctor_ref();
                patient.set_doctor_ref(Some(target)).map_err(role_not_found)?;
                Ok(previous)
            })
            .await?;

        if let Some(previous) = previous.filter(|previous| previous != doctor_id) {
            self.release_from(&previous, patient_id).await?;
        }
        let doctor = self.add_patient_ref(doctor_id, patient_id).await?;

        info!(doctor_id = %doctor_id, patient_id = %patient_id, "patient assigned");
        Ok(CareLinkPair { doctor, patient })
    }

    async fn unassign(&self, actor: &Actor, patient_id: &UserId) -> Result<User, Error> {
        can_on(actor, Action::ManageCareGraph, Subject::unresolved(*patient_id))?;
        self.users.load_with_role(patient_id, Role::Patient).await?;
        self.repair(patient_id).await?;

        let (patient, previous) = self
            .users
            .mutate(patient_id, |patient| {
                let previous = patient.doctor_ref().ok_or_else(|| {
                    Error::conflict(format!("patient {} is not assigned", patient.id()))
                })?;
                patient.set_doctor_ref(None).map_err(role_not_found)?;
                Ok(previous)
            })
            .await?;

        self.release_from(&previous, patient_id).await?;

        info!(doctor_id = %previous, patient_id = %patient_id, "patient unassigned");
        Ok(patient)
    }
}

#[cfg(test)]
#[path = "care_graph_tests.rs"]
mod tests;
