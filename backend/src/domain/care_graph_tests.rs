//! Tests for the care graph service.

use std::sync::Arc;

use rstest::rstest;

use super::*;
use crate::domain::ports::MockUserRepository;
use crate::domain::{CredentialHash, Email, Profile};
use crate::test_support::mock_users::{mock_user_repository, stored};

fn user(role: Role, name: &str) -> User {
    User::new(
        UserId::random(),
        Email::new(format!("{name}@example.test")).expect("email"),
        CredentialHash::new("salt$hash"),
        Profile::named(name).expect("profile"),
        role,
    )
    .with_revision(1)
}

fn admin() -> Actor {
    Actor::new(UserId::random(), Role::Admin)
}

#[rstest]
#[case(Role::Doctor)]
#[case(Role::Patient)]
#[tokio::test]
async fn non_admins_are_denied_before_any_lookup(#[case] role: Role) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().times(0);
    repo.expect_save().times(0);
    let service = CareGraphService::new(Arc::new(repo));

    let actor = Actor::new(UserId::random(), role);
    let err = service
        .assign(&actor, &UserId::random(), &UserId::random())
        .await
        .expect_err("denied");
    assert_eq!(err.code(), ErrorCode::Unauthorized);

    let err = service
        .unassign(&actor, &UserId::random())
        .await
        .expect_err("denied");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn assign_rejects_a_patient_in_the_doctor_slot() {
    let impostor = user(Role::Patient, "ada");
    let patient = user(Role::Patient, "bob");
    let (impostor_id, patient_id) = (impostor.id(), patient.id());

    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .returning(move |id| Ok(Some(if *id == impostor_id { impostor.clone() } else { patient.clone() })));
    repo.expect_save().times(0);
    let service = CareGraphService::new(Arc::new(repo));

    let err = service
        .assign(&admin(), &impostor_id, &patient_id)
        .await
        .expect_err("role mismatch");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn unassign_of_unlinked_patient_is_a_conflict() {
    let patient = user(Role::Patient, "ada");
    let patient_id = patient.id();

    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .returning(move |_| Ok(Some(patient.clone())));
    repo.expect_find_doctors_listing()
        .returning(|_| Ok(Vec::new()));
    repo.expect_save().times(0);
    let service = CareGraphService::new(Arc::new(repo));

    let err = service
        .unassign(&admin(), &patient_id)
        .await
        .expect_err("not assigned");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.message(), format!("patient {patient_id} is not assigned"));
}

#[rstest]
#[tokio::test]
async fn repair_drops_doctors_that_are_not_the_doctor_ref() {
    let patient = user(Role::Patient, "ada");
    let mut stale = user(Role::Doctor, "grace");
    stale.add_patient_ref(patient.id()).expect("doctor");
    let (patient_id, stale_id) = (patient.id(), stale.id());
    let listed = stale.clone();

    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().returning(move |id| {
        Ok(Some(if *id == stale_id {
            stale.clone()
        } else {
            patient.clone()
        }))
    });
    repo.expect_find_doctors_listing()
        .returning(move |_| Ok(vec![listed.clone()]));
    repo.expect_save()
        .times(1)
        .withf(move |saved| saved.id() == stale_id && saved.patient_refs().is_empty())
        .returning(|saved| Ok(saved.clone().with_revision(saved.revision() + 1)));
    let service = CareGraphService::new(Arc::new(repo));

    let report = service.repair(&patient_id).await.expect("repair");
    assert_eq!(report.removed_from, vec![stale_id]);
    assert_eq!(report.restored_on, None);
    assert!(!report.is_clean());
}

#[rstest]
#[tokio::test]
async fn repair_restores_the_doctor_side_of_a_half_link() {
    let doctor = user(Role::Doctor, "grace");
    let mut patient = user(Role::Patient, "ada");
    patient.set_doctor_ref(Some(doctor.id())).expect("patient");
    let (doctor_id, patient_id) = (doctor.id(), patient.id());
    let (repo, table) = mock_user_repository([doctor, patient]);
    let service = CareGraphService::new(Arc::new(repo));

    let report = service.repair(&patient_id).await.expect("repair");

    assert_eq!(report.restored_on, Some(doctor_id));
    assert!(report.removed_from.is_empty());
    assert_eq!(stored(&table, &doctor_id).patient_refs(), &[patient_id]);

    let again = service.repair(&patient_id).await.expect("second repair");
    assert!(again.is_clean());
}

#[rstest]
#[tokio::test]
async fn unassign_heals_a_half_link_before_clearing_it() {
    let doctor = user(Role::Doctor, "grace");
    let mut patient = user(Role::Patient, "ada");
    patient.set_doctor_ref(Some(doctor.id())).expect("patient");
    let (doctor_id, patient_id) = (doctor.id(), patient.id());
    let (repo, table) = mock_user_repository([doctor, patient]);
    let service = CareGraphService::new(Arc::new(repo));

    let released = service
        .unassign(&admin(), &patient_id)
        .await
        .expect("unassign");

    assert_eq!(released.doctor_ref(), None);
    assert!(stored(&table, &doctor_id).patient_refs().is_empty());
}
