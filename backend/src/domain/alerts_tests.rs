//! Tests for the alert engine.

use std::sync::Arc;

use chrono::Utc;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::MockUserRepository;
use crate::domain::{EntryDraft, EntryId, ErrorCode, MedicalHistoryEntry, VitalDraft};
use crate::test_support::clock::FixtureClock;
use crate::test_support::mock_users::{UserTable, mock_user_repository, stored};
use crate::test_support::users;

struct Practice {
    doctor: User,
    patient: User,
    service: AlertService<MockUserRepository>,
    table: UserTable,
}

impl Practice {
    fn doctor_actor(&self) -> Actor {
        Actor::new(self.doctor.id(), Role::Doctor)
    }
}

fn vital(name: &str, status: &str) -> VitalDraft {
    VitalDraft {
        name: name.into(),
        value: "1".into(),
        status: Some(status.into()),
    }
}

fn entry(vitals: Vec<VitalDraft>) -> MedicalHistoryEntry {
    MedicalHistoryEntry::from_draft(
        EntryId::random(),
        Utc::now(),
        EntryDraft {
            vitals,
            ..EntryDraft::default()
        },
    )
    .expect("valid entry")
}

#[fixture]
fn practice() -> Practice {
    let mut doctor = users::doctor("Grace");
    let mut patient = users::patient("Ada");
    doctor.add_patient_ref(patient.id()).expect("doctor");
    patient.set_doctor_ref(Some(doctor.id())).expect("patient");
    patient
        .prepend_entry(entry(vec![
            vital("heartRate", "Danger"),
            vital("spo2", "Normal"),
            vital("glucose", "Low"),
        ]))
        .expect("ledger");

    let (repo, table) = mock_user_repository([doctor.clone(), patient.clone()]);
    Practice {
        doctor,
        patient,
        service: AlertService::new(Arc::new(repo), Arc::new(FixtureClock::default())),
        table,
    }
}

#[rstest]
fn derived_alerts_cover_abnormal_vitals_only(practice: Practice) {
    let alerts = derive_clinical_alerts(&practice.doctor.id(), &practice.patient);
    assert_eq!(
        alerts,
        vec![
            ComputedAlert {
                patient_id: practice.patient.id(),
                message: "Abnormal vital heartRate: Danger".into(),
                severity: AlertSeverity::Critical,
            },
            ComputedAlert {
                patient_id: practice.patient.id(),
                message: "Abnormal vital glucose: Low".into(),
                severity: AlertSeverity::High,
            },
        ]
    );
}

#[rstest]
fn listed_patient_without_doctor_is_flagged() {
    let doctor_id = UserId::random();
    let patient = users::patient("Bob");
    let alerts = derive_clinical_alerts(&doctor_id, &patient);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].message, UNASSIGNED_PATIENT_MESSAGE);
    assert_eq!(alerts[0].severity, AlertSeverity::High);
}

#[rstest]
fn patients_of_other_doctors_yield_nothing(practice: Practice) {
    assert!(derive_clinical_alerts(&UserId::random(), &practice.patient).is_empty());
}

#[rstest]
#[tokio::test]
async fn inbox_and_computed_alerts_stay_separate(practice: Practice) {
    let actor = practice.doctor_actor();
    practice
        .service
        .push_doctor_alert(&practice.doctor.id(), "Fall detected for Ada at Hall", Some(practice.patient.id()))
        .await
        .expect("push");

    let computed = practice
        .service
        .compute_doctor_alerts(&actor, &practice.doctor.id())
        .await
        .expect("computed");
    assert!(computed.iter().all(|a| a.message.starts_with("Abnormal vital")));

    let falls = practice
        .service
        .list_doctor_fall_alerts(&actor, &practice.doctor.id())
        .await
        .expect("falls");
    assert_eq!(falls.len(), 1);
    assert!(falls.iter().all(|a| !a.message().contains("Danger")));
}

#[rstest]
#[tokio::test]
async fn clear_all_removes_untagged_alerts_too(practice: Practice) {
    let actor = practice.doctor_actor();
    let doctor_id = practice.doctor.id();
    practice
        .service
        .push_doctor_alert(&doctor_id, "Fall detected for Ada at Room 4", None)
        .await
        .expect("fall alert");
    practice
        .service
        .push_doctor_alert(&doctor_id, "Lab results ready", None)
        .await
        .expect("generic alert");

    let falls = practice
        .service
        .list_doctor_fall_alerts(&actor, &doctor_id)
        .await
        .expect("falls");
    assert_eq!(falls.len(), 1);

    let removed = practice
        .service
        .clear_doctor_alerts(&actor, &doctor_id)
        .await
        .expect("clear");
    assert_eq!(removed, 2);
    assert!(stored(&practice.table, &doctor_id).alerts().is_empty());
}

#[rstest]
#[tokio::test]
async fn clear_one_removes_only_the_named_alert(practice: Practice) {
    let actor = practice.doctor_actor();
    let doctor_id = practice.doctor.id();
    let first = practice
        .service
        .push_doctor_alert(&doctor_id, "Fall detected for Ada at Room 4", None)
        .await
        .expect("push");
    practice
        .service
        .push_doctor_alert(&doctor_id, "Fall detected for Ada at Garden", None)
        .await
        .expect("push");

    practice
        .service
        .clear_doctor_alert(&actor, &doctor_id, &first.id())
        .await
        .expect("clear one");
    assert_eq!(stored(&practice.table, &doctor_id).alerts().len(), 1);

    let err = practice
        .service
        .clear_doctor_alert(&actor, &doctor_id, &first.id())
        .await
        .expect_err("already gone");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn doctors_cannot_manage_another_inbox(practice: Practice) {
    let other = Actor::new(UserId::random(), Role::Doctor);
    let err = practice
        .service
        .clear_doctor_alerts(&other, &practice.doctor.id())
        .await
        .expect_err("foreign inbox");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn dismissal_is_a_flag_and_hides_from_listing(practice: Practice) {
    let actor = practice.doctor_actor();
    let patient_id = practice.patient.id();
    let kept = practice
        .service
        .push_patient_alert(&actor, &patient_id, "Missed medication".into())
        .await
        .expect("push");
    let dismissed = practice
        .service
        .push_patient_alert(&actor, &patient_id, "Low activity".into())
        .await
        .expect("push");

    practice
        .service
        .dismiss_patient_alert(&actor, &patient_id, &dismissed.id())
        .await
        .expect("dismiss");

    let views = practice
        .service
        .list_patient_alerts(&actor, &practice.doctor.id())
        .await
        .expect("list");
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].alert.id(), kept.id());
    assert_eq!(views[0].patient_name, "Ada");

    let record = stored(&practice.table, &patient_id);
    assert_eq!(record.alerts().len(), 2);
    assert!(record
        .alerts()
        .iter()
        .any(|a| a.id() == dismissed.id() && a.is_dismissed()));
}

#[rstest]
#[tokio::test]
async fn unassigned_doctor_cannot_dismiss(practice: Practice) {
    let actor = practice.doctor_actor();
    let patient_id = practice.patient.id();
    let alert = practice
        .service
        .push_patient_alert(&actor, &patient_id, "Missed medication".into())
        .await
        .expect("push");

    let stranger = Actor::new(UserId::random(), Role::Doctor);
    let err = practice
        .service
        .dismiss_patient_alert(&stranger, &patient_id, &alert.id())
        .await
        .expect_err("not assigned");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn patients_cannot_push_alerts_on_themselves(practice: Practice) {
    let me = Actor::new(practice.patient.id(), Role::Patient);
    let err = practice
        .service
        .push_patient_alert(&me, &practice.patient.id(), "help".into())
        .await
        .expect_err("denied");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}
