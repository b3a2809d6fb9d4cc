//! Computed alerts derived from patient ledgers.

use rstest::rstest;

use carelink::domain::ports::{AlertCommand, AlertQuery, MedicalHistoryCommand};
use carelink::domain::{
    Actor, AlertSeverity, ComputedAlert, EntryDraft, ErrorCode, Role, VitalDraft,
};
use carelink::test_support::world::TestWorld;

fn vital(name: &str, value: &str, status: &str) -> EntryDraft {
    EntryDraft {
        vitals: vec![VitalDraft {
            name: name.to_owned(),
            value: value.to_owned(),
            status: Some(status.to_owned()),
        }],
        ..EntryDraft::default()
    }
}

#[rstest]
#[case::danger("Danger", Some(AlertSeverity::Critical))]
#[case::high("High", Some(AlertSeverity::High))]
#[case::low("Low", Some(AlertSeverity::High))]
#[case::normal("Normal", None)]
#[case::ok("OK", None)]
#[tokio::test]
async fn vital_status_sets_computed_severity(
    #[case] status: &str,
    #[case] expected: Option<AlertSeverity>,
) {
    let world = TestWorld::new();
    let (gp, ada) = world.linked_pair("Grace", "Ada").await;
    let caller = Actor::new(gp.id(), Role::Doctor);

    world
        .history
        .append_entry(&caller, &ada.id(), vital("heartRate", "140", status))
        .await
        .expect("append");

    let alerts = world
        .alerts
        .compute_doctor_alerts(&caller, &gp.id())
        .await
        .expect("computed");
    let expected: Vec<ComputedAlert> = expected
        .map(|severity| ComputedAlert {
            patient_id: ada.id(),
            message: format!("Abnormal vital heartRate: {status}"),
            severity,
        })
        .into_iter()
        .collect();
    assert_eq!(alerts, expected);
}

#[rstest]
#[tokio::test]
async fn computed_alerts_are_not_stored() {
    let world = TestWorld::new();
    let (gp, ada) = world.linked_pair("Grace", "Ada").await;
    let caller = Actor::new(gp.id(), Role::Doctor);
    world
        .history
        .append_entry(&caller, &ada.id(), vital("spo2", "84", "Danger"))
        .await
        .expect("append");

    for _ in 0..2 {
        let alerts = world
            .alerts
            .compute_doctor_alerts(&caller, &gp.id())
            .await
            .expect("computed");
        assert_eq!(alerts.len(), 1);
    }
    assert!(world.stored(&gp.id()).await.alerts().is_empty());
    assert!(world.stored(&ada.id()).await.alerts().is_empty());
}

#[rstest]
#[tokio::test]
async fn dismissed_patient_alerts_leave_the_doctor_view() {
    let world = TestWorld::new();
    let (gp, ada) = world.linked_pair("Grace", "Ada").await;
    let caller = Actor::new(gp.id(), Role::Doctor);

    let alert = world
        .alerts
        .push_patient_alert(&caller, &ada.id(), "Missed medication".to_owned())
        .await
        .expect("push");
    let visible = world
        .alerts
        .list_patient_alerts(&caller, &gp.id())
        .await
        .expect("view");
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].patient_name, "Ada");

    let dismissed = world
        .alerts
        .dismiss_patient_alert(&caller, &ada.id(), &alert.id())
        .await
        .expect("dismiss");
    assert!(dismissed.is_dismissed());
    let visible = world
        .alerts
        .list_patient_alerts(&caller, &gp.id())
        .await
        .expect("view");
    assert!(visible.is_empty());
    // Dismissal flags the alert; the record keeps it.
    assert_eq!(world.stored(&ada.id()).await.alerts().len(), 1);
}

#[rstest]
#[tokio::test]
async fn doctors_cannot_read_another_inbox() {
    let world = TestWorld::new();
    let (gp, _) = world.linked_pair("Grace", "Ada").await;
    let (other, _) = world.linked_pair("Hopper", "Lin").await;

    let err = world
        .alerts
        .compute_doctor_alerts(&Actor::new(other.id(), Role::Doctor), &gp.id())
        .await
        .expect_err("denied");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}
