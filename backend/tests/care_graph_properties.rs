//! Care graph symmetry and ledger ordering over the in-memory adapters.

use futures::future::join_all;
use rstest::rstest;

use carelink::domain::ports::{CareGraphCommand, MedicalHistoryCommand, MedicalHistoryQuery};
use carelink::domain::{Actor, EntryDraft, ErrorCode, Role, User, UserId};
use carelink::test_support::users::{admin, doctor, patient};
use carelink::test_support::world::TestWorld;

fn actor(user: &User) -> Actor {
    Actor::new(user.id(), user.role())
}

fn note(text: &str) -> EntryDraft {
    EntryDraft {
        notes: text.to_owned(),
        ..EntryDraft::default()
    }
}

/// Both sides agree on the link for every stored doctor and patient.
async fn assert_symmetric(world: &TestWorld, doctors: &[UserId], patients: &[UserId]) {
    for doctor_id in doctors {
        let doctor = world.stored(doctor_id).await;
        for patient_id in doctor.patient_refs() {
            let patient = world.stored(patient_id).await;
            assert_eq!(patient.doctor_ref(), Some(*doctor_id), "dangling ref on {doctor_id}");
        }
    }
    for patient_id in patients {
        let patient = world.stored(patient_id).await;
        if let Some(doctor_id) = patient.doctor_ref() {
            let doctor = world.stored(&doctor_id).await;
            assert!(
                doctor.patient_refs().contains(patient_id),
                "doctor {doctor_id} does not list {patient_id}"
            );
        }
    }
}

#[rstest]
#[tokio::test]
async fn assignment_is_symmetric_and_idempotent() {
    let world = TestWorld::new();
    let root = world.seed(admin("Root")).await;
    let gp = world.seed(doctor("Grace")).await;
    let ada = world.seed(patient("Ada")).await;

    for _ in 0..2 {
        world
            .care_graph
            .assign(&actor(&root), &gp.id(), &ada.id())
            .await
            .expect("assign");
    }

    let stored_gp = world.stored(&gp.id()).await;
    assert_eq!(stored_gp.patient_refs(), &[ada.id()]);
    assert_symmetric(&world, &[gp.id()], &[ada.id()]).await;
}

#[rstest]
#[tokio::test]
async fn reassignment_moves_the_patient_between_doctors() {
    let world = TestWorld::new();
    let root = world.seed(admin("Root")).await;
    let (first, ada) = world.linked_pair("Grace", "Ada").await;
    let second = world.seed(doctor("Hopper")).await;

    let pair = world
        .care_graph
        .assign(&actor(&root), &second.id(), &ada.id())
        .await
        .expect("reassign");

    assert_eq!(pair.patient.doctor_ref(), Some(second.id()));
    assert!(world.stored(&first.id()).await.patient_refs().is_empty());
    assert_symmetric(&world, &[first.id(), second.id()], &[ada.id()]).await;
}

#[rstest]
#[tokio::test]
async fn unassign_clears_both_sides_then_conflicts() {
    let world = TestWorld::new();
    let root = world.seed(admin("Root")).await;
    let (gp, ada) = world.linked_pair("Grace", "Ada").await;

    let patient = world
        .care_graph
        .unassign(&actor(&root), &ada.id())
        .await
        .expect("unassign");
    assert_eq!(patient.doctor_ref(), None);
    assert!(world.stored(&gp.id()).await.patient_refs().is_empty());

    let err = world
        .care_graph
        .unassign(&actor(&root), &ada.id())
        .await
        .expect_err("second unassign");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[case::doctor(Role::Doctor)]
#[case::patient(Role::Patient)]
#[tokio::test]
async fn only_admins_manage_links(#[case] role: Role) {
    let world = TestWorld::new();
    let gp = world.seed(doctor("Grace")).await;
    let ada = world.seed(patient("Ada")).await;
    let caller = Actor::new(if role == Role::Doctor { gp.id() } else { ada.id() }, role);

    let err = world
        .care_graph
        .assign(&caller, &gp.id(), &ada.id())
        .await
        .expect_err("denied");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(world.stored(&ada.id()).await.doctor_ref(), None);
}

#[rstest]
#[tokio::test]
async fn concurrent_appends_all_land_in_the_ledger() {
    let world = TestWorld::new();
    let (gp, ada) = world.linked_pair("Grace", "Ada").await;
    let caller = actor(&gp);
    let notes = ["morning round", "lunch check", "evening round"];
    let ada_id = ada.id();

    let results = join_all(
        notes
            .iter()
            .map(|text| world.history.append_entry(&caller, &ada_id, note(text))),
    )
    .await;
    for result in results {
        result.expect("append");
    }

    let ledger = world
        .history
        .list_history(&caller, &ada.id())
        .await
        .expect("ledger");
    assert_eq!(ledger.len(), notes.len());
    let mut recorded: Vec<&str> = ledger.iter().map(|entry| entry.notes()).collect();
    recorded.sort_unstable();
    let mut expected = notes.to_vec();
    expected.sort_unstable();
    assert_eq!(recorded, expected);
}

#[rstest]
#[tokio::test]
async fn newest_entry_heads_the_ledger() {
    let world = TestWorld::new();
    let (gp, ada) = world.linked_pair("Grace", "Ada").await;
    let caller = actor(&gp);

    let first = world
        .history
        .append_entry(&caller, &ada.id(), note("first"))
        .await
        .expect("first")
        .remove(0);
    world.clock.advance(chrono::Duration::minutes(5));
    let ledger = world
        .history
        .append_entry(&caller, &ada.id(), note("second"))
        .await
        .expect("second");

    let notes: Vec<&str> = ledger.iter().map(|entry| entry.notes()).collect();
    assert_eq!(notes, ["second", "first"]);
    assert!(ledger[0].recorded_at() > ledger[1].recorded_at());
    assert_eq!(ledger[1], first, "earlier entries never change");
}
