//! Tests for the claim-by-move protocol

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use handoff::models::{Stage, Zone};
use handoff::storage::{ClaimError, ClaimLog, StageStore, claim_task};

use crate::common::fixtures::safe_task;
use crate::common::temp_vault;

#[test]
fn test_claim_moves_task_and_records_exactly_one_claim() {
    let (_dir, layout) = temp_vault();
    let cloud = StageStore::new(&layout, Zone::Cloud);
    let local = StageStore::new(&layout, Zone::Local);
    let log = ClaimLog::new(&layout);

    let id = cloud.create(Stage::Pending, &safe_task()).unwrap();
    let before = cloud.read(&id, Stage::Pending).unwrap();

    let claim =
        claim_task(&log, &cloud, &id, Stage::Pending, &local, Stage::Claimed, "worker-1").unwrap();

    // Absent at the source, present and unchanged at the destination.
    assert!(!cloud.exists(&id, Stage::Pending));
    assert_eq!(local.read(&id, Stage::Claimed).unwrap(), before);

    // Exactly one claim record references this transfer.
    let claims = log.list().unwrap();
    assert_eq!(claims.iter().filter(|c| c.task == id).count(), 1);
    assert_eq!(claim.claimed_by, "worker-1");
    assert_eq!(claim.from_zone, Zone::Cloud);
    assert_eq!(claim.to_zone, Zone::Local);
    assert!(!log.is_orphaned(&claim, &cloud));
}

#[test]
fn test_second_claim_observes_source_missing() {
    let (_dir, layout) = temp_vault();
    let cloud = StageStore::new(&layout, Zone::Cloud);
    let local = StageStore::new(&layout, Zone::Local);
    let log = ClaimLog::new(&layout);

    let id = cloud.create(Stage::Pending, &safe_task()).unwrap();
    claim_task(&log, &cloud, &id, Stage::Pending, &local, Stage::Claimed, "worker-1").unwrap();

    let err = claim_task(&log, &cloud, &id, Stage::Pending, &local, Stage::Inbox, "worker-2")
        .unwrap_err();
    assert!(matches!(err, ClaimError::SourceMissing { .. }));
}

#[test]
fn test_claim_never_overwrites_occupied_destination() {
    let (_dir, layout) = temp_vault();
    let cloud = StageStore::new(&layout, Zone::Cloud);
    let local = StageStore::new(&layout, Zone::Local);
    let log = ClaimLog::new(&layout);

    let id = cloud.create(Stage::Pending, &safe_task()).unwrap();
    std::fs::write(local.record_path(&id, Stage::Claimed), "occupied").unwrap();

    let err = claim_task(&log, &cloud, &id, Stage::Pending, &local, Stage::Claimed, "worker-1")
        .unwrap_err();
    assert!(matches!(err, ClaimError::Conflict { .. }));

    // The failed move left an orphan claim record, distinguishable because
    // the task is still at its origin.
    assert!(cloud.exists(&id, Stage::Pending));
    let claims = log.list().unwrap();
    let orphan = claims.iter().find(|c| c.task == id).unwrap();
    assert!(log.is_orphaned(orphan, &cloud));
}

#[test]
fn test_concurrent_claims_have_exactly_one_winner() {
    let (_dir, layout) = temp_vault();
    let cloud = StageStore::new(&layout, Zone::Cloud);
    let local = StageStore::new(&layout, Zone::Local);
    let log = ClaimLog::new(&layout);

    let id = cloud.create(Stage::Pending, &safe_task()).unwrap();
    let before = cloud.read(&id, Stage::Pending).unwrap();

    let wins = Arc::new(AtomicUsize::new(0));
    let races = Arc::new(AtomicUsize::new(0));

    std::thread::scope(|scope| {
        for worker in 0..4 {
            let cloud = cloud.clone();
            let local = local.clone();
            let log = log.clone();
            let id = id.clone();
            let wins = Arc::clone(&wins);
            let races = Arc::clone(&races);
            scope.spawn(move || {
                match claim_task(
                    &log,
                    &cloud,
                    &id,
                    Stage::Pending,
                    &local,
                    Stage::Claimed,
                    &format!("worker-{worker}"),
                ) {
                    Ok(_) => wins.fetch_add(1, Ordering::SeqCst),
                    Err(ClaimError::SourceMissing { .. } | ClaimError::Conflict { .. }) => {
                        races.fetch_add(1, Ordering::SeqCst)
                    },
                    Err(err) => panic!("unexpected claim error: {err}"),
                };
            });
        }
    });

    assert_eq!(wins.load(Ordering::SeqCst), 1);
    assert_eq!(races.load(Ordering::SeqCst), 3);

    // Never duplicated: one copy at the destination, none at the source.
    assert!(!cloud.exists(&id, Stage::Pending));
    assert_eq!(local.read(&id, Stage::Claimed).unwrap(), before);
}
