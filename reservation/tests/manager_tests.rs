use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use reservation::manager::{CommitError, ReservationManager};
use reservation::model::{CustomerInfo, Reservation, ReservationStatus};
use reservation::store::ReservationStore;
use reservation::store::memory_store::InMemoryReservationStore;
use reservation::window::TimeWindow;
use venue::model::{TableId, VenueId};

fn window(date: (i32, u32, u32), start: (u32, u32), end: (u32, u32)) -> TimeWindow {
    TimeWindow::new(
        NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
        NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
        NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
    )
    .unwrap()
}

fn reservation(venue_id: VenueId, table_ids: Vec<TableId>, w: TimeWindow) -> Reservation {
    Reservation {
        id: Uuid::nil(),
        venue_id,
        table_ids,
        window: w,
        party_size: 4,
        status: ReservationStatus::Pending,
        customer: CustomerInfo {
            name: "Grace".into(),
            email: "grace@example.com".into(),
            phone: None,
        },
        deposit_total: 10_000,
        min_spend_total: 50_000,
        created_at_ms: 1_000,
    }
}

fn manager(store: &InMemoryReservationStore) -> ReservationManager<InMemoryReservationStore> {
    ReservationManager::new(Arc::new(store.clone()), Duration::from_secs(1))
}

#[tokio::test]
async fn commit_persists_a_pending_hold() -> anyhow::Result<()> {
    let store = InMemoryReservationStore::new();
    let mgr = manager(&store);

    let venue_id = Uuid::new_v4();
    let table = Uuid::new_v4();
    let w = window((2025, 3, 14), (23, 0), (6, 0));

    let id = mgr.commit(reservation(venue_id, vec![table], w)).await?;

    let stored = store.load(id).await?.unwrap();
    assert_eq!(stored.status, ReservationStatus::Pending);
    assert_eq!(stored.table_ids, vec![table]);

    Ok(())
}

#[tokio::test]
async fn second_commit_on_same_table_conflicts_and_names_it() -> anyhow::Result<()> {
    let store = InMemoryReservationStore::new();
    let mgr = manager(&store);

    let venue_id = Uuid::new_v4();
    let table = Uuid::new_v4();
    let free_table = Uuid::new_v4();
    let w = window((2025, 3, 14), (23, 0), (6, 0));

    mgr.commit(reservation(venue_id, vec![table], w)).await?;

    let err = mgr
        .commit(reservation(venue_id, vec![table, free_table], w))
        .await
        .unwrap_err();

    match err {
        CommitError::Conflict(tables) => {
            // Only the contested table is reported, not the free one.
            assert_eq!(tables, vec![table]);
        }
        other => panic!("expected Conflict, got {:?}", other),
    }

    // The failed commit left nothing behind.
    assert_eq!(store.load_all().await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn wrapped_window_conflicts_across_calendar_days() -> anyhow::Result<()> {
    let store = InMemoryReservationStore::new();
    let mgr = manager(&store);

    let venue_id = Uuid::new_v4();
    let table = Uuid::new_v4();

    // Booked on D, runs 23:00 -> 06:00 next morning.
    let long_night = window((2025, 3, 14), (23, 0), (6, 0));
    mgr.commit(reservation(venue_id, vec![table], long_night)).await?;

    // Booked on D+1 in the small hours: same physical time span.
    let after_midnight = window((2025, 3, 15), (0, 30), (1, 30));
    let err = mgr
        .commit(reservation(venue_id, vec![table], after_midnight))
        .await
        .unwrap_err();

    assert!(matches!(err, CommitError::Conflict(_)));
    Ok(())
}

#[tokio::test]
async fn disjoint_table_sets_commit_concurrently() -> anyhow::Result<()> {
    let store = InMemoryReservationStore::new();
    let mgr = Arc::new(manager(&store));

    let venue_id = Uuid::new_v4();
    let w = window((2025, 3, 14), (23, 0), (6, 0));

    let (m1, m2) = (mgr.clone(), mgr.clone());
    let r1 = reservation(venue_id, vec![Uuid::new_v4()], w);
    let r2 = reservation(venue_id, vec![Uuid::new_v4()], w);

    let a = tokio::spawn(async move { m1.commit(r1).await });
    let b = tokio::spawn(async move { m2.commit(r2).await });

    assert!(a.await?.is_ok());
    assert!(b.await?.is_ok());
    assert_eq!(store.load_all().await?.len(), 2);

    Ok(())
}

#[tokio::test]
async fn lock_registry_is_pruned_after_commits() -> anyhow::Result<()> {
    let store = InMemoryReservationStore::new();
    let mgr = manager(&store);

    let venue_id = Uuid::new_v4();

    // Wrapped windows take two keys per table; nights across a week take
    // keys for many dates. None may outlive their commit.
    for day in 10..17 {
        let w = window((2025, 3, day), (23, 0), (6, 0));
        mgr.commit(reservation(venue_id, vec![Uuid::new_v4(), Uuid::new_v4()], w))
            .await?;
    }

    assert_eq!(mgr.active_locks().await, 0);
    Ok(())
}

#[tokio::test]
async fn confirm_promotes_only_pending() -> anyhow::Result<()> {
    let store = InMemoryReservationStore::new();
    let mgr = manager(&store);

    let venue_id = Uuid::new_v4();
    let w = window((2025, 3, 14), (23, 0), (6, 0));
    let id = mgr.commit(reservation(venue_id, vec![Uuid::new_v4()], w)).await?;

    mgr.confirm(id).await?;
    assert_eq!(
        store.load(id).await?.unwrap().status,
        ReservationStatus::Confirmed
    );

    // A second confirm is a state error.
    assert!(mgr.confirm(id).await.is_err());

    // Unknown id is a state error too.
    assert!(mgr.confirm(Uuid::new_v4()).await.is_err());

    Ok(())
}

#[tokio::test]
async fn cancel_releases_the_hold() -> anyhow::Result<()> {
    let store = InMemoryReservationStore::new();
    let mgr = manager(&store);

    let venue_id = Uuid::new_v4();
    let table = Uuid::new_v4();
    let w = window((2025, 3, 14), (23, 0), (6, 0));

    let id = mgr.commit(reservation(venue_id, vec![table], w)).await?;
    mgr.cancel(id).await?;

    // The table can be claimed again for the same window.
    assert!(mgr.commit(reservation(venue_id, vec![table], w)).await.is_ok());

    // Cancelling twice is a state error.
    assert!(mgr.cancel(id).await.is_err());

    Ok(())
}

#[tokio::test]
async fn expire_pending_releases_only_stale_holds() -> anyhow::Result<()> {
    let store = InMemoryReservationStore::new();
    let mgr = manager(&store);

    let venue_id = Uuid::new_v4();
    let w = window((2025, 3, 14), (23, 0), (6, 0));

    let stale_id = mgr.commit(reservation(venue_id, vec![Uuid::new_v4()], w)).await?;
    let confirmed_id = mgr.commit(reservation(venue_id, vec![Uuid::new_v4()], w)).await?;
    mgr.confirm(confirmed_id).await?;

    // Reservations were created "now"; ttl 0 makes every pending one stale.
    let now = store.load(stale_id).await?.unwrap().created_at_ms + 1;
    let released = mgr.expire_pending(now, 0).await?;

    assert_eq!(released, 1);
    assert_eq!(
        store.load(stale_id).await?.unwrap().status,
        ReservationStatus::Cancelled
    );
    assert_eq!(
        store.load(confirmed_id).await?.unwrap().status,
        ReservationStatus::Confirmed
    );

    Ok(())
}
