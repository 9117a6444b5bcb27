//! The commit side of the engine: serialized reservation writes.
//!
//! The advisory read path (resolver → generator → ranker) may race with
//! other requests; the manager is the authority. A commit:
//!
//!   1. Acquires one async lock per `(table_id, calendar date)` the window
//!      touches, in sorted key order, bounded by a timeout.
//!   2. Re-reads the reservation set fresh from the store.
//!   3. Re-checks overlap with the same half-open rule the resolver uses.
//!   4. Inserts the reservation as a single store write, or changes nothing.
//!
//! Two commits over disjoint table sets never contend; two commits sharing a
//! table on the same night are totally ordered by the lock registry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::model::{Reservation, ReservationId, ReservationStatus};
use crate::store::ReservationStore;
use venue::model::TableId;

/// Why a commit attempt failed.
///
/// `Conflict` is a genuine capacity loss and retrying the same tables is
/// pointless; `LockTimeout` is transient and the caller may retry as-is.
/// Store failures are neither and must never be mistaken for conflicts.
#[derive(Debug, Error)]
pub enum CommitError {
    #[error("tables already reserved: {0:?}")]
    Conflict(Vec<TableId>),

    #[error("timed out acquiring table locks after {0:?}")]
    LockTimeout(Duration),

    #[error("reservation store unavailable: {0}")]
    Store(#[from] anyhow::Error),
}

type LockKey = (TableId, NaiveDate);

/// Owns the per-table lock registry and persists reservation state changes.
pub struct ReservationManager<S: ReservationStore> {
    store: Arc<S>,
    locks: Arc<Mutex<HashMap<LockKey, Arc<Mutex<()>>>>>,
    lock_timeout: Duration,
}

impl<S: ReservationStore> ReservationManager<S> {
    pub fn new(store: Arc<S>, lock_timeout: Duration) -> Self {
        Self {
            store,
            locks: Arc::new(Mutex::new(HashMap::new())),
            lock_timeout,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Atomically claim the reservation's tables for its window.
    ///
    /// The caller supplies a fully-priced reservation; the manager assigns a
    /// fresh id and forces the status to `Pending` (the payment flow
    /// promotes it later). On conflict the error names every losing table.
    pub async fn commit(&self, reservation: Reservation) -> Result<ReservationId, CommitError> {
        let guards = self
            .acquire_locks(&reservation.table_ids, &reservation.window.dates_touched())
            .await?;

        let result = self.commit_under_locks(reservation).await;

        drop(guards);
        self.prune_locks().await;
        result
    }

    async fn commit_under_locks(
        &self,
        mut reservation: Reservation,
    ) -> Result<ReservationId, CommitError> {
        // Authoritative re-check against the freshest rows; the resolver's
        // earlier answer was only a hint for the UI.
        let existing = self
            .store
            .load_window(reservation.venue_id, &reservation.window)
            .await?;

        let mut losers: Vec<TableId> = reservation
            .table_ids
            .iter()
            .copied()
            .filter(|id| existing.iter().any(|r| r.blocks(*id, &reservation.window)))
            .collect();

        if !losers.is_empty() {
            losers.sort();
            losers.dedup();
            debug!(tables = ?losers, "commit lost the race");
            return Err(CommitError::Conflict(losers));
        }

        reservation.id = Uuid::new_v4();
        reservation.status = ReservationStatus::Pending;

        self.store.insert(&reservation).await?;

        info!(
            reservation = %reservation.id,
            venue = %reservation.venue_id,
            tables = reservation.table_ids.len(),
            party_size = reservation.party_size,
            "reservation committed"
        );

        Ok(reservation.id)
    }

    /// Promote a pending hold after payment is authorized.
    pub async fn confirm(&self, id: ReservationId) -> anyhow::Result<()> {
        let Some(reservation) = self.store.load(id).await? else {
            anyhow::bail!("reservation {} not found", id);
        };

        if reservation.status != ReservationStatus::Pending {
            anyhow::bail!(
                "reservation {} is {}, only Pending can be confirmed",
                id,
                reservation.status
            );
        }

        self.store.update_status(id, ReservationStatus::Confirmed).await
    }

    /// Release a hold (payment failure, customer abort). The tables become
    /// visible to the resolver again immediately.
    pub async fn cancel(&self, id: ReservationId) -> anyhow::Result<()> {
        let Some(reservation) = self.store.load(id).await? else {
            anyhow::bail!("reservation {} not found", id);
        };

        if !reservation.status.blocks_table() {
            anyhow::bail!("reservation {} is already {}", id, reservation.status);
        }

        self.store.update_status(id, ReservationStatus::Cancelled).await
    }

    /// Cancel pending holds older than `ttl_ms`. Returns how many were
    /// released. Confirmed reservations are never touched.
    pub async fn expire_pending(&self, now_ms: u64, ttl_ms: u64) -> anyhow::Result<usize> {
        let all = self.store.load_all().await?;

        let stale: Vec<ReservationId> = all
            .iter()
            .filter(|r| {
                r.status == ReservationStatus::Pending
                    && r.created_at_ms.saturating_add(ttl_ms) <= now_ms
            })
            .map(|r| r.id)
            .collect();

        for id in &stale {
            if let Err(e) = self.store.update_status(*id, ReservationStatus::Cancelled).await {
                warn!(reservation = %id, error = %e, "failed to expire pending hold");
            }
        }

        if !stale.is_empty() {
            info!(count = stale.len(), "expired stale pending holds");
        }

        Ok(stale.len())
    }

    /// Lock-registry entries currently retained. Keys persist only while a
    /// commit holds or waits on their slot.
    pub async fn active_locks(&self) -> usize {
        self.locks.lock().await.len()
    }

    /// Drop registry entries nobody holds or waits on. Cloning a slot also
    /// requires the registry lock, so a strong count of one means the
    /// registry holds the only reference.
    async fn prune_locks(&self) {
        let mut registry = self.locks.lock().await;
        registry.retain(|_, slot| Arc::strong_count(slot) > 1);
    }

    /// Take every `(table, date)` lock the commit needs, in sorted order so
    /// concurrent commits over overlapping table sets cannot deadlock.
    async fn acquire_locks(
        &self,
        table_ids: &[TableId],
        dates: &[NaiveDate],
    ) -> Result<Vec<OwnedMutexGuard<()>>, CommitError> {
        let mut keys: Vec<LockKey> = table_ids
            .iter()
            .flat_map(|t| dates.iter().map(move |d| (*t, *d)))
            .collect();
        keys.sort();
        keys.dedup();

        let mut guards = Vec::with_capacity(keys.len());
        for key in keys {
            let slot = {
                let mut registry = self.locks.lock().await;
                registry
                    .entry(key)
                    .or_insert_with(|| Arc::new(Mutex::new(())))
                    .clone()
            };

            match timeout(self.lock_timeout, slot.lock_owned()).await {
                Ok(guard) => guards.push(guard),
                Err(_) => return Err(CommitError::LockTimeout(self.lock_timeout)),
            }
        }

        Ok(guards)
    }
}
