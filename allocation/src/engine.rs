//! The allocation engine.
//!
//! For each booking request it:
//!   1. Takes one snapshot of tables and reservations from the stores.
//!   2. Resolves available tables (`availability`).
//!   3. Enumerates feasible singles and combinations (`candidates`).
//!   4. Ranks them (`ranking`) and returns the bounded top list.
//!
//! The snapshot is advisory; `commit` re-validates under the reservation
//! manager's per-table locks and is the only operation that writes.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{Instrument, debug};
use uuid::Uuid;

use crate::availability::resolve_availability;
use crate::candidates::generate_candidates;
use crate::error::EngineError;
use crate::ranking::rank;
use crate::types::{BookingRequest, Candidate, CommitReceipt, CommitRequest, EngineConfig};
use common::logger::{TraceId, child_span, request_span};
use reservation::manager::ReservationManager;
use reservation::model::{Reservation, ReservationStatus};
use reservation::store::ReservationStore;
use reservation::window::TimeWindow;
use venue::catalog::VenueCatalog;
use venue::store::VenueStore;

pub struct AllocationEngine<V: VenueStore, R: ReservationStore> {
    catalog: Arc<VenueCatalog<V>>,
    reservations: Arc<ReservationManager<R>>,
    cfg: EngineConfig,
}

impl<V: VenueStore, R: ReservationStore> AllocationEngine<V, R> {
    /// Builds the engine's own reservation manager, bounded by
    /// `cfg.lock_timeout`.
    pub fn new(catalog: Arc<VenueCatalog<V>>, store: Arc<R>, cfg: EngineConfig) -> Self {
        let reservations = Arc::new(ReservationManager::new(store, cfg.lock_timeout));
        Self {
            catalog,
            reservations,
            cfg,
        }
    }

    /// The manager the engine commits through; callers drive the
    /// confirm/cancel lifecycle on it.
    pub fn manager(&self) -> &Arc<ReservationManager<R>> {
        &self.reservations
    }

    /// Ranked candidates for a request. An unknown venue, a venue with no
    /// active tables, or a party nothing can seat all yield `Ok(vec![])`:
    /// absence of availability is an expected outcome, not a failure.
    pub async fn suggest(&self, req: &BookingRequest) -> Result<Vec<Candidate>, EngineError> {
        let span = request_span("suggest", &TraceId::default());
        self.suggest_inner(req).instrument(span).await
    }

    async fn suggest_inner(&self, req: &BookingRequest) -> Result<Vec<Candidate>, EngineError> {
        validate_window(&req.window)?;
        validate_party_size(req.party_size)?;

        let tables = self
            .catalog
            .tables_for(req.venue_id, req.location)
            .await
            .map_err(EngineError::StoreUnavailable)?;

        if tables.is_empty() {
            debug!(venue = %req.venue_id, "no active tables in scope");
            return Ok(Vec::new());
        }

        let reservations = self
            .reservations
            .store()
            .load_window(req.venue_id, &req.window)
            .await
            .map_err(EngineError::StoreUnavailable)?;

        let available = {
            let _stage = child_span("resolve").entered();
            resolve_availability(&tables, &reservations, &req.window)
        };

        let combinations = self
            .catalog
            .combinations_for(req.venue_id)
            .await
            .map_err(EngineError::StoreUnavailable)?;

        let candidates = {
            let _stage = child_span("generate").entered();
            generate_candidates(&tables, &combinations, &available, req.party_size)
        };
        let ranked = {
            let _stage = child_span("rank").entered();
            rank(
                candidates,
                req.party_size,
                &self.cfg.ranking,
                self.cfg.max_results,
            )
        };

        debug!(
            venue = %req.venue_id,
            party_size = req.party_size,
            available = available.len(),
            candidates = ranked.len(),
            "request resolved"
        );

        Ok(ranked)
    }

    /// Claim the requested tables, atomically. The requested table set is
    /// validated against the catalog (known, active, this venue) and priced
    /// there; the actual claim is serialized by the reservation manager.
    pub async fn commit(&self, req: CommitRequest) -> Result<CommitReceipt, EngineError> {
        let span = request_span("commit", &TraceId::default());
        self.commit_inner(req).instrument(span).await
    }

    async fn commit_inner(&self, req: CommitRequest) -> Result<CommitReceipt, EngineError> {
        validate_window(&req.window)?;
        validate_party_size(req.party_size)?;

        if req.table_ids.is_empty() {
            return Err(EngineError::InvalidRequest(
                "commit requires at least one table".into(),
            ));
        }

        let mut unique = req.table_ids.clone();
        unique.sort();
        unique.dedup();
        if unique.len() != req.table_ids.len() {
            return Err(EngineError::InvalidRequest(
                "commit table list contains duplicates".into(),
            ));
        }

        let mut deposit_total = 0u64;
        let mut min_spend_total = 0u64;
        for table_id in &req.table_ids {
            let table = self
                .catalog
                .table(req.venue_id, *table_id)
                .await
                .map_err(EngineError::StoreUnavailable)?
                .ok_or_else(|| {
                    EngineError::InvalidRequest(format!(
                        "table {} is not part of venue {}",
                        table_id, req.venue_id
                    ))
                })?;

            if !table.is_active {
                return Err(EngineError::InvalidRequest(format!(
                    "table {} is not active",
                    table_id
                )));
            }

            deposit_total += table.deposit;
            min_spend_total += table.min_spend;
        }

        let reservation = Reservation {
            id: Uuid::nil(), // manager assigns
            venue_id: req.venue_id,
            table_ids: req.table_ids,
            window: req.window,
            party_size: req.party_size,
            status: ReservationStatus::Pending,
            customer: req.customer,
            deposit_total,
            min_spend_total,
            created_at_ms: now_ms(),
        };

        let reservation_id = self.reservations.commit(reservation).await?;

        Ok(CommitReceipt {
            reservation_id,
            deposit_total,
            min_spend_total,
        })
    }

    /// Release pending holds older than the configured TTL.
    pub async fn sweep_expired_holds(&self) -> Result<usize, EngineError> {
        self.reservations
            .expire_pending(now_ms(), self.cfg.pending_ttl.as_millis() as u64)
            .await
            .map_err(EngineError::StoreUnavailable)
    }
}

fn validate_window(window: &TimeWindow) -> Result<(), EngineError> {
    // TimeWindow::new already rejects start == end; re-check here because
    // requests may be built field-by-field by deserializing callers.
    if window.start == window.end {
        return Err(EngineError::InvalidRequest(
            "time window start and end are equal".into(),
        ));
    }
    Ok(())
}

fn validate_party_size(party_size: u32) -> Result<(), EngineError> {
    if party_size == 0 {
        return Err(EngineError::InvalidRequest(
            "party size must be at least 1".into(),
        ));
    }
    Ok(())
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
