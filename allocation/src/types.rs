//! Shared types used by the allocation subsystem.

use std::time::Duration;

use reservation::model::{CustomerInfo, ReservationId};
use reservation::window::TimeWindow;
use venue::model::{Location, TableId, VenueId};

/// One advisory availability/recommendation query.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub venue_id: VenueId,
    /// Optional floor-zone filter.
    pub location: Option<Location>,
    pub window: TimeWindow,
    pub party_size: u32,
}

/// A confirmed customer's claim, sent once payment is authorized upstream.
#[derive(Debug, Clone)]
pub struct CommitRequest {
    pub venue_id: VenueId,
    pub table_ids: Vec<TableId>,
    pub window: TimeWindow,
    pub party_size: u32,
    pub customer: CustomerInfo,
}

/// What the caller gets back from a successful commit.
#[derive(Debug, Clone)]
pub struct CommitReceipt {
    pub reservation_id: ReservationId,
    pub deposit_total: u64,
    pub min_spend_total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    Single,
    Combination,
}

/// One computed, not-yet-committed answer to a booking request.
///
/// Ephemeral: built per request, scored by the ranker, never persisted.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub table_ids: Vec<TableId>,
    pub kind: CandidateKind,

    /// Seats this candidate offers: the single table's max capacity, or the
    /// venue-declared combined capacity.
    pub capacity: u32,

    /// Aggregate commercial terms over the member tables, minor units.
    pub min_spend: u64,
    pub deposit: u64,

    /// Venue-curated "intended option for this party size" flag.
    pub preferred: bool,

    /// Total ranking score; set by the ranker, zero until then.
    pub score: u32,
}

impl Candidate {
    /// Smallest member table id; the final tie-break key.
    pub fn min_table_id(&self) -> TableId {
        self.table_ids
            .iter()
            .min()
            .copied()
            .unwrap_or_else(uuid::Uuid::nil)
    }
}

/// Deposit tier thresholds and fixed bonuses for the ranker.
#[derive(Debug, Clone)]
pub struct RankingConfig {
    /// Deposits below this score the top cost tier (minor units).
    pub low_deposit: u64,
    /// Deposits below this (and at/above `low_deposit`) score the mid tier.
    pub mid_deposit: u64,

    /// Bonus for the structurally preferred shape (single for parties a
    /// single table can seat, combination otherwise).
    pub structural_bonus: u32,
    /// Bonus for the venue-curated preferred flag.
    pub curated_bonus: u32,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            low_deposit: 20_000,
            mid_deposit: 50_000,
            structural_bonus: 8,
            curated_bonus: 12,
        }
    }
}

/// Configuration knobs for the allocation engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Ranked candidates handed back per request; presenting unlimited
    /// options has no value.
    pub max_results: usize,

    /// Bound on acquiring per-table commit locks; exceeding it yields a
    /// retryable timeout, not a conflict.
    pub lock_timeout: Duration,

    /// How long an unconfirmed (pending) hold lives before the expiry sweep
    /// releases it.
    pub pending_ttl: Duration,

    pub ranking: RankingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_results: 5,
            lock_timeout: Duration::from_secs(5),
            pending_ttl: Duration::from_secs(15 * 60),
            ranking: RankingConfig::default(),
        }
    }
}
