//! Determines which tables are free for a requested window, given one
//! consistent snapshot of the reservation set.
//
//  This module is deliberately pure: no async, no IO.

use std::collections::BTreeSet;

use reservation::model::Reservation;
use reservation::window::TimeWindow;
use venue::model::{Table, TableId};

/// A table is available iff it is active and no pending/confirmed
/// reservation holding it overlaps the window (half-open intervals, so a
/// booking ending exactly when another starts is fine).
///
/// Returns an ordered set so downstream stages see a reproducible order.
pub fn resolve_availability(
    tables: &[Table],
    reservations: &[Reservation],
    window: &TimeWindow,
) -> BTreeSet<TableId> {
    tables
        .iter()
        .filter(|t| t.is_active)
        .filter(|t| !reservations.iter().any(|r| r.blocks(t.id, window)))
        .map(|t| t.id)
        .collect()
}
