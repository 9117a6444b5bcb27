use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::window::TimeWindow;
use venue::model::{TableId, VenueId};

pub type ReservationId = uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    NoShow,
}

impl ReservationStatus {
    /// Only pending and confirmed reservations hold their tables. Cancelled,
    /// completed and no-show rows stay in the store for history but never
    /// block availability.
    pub fn blocks_table(&self) -> bool {
        matches!(self, ReservationStatus::Pending | ReservationStatus::Confirmed)
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReservationStatus::Pending => "Pending",
            ReservationStatus::Confirmed => "Confirmed",
            ReservationStatus::Cancelled => "Cancelled",
            ReservationStatus::Completed => "Completed",
            ReservationStatus::NoShow => "NoShow",
        };
        f.write_str(s)
    }
}

impl FromStr for ReservationStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(ReservationStatus::Pending),
            "Confirmed" => Ok(ReservationStatus::Confirmed),
            "Cancelled" => Ok(ReservationStatus::Cancelled),
            "Completed" => Ok(ReservationStatus::Completed),
            "NoShow" => Ok(ReservationStatus::NoShow),
            other => Err(anyhow::anyhow!("Invalid ReservationStatus value: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// A claim on one or more tables for a date and time window.
#[derive(Debug, Clone)]
pub struct Reservation {
    pub id: ReservationId,
    pub venue_id: VenueId,

    /// Tables held by this reservation; more than one for combinations.
    pub table_ids: Vec<TableId>,
    pub window: TimeWindow,
    pub party_size: u32,

    pub status: ReservationStatus,
    pub customer: CustomerInfo,

    /// Commercial terms computed for the committed table set, minor units.
    pub deposit_total: u64,
    pub min_spend_total: u64,

    pub created_at_ms: u64,
}

impl Reservation {
    /// Does this reservation block `table_id` for `window`?
    pub fn blocks(&self, table_id: TableId, window: &TimeWindow) -> bool {
        self.status.blocks_table()
            && self.table_ids.contains(&table_id)
            && self.window.overlaps(window)
    }
}
