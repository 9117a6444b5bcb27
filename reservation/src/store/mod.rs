pub mod memory_store;
pub mod sqlite_store;

use crate::model::{Reservation, ReservationId, ReservationStatus};
use crate::window::TimeWindow;
use venue::model::VenueId;

/// Persistence for reservations.
///
/// `load_window` must return one consistent snapshot of every reservation
/// that could interact with the given window: all rows for the venue whose
/// booking date lies in the window's query band (see
/// [`TimeWindow::query_dates`]). Overlap filtering happens in pure code on
/// top of that snapshot, never inside the store.
#[async_trait::async_trait]
pub trait ReservationStore: Send + Sync {
    async fn load_window(
        &self,
        venue_id: VenueId,
        window: &TimeWindow,
    ) -> anyhow::Result<Vec<Reservation>>;

    /// Insert a new reservation. Fails if the id already exists; a failed
    /// insert leaves the store unchanged.
    async fn insert(&self, reservation: &Reservation) -> anyhow::Result<()>;

    async fn load(&self, id: ReservationId) -> anyhow::Result<Option<Reservation>>;

    /// Update the status of an existing reservation; errors if unknown.
    async fn update_status(&self, id: ReservationId, status: ReservationStatus)
    -> anyhow::Result<()>;

    async fn load_all(&self) -> anyhow::Result<Vec<Reservation>>;
}
