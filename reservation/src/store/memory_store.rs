use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::ReservationStore;
use crate::model::{Reservation, ReservationId, ReservationStatus};
use crate::window::TimeWindow;
use venue::model::VenueId;

/// In-memory reservation store.
///
/// First-class deterministic backend: unit tests inject it instead of a
/// database, and single-process deployments can run on it directly.
#[derive(Default, Clone)]
pub struct InMemoryReservationStore {
    map: Arc<Mutex<HashMap<ReservationId, Reservation>>>,
}

impl InMemoryReservationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReservationStore for InMemoryReservationStore {
    async fn load_window(
        &self,
        venue_id: VenueId,
        window: &TimeWindow,
    ) -> anyhow::Result<Vec<Reservation>> {
        let dates = window.query_dates();
        let mut out: Vec<Reservation> = self
            .map
            .lock()
            .await
            .values()
            .filter(|r| r.venue_id == venue_id && dates.contains(&r.window.date))
            .cloned()
            .collect();

        out.sort_by_key(|r| r.id);
        Ok(out)
    }

    async fn insert(&self, reservation: &Reservation) -> anyhow::Result<()> {
        let mut map = self.map.lock().await;
        if map.contains_key(&reservation.id) {
            anyhow::bail!("reservation {} already exists", reservation.id);
        }
        map.insert(reservation.id, reservation.clone());
        Ok(())
    }

    async fn load(&self, id: ReservationId) -> anyhow::Result<Option<Reservation>> {
        Ok(self.map.lock().await.get(&id).cloned())
    }

    async fn update_status(
        &self,
        id: ReservationId,
        status: ReservationStatus,
    ) -> anyhow::Result<()> {
        let mut map = self.map.lock().await;
        let Some(reservation) = map.get_mut(&id) else {
            anyhow::bail!("reservation {} not found", id);
        };
        reservation.status = status;
        Ok(())
    }

    async fn load_all(&self) -> anyhow::Result<Vec<Reservation>> {
        let mut out: Vec<Reservation> = self.map.lock().await.values().cloned().collect();
        out.sort_by_key(|r| r.id);
        Ok(out)
    }
}
